use crate::url::CanonicalUrl;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Shared breadth-first worklist drained by the crawl workers.
///
/// `pending` counts queued URLs plus URLs a worker has popped but not yet
/// finished. The crawl is over when it reaches zero.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<CanonicalUrl>>,
    pending: AtomicUsize,
    changed: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, url: CanonicalUrl) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.lock().push_back(url);
        self.changed.notify_waiters();
    }

    /// Wait for the next URL. Returns `None` once the queue is empty and no
    /// popped URL is still being processed.
    ///
    /// Every `Some` must be matched by a call to [`Frontier::done`].
    pub async fn next(&self) -> Option<CanonicalUrl> {
        loop {
            let changed = self.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            if let Some(url) = self.lock().pop_front() {
                return Some(url);
            }
            if self.pending.load(Ordering::SeqCst) == 0 {
                return None;
            }

            changed.await;
        }
    }

    /// Mark a popped URL as finished, after its links have been pushed.
    pub fn done(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.changed.notify_waiters();
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<CanonicalUrl>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
