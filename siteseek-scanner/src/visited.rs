use crate::url::CanonicalUrl;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Canonical URLs that have been scheduled for processing.
///
/// `add` is the single gate that admits a URL to be fetched, so it returns
/// `true` at most once per URL for the lifetime of the set.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<CanonicalUrl>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically mark `url` as visited. Returns `true` if it was not already present.
    pub fn add(&self, url: &CanonicalUrl) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.clone())
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current contents, sorted.
    pub fn snapshot(&self) -> Vec<CanonicalUrl> {
        let mut urls: Vec<CanonicalUrl> = self.lock().iter().cloned().collect();
        urls.sort();
        urls
    }

    // A panic while holding the lock cannot leave the set half-updated.
    fn lock(&self) -> MutexGuard<'_, HashSet<CanonicalUrl>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
