use crate::error::{Result, ScanError};
use crate::fetch::{FetchResponse, Fetcher, HttpFetcher};
use crate::frontier::Frontier;
use crate::index::TextIndex;
use crate::parser::{HtmlParser, PageParser};
use crate::result::{CrawlSummary, PageReport};
use crate::scope::{ScopeMode, ScopeRoot};
use crate::stop::StopSignal;
use crate::url::{CanonicalUrl, normalize};
use crate::visited::VisitedSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;
pub type ResultCallback = Arc<dyn Fn(PageReport) + Send + Sync>;

/// Scoped crawl engine.
///
/// The visited set and text index belong to the crawler instance: they start
/// empty and are shared by every `crawl` call made on it.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn PageParser>,
    visited: Arc<VisitedSet>,
    index: Arc<TextIndex>,
    workers: usize,
    scope_mode: ScopeMode,
    index_failures: bool,
    crawl_timeout: Option<Duration>,
    stop: StopSignal,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            parser: Arc::new(HtmlParser::new()),
            visited: Arc::new(VisitedSet::new()),
            index: Arc::new(TextIndex::new()),
            workers: 1,
            scope_mode: ScopeMode::default(),
            index_failures: false,
            crawl_timeout: None,
            stop: StopSignal::new(),
            progress_callback: None,
            result_callback: None,
        }
    }

    /// Crawler using the default reqwest transport.
    pub fn http(timeout_secs: u64) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::with_timeout(timeout_secs)?)))
    }

    pub fn with_parser(mut self, parser: Arc<dyn PageParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_scope_mode(mut self, mode: ScopeMode) -> Self {
        self.scope_mode = mode;
        self
    }

    /// Give failed URLs an empty index entry instead of none.
    pub fn with_index_failures(mut self, index_failures: bool) -> Self {
        self.index_failures = index_failures;
        self
    }

    pub fn with_crawl_timeout(mut self, timeout: Duration) -> Self {
        self.crawl_timeout = Some(timeout);
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn index(&self) -> &TextIndex {
        &self.index
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn scope_mode(&self) -> ScopeMode {
        self.scope_mode
    }

    /// Crawl everything reachable from `seed` inside the scope root.
    ///
    /// The scope root is `explicit_base` when given, otherwise the seed.
    /// Failures are recorded in the returned summary; this never errors.
    pub async fn crawl(&self, seed: &str, explicit_base: Option<&str>) -> CrawlSummary {
        let started = Instant::now();
        let mut summary = CrawlSummary {
            seed: seed.to_string(),
            ..CrawlSummary::default()
        };

        let (seed_url, scope) = match self.establish_scope(seed, explicit_base) {
            Ok(established) => established,
            Err(e) => {
                warn!("Not crawling {}: {}", seed, e);
                summary.invalid_seed = Some(e.to_string());
                return summary;
            }
        };

        info!(
            "Starting crawl of {} with {} workers, scope {}",
            seed_url, self.workers, scope
        );
        summary.scope_root = Some(scope.root().clone());

        let ctx = Arc::new(CrawlContext {
            fetcher: self.fetcher.clone(),
            parser: self.parser.clone(),
            visited: self.visited.clone(),
            index: self.index.clone(),
            frontier: Frontier::new(),
            scope,
            index_failures: self.index_failures,
            stop: self.stop.clone(),
            deadline: self.crawl_timeout.map(|t| tokio::time::Instant::now() + t),
            progress_callback: self.progress_callback.clone(),
            result_callback: self.result_callback.clone(),
            pages: Mutex::new(Vec::new()),
            skipped_visited: AtomicUsize::new(0),
            invalid_links: AtomicUsize::new(0),
            out_of_scope_links: AtomicUsize::new(0),
            halted: AtomicBool::new(false),
        });

        ctx.frontier.push(seed_url);

        let handles: Vec<_> = (0..self.workers)
            .map(|worker_id| tokio::spawn(run_worker(worker_id, ctx.clone())))
            .collect();

        for joined in futures::future::join_all(handles).await {
            if let Err(e) = joined {
                warn!("Worker task failed: {}", ScanError::from(e));
            }
        }

        summary.pages = std::mem::take(&mut *ctx.pages.lock().unwrap_or_else(PoisonError::into_inner));
        summary.skipped_visited = ctx.skipped_visited.load(Ordering::SeqCst);
        summary.invalid_links = ctx.invalid_links.load(Ordering::SeqCst);
        summary.out_of_scope_links = ctx.out_of_scope_links.load(Ordering::SeqCst);
        summary.stopped = ctx.halted.load(Ordering::SeqCst);
        summary.elapsed = started.elapsed();

        info!(
            "Crawl complete. Indexed {} pages, {} failed{}",
            summary.indexed_count(),
            summary.failed_count(),
            if summary.stopped { " (stopped early)" } else { "" }
        );

        summary
    }

    fn establish_scope(
        &self,
        seed: &str,
        explicit_base: Option<&str>,
    ) -> Result<(CanonicalUrl, ScopeRoot)> {
        let seed_url = CanonicalUrl::parse(seed)?;
        let root = match explicit_base {
            Some(base) => CanonicalUrl::parse(base)?,
            None => seed_url.clone(),
        };
        Ok((seed_url, ScopeRoot::new(root, self.scope_mode)))
    }
}

/// State shared by the workers of a single `crawl` call.
struct CrawlContext {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn PageParser>,
    visited: Arc<VisitedSet>,
    index: Arc<TextIndex>,
    frontier: Frontier,
    scope: ScopeRoot,
    index_failures: bool,
    stop: StopSignal,
    deadline: Option<tokio::time::Instant>,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
    pages: Mutex<Vec<PageReport>>,
    skipped_visited: AtomicUsize,
    invalid_links: AtomicUsize,
    out_of_scope_links: AtomicUsize,
    halted: AtomicBool,
}

/// Marks a popped URL finished even if processing panics.
struct InFlight<'a>(&'a Frontier);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.done();
    }
}

async fn run_worker(worker_id: usize, ctx: Arc<CrawlContext>) {
    debug!("Worker {} started", worker_id);

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.halted_signal() => {
                ctx.halted.store(true, Ordering::SeqCst);
                break;
            }
            next = ctx.frontier.next() => next,
        };

        let Some(url) = next else {
            break;
        };

        let _in_flight = InFlight(&ctx.frontier);
        ctx.process(worker_id, url).await;
    }

    debug!("Worker {} finished", worker_id);
}

impl CrawlContext {
    async fn halted_signal(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.stop.stopped() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.stop.stopped().await,
        }
    }

    async fn process(&self, worker_id: usize, url: CanonicalUrl) {
        if !self.visited.add(&url) {
            debug!("Skipping already visited {}", url);
            self.skipped_visited.fetch_add(1, Ordering::SeqCst);
            return;
        }

        if let Some(ref callback) = self.progress_callback {
            callback(worker_id, url.to_string());
        }

        let fetched = tokio::select! {
            biased;
            _ = self.halted_signal() => Err(ScanError::Stopped),
            response = self.fetcher.fetch(&url) => response,
        };

        let report = match fetched {
            Ok(response) => match response.final_url {
                Some(ref landed) if !self.scope.contains(landed) => {
                    let reason = format!("redirected out of scope to {}", landed);
                    debug!("Not indexing {}: {}", url, reason);
                    self.out_of_scope_links.fetch_add(1, Ordering::SeqCst);
                    self.record_failure(&url);
                    let mut report = PageReport::failed(url, reason);
                    report.status_code = Some(response.status);
                    report
                }
                _ => self.index_page(url, response),
            },
            Err(ScanError::Stopped) => {
                debug!("Abandoned fetch of {}", url);
                self.halted.store(true, Ordering::SeqCst);
                PageReport::abandoned(url)
            }
            Err(e) => {
                warn!("Crawl error for {}: {}", url, e);
                self.record_failure(&url);
                PageReport::failed(url, e.to_string())
            }
        };

        if let Some(ref callback) = self.result_callback {
            callback(report.clone());
        }
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }

    fn record_failure(&self, url: &CanonicalUrl) {
        if self.index_failures {
            self.index.put(url.clone(), String::new());
        }
    }

    fn index_page(&self, url: CanonicalUrl, response: FetchResponse) -> PageReport {
        let parsed = self.parser.parse(&response.body);

        // Relative links resolve against where the page actually lives.
        let base = match response.final_url {
            Some(landed) => {
                self.visited.add(&landed);
                landed
            }
            None => url.clone(),
        };

        let mut report = PageReport::indexed(url.clone(), response.status);
        report.content_type = response.content_type;
        report.response_time = response.elapsed;
        report.text_length = parsed.text.len();
        report.links_found = parsed.links.len();

        if !self.index.put(url.clone(), parsed.text) {
            debug!("{} already has an index entry", url);
        }

        for raw in &parsed.links {
            match normalize(raw, &base) {
                Err(e) => {
                    debug!("Dropping link on {}: {}", base, e);
                    self.invalid_links.fetch_add(1, Ordering::SeqCst);
                }
                Ok(link) if !self.scope.contains(&link) => {
                    debug!("Dropping out-of-scope link {}", link);
                    self.out_of_scope_links.fetch_add(1, Ordering::SeqCst);
                }
                Ok(link) => {
                    if self.visited.contains(&link) {
                        continue;
                    }
                    debug!("Queuing {}", link);
                    self.frontier.push(link);
                    report.links_queued += 1;
                }
            }
        }

        report
    }
}
