use crate::config::CrawlConfig;
use crate::error::Result;
use crate::report;
use crate::search::SearchEngine;
use indicatif::{ProgressBar, ProgressStyle};
use siteseek_scanner::{
    CanonicalUrl, CrawlSummary, Crawler, Fetcher, HttpFetcher, HttpFetcherOptions, StopSignal,
    TextIndex, VisitedSet,
};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub seeds: Vec<String>,
    /// Scope root shared by every seed. Each seed is its own root when unset.
    pub base: Option<String>,
    pub config: CrawlConfig,
    pub show_progress_bars: bool,
    pub stop: Option<StopSignal>,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// A finished crawl: the crawler holding the index, plus one summary per seed.
pub struct CrawlRun {
    pub crawler: WebCrawler,
    pub summaries: Vec<CrawlSummary>,
}

/// Crawl-then-search facade over a single [`Crawler`] instance.
///
/// Visited set and text index live as long as the `WebCrawler`; successive
/// `crawl` calls share them.
pub struct WebCrawler {
    crawler: Crawler,
}

impl WebCrawler {
    /// Crawler using the reqwest transport configured from `config`.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::with_options(HttpFetcherOptions {
            timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
            max_redirects: config.max_redirects,
        })?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    pub fn with_fetcher(config: &CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_crawler(configure(Crawler::new(fetcher), config)))
    }

    pub fn from_crawler(crawler: Crawler) -> Self {
        Self { crawler }
    }

    pub async fn crawl(&self, seed: &str, explicit_base: Option<&str>) -> CrawlSummary {
        self.crawler.crawl(seed, explicit_base).await
    }

    pub fn search(&self, keyword: &str) -> Vec<CanonicalUrl> {
        SearchEngine::new(self.crawler.index()).search(keyword)
    }

    pub fn search_all<'k, I>(&self, keywords: I) -> Vec<(String, Vec<CanonicalUrl>)>
    where
        I: IntoIterator<Item = &'k str>,
    {
        SearchEngine::new(self.crawler.index()).search_all(keywords)
    }

    /// Write results in the `Search results:` / `No results found.` format.
    pub fn present_results<W: Write>(&self, results: &[CanonicalUrl], out: &mut W) -> io::Result<()> {
        report::present_results(results, out)
    }

    pub fn print_results(&self, results: &[CanonicalUrl]) -> io::Result<()> {
        report::print_results(results)
    }

    pub fn visited(&self) -> &VisitedSet {
        self.crawler.visited()
    }

    pub fn index(&self) -> &TextIndex {
        self.crawler.index()
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.crawler.stop_signal()
    }

    pub fn crawler(&self) -> &Crawler {
        &self.crawler
    }
}

fn configure(crawler: Crawler, config: &CrawlConfig) -> Crawler {
    let crawler = crawler
        .with_workers(config.workers)
        .with_scope_mode(config.scope_mode)
        .with_index_failures(config.index_failed_pages);

    match config.crawl_timeout() {
        Some(timeout) => crawler.with_crawl_timeout(timeout),
        None => crawler,
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl over HTTP with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlRun> {
    options.config.validate()?;
    let fetcher = HttpFetcher::with_options(HttpFetcherOptions {
        timeout: options.config.request_timeout(),
        user_agent: options.config.user_agent.clone(),
        max_redirects: options.config.max_redirects,
    })?;
    execute_crawl_with_fetcher(options, Arc::new(fetcher), progress_callback).await
}

/// Execute a crawl with a caller-supplied transport
pub async fn execute_crawl_with_fetcher(
    options: CrawlOptions,
    fetcher: Arc<dyn Fetcher>,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlRun> {
    let CrawlOptions {
        seeds,
        base,
        config,
        show_progress_bars,
        stop,
    } = options;
    config.validate()?;
    info!(
        "Crawling {} seed(s) with {} workers, scope mode {}",
        seeds.len(),
        config.workers,
        config.scope_mode
    );

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    // Counter for tracking processed URLs
    let processed_count = Arc::new(AtomicUsize::new(0));

    let mut crawler = configure(Crawler::new(fetcher), &config);
    if let Some(stop) = stop {
        crawler = crawler.with_stop_signal(stop);
    }
    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        let count_clone = processed_count.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |_worker_id: usize, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            pb_clone.set_message(format!(
                "Crawling... {} URLs processed ({})",
                count,
                extract_url_path(&url)
            ));
        }));
    }

    let crawler = WebCrawler::from_crawler(crawler);

    // Crawl each seed on the same crawler so state is shared
    let mut summaries = Vec::with_capacity(seeds.len());
    for (idx, seed) in seeds.iter().enumerate() {
        if let Some(ref callback) = progress_callback
            && seeds.len() > 1
        {
            callback(format!("Crawling host {}/{}: {}", idx + 1, seeds.len(), seed));
        }

        let summary = crawler.crawl(seed, base.as_deref()).await;

        if let Some(ref callback) = progress_callback {
            match (&summary.invalid_seed, summary.stopped) {
                (Some(reason), _) => callback(format!("[!]  Failed to crawl {}: {}", seed, reason)),
                (None, true) => callback(format!("[!]  Crawl of {} stopped early", seed)),
                (None, false) => {}
            }
        }

        let stopped = summary.stopped;
        summaries.push(summary);
        if stopped && crawler.stop_signal().is_stopped() {
            warn!("Stop requested, skipping {} remaining seed(s)", seeds.len() - idx - 1);
            break;
        }
    }

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} URLs processed", total));
    }

    Ok(CrawlRun { crawler, summaries })
}
