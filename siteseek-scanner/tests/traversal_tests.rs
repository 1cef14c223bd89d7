// Traversal tests driven by an in-memory fetcher

use async_trait::async_trait;
use siteseek_scanner::error::Result;
use siteseek_scanner::{
    CanonicalUrl, Crawler, FetchResponse, Fetcher, PageReport, PageState, ScanError, ScopeMode,
    StopSignal,
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SAMPLE_HTML: &str = r#"
    <html><body>
        <h1>Welcome!</h1>
        <a href="/about">About Us</a>
        <a href="https://www.external.com">External Link</a>
    </body></html>
"#;

#[derive(Clone)]
enum MockPage {
    Html(u16, String),
    Redirect(String, String),
    Fail(String),
    Hang,
}

/// Serves canned pages by canonical URL and records every fetch.
#[derive(Default)]
struct MockSite {
    pages: HashMap<String, MockPage>,
    fallback: Option<MockPage>,
    calls: Mutex<Vec<String>>,
}

impl MockSite {
    fn new() -> Self {
        Self::default()
    }

    fn every_page(body: &str) -> Self {
        Self {
            fallback: Some(MockPage::Html(200, body.to_string())),
            ..Self::default()
        }
    }

    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages
            .insert(canonical(url).into_string(), MockPage::Html(200, body.to_string()));
        self
    }

    fn with(mut self, url: &str, page: MockPage) -> Self {
        self.pages.insert(canonical(url).into_string(), page);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self, url: &str) -> usize {
        let target = canonical(url).into_string();
        self.calls().iter().filter(|c| **c == target).count()
    }
}

#[async_trait]
impl Fetcher for MockSite {
    async fn fetch(&self, url: &CanonicalUrl) -> Result<FetchResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        let page = self.pages.get(url.as_str()).or(self.fallback.as_ref()).cloned();
        match page {
            Some(MockPage::Html(status, body)) => Ok(FetchResponse::new(status, body)),
            Some(MockPage::Redirect(target, body)) => {
                Ok(FetchResponse::new(200, body).redirected_to(canonical(&target)))
            }
            Some(MockPage::Fail(message)) => Err(ScanError::Transport(message)),
            Some(MockPage::Hang) => match std::future::pending::<Infallible>().await {},
            None => Ok(FetchResponse::new(404, "")),
        }
    }
}

fn canonical(raw: &str) -> CanonicalUrl {
    CanonicalUrl::parse(raw).unwrap()
}

fn crawler_for(site: &Arc<MockSite>) -> Crawler {
    Crawler::new(site.clone())
}

#[tokio::test]
async fn test_crawl_success_stays_in_scope() {
    let site = Arc::new(MockSite::every_page(SAMPLE_HTML));
    let crawler = crawler_for(&site);

    let summary = crawler.crawl("https://example.com", None).await;

    assert!(crawler.visited().contains(&canonical("https://example.com")));
    assert!(crawler.visited().contains(&canonical("https://example.com/about")));
    assert!(!crawler.visited().contains(&canonical("https://www.external.com")));
    assert!(crawler.index().contains(&canonical("https://example.com")));
    assert!(crawler.index().contains(&canonical("https://example.com/about")));
    assert_eq!(crawler.index().len(), 2);

    assert_eq!(site.call_count("https://example.com"), 1);
    assert_eq!(site.call_count("https://example.com/about"), 1);
    assert_eq!(site.call_count("https://www.external.com"), 0);
    assert_eq!(summary.indexed_count(), 2);
    assert_eq!(summary.out_of_scope_links, 2);
}

#[tokio::test]
async fn test_crawl_already_visited_seed_is_not_fetched() {
    let site = Arc::new(MockSite::every_page(SAMPLE_HTML));
    let crawler = crawler_for(&site);
    crawler.visited().add(&canonical("https://example.com"));

    let summary = crawler.crawl("https://example.com", None).await;

    assert!(site.calls().is_empty());
    assert_eq!(crawler.visited().len(), 1);
    assert!(crawler.index().is_empty());
    assert_eq!(summary.skipped_visited, 1);
    assert!(summary.pages.is_empty());
}

#[tokio::test]
async fn test_crawl_relative_and_absolute_links() {
    let html = r#"
        <html><body>
            <a href="/page1">Page1</a>
            <a href="https://example.com/page2">Page2</a>
        </body></html>
    "#;
    let site = Arc::new(MockSite::every_page(html));
    let crawler = crawler_for(&site);

    crawler.crawl("https://example.com", None).await;

    assert!(crawler.visited().contains(&canonical("https://example.com/page1")));
    assert!(crawler.visited().contains(&canonical("https://example.com/page2")));
    assert_eq!(site.calls().len(), 3);
}

#[tokio::test]
async fn test_redirected_page_resolves_links_against_landing_url() {
    let site = Arc::new(
        MockSite::new()
            .page("https://example.com/docs/", r#"<a href="old">Old</a>"#)
            .with(
                "https://example.com/docs/old",
                MockPage::Redirect(
                    "https://example.com/docs/guide/".to_string(),
                    r#"<p>Guide</p><a href="intro">Intro</a>"#.to_string(),
                ),
            )
            .page("https://example.com/docs/guide/intro", "<p>Intro</p>"),
    );
    let crawler = crawler_for(&site);

    let summary = crawler.crawl("https://example.com/docs/", None).await;

    assert_eq!(summary.indexed_count(), 3);
    assert_eq!(site.call_count("https://example.com/docs/guide/intro"), 1);
    assert_eq!(site.call_count("https://example.com/docs/intro"), 0);
    assert_eq!(site.call_count("https://example.com/docs/guide/"), 0);
    assert!(crawler.visited().contains(&canonical("https://example.com/docs/guide/")));
    assert_eq!(
        crawler
            .index()
            .get(&canonical("https://example.com/docs/old"))
            .as_deref(),
        Some("Guide Intro")
    );
}

#[tokio::test]
async fn test_redirect_out_of_scope_is_not_indexed() {
    let site = Arc::new(
        MockSite::new()
            .page("https://example.com/docs/", r#"<a href="moved">Moved</a>"#)
            .with(
                "https://example.com/docs/moved",
                MockPage::Redirect(
                    "https://other.example/landing".to_string(),
                    r#"<p>Elsewhere</p><a href="next">Next</a>"#.to_string(),
                ),
            ),
    );
    let crawler = crawler_for(&site);

    let summary = crawler.crawl("https://example.com/docs/", None).await;

    let moved = canonical("https://example.com/docs/moved");
    assert!(crawler.index().get(&moved).is_none());
    assert_eq!(site.call_count("https://other.example/next"), 0);
    assert_eq!(summary.out_of_scope_links, 1);

    let report = summary.pages.iter().find(|p| p.url == moved).unwrap();
    assert_eq!(report.state, PageState::Failed);
    assert!(
        report
            .error
            .as_deref()
            .unwrap()
            .contains("redirected out of scope to https://other.example/landing")
    );
}

#[tokio::test]
async fn test_crawl_transport_error_on_seed() {
    let site = Arc::new(
        MockSite::new().with("https://example.com", MockPage::Fail("Test Error".to_string())),
    );
    let crawler = crawler_for(&site);

    let summary = crawler.crawl("https://example.com", None).await;

    assert!(crawler.visited().contains(&canonical("https://example.com")));
    assert!(crawler.index().is_empty());
    assert_eq!(summary.failed_count(), 1);
    let failure = summary.failures().next().unwrap();
    assert!(failure.error.as_deref().unwrap().contains("Test Error"));
}

#[tokio::test]
async fn test_failed_pages_can_get_empty_entries() {
    let site = Arc::new(
        MockSite::new().with("https://example.com", MockPage::Fail("boom".to_string())),
    );
    let crawler = crawler_for(&site).with_index_failures(true);

    crawler.crawl("https://example.com", None).await;

    assert_eq!(
        crawler.index().get(&canonical("https://example.com")).as_deref(),
        Some("")
    );
}

#[tokio::test]
async fn test_failed_page_is_not_retried() {
    let site = Arc::new(
        MockSite::new()
            .page("https://example.com", r#"<a href="/flaky">a</a><a href="/next">b</a>"#)
            .with("https://example.com/flaky", MockPage::Fail("reset".to_string()))
            .page("https://example.com/next", r#"<a href="/flaky">again</a>"#),
    );
    let crawler = crawler_for(&site);

    let summary = crawler.crawl("https://example.com", None).await;

    assert_eq!(site.call_count("https://example.com/flaky"), 1);
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.indexed_count(), 2);
}

#[tokio::test]
async fn test_crawl_invalid_html_still_indexed() {
    let site = Arc::new(MockSite::every_page("<html><body><a href='bad'></body></html>"));
    let crawler = crawler_for(&site);

    crawler.crawl("https://example.com", None).await;

    assert!(crawler.index().contains(&canonical("https://example.com")));
    assert!(crawler.index().contains(&canonical("https://example.com/bad")));
}

#[tokio::test]
async fn test_crawl_handles_non_200() {
    let site = Arc::new(
        MockSite::new().with("https://example.com", MockPage::Html(404, String::new())),
    );
    let crawler = crawler_for(&site);

    let summary = crawler.crawl("https://example.com", None).await;

    assert_eq!(
        crawler.index().get(&canonical("https://example.com")).as_deref(),
        Some("")
    );
    assert_eq!(summary.pages[0].status_code, Some(404));
    assert_eq!(summary.pages[0].state, PageState::Indexed);
}

#[tokio::test]
async fn test_cycles_are_visited_once() {
    let site = Arc::new(
        MockSite::new()
            .page("https://example.com/a", r#"<a href="/b">b</a><a href="/a#self">self</a>"#)
            .page("https://example.com/b", r#"<a href="/a">a</a><a href="b">b again</a>"#),
    );
    let crawler = crawler_for(&site);

    crawler.crawl("https://example.com/a", Some("https://example.com")).await;

    assert_eq!(site.call_count("https://example.com/a"), 1);
    assert_eq!(site.call_count("https://example.com/b"), 1);
    assert_eq!(crawler.index().len(), 2);
}

#[tokio::test]
async fn test_no_revisit_with_many_workers() {
    let mut links = String::new();
    for i in 0..30 {
        links.push_str(&format!(r#"<a href="/p{}">page {}</a>"#, i, i));
    }
    let site = Arc::new(MockSite::every_page(&links));
    let crawler = crawler_for(&site).with_workers(8);

    let summary = crawler.crawl("https://example.com/p0", Some("https://example.com")).await;

    let calls = site.calls();
    let mut distinct = calls.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(calls.len(), distinct.len(), "a URL was fetched twice");
    assert_eq!(calls.len(), 30);
    assert_eq!(crawler.index().len(), 30);
    assert_eq!(crawler.visited().len(), 30);
    assert_eq!(summary.indexed_count(), 30);
}

#[tokio::test]
async fn test_single_worker_is_breadth_first() {
    let site = Arc::new(
        MockSite::new()
            .page("https://example.com/", r#"<a href="/a">a</a><a href="/b">b</a>"#)
            .page("https://example.com/a", r#"<a href="/a/deep">deep</a>"#)
            .page("https://example.com/b", "leaf")
            .page("https://example.com/a/deep", "deep leaf"),
    );
    let crawler = crawler_for(&site);

    crawler.crawl("https://example.com/", None).await;

    let order: Vec<String> = crawler
        .index()
        .entries()
        .into_iter()
        .map(|(url, _)| url.into_string())
        .collect();
    assert_eq!(
        order,
        vec![
            "https://example.com/",
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/a/deep",
        ]
    );
}

#[tokio::test]
async fn test_out_of_scope_links_never_visited() {
    let site = Arc::new(
        MockSite::new().page(
            "https://example.com/docs",
            r#"<a href="/docs/guide">in</a><a href="/blog">out</a>
               <a href="mailto:someone@example.com">mail</a>
               <a href="http://[::1">broken</a>"#,
        ),
    );
    let crawler = crawler_for(&site);

    let summary = crawler.crawl("https://example.com/docs", None).await;

    assert!(crawler.visited().contains(&canonical("https://example.com/docs/guide")));
    assert!(!crawler.visited().contains(&canonical("https://example.com/blog")));
    assert!(!crawler.index().contains(&canonical("https://example.com/blog")));
    assert_eq!(summary.out_of_scope_links, 1);
    assert_eq!(summary.invalid_links, 2);
}

#[tokio::test]
async fn test_explicit_base_sets_scope_root() {
    let site = Arc::new(
        MockSite::new()
            .page(
                "https://example.com/docs/start",
                r#"<a href="next">next</a><a href="/blog/post">blog</a>"#,
            )
            .page("https://example.com/docs/next", "done"),
    );
    let crawler = crawler_for(&site);

    let summary = crawler
        .crawl("https://example.com/docs/start", Some("https://example.com/docs/"))
        .await;

    assert_eq!(
        summary.scope_root.as_ref().map(|r| r.as_str()),
        Some("https://example.com/docs/")
    );
    assert!(crawler.index().contains(&canonical("https://example.com/docs/next")));
    assert_eq!(site.call_count("https://example.com/blog/post"), 0);
}

#[tokio::test]
async fn test_prefix_mode_admits_string_prefix_siblings() {
    let html = r#"<a href="/docs-old/page">old</a>"#;

    let strict_site = Arc::new(MockSite::new().page("https://example.com/docs", html));
    let strict = crawler_for(&strict_site);
    strict.crawl("https://example.com/docs", None).await;
    assert!(!strict.visited().contains(&canonical("https://example.com/docs-old/page")));

    let prefix_site = Arc::new(MockSite::new().page("https://example.com/docs", html));
    let prefix = crawler_for(&prefix_site).with_scope_mode(ScopeMode::Prefix);
    prefix.crawl("https://example.com/docs", None).await;
    assert!(prefix.visited().contains(&canonical("https://example.com/docs-old/page")));
}

#[tokio::test]
async fn test_invalid_seed_is_reported_not_raised() {
    let site = Arc::new(MockSite::every_page(SAMPLE_HTML));
    let crawler = crawler_for(&site);

    let summary = crawler.crawl("not a url", None).await;
    assert!(summary.invalid_seed.is_some());
    assert!(summary.scope_root.is_none());

    let summary = crawler.crawl("mailto:someone@example.com", None).await;
    assert!(summary.invalid_seed.is_some());

    let summary = crawler.crawl("https://example.com", Some("::nope::")).await;
    assert!(summary.invalid_seed.is_some());

    assert!(site.calls().is_empty());
    assert!(crawler.visited().is_empty());
}

#[tokio::test]
async fn test_state_persists_across_crawls() {
    let site = Arc::new(MockSite::every_page(SAMPLE_HTML));
    let crawler = crawler_for(&site);

    crawler.crawl("https://example.com", None).await;
    let second = crawler.crawl("https://example.com/about", None).await;

    assert_eq!(site.calls().len(), 2);
    assert_eq!(second.skipped_visited, 1);
    assert_eq!(crawler.index().len(), 2);
}

#[tokio::test]
async fn test_stop_signal_abandons_in_flight_fetch() {
    let site = Arc::new(
        MockSite::new()
            .page("https://example.com", r#"<a href="/slow">slow</a>"#)
            .with("https://example.com/slow", MockPage::Hang),
    );
    let stop = StopSignal::new();
    let crawler = crawler_for(&site).with_stop_signal(stop.clone());

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.stop();
    });

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        crawler.crawl("https://example.com", None),
    )
    .await
    .expect("crawl should return once stopped");
    stopper.await.unwrap();

    assert!(summary.stopped);
    let slow = canonical("https://example.com/slow");
    assert!(crawler.visited().contains(&slow));
    assert!(!crawler.index().contains(&slow));
    let report = summary.pages.iter().find(|p| p.url == slow).unwrap();
    assert_eq!(report.state, PageState::Abandoned);
}

#[tokio::test]
async fn test_crawl_timeout_stops_crawl() {
    let site = Arc::new(MockSite::new().with("https://example.com", MockPage::Hang));
    let crawler = crawler_for(&site)
        .with_workers(2)
        .with_crawl_timeout(Duration::from_millis(50));

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        crawler.crawl("https://example.com", None),
    )
    .await
    .expect("crawl should honour its timeout");

    assert!(summary.stopped);
    assert!(crawler.index().is_empty());
    assert!(crawler.visited().contains(&canonical("https://example.com")));
}

#[tokio::test]
async fn test_callbacks_observe_every_scheduled_page() {
    let site = Arc::new(MockSite::every_page(SAMPLE_HTML));
    let progressed = Arc::new(Mutex::new(Vec::new()));
    let reported: Arc<Mutex<Vec<PageReport>>> = Arc::new(Mutex::new(Vec::new()));

    let progressed_clone = progressed.clone();
    let reported_clone = reported.clone();
    let crawler = crawler_for(&site)
        .with_progress_callback(Arc::new(move |_worker: usize, url: String| {
            progressed_clone.lock().unwrap().push(url);
        }))
        .with_result_callback(Arc::new(move |report: PageReport| {
            reported_clone.lock().unwrap().push(report);
        }));

    crawler.crawl("https://example.com", None).await;

    assert_eq!(
        *progressed.lock().unwrap(),
        vec!["https://example.com/", "https://example.com/about"]
    );
    let reported = reported.lock().unwrap();
    assert_eq!(reported.len(), 2);
    assert!(reported.iter().all(|r| r.state == PageState::Indexed));
    assert_eq!(reported[0].links_found, 2);
    assert_eq!(reported[0].links_queued, 1);
}
