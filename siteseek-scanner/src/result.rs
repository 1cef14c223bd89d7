use crate::url::CanonicalUrl;
use serde::Serialize;
use std::time::Duration;

/// Terminal state of a scheduled URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageState {
    /// Fetched, parsed and written to the text index.
    Indexed,
    /// The fetch collaborator failed; no links were followed.
    Failed,
    /// The crawl stopped while the fetch was in flight.
    Abandoned,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub url: CanonicalUrl,
    pub state: PageState,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
    pub response_time: Duration,
    pub text_length: usize,
    pub links_found: usize,
    pub links_queued: usize,
    pub error: Option<String>,
}

impl PageReport {
    pub fn indexed(url: CanonicalUrl, status_code: u16) -> Self {
        Self {
            url,
            state: PageState::Indexed,
            status_code: Some(status_code),
            content_type: None,
            response_time: Duration::ZERO,
            text_length: 0,
            links_found: 0,
            links_queued: 0,
            error: None,
        }
    }

    pub fn failed(url: CanonicalUrl, error: String) -> Self {
        Self {
            url,
            state: PageState::Failed,
            status_code: None,
            content_type: None,
            response_time: Duration::ZERO,
            text_length: 0,
            links_found: 0,
            links_queued: 0,
            error: Some(error),
        }
    }

    pub fn abandoned(url: CanonicalUrl) -> Self {
        Self {
            state: PageState::Abandoned,
            error: None,
            ..Self::failed(url, String::new())
        }
    }
}

/// Outcome of one `crawl` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlSummary {
    pub seed: String,
    pub scope_root: Option<CanonicalUrl>,
    /// One report per URL that passed the visited gate, in completion order.
    pub pages: Vec<PageReport>,
    /// URLs popped from the frontier that had already been visited.
    pub skipped_visited: usize,
    pub invalid_links: usize,
    pub out_of_scope_links: usize,
    /// Set when the seed or explicit base could not be normalised.
    pub invalid_seed: Option<String>,
    pub stopped: bool,
    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn indexed_count(&self) -> usize {
        self.count(PageState::Indexed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(PageState::Failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PageReport> {
        self.pages.iter().filter(|p| p.state == PageState::Failed)
    }

    fn count(&self, state: PageState) -> usize {
        self.pages.iter().filter(|p| p.state == state).count()
    }
}
