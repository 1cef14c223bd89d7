pub mod crawler;
pub mod error;
pub mod fetch;
pub mod frontier;
pub mod index;
pub mod parser;
pub mod result;
pub mod scope;
pub mod stop;
pub mod url;
pub mod visited;

pub use crawler::{Crawler, ProgressCallback, ResultCallback};
pub use error::ScanError;
pub use fetch::{FetchResponse, Fetcher, HttpFetcher, HttpFetcherOptions};
pub use index::TextIndex;
pub use parser::{HtmlParser, PageParser, ParsedPage};
pub use result::{CrawlSummary, PageReport, PageState};
pub use scope::{ScopeMode, ScopeRoot};
pub use stop::StopSignal;
pub use crate::url::{CanonicalUrl, normalize};
pub use visited::VisitedSet;
