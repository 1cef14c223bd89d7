pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    init_tracing, load_config, load_urls_from_file, load_urls_from_source, parse_url_line,
};

// Re-export crawl functionality from siteseek-core
pub use siteseek_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path,
};
pub use siteseek_core::report::generate_crawl_report;
