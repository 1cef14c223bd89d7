pub mod config;
pub mod crawl;
pub mod error;
pub mod report;
pub mod search;

use colored::Colorize;

pub use config::{ConfigOverrides, CrawlConfig};
pub use crawl::{
    CrawlOptions, CrawlProgressCallback, CrawlRun, WebCrawler, execute_crawl,
    execute_crawl_with_fetcher, extract_url_path,
};
pub use error::{CoreError, Result};
pub use report::{
    ReportFormat, SearchReport, generate_crawl_report, present_results, print_results,
    render_crawl_json, render_search_json,
};
pub use search::SearchEngine;

const BANNER: &str = r#"
    ╔═══════════════════════════════════════════════════════════╗
    ║  ███████╗██╗████████╗███████╗███████╗███████╗███████╗██╗  ██╗ ║
    ║  ██╔════╝██║╚══██╔══╝██╔════╝██╔════╝██╔════╝██╔════╝██║ ██╔╝ ║
    ║  ███████╗██║   ██║   █████╗  ███████╗█████╗  █████╗  █████╔╝  ║
    ║  ╚════██║██║   ██║   ██╔══╝  ╚════██║██╔══╝  ██╔══╝  ██╔═██╗  ║
    ║  ███████║██║   ██║   ███████╗███████║███████╗███████╗██║  ██╗ ║
    ║  ╚══════╝╚═╝   ╚═╝   ╚══════╝╚══════╝╚══════╝╚══════╝╚═╝  ╚═╝ ║
    ╚═══════════════════════════════════════════════════════════╝
"#;

/// Print the banner to stderr so stdout stays clean for results.
pub fn print_banner() {
    eprintln!("{}", BANNER.bright_cyan());
    eprintln!(
        "    {} {}\n",
        "siteseek".bright_white().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
}
