// Search result presentation and crawl reports

use crate::crawl::extract_url_path;
use crate::error::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use siteseek_scanner::{CanonicalUrl, CrawlSummary, PageReport, PageState};
use std::collections::BTreeMap;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Write search results as `Search results:` followed by one `- <url>` line
/// each, or `No results found.` when there are none.
pub fn present_results<U, W>(results: &[U], out: &mut W) -> io::Result<()>
where
    U: AsRef<str>,
    W: Write,
{
    if results.is_empty() {
        writeln!(out, "No results found.")?;
        return Ok(());
    }

    writeln!(out, "Search results:")?;
    for result in results {
        writeln!(out, "- {}", result.as_ref())?;
    }
    Ok(())
}

pub fn print_results<U: AsRef<str>>(results: &[U]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    present_results(results, &mut out)
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordResults {
    pub keyword: String,
    pub results: Vec<CanonicalUrl>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub generated_at: DateTime<Utc>,
    pub seeds: Vec<String>,
    pub pages_indexed: usize,
    pub queries: Vec<KeywordResults>,
}

impl SearchReport {
    pub fn new(seeds: Vec<String>, pages_indexed: usize, queries: Vec<(String, Vec<CanonicalUrl>)>) -> Self {
        Self {
            generated_at: Utc::now(),
            seeds,
            pages_indexed,
            queries: queries
                .into_iter()
                .map(|(keyword, results)| KeywordResults { keyword, results })
                .collect(),
        }
    }
}

pub fn render_search_json(report: &SearchReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_crawl_json(summaries: &[CrawlSummary]) -> Result<String> {
    Ok(serde_json::to_string_pretty(summaries)?)
}

fn colorize_status(report: &PageReport) -> String {
    match (report.state, report.status_code) {
        (PageState::Failed, _) => "ERR".red().bold().to_string(),
        (PageState::Abandoned, _) => "---".dimmed().to_string(),
        (_, Some(code @ 100..=199)) => code.to_string().white().to_string(),
        (_, Some(code @ 200..=299)) => code.to_string().green().to_string(),
        (_, Some(code @ 300..=399)) => code.to_string().cyan().to_string(),
        (_, Some(code @ 400..=499)) => code.to_string().yellow().to_string(),
        (_, Some(code @ 500..=599)) => code.to_string().red().to_string(),
        (_, Some(code)) => code.to_string(),
        (_, None) => "???".to_string(),
    }
}

/// Generate a crawl report from summaries
pub fn generate_crawl_report(summaries: &[CrawlSummary]) -> String {
    let pages: Vec<&PageReport> = summaries.iter().flat_map(|s| s.pages.iter()).collect();
    let indexed: usize = summaries.iter().map(CrawlSummary::indexed_count).sum();
    let failed: usize = summaries.iter().map(CrawlSummary::failed_count).sum();
    let invalid_links: usize = summaries.iter().map(|s| s.invalid_links).sum();
    let out_of_scope: usize = summaries.iter().map(|s| s.out_of_scope_links).sum();

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Generated: {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
    report.push_str(&format!("  Pages indexed: {}\n", indexed));
    report.push_str(&format!("  Fetch failures: {}\n", failed));
    report.push_str(&format!("  Links dropped (invalid): {}\n", invalid_links));
    report.push_str(&format!("  Links dropped (out of scope): {}\n", out_of_scope));

    for summary in summaries {
        if let Some(ref reason) = summary.invalid_seed {
            report.push_str(&format!("  {} {}: {}\n", "Invalid seed".red(), summary.seed, reason));
        } else if summary.stopped {
            report.push_str(&format!("  {} {}\n", "Stopped early:".yellow(), summary.seed));
        }
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Group pages by host, hosts sorted for stable output
    let mut by_host: BTreeMap<&str, Vec<&PageReport>> = BTreeMap::new();
    for page in pages.iter().copied() {
        by_host.entry(page.url.host()).or_default().push(page);
    }

    for (host, host_pages) in &by_host {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages\n\n", host_pages.len()));

        for page in host_pages {
            let mut line = format!(
                "  {} {}",
                colorize_status(page),
                extract_url_path(page.url.as_str())
            );

            if let Some(ref content_type) = page.content_type
                && !content_type.starts_with("text/html")
            {
                line.push_str(&format!(" {}", content_type.bright_black()));
            }
            if let Some(ref error) = page.error {
                line.push_str(&format!(" {}", error.red()));
            }

            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    report
}
