use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use siteseek_core::{
    ConfigOverrides, CrawlConfig, CrawlOptions, CrawlRun, ReportFormat, SearchReport,
    execute_crawl, generate_crawl_report, present_results, render_crawl_json, render_search_json,
};
use siteseek_scanner::{ScopeMode, StopSignal};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, warn};
use url::Url;

// Helper functions for crawl handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
    let content = fs::read_to_string(&expanded)
        .map_err(|e| format!("Failed to read hosts file {}: {}", expanded.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", expanded.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if line.contains("://") {
        if Url::parse(line).is_ok() {
            return Some(line.to_string());
        }
    } else {
        let with_scheme = format!("http://{}", line);
        if Url::parse(&with_scheme).is_ok() {
            return Some(with_scheme);
        }
    }

    warn!("Skipping invalid URL '{}'", line);
    None
}

/// Install the stderr log subscriber. `verbosity` is the `-v` count.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build the effective config: defaults, then `--config`, then flags.
pub fn load_config(sub_matches: &ArgMatches) -> Result<CrawlConfig> {
    let config = match sub_matches.get_one::<String>("config") {
        Some(path) => CrawlConfig::from_file(path)?,
        None => CrawlConfig::default(),
    };

    let scope_mode = sub_matches
        .get_one::<String>("scope")
        .map(|s| s.parse::<ScopeMode>())
        .transpose()
        .map_err(|e| anyhow!(e))?;

    let config = config.merge(ConfigOverrides {
        workers: sub_matches.get_one::<usize>("threads").copied(),
        request_timeout_secs: sub_matches.get_one::<u64>("timeout").copied(),
        crawl_timeout_secs: sub_matches.get_one::<u64>("crawl-timeout").copied(),
        user_agent: sub_matches.get_one::<String>("user-agent").cloned(),
        scope_mode,
        index_failed_pages: sub_matches.get_flag("index-failures").then_some(true),
    });
    config.validate()?;

    Ok(config)
}

fn report_format(sub_matches: &ArgMatches) -> ReportFormat {
    sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

/// Stop the crawl on Ctrl-C. Pages in flight are abandoned.
fn stop_on_ctrl_c(stop: StopSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Interrupted, stopping crawl", "[!]".yellow().bold());
            stop.stop();
        }
    });
}

async fn run_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<CrawlRun> {
    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");

    let seeds = load_urls_from_source(url, hosts_file).map_err(|e| anyhow!(e))?;
    let config = load_config(sub_matches)?;
    let base = sub_matches.get_one::<Url>("base").map(|u| u.to_string());

    if !quiet {
        eprintln!("\n{} Crawling {} host(s)", "→".blue().bold(), seeds.len());
        eprintln!("Workers: {}", config.workers);
        eprintln!("Scope: {}", config.scope_mode);
        if let Some(ref base) = base {
            eprintln!("Scope root: {}", base);
        }
        if let Some(secs) = config.crawl_timeout_secs {
            eprintln!("Crawl timeout: {}s", secs);
        }
        eprintln!();
    }

    let stop = StopSignal::new();
    stop_on_ctrl_c(stop.clone());

    let options = CrawlOptions {
        seeds,
        base,
        config,
        show_progress_bars: !quiet && !sub_matches.get_flag("no-progress"),
        stop: Some(stop),
    };

    let progress_callback = (!quiet).then(|| {
        Arc::new(|msg: String| {
            eprintln!("{}", msg);
        }) as siteseek_core::CrawlProgressCallback
    });

    let run = execute_crawl(options, progress_callback)
        .await
        .context("Crawl failed")?;

    if !quiet {
        eprintln!("\n{} Crawl complete!\n", "✓".green().bold());
    }

    Ok(run)
}

/// Write to the `--output` file when given, otherwise stdout.
fn emit(sub_matches: &ArgMatches, content: &str, quiet: bool) -> Result<()> {
    match sub_matches.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                eprintln!("{} Saved to {}", "✓".green().bold(), path.display());
            }
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    if sub_matches.get_one::<PathBuf>("output").is_some() {
        colored::control::set_override(false);
    }

    let run = run_crawl(sub_matches, quiet).await?;

    let content = match report_format(sub_matches) {
        ReportFormat::Text => generate_crawl_report(&run.summaries),
        ReportFormat::Json => {
            let mut json = render_crawl_json(&run.summaries)?;
            json.push('\n');
            json
        }
    };

    emit(sub_matches, &content, quiet)
}

pub async fn handle_search(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let keywords: Vec<&str> = sub_matches
        .get_many::<String>("keyword")
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default();

    let run = run_crawl(sub_matches, quiet).await?;
    let results = run.crawler.search_all(keywords.iter().copied());

    let content = match report_format(sub_matches) {
        ReportFormat::Text => {
            let mut out = Vec::new();
            for (keyword, urls) in &results {
                if results.len() > 1 {
                    out.extend_from_slice(format!("Keyword: {}\n", keyword).as_bytes());
                }
                present_results(urls, &mut out)?;
            }
            String::from_utf8(out).context("Search results were not valid UTF-8")?
        }
        ReportFormat::Json => {
            let seeds = run.summaries.iter().map(|s| s.seed.clone()).collect();
            let report = SearchReport::new(seeds, run.crawler.index().len(), results);
            let mut json = render_search_json(&report)?;
            json.push('\n');
            json
        }
    };

    emit(sub_matches, &content, quiet)
}
