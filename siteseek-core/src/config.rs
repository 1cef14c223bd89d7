//! Crawl configuration.
//!
//! Values come from [`CrawlConfig::default`], optionally replaced by a JSON
//! file, then overridden by whatever the command line sets explicitly.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use siteseek_scanner::ScopeMode;
use siteseek_scanner::fetch::DEFAULT_USER_AGENT;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    /// Concurrent fetch workers draining the frontier.
    pub workers: usize,
    pub request_timeout_secs: u64,
    /// Stop the whole crawl after this long. `None` runs until the frontier drains.
    pub crawl_timeout_secs: Option<u64>,
    pub user_agent: String,
    pub max_redirects: usize,
    pub scope_mode: ScopeMode,
    /// Give URLs whose fetch failed an empty index entry.
    pub index_failed_pages: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            request_timeout_secs: 10,
            crawl_timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 5,
            scope_mode: ScopeMode::Strict,
            index_failed_pages: false,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workers: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub crawl_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub scope_mode: Option<ScopeMode>,
    pub index_failed_pages: Option<bool>,
}

impl CrawlConfig {
    /// Load a JSON config file. `~` in the path is expanded.
    pub fn from_file(path: &str) -> Result<Self> {
        let expanded = PathBuf::from(shellexpand::tilde(path).as_ref());
        let content = fs::read_to_string(&expanded).map_err(|e| {
            CoreError::config(format!("failed to read {}: {}", expanded.display(), e))
        })?;
        let config = Self::from_json(&content)?;
        debug!("Loaded crawl config from {}", expanded.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(timeout) = overrides.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if overrides.crawl_timeout_secs.is_some() {
            self.crawl_timeout_secs = overrides.crawl_timeout_secs;
        }
        if let Some(user_agent) = overrides.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(mode) = overrides.scope_mode {
            self.scope_mode = mode;
        }
        if let Some(index_failed_pages) = overrides.index_failed_pages {
            self.index_failed_pages = index_failed_pages;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(CoreError::config("workers must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::config("request_timeout_secs must be at least 1"));
        }
        if self.crawl_timeout_secs == Some(0) {
            return Err(CoreError::config("crawl_timeout_secs must be at least 1"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(CoreError::config("user_agent must not be empty"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn crawl_timeout(&self) -> Option<Duration> {
        self.crawl_timeout_secs.map(Duration::from_secs)
    }
}
