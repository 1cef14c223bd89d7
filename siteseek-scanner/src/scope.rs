//! Scope containment for discovered links.

use crate::url::CanonicalUrl;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a [`ScopeRoot`] decides whether a URL belongs to the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Literal string-prefix test against the root.
    ///
    /// Admits sibling paths that share a string prefix (`/docs` admits
    /// `/docs-old`).
    Prefix,
    /// Prefix test restricted to the root's origin and to whole path segments.
    #[default]
    Strict,
}

impl ScopeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeMode::Prefix => "prefix",
            ScopeMode::Strict => "strict",
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prefix" => Ok(ScopeMode::Prefix),
            "strict" => Ok(ScopeMode::Strict),
            other => Err(format!("unknown scope mode '{}' (expected prefix or strict)", other)),
        }
    }
}

/// The URL prefix that bounds a crawl. Established once per crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRoot {
    root: CanonicalUrl,
    mode: ScopeMode,
}

impl ScopeRoot {
    pub fn new(root: CanonicalUrl, mode: ScopeMode) -> Self {
        Self { root, mode }
    }

    pub fn root(&self) -> &CanonicalUrl {
        &self.root
    }

    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    /// Whether `url` may be admitted to the frontier.
    ///
    /// Both modes require `url` to start with the root string, so strict
    /// scope is always a subset of prefix scope.
    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        let root = self.root.as_str();
        let Some(rest) = url.as_str().strip_prefix(root) else {
            return false;
        };

        match self.mode {
            ScopeMode::Prefix => true,
            ScopeMode::Strict => {
                let same_origin = url.as_url().origin() == self.root.as_url().origin();
                let on_boundary = root.ends_with('/')
                    || rest.is_empty()
                    || rest.starts_with('/')
                    || rest.starts_with('?');
                same_origin && on_boundary
            }
        }
    }
}

impl fmt::Display for ScopeRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.root, self.mode)
    }
}
