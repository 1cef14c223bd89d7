//! URL canonicalisation and link resolution.
//!
//! Every URL the crawler stores, compares or schedules is a [`CanonicalUrl`]:
//! absolute, `http`/`https` only, fragment stripped, with the host, port and
//! path normalised by the WHATWG parser.

use crate::error::{Result, ScanError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A normalized absolute URL used as the dedup and index key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Canonicalise an absolute URL string.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let url = Url::parse(trimmed).map_err(|e| ScanError::invalid_url(trimmed, e.to_string()))?;
        Self::from_url(url)
    }

    /// Canonicalise an already parsed URL.
    pub fn from_url(mut url: Url) -> Result<Self> {
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ScanError::invalid_url(
                    url.as_str(),
                    format!("unsupported scheme '{}'", other),
                ));
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(ScanError::invalid_url(url.as_str(), "missing host"));
        }

        url.set_fragment(None);
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        self.0.into()
    }
}

/// Resolve `raw` against `base` and canonicalise the result.
///
/// Absolute references pass through; scheme-relative and path-relative
/// references are joined with `base`. Anything that does not resolve to an
/// `http`/`https` URL with a host is rejected as [`ScanError::InvalidUrl`].
pub fn normalize(raw: &str, base: &CanonicalUrl) -> Result<CanonicalUrl> {
    let href = raw.trim();
    if href.is_empty() {
        return Err(ScanError::invalid_url(raw, "empty reference"));
    }

    let joined = base
        .0
        .join(href)
        .map_err(|e| ScanError::invalid_url(href, e.to_string()))?;

    CanonicalUrl::from_url(joined)
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for CanonicalUrl {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialEq<str> for CanonicalUrl {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for CanonicalUrl {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for CanonicalUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
