use crate::url::CanonicalUrl;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Entries {
    order: Vec<CanonicalUrl>,
    texts: HashMap<CanonicalUrl, String>,
}

/// Extracted page text keyed by canonical URL, in insertion order.
///
/// Each key is written once; later writes for the same key are ignored.
#[derive(Debug, Default)]
pub struct TextIndex {
    entries: RwLock<Entries>,
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the text for `url`. Returns `false`, leaving the entry untouched,
    /// if `url` is already indexed.
    pub fn put(&self, url: CanonicalUrl, text: impl Into<String>) -> bool {
        let mut entries = self.write();
        if entries.texts.contains_key(&url) {
            return false;
        }
        entries.order.push(url.clone());
        entries.texts.insert(url, text.into());
        true
    }

    pub fn get(&self, url: &CanonicalUrl) -> Option<String> {
        self.read().texts.get(url).cloned()
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.read().texts.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().order.is_empty()
    }

    /// All `(url, text)` pairs in insertion order.
    pub fn entries(&self) -> Vec<(CanonicalUrl, String)> {
        let entries = self.read();
        entries
            .order
            .iter()
            .map(|url| (url.clone(), entries.texts.get(url).cloned().unwrap_or_default()))
            .collect()
    }

    /// Visit each entry in insertion order without cloning the text.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&CanonicalUrl, &str),
    {
        let entries = self.read();
        for url in &entries.order {
            if let Some(text) = entries.texts.get(url) {
                f(url, text);
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
