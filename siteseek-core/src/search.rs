use siteseek_scanner::{CanonicalUrl, TextIndex};

/// Keyword lookup over a [`TextIndex`].
///
/// Matching is a case-insensitive substring test against each page's whole
/// text, so partial words match. Results follow index insertion order.
pub struct SearchEngine<'a> {
    index: &'a TextIndex,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a TextIndex) -> Self {
        Self { index }
    }

    pub fn search(&self, keyword: &str) -> Vec<CanonicalUrl> {
        let needle = keyword.to_lowercase();
        let mut results = Vec::new();
        self.index.for_each(|url, text| {
            if text.to_lowercase().contains(&needle) {
                results.push(url.clone());
            }
        });
        results
    }

    /// Run several keywords, keeping the caller's order.
    pub fn search_all<'k, I>(&self, keywords: I) -> Vec<(String, Vec<CanonicalUrl>)>
    where
        I: IntoIterator<Item = &'k str>,
    {
        keywords
            .into_iter()
            .map(|keyword| (keyword.to_string(), self.search(keyword)))
            .collect()
    }
}
