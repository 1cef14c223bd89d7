use scraper::{Html, Selector};
use std::sync::LazyLock;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Elements whose text is not page content.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Text and raw links extracted from a page body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub text: String,
    pub links: Vec<String>,
}

/// Turns a fetched body into text and raw hrefs.
///
/// Implementations must not fail: malformed input yields empty text or no links.
pub trait PageParser: Send + Sync {
    fn parse(&self, body: &str) -> ParsedPage;
}

/// [`PageParser`] for HTML documents, built on html5ever via scraper.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for HtmlParser {
    fn parse(&self, body: &str) -> ParsedPage {
        let document = Html::parse_document(body);

        let mut text = String::new();
        for node in document.tree.root().descendants() {
            let Some(fragment) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
            });
            if hidden {
                continue;
            }
            for word in fragment.split_whitespace() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(word);
            }
        }

        let links = document
            .select(&LINK_SELECTOR)
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect();

        ParsedPage { text, links }
    }
}
