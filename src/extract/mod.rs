// src/extract/mod.rs

//! HTML extraction strategies.
//!
//! Each strategy is a narrow "given HTML text, return extracted value(s) or
//! fail" implementation, so a page-layout change touches exactly one
//! extractor.

mod change_list;
mod updated_date;

pub use change_list::ChangeListExtractor;
pub use updated_date::UpdatedDateExtractor;

use scraper::Html;

use crate::error::Result;

/// An extraction strategy over raw HTML text.
pub trait Extract {
    /// Shape of the extracted value.
    type Output;

    /// Pull the watched value out of the page, or fail because the page
    /// structure no longer matches.
    fn extract(&self, html: &str) -> Result<Self::Output>;
}

/// Render a page to plain text: text nodes trimmed and joined by newlines,
/// non-breaking spaces normalized to regular spaces.
pub(crate) fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();
    for node in document.root_element().text() {
        let line = node.replace('\u{a0}', " ");
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_text_strips_tags_and_normalizes_nbsp() {
        let html = "<html><body><p>first\u{a0}line</p><div><span>second</span></div></body></html>";
        assert_eq!(page_text(html), "first line\nsecond");
    }

    #[test]
    fn page_text_drops_whitespace_only_nodes() {
        let html = "<div>  </div><p>only</p>";
        assert_eq!(page_text(html), "only");
    }
}
