// src/extract/change_list.rs

//! Change-entry list extraction.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::Extract;
use crate::error::{AppError, Result};

/// Heading that introduces the change list.
const HEADING: &str = "Senaste publicerade ändringar";

/// Extracts the ordered change entries following the section heading.
///
/// Entries come back in page display order, first = newest as rendered.
#[derive(Debug, Clone)]
pub struct ChangeListExtractor {
    headings: Selector,
    heading_lower: String,
    break_re: Regex,
    tag_re: Regex,
}

impl ChangeListExtractor {
    pub fn new() -> Self {
        Self {
            headings: Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector is valid"),
            heading_lower: HEADING.to_lowercase(),
            break_re: Regex::new(r"(?i)<br\s*/?>").expect("break pattern is valid"),
            tag_re: Regex::new(r"<[^>]*>").expect("tag pattern is valid"),
        }
    }

    fn is_change_heading(&self, element: ElementRef<'_>) -> bool {
        let text: String = element.text().collect();
        text.replace('\u{a0}', " ").trim().to_lowercase() == self.heading_lower
    }
}

impl Default for ChangeListExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extract for ChangeListExtractor {
    type Output = Vec<String>;

    fn extract(&self, html: &str) -> Result<Vec<String>> {
        let document = Html::parse_document(html);

        let heading = document
            .select(&self.headings)
            .find(|el| self.is_change_heading(*el))
            .ok_or_else(|| AppError::extract(format!("no '{HEADING}' heading on the page")))?;

        // The entries live in the next element after the heading, one per
        // <br>-separated line.
        let block = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .next()
            .ok_or_else(|| {
                AppError::extract(format!("no content block follows the '{HEADING}' heading"))
            })?;

        let entries = self
            .break_re
            .split(&block.inner_html())
            .map(|fragment| {
                self.tag_re
                    .replace_all(fragment, "")
                    .replace("&nbsp;", " ")
                    .replace('\u{a0}', " ")
                    .trim()
                    .to_string()
            })
            .filter(|entry| !entry.is_empty())
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!("<html><body>{body}</body></html>")
    }

    #[test]
    fn extracts_entries_in_page_order() {
        let html = page(
            "<h2>Senaste publicerade ändringar</h2>\
             <p>2025-10-26 Ny version av linjebok öst<br>\
             2025-10-17 Rättelse kapitel 4<br/>\
             2025-09-30 Uppdaterade hastighetstabeller</p>",
        );
        let entries = ChangeListExtractor::new().extract(&html).unwrap();
        assert_eq!(
            entries,
            vec![
                "2025-10-26 Ny version av linjebok öst",
                "2025-10-17 Rättelse kapitel 4",
                "2025-09-30 Uppdaterade hastighetstabeller",
            ]
        );
    }

    #[test]
    fn heading_match_is_case_insensitive() {
        let html = page("<h3>SENASTE PUBLICERADE ÄNDRINGAR</h3><p>2025-01-01 Post</p>");
        let entries = ChangeListExtractor::new().extract(&html).unwrap();
        assert_eq!(entries, vec!["2025-01-01 Post"]);
    }

    #[test]
    fn strips_nested_markup_and_decodes_nbsp() {
        let html = page(
            "<h2>Senaste publicerade ändringar</h2>\
             <div><strong>2025-10-26</strong>&nbsp;Ny version<br>\
             <em>2025-10-17</em> Rättelse</div>",
        );
        let entries = ChangeListExtractor::new().extract(&html).unwrap();
        assert_eq!(entries, vec!["2025-10-26 Ny version", "2025-10-17 Rättelse"]);
    }

    #[test]
    fn drops_empty_fragments() {
        let html = page(
            "<h2>Senaste publicerade ändringar</h2>\
             <p><br>2025-10-26 Ny version<br><br>  <br>2025-10-17 Rättelse<br></p>",
        );
        let entries = ChangeListExtractor::new().extract(&html).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn missing_heading_is_an_extraction_error() {
        let html = page("<h2>Aktuella driftstörningar</h2><p>2025-10-26 X</p>");
        let err = ChangeListExtractor::new().extract(&html);
        assert!(matches!(err, Err(AppError::Extract(_))));
    }

    #[test]
    fn heading_without_following_block_is_an_extraction_error() {
        let html = page("<div><h2>Senaste publicerade ändringar</h2></div>");
        let err = ChangeListExtractor::new().extract(&html);
        assert!(matches!(err, Err(AppError::Extract(_))));
    }

    #[test]
    fn skips_text_nodes_between_heading_and_block() {
        let html = page("<h2>Senaste publicerade ändringar</h2>\n  \n<p>2025-10-26 Post</p>");
        let entries = ChangeListExtractor::new().extract(&html).unwrap();
        assert_eq!(entries, vec!["2025-10-26 Post"]);
    }
}
