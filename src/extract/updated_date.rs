// src/extract/updated_date.rs

//! "Senast uppdaterad / granskad" date extraction.

use regex::Regex;

use super::{Extract, page_text};
use crate::error::{AppError, Result};

/// Label substring used by the line-scan fallback.
const LABEL: &str = "Senast uppdaterad";

/// Extracts the ISO date that follows the fixed Swedish label.
#[derive(Debug, Clone)]
pub struct UpdatedDateExtractor {
    label_re: Regex,
    date_re: Regex,
}

impl UpdatedDateExtractor {
    pub fn new() -> Self {
        Self {
            label_re: Regex::new(r"(?i)Senast\s+uppdaterad\s*/\s*granskad:\s*(\d{4}-\d{2}-\d{2})")
                .expect("label pattern is valid"),
            date_re: Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date pattern is valid"),
        }
    }
}

impl Default for UpdatedDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extract for UpdatedDateExtractor {
    type Output = String;

    fn extract(&self, html: &str) -> Result<String> {
        let text = page_text(html);

        if let Some(caps) = self.label_re.captures(&text) {
            return Ok(caps[1].to_string());
        }

        // Fallback for markup that separates label and date with extra text:
        // any line carrying the label with a bare date token later on it.
        for line in text.lines() {
            if line.contains(LABEL) {
                if let Some(m) = self.date_re.find(line) {
                    return Ok(m.as_str().to_string());
                }
            }
        }

        Err(AppError::extract(
            "could not find the 'Senast uppdaterad / granskad' date on the page",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_labelled_date() {
        let html = "<p>Senast uppdaterad / granskad: 2025-10-26</p>";
        let extracted = UpdatedDateExtractor::new().extract(html).unwrap();
        assert_eq!(extracted, "2025-10-26");
    }

    #[test]
    fn label_match_is_case_insensitive() {
        let html = "<p>SENAST UPPDATERAD / GRANSKAD: 2024-01-02</p>";
        let extracted = UpdatedDateExtractor::new().extract(html).unwrap();
        assert_eq!(extracted, "2024-01-02");
    }

    #[test]
    fn tolerates_non_breaking_spaces_in_label() {
        let html = "<p>Senast\u{a0}uppdaterad /\u{a0}granskad: 2025-03-15</p>";
        let extracted = UpdatedDateExtractor::new().extract(html).unwrap();
        assert_eq!(extracted, "2025-03-15");
    }

    #[test]
    fn date_inside_child_element_still_matches() {
        // The date renders on its own text node; the primary pattern spans
        // the resulting line break.
        let html = "<p>Senast uppdaterad / granskad: <time>2025-06-01</time></p>";
        let extracted = UpdatedDateExtractor::new().extract(html).unwrap();
        assert_eq!(extracted, "2025-06-01");
    }

    #[test]
    fn falls_back_to_line_scan() {
        let html = "<p>Senast uppdaterad den 2025-10-26 av redaktionen</p>";
        let extracted = UpdatedDateExtractor::new().extract(html).unwrap();
        assert_eq!(extracted, "2025-10-26");
    }

    #[test]
    fn missing_label_is_an_extraction_error() {
        let html = "<p>Publicerad: 2025-10-26</p>";
        let err = UpdatedDateExtractor::new().extract(html);
        assert!(matches!(err, Err(AppError::Extract(_))));
    }

    #[test]
    fn label_without_any_date_is_an_extraction_error() {
        let html = "<p>Senast uppdaterad: igår</p>";
        let err = UpdatedDateExtractor::new().extract(html);
        assert!(matches!(err, Err(AppError::Extract(_))));
    }
}
