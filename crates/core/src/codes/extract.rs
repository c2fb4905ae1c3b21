//! Extraction of book codes from recognized text

use super::jan::convert_jan_to_isbn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ISBN13_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:978|979)\d{10}").expect("valid ISBN-13 pattern"));
static ISBN10_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{9}[\dX]\b").expect("valid ISBN-10 pattern"));
static JAN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:192|198|199|491)\d{10}").expect("valid JAN pattern"));

/// Kind of a code found in text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedKind {
    Isbn,
    Jan,
}

/// A code found in recognized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedCode {
    pub kind: DetectedKind,
    pub code: String,
}

impl DetectedCode {
    fn new(kind: DetectedKind, code: &str) -> Self {
        Self {
            kind,
            code: code.to_string(),
        }
    }
}

/// Finds ISBN and JAN codes in OCR output.
///
/// Whitespace and hyphens are removed first, so codes split across lines or
/// printed with separators are still found. Results are ordered ISBN-13
/// matches, then ISBN-10 matches, then JAN matches.
pub fn extract_codes(text: &str) -> Vec<DetectedCode> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    let isbn13 = ISBN13_PATTERN
        .find_iter(&normalized)
        .map(|m| DetectedCode::new(DetectedKind::Isbn, m.as_str()));
    let isbn10 = ISBN10_PATTERN
        .find_iter(&normalized)
        .map(|m| DetectedCode::new(DetectedKind::Isbn, m.as_str()));
    let jan = JAN_PATTERN
        .find_iter(&normalized)
        .map(|m| DetectedCode::new(DetectedKind::Jan, m.as_str()));

    isbn13.chain(isbn10).chain(jan).collect()
}

/// Picks the first usable ISBN from detected codes.
///
/// ISBNs are taken as-is; JANs go through [`convert_jan_to_isbn`] and are
/// skipped when they do not convert.
pub fn resolve_detected(codes: &[DetectedCode]) -> Option<String> {
    codes.iter().find_map(|detected| match detected.kind {
        DetectedKind::Isbn => Some(detected.code.clone()),
        DetectedKind::Jan => convert_jan_to_isbn(&detected.code),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_isbn13_with_separators() {
        let codes = extract_codes("ISBN978-4-8222-8394-0\nC0055 ¥1800E");
        assert_eq!(
            codes.first(),
            Some(&DetectedCode::new(DetectedKind::Isbn, "9784822283940"))
        );
    }

    #[test]
    fn test_extracts_isbn10_at_word_boundary() {
        let codes = extract_codes("ISBN: 4-06-159343-X");
        assert!(codes.contains(&DetectedCode::new(DetectedKind::Isbn, "406159343X")));
    }

    #[test]
    fn test_extracts_jan() {
        let codes = extract_codes("雑誌 4910123456789 定価");
        assert!(codes.contains(&DetectedCode::new(DetectedKind::Jan, "4910123456789")));
    }

    #[test]
    fn test_isbn13_precedes_jan() {
        let codes = extract_codes("4910123456789 / 9784822283940");
        assert_eq!(codes[0].kind, DetectedKind::Isbn);
        assert_eq!(codes[0].code, "9784822283940");
    }

    #[test]
    fn test_no_codes() {
        assert!(extract_codes("no barcode here").is_empty());
        assert!(extract_codes("").is_empty());
    }

    #[test]
    fn test_resolve_prefers_first_isbn() {
        let codes = vec![
            DetectedCode::new(DetectedKind::Isbn, "9784822283940"),
            DetectedCode::new(DetectedKind::Jan, "4910123456789"),
        ];
        assert_eq!(resolve_detected(&codes), Some("9784822283940".to_string()));
    }

    #[test]
    fn test_resolve_converts_jan() {
        let codes = vec![DetectedCode::new(DetectedKind::Jan, "4910123456789")];
        assert_eq!(resolve_detected(&codes), Some("9780123456786".to_string()));
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(resolve_detected(&[]), None);
    }
}
