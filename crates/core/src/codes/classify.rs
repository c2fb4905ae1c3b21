//! Scanned code classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefixes of 13-digit codes that are ISBN-13 (Bookland EAN)
pub const ISBN_PREFIXES: [&str; 2] = ["978", "979"];

/// Prefixes of 13-digit Japanese book JAN codes
pub const JAN_PREFIXES: [&str; 4] = ["192", "198", "199", "491"];

/// What kind of code a scanned string is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    /// 13 digits starting with 978 or 979
    Isbn13,
    /// Any 10 digits
    Isbn10,
    /// 13 digits starting with a Japanese book JAN prefix
    JapaneseJan,
    /// Anything else, including non-digit input and wrong lengths
    Unknown,
}

impl CodeKind {
    /// Returns true for the two ISBN kinds
    pub fn is_isbn(&self) -> bool {
        matches!(self, Self::Isbn13 | Self::Isbn10)
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isbn13 => write!(f, "ISBN-13"),
            Self::Isbn10 => write!(f, "ISBN-10"),
            Self::JapaneseJan => write!(f, "Japanese JAN"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Classifies a scanned code by length and three-digit prefix.
///
/// Rules are checked in the order ISBN-13, ISBN-10, Japanese JAN. Input that
/// is not entirely ASCII digits classifies as [`CodeKind::Unknown`].
pub fn classify(code: &str) -> CodeKind {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return CodeKind::Unknown;
    }

    match code.len() {
        13 if has_prefix(code, &ISBN_PREFIXES) => CodeKind::Isbn13,
        10 => CodeKind::Isbn10,
        13 if has_prefix(code, &JAN_PREFIXES) => CodeKind::JapaneseJan,
        _ => CodeKind::Unknown,
    }
}

/// Strips hyphens and whitespace from manually entered or OCR'd codes.
///
/// `classify` never does this itself; callers normalize first when the input
/// comes from a person.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

fn has_prefix(code: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| code.starts_with(p))
}
