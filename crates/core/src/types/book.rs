//! Book metadata and cataloged book models

use crate::types::Validator;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

static ISBN_INPUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d-]{10,13}$").expect("valid ISBN input pattern"));

/// Unique identifier for a cataloged book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    /// Creates a new random BookId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a BookId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the BookId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for BookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized book metadata as returned by a lookup source or typed by a user.
///
/// Every field is optional; no invariants are enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Name of the lookup source the record came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl BookRecord {
    /// Creates a record with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Returns true when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays every field set in `other` onto this record
    pub fn merge(&mut self, other: BookRecord) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.title, other.title);
        take(&mut self.author, other.author);
        take(&mut self.publisher, other.publisher);
        take(&mut self.publish_date, other.publish_date);
        take(&mut self.pages, other.pages);
        take(&mut self.description, other.description);
        take(&mut self.category, other.category);
        take(&mut self.isbn, other.isbn);
        take(&mut self.image_url, other.image_url);
        take(&mut self.language, other.language);
        take(&mut self.source, other.source);
    }

    /// Categories split on commas, trimmed, empty entries dropped
    pub fn categories(&self) -> Vec<String> {
        self.category
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A book stored in the catalog together with where it is kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBook {
    pub id: BookId,
    #[serde(flatten)]
    pub record: BookRecord,
    /// User-supplied storage location (shelf, box, room...)
    #[serde(default)]
    pub location: String,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CatalogBook {
    /// Creates a new catalog entry stamped with the current time
    pub fn new(record: BookRecord, location: impl Into<String>) -> Self {
        Self::with_added_at(record, location, Utc::now())
    }

    /// Creates a new catalog entry with an explicit creation time
    pub fn with_added_at(
        record: BookRecord,
        location: impl Into<String>,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BookId::new(),
            record,
            location: location.into(),
            added_at,
            updated_at: None,
        }
    }

    /// Title, or an empty string when unset
    pub fn title(&self) -> &str {
        self.record.title.as_deref().unwrap_or_default()
    }

    /// Author, or an empty string when unset
    pub fn author(&self) -> &str {
        self.record.author.as_deref().unwrap_or_default()
    }

    /// Marks the entry as modified now
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

impl Validator for CatalogBook {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title().trim().is_empty() {
            errors.push("Title cannot be empty".to_string());
        }

        if self.location.trim().is_empty() {
            errors.push("Location cannot be empty".to_string());
        }

        if let Some(isbn) = self.record.isbn.as_deref() {
            if !isbn.is_empty() && !ISBN_INPUT_PATTERN.is_match(isbn) {
                errors.push(format!("Invalid ISBN: {}", isbn));
            }
        }

        if self.record.pages == Some(0) {
            errors.push("Pages must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> CatalogBook {
        let mut record = BookRecord::titled("吾輩は猫である");
        record.author = Some("夏目漱石".to_string());
        record.isbn = Some("9784003101018".to_string());
        CatalogBook::new(record, "Shelf A")
    }

    #[test]
    fn test_book_id_roundtrip() {
        let id = BookId::new();
        let parsed = BookId::from_string(&id.as_string()).expect("Should parse");
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<BookId>().is_err());
    }

    #[test]
    fn test_valid_book() {
        assert!(sample_book().is_valid());
    }

    #[test]
    fn test_missing_title_and_location() {
        let book = CatalogBook::new(BookRecord::default(), "  ");
        let errors = book.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_invalid_isbn_format() {
        let mut book = sample_book();
        book.record.isbn = Some("ISBN 978".to_string());
        assert!(!book.is_valid());

        book.record.isbn = Some("4-06-159343".to_string());
        assert!(book.is_valid());
    }

    #[test]
    fn test_zero_pages_invalid() {
        let mut book = sample_book();
        book.record.pages = Some(0);
        assert!(!book.is_valid());
    }

    #[test]
    fn test_merge_prefers_set_fields() {
        let mut base = BookRecord::titled("Old");
        base.author = Some("Author".to_string());

        let mut overlay = BookRecord::titled("New");
        overlay.pages = Some(320);

        base.merge(overlay);
        assert_eq!(base.title.as_deref(), Some("New"));
        assert_eq!(base.author.as_deref(), Some("Author"));
        assert_eq!(base.pages, Some(320));
    }

    #[test]
    fn test_categories_split() {
        let mut record = BookRecord::default();
        record.category = Some("Fiction, Japanese literature,, ".to_string());
        assert_eq!(record.categories(), vec!["Fiction", "Japanese literature"]);
        assert!(BookRecord::default().categories().is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let mut record = BookRecord::titled("T");
        record.publish_date = Some("2020-01".to_string());
        record.image_url = Some("http://example.com/c.jpg".to_string());
        let book = CatalogBook::new(record, "Box 1");

        let json = serde_json::to_value(&book).expect("Should serialize");
        assert_eq!(json["title"], "T");
        assert_eq!(json["publishDate"], "2020-01");
        assert_eq!(json["imageUrl"], "http://example.com/c.jpg");
        assert_eq!(json["location"], "Box 1");
        assert!(json.get("addedAt").is_some());
        assert!(json.get("updatedAt").is_none());

        let back: CatalogBook = serde_json::from_value(json).expect("Should deserialize");
        assert_eq!(back, book);
    }

    #[test]
    fn test_touch_sets_updated_at() {
        let mut book = sample_book();
        assert!(book.updated_at.is_none());
        book.touch();
        assert!(book.updated_at.is_some());
    }
}
