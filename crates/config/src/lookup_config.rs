//! Metadata lookup configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Endpoints and limits for the external book catalogs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    /// Google Books API base (volumes endpoint is appended)
    pub google_books_url: String,

    /// Optional Google Books API key; empty means anonymous quota
    pub google_books_api_key: String,

    /// openBD API base (`/get` is appended)
    pub openbd_url: String,

    /// National Diet Library OpenSearch endpoint
    pub ndl_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            google_books_url: "https://www.googleapis.com/books/v1".to_string(),
            google_books_api_key: String::new(),
            openbd_url: "https://api.openbd.jp/v1".to_string(),
            ndl_url: "https://iss.ndl.go.jp/api/opensearch".to_string(),
            timeout_secs: 10,
        }
    }
}

impl LookupConfig {
    /// API key, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        let key = self.google_books_api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

impl ConfigSection for LookupConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::is_http_url(&self.google_books_url, "lookup.google_books_url"),
            Validator::is_http_url(&self.openbd_url, "lookup.openbd_url"),
            Validator::is_http_url(&self.ndl_url, "lookup.ndl_url"),
            Validator::in_range(self.timeout_secs, 1, 120, "lookup.timeout_secs"),
        ];

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.google_books_url = other.google_books_url;
        self.google_books_api_key = other.google_books_api_key;
        self.openbd_url = other.openbd_url;
        self.ndl_url = other.ndl_url;
        self.timeout_secs = other.timeout_secs;
    }

    fn section_name(&self) -> &'static str {
        "lookup"
    }
}
