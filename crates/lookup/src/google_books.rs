//! Google Books volumes search

use crate::http::{build_client, get_text, non_empty, require_client};
use crate::{MetadataSource, SourceError, SourceMetadata, SourceResult};
use serde::Deserialize;
use shelfscan_config::LookupConfig;
use shelfscan_core::{normalize_code, BookRecord};

/// General ISBN catalog backed by the Google Books API
pub struct GoogleBooksSource {
    base_url: String,
    api_key: Option<String>,
    client: Option<reqwest::blocking::Client>,
}

impl GoogleBooksSource {
    pub const NAME: &'static str = "Google Books";

    pub fn from_config(config: &LookupConfig) -> Self {
        Self {
            base_url: config.google_books_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().map(str::to_string),
            client: build_client(config.timeout_secs),
        }
    }

    fn volumes_url(&self) -> String {
        format!("{}/volumes", self.base_url)
    }
}

impl MetadataSource for GoogleBooksSource {
    fn lookup(&self, code: &str) -> SourceResult<Option<BookRecord>> {
        let isbn = normalize_code(code);
        if isbn.is_empty() {
            return Err(SourceError::InvalidQuery("Empty code".to_string()));
        }

        let client = require_client(&self.client)?;
        let q = format!("isbn:{}", isbn);
        let mut query = vec![("q", q.as_str())];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        let body = get_text(client, &self.volumes_url(), &query)?;
        parse_google_books(&body, &isbn)
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: Self::NAME.to_string(),
            description: "Worldwide book metadata searched by ISBN".to_string(),
            base_url: self.base_url.clone(),
            requires_auth: false,
        }
    }

    fn is_available(&self) -> bool {
        self.client.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    #[serde(default)]
    total_items: u64,
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    #[serde(default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VolumeInfo {
    title: Option<String>,
    authors: Vec<String>,
    publisher: Option<String>,
    published_date: Option<String>,
    page_count: Option<u32>,
    description: Option<String>,
    categories: Vec<String>,
    image_links: Option<ImageLinks>,
    language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

/// Maps a volumes search response to a record for `isbn`.
///
/// Only the first volume is used. Authors and categories are joined with
/// `", "`; the thumbnail is preferred over the small thumbnail.
pub fn parse_google_books(body: &str, isbn: &str) -> SourceResult<Option<BookRecord>> {
    let response: VolumesResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::ParseError(format!("JSON parse error: {}", e)))?;

    if response.total_items == 0 {
        return Ok(None);
    }

    let Some(volume) = response.items.into_iter().next() else {
        return Ok(None);
    };
    let info = volume.volume_info;

    let image_url = info
        .image_links
        .and_then(|links| non_empty(links.thumbnail).or(non_empty(links.small_thumbnail)));

    Ok(Some(BookRecord {
        title: non_empty(info.title),
        author: non_empty(Some(info.authors.join(", "))),
        publisher: non_empty(info.publisher),
        publish_date: non_empty(info.published_date),
        pages: info.page_count.filter(|p| *p > 0),
        description: non_empty(info.description),
        category: non_empty(Some(info.categories.join(", "))),
        isbn: Some(isbn.to_string()),
        image_url,
        language: non_empty(info.language),
        source: Some(GoogleBooksSource::NAME.to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOLUME: &str = r#"{
        "kind": "books#volumes",
        "totalItems": 1,
        "items": [{
            "volumeInfo": {
                "title": "Programming Rust",
                "authors": ["Jim Blandy", "Jason Orendorff"],
                "publisher": "O'Reilly Media",
                "publishedDate": "2017-11-21",
                "pageCount": 622,
                "categories": ["Computers", "Programming"],
                "imageLinks": {
                    "smallThumbnail": "http://books.google.com/small.jpg",
                    "thumbnail": "http://books.google.com/thumb.jpg"
                },
                "language": "en"
            }
        }]
    }"#;

    #[test]
    fn test_parse_volume() {
        let record = parse_google_books(VOLUME, "9781491927281")
            .expect("Should parse")
            .expect("Should find a record");

        assert_eq!(record.title.as_deref(), Some("Programming Rust"));
        assert_eq!(record.author.as_deref(), Some("Jim Blandy, Jason Orendorff"));
        assert_eq!(record.pages, Some(622));
        assert_eq!(record.category.as_deref(), Some("Computers, Programming"));
        assert_eq!(
            record.image_url.as_deref(),
            Some("http://books.google.com/thumb.jpg")
        );
        assert_eq!(record.isbn.as_deref(), Some("9781491927281"));
        assert_eq!(record.description, None);
        assert_eq!(record.source.as_deref(), Some("Google Books"));
    }

    #[test]
    fn test_small_thumbnail_fallback() {
        let body = r#"{"totalItems": 1, "items": [{"volumeInfo": {
            "title": "T", "imageLinks": {"smallThumbnail": "http://s.jpg"}}}]}"#;
        let record = parse_google_books(body, "0123456789").unwrap().unwrap();
        assert_eq!(record.image_url.as_deref(), Some("http://s.jpg"));
        assert_eq!(record.author, None);
        assert_eq!(record.category, None);
    }

    #[test]
    fn test_no_items() {
        assert_eq!(parse_google_books(r#"{"totalItems": 0}"#, "x").unwrap(), None);
        assert_eq!(
            parse_google_books(r#"{"totalItems": 3, "items": []}"#, "x").unwrap(),
            None
        );
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_google_books("<html>", "x").unwrap_err();
        assert!(matches!(err, SourceError::ParseError(_)));
    }

    #[test]
    fn test_metadata() {
        let source = GoogleBooksSource::from_config(&LookupConfig::default());
        let meta = source.metadata();
        assert_eq!(meta.name, "Google Books");
        assert!(meta.base_url.contains("googleapis.com"));
        assert!(!meta.requires_auth);
    }

    #[test]
    fn test_empty_code_rejected() {
        let source = GoogleBooksSource::from_config(&LookupConfig::default());
        let result = source.lookup(" - ");
        assert!(matches!(result, Err(SourceError::InvalidQuery(_))));
    }
}
