//! openBD: the Japanese book distribution database

use crate::http::{build_client, get_text, non_empty, require_client};
use crate::{MetadataSource, SourceError, SourceMetadata, SourceResult};
use serde::Deserialize;
use serde_json::Value;
use shelfscan_config::LookupConfig;
use shelfscan_core::BookRecord;

/// JAN catalog; openBD accepts both ISBNs and Japanese book JANs
pub struct OpenBdSource {
    base_url: String,
    client: Option<reqwest::blocking::Client>,
}

impl OpenBdSource {
    pub const NAME: &'static str = "openBD";

    pub fn from_config(config: &LookupConfig) -> Self {
        Self {
            base_url: config.openbd_url.trim_end_matches('/').to_string(),
            client: build_client(config.timeout_secs),
        }
    }
}

impl MetadataSource for OpenBdSource {
    fn lookup(&self, code: &str) -> SourceResult<Option<BookRecord>> {
        if code.trim().is_empty() {
            return Err(SourceError::InvalidQuery("Empty code".to_string()));
        }

        let client = require_client(&self.client)?;
        let url = format!("{}/get", self.base_url);
        let body = get_text(client, &url, &[("isbn", code)])?;
        parse_openbd(&body, code)
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: Self::NAME.to_string(),
            description: "Japanese publishers' distribution records keyed by JAN/ISBN".to_string(),
            base_url: self.base_url.clone(),
            requires_auth: false,
        }
    }

    fn is_available(&self) -> bool {
        self.client.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    summary: Summary,
    #[serde(default)]
    onix: Onix,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Summary {
    isbn: Option<String>,
    title: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
    pubdate: Option<String>,
    cover: Option<String>,
    pages: Option<Value>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Onix {
    #[serde(rename = "DescriptiveDetail")]
    descriptive_detail: DescriptiveDetail,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DescriptiveDetail {
    #[serde(rename = "Subject")]
    subject: Vec<Subject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Subject {
    #[serde(rename = "SubjectHeadingText")]
    heading: Option<String>,
}

/// Maps an openBD `/get` response for `code`.
///
/// The response is an array with one entry per requested code; unknown codes
/// come back as `null`. The ISBN falls back to the requested code.
pub fn parse_openbd(body: &str, code: &str) -> SourceResult<Option<BookRecord>> {
    let entries: Vec<Option<Entry>> = serde_json::from_str(body)
        .map_err(|e| SourceError::ParseError(format!("JSON parse error: {}", e)))?;

    let Some(entry) = entries.into_iter().next().flatten() else {
        return Ok(None);
    };

    let summary = entry.summary;
    let categories: Vec<String> = entry
        .onix
        .descriptive_detail
        .subject
        .into_iter()
        .filter_map(|s| non_empty(s.heading))
        .collect();

    Ok(Some(BookRecord {
        title: non_empty(summary.title),
        author: non_empty(summary.author),
        publisher: non_empty(summary.publisher),
        publish_date: non_empty(summary.pubdate),
        pages: summary.pages.as_ref().and_then(page_count),
        description: non_empty(summary.description),
        category: non_empty(Some(categories.join(", "))),
        isbn: non_empty(summary.isbn).or_else(|| Some(code.to_string())),
        image_url: non_empty(summary.cover),
        language: Some("ja".to_string()),
        source: Some(OpenBdSource::NAME.to_string()),
    }))
}

/// Page counts arrive as numbers or numeric strings
fn page_count(value: &Value) -> Option<u32> {
    let pages: Option<u32> = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    pages.filter(|p| *p > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"[{
        "onix": {
            "DescriptiveDetail": {
                "Subject": [
                    {"SubjectSchemeIdentifier": "78", "SubjectCode": "93"},
                    {"SubjectHeadingText": "小説"},
                    {"SubjectHeadingText": "日本文学"}
                ]
            }
        },
        "summary": {
            "isbn": "9784003101018",
            "title": "こころ",
            "publisher": "岩波書店",
            "pubdate": "19890516",
            "cover": "",
            "author": "夏目漱石／著"
        }
    }]"#;

    #[test]
    fn test_parse_entry() {
        let record = parse_openbd(ENTRY, "9784003101018")
            .expect("Should parse")
            .expect("Should find a record");

        assert_eq!(record.title.as_deref(), Some("こころ"));
        assert_eq!(record.author.as_deref(), Some("夏目漱石／著"));
        assert_eq!(record.publish_date.as_deref(), Some("19890516"));
        assert_eq!(record.category.as_deref(), Some("小説, 日本文学"));
        assert_eq!(record.image_url, None);
        assert_eq!(record.language.as_deref(), Some("ja"));
        assert_eq!(record.source.as_deref(), Some("openBD"));
    }

    #[test]
    fn test_null_entry_is_not_found() {
        assert_eq!(parse_openbd("[null]", "4910123456789").unwrap(), None);
        assert_eq!(parse_openbd("[]", "4910123456789").unwrap(), None);
    }

    #[test]
    fn test_isbn_falls_back_to_code() {
        let body = r#"[{"summary": {"title": "雑誌"}}]"#;
        let record = parse_openbd(body, "4910123456789").unwrap().unwrap();
        assert_eq!(record.isbn.as_deref(), Some("4910123456789"));
        assert_eq!(record.category, None);
    }

    #[test]
    fn test_pages_number_or_string() {
        assert_eq!(page_count(&Value::from(240)), Some(240));
        assert_eq!(page_count(&Value::from("312")), Some(312));
        assert_eq!(page_count(&Value::from("n/a")), None);
        assert_eq!(page_count(&Value::from(0)), None);
    }

    #[test]
    fn test_not_an_array() {
        let err = parse_openbd(r#"{"error": "bad"}"#, "x").unwrap_err();
        assert!(matches!(err, SourceError::ParseError(_)));
    }
}
