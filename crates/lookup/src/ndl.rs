//! National Diet Library OpenSearch

use crate::http::{build_client, get_text, non_empty, require_client};
use crate::{MetadataSource, SourceError, SourceMetadata, SourceResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use shelfscan_config::LookupConfig;
use shelfscan_core::{normalize_code, BookRecord};

/// Fallback ISBN catalog; answers in RSS
pub struct NdlSource {
    base_url: String,
    client: Option<reqwest::blocking::Client>,
}

impl NdlSource {
    pub const NAME: &'static str = "National Diet Library";

    pub fn from_config(config: &LookupConfig) -> Self {
        Self {
            base_url: config.ndl_url.clone(),
            client: build_client(config.timeout_secs),
        }
    }
}

impl MetadataSource for NdlSource {
    fn lookup(&self, code: &str) -> SourceResult<Option<BookRecord>> {
        let isbn = normalize_code(code);
        if isbn.is_empty() {
            return Err(SourceError::InvalidQuery("Empty code".to_string()));
        }

        let client = require_client(&self.client)?;
        let body = get_text(client, &self.base_url, &[("isbn", isbn.as_str())])?;
        parse_ndl(&body, &isbn)
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: Self::NAME.to_string(),
            description: "Japanese national bibliography, used as a last resort".to_string(),
            base_url: self.base_url.clone(),
            requires_auth: false,
        }
    }

    fn is_available(&self) -> bool {
        self.client.is_some()
    }
}

/// Maps the first `<item>` of an OpenSearch RSS response.
///
/// Reads `title`, `author`, `dc:publisher`, `pubDate` and `description`; the
/// first occurrence of each wins. No item means no record.
pub fn parse_ndl(body: &str, isbn: &str) -> SourceResult<Option<BookRecord>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut record: Option<BookRecord> = None;
    let mut text_buffer = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"item" && record.is_none() {
                    record = Some(BookRecord::default());
                }
                text_buffer.clear();
            }
            Ok(Event::Text(e)) => {
                text_buffer = e.unescape().map(|s| s.to_string()).unwrap_or_default();
            }
            Ok(Event::CData(e)) => {
                text_buffer = String::from_utf8_lossy(&e.into_inner()).to_string();
            }
            Ok(Event::End(e)) => {
                let element_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if let Some(item) = record.as_mut() {
                    let slot = match element_name.as_str() {
                        "title" => Some(&mut item.title),
                        "author" => Some(&mut item.author),
                        "dc:publisher" => Some(&mut item.publisher),
                        "pubDate" => Some(&mut item.publish_date),
                        "description" => Some(&mut item.description),
                        _ => None,
                    };
                    if let Some(slot) = slot {
                        if slot.is_none() {
                            *slot = non_empty(Some(text_buffer.clone()));
                        }
                    }

                    if element_name == "item" {
                        break;
                    }
                }

                text_buffer.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::ParseError(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(record.map(|mut item| {
        item.isbn = Some(isbn.to_string());
        item.source = Some(NdlSource::NAME.to_string());
        item
    }))
}
