//! Catalog import
//!
//! Parsing only; [`Catalog::import_entries`](crate::Catalog::import_entries)
//! turns entries into books with fresh ids and timestamps.

use crate::{CatalogError, CatalogResult, DataFormat};
use serde::Deserialize;
use serde_json::Value;
use shelfscan_core::BookRecord;

/// One book read from an import file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub record: BookRecord,
    /// Location carried by the file, if any
    pub location: Option<String>,
}

pub fn import(text: &str, format: DataFormat) -> CatalogResult<Vec<ImportEntry>> {
    match format {
        DataFormat::Json => import_json(text),
        DataFormat::Csv => import_csv(text),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct JsonEntry {
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    publisher: Option<String>,
    publish_date: Option<String>,
    pages: Option<Value>,
    category: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    location: Option<String>,
}

/// Reads a JSON array of books; each entry needs a title
pub fn import_json(text: &str) -> CatalogResult<Vec<ImportEntry>> {
    let value: Value = serde_json::from_str(text.trim_start_matches('\u{FEFF}'))
        .map_err(|e| CatalogError::Import(format!("invalid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(CatalogError::Import(
            "expected a JSON array of books".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let entry: JsonEntry = serde_json::from_value(item)
                .map_err(|e| CatalogError::Import(format!("entry {}: {}", index + 1, e)))?;

            let title = non_empty(entry.title).ok_or_else(|| {
                CatalogError::Import(format!("entry {}: title is required", index + 1))
            })?;

            Ok(ImportEntry {
                record: BookRecord {
                    title: Some(title),
                    author: non_empty(entry.author),
                    isbn: non_empty(entry.isbn),
                    publisher: non_empty(entry.publisher),
                    publish_date: non_empty(entry.publish_date),
                    pages: entry.pages.as_ref().and_then(pages_from_json),
                    category: non_empty(entry.category),
                    description: non_empty(entry.description),
                    image_url: non_empty(entry.image_url),
                    ..BookRecord::default()
                },
                location: non_empty(entry.location),
            })
        })
        .collect()
}

/// Reads CSV in the export column order; the first row is a header.
///
/// Errors name the offending line, counting the header as line 1.
pub fn import_csv(text: &str) -> CatalogResult<Vec<ImportEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.trim_start_matches('\u{FEFF}').as_bytes());

    let mut entries = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let fallback_line = index as u64 + 2;
        let record = result.map_err(|e| {
            let line = e
                .position()
                .map(|p| p.line())
                .unwrap_or(fallback_line);
            CatalogError::Import(format!("line {}: {}", line, e))
        })?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);

        let field = |i: usize| non_empty(record.get(i).map(str::to_string));

        let title = field(0)
            .ok_or_else(|| CatalogError::Import(format!("line {}: title is required", line)))?;

        entries.push(ImportEntry {
            record: BookRecord {
                title: Some(title),
                author: field(1),
                isbn: field(2),
                publisher: field(3),
                publish_date: field(4),
                pages: record.get(5).and_then(parse_pages),
                category: field(6),
                description: field(7),
                ..BookRecord::default()
            },
            location: None,
        });
    }

    if entries.is_empty() {
        return Err(CatalogError::Import("the file contains no books".to_string()));
    }
    Ok(entries)
}

/// Leading digits of `text`; zero and non-numeric text give `None`
pub fn parse_pages(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok().filter(|p| *p > 0)
}

fn pages_from_json(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|p| u32::try_from(p).ok())
            .filter(|p| *p > 0),
        Value::String(s) => parse_pages(s),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
