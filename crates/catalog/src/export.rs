//! Catalog export

use crate::{CatalogError, CatalogResult, DataFormat};
use chrono::{DateTime, Utc};
use shelfscan_core::CatalogBook;

/// Column headings of the CSV export, in order
pub const CSV_HEADERS: [&str; 10] = [
    "タイトル",
    "著者",
    "ISBN",
    "出版社",
    "出版日",
    "ページ数",
    "カテゴリー",
    "説明",
    "登録日",
    "更新日",
];

/// Spreadsheet applications need this to read the file as UTF-8
const UTF8_BOM: &str = "\u{FEFF}";

pub fn export(books: &[CatalogBook], format: DataFormat) -> CatalogResult<String> {
    match format {
        DataFormat::Json => export_json(books),
        DataFormat::Csv => export_csv(books),
    }
}

/// Pretty-printed JSON array of every field
pub fn export_json(books: &[CatalogBook]) -> CatalogResult<String> {
    Ok(serde_json::to_string_pretty(books)?)
}

/// CSV with a BOM and [`CSV_HEADERS`]; an empty catalog is an error
pub fn export_csv(books: &[CatalogBook]) -> CatalogResult<String> {
    if books.is_empty() {
        return Err(CatalogError::Export("there are no books to export".to_string()));
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.as_bytes().to_vec());

    let csv_error = |e: csv::Error| CatalogError::Export(e.to_string());

    writer.write_record(CSV_HEADERS).map_err(csv_error)?;
    for book in books {
        let record = &book.record;
        let pages = record.pages.map(|p| p.to_string()).unwrap_or_default();
        let added = format_date(&book.added_at);
        let updated = book.updated_at.as_ref().map(format_date).unwrap_or_default();

        writer
            .write_record([
                text(&record.title),
                text(&record.author),
                text(&record.isbn),
                text(&record.publisher),
                text(&record.publish_date),
                pages.as_str(),
                text(&record.category),
                text(&record.description),
                added.as_str(),
                updated.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CatalogError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CatalogError::Export(e.to_string()))
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// `YYYY/M/D` in UTC
fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y/%-m/%-d").to_string()
}
