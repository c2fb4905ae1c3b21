//! Photo to ISBN

use crate::{ScanError, ScanResult, TextDetector};
use base64::{engine::general_purpose::STANDARD, Engine};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use shelfscan_core::{extract_codes, resolve_detected, DetectedCode};
use std::fs;
use std::path::Path;

static DATA_URL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(?:png|jpeg|jpg);base64,").expect("valid data URL pattern")
});

/// What a scan found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Full recognized text
    pub text: Option<String>,
    /// Every code found in the text, in extraction order
    pub codes: Vec<DetectedCode>,
    /// First code usable as an ISBN
    pub isbn: Option<String>,
}

impl ScanReport {
    pub fn found(&self) -> bool {
        self.isbn.is_some()
    }

    fn from_text(text: Option<String>) -> Self {
        let codes = text.as_deref().map(extract_codes).unwrap_or_default();
        let isbn = resolve_detected(&codes);
        Self { text, codes, isbn }
    }
}

/// Removes a `data:image/(png|jpeg|jpg);base64,` prefix if present
pub fn strip_data_url(data: &str) -> &str {
    match DATA_URL_PREFIX.find(data) {
        Some(m) => &data[m.end()..],
        None => data,
    }
}

pub struct BarcodeScanner<D> {
    detector: D,
}

impl<D: TextDetector> BarcodeScanner<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Scans raw image bytes (PNG or JPEG)
    pub fn scan_image(&mut self, bytes: &[u8]) -> ScanResult<ScanReport> {
        if bytes.is_empty() {
            return Err(ScanError::EmptyImage);
        }
        let encoded = STANDARD.encode(bytes);
        self.scan_base64(&encoded)
    }

    /// Scans an image given as a data URL or bare base64
    pub fn scan_data_url(&mut self, data: &str) -> ScanResult<ScanReport> {
        let encoded = strip_data_url(data.trim());
        if encoded.is_empty() {
            return Err(ScanError::EmptyImage);
        }
        self.scan_base64(encoded)
    }

    pub fn scan_file(&mut self, path: &Path) -> ScanResult<ScanReport> {
        let bytes = fs::read(path).map_err(|source| ScanError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.scan_image(&bytes)
    }

    fn scan_base64(&mut self, encoded: &str) -> ScanResult<ScanReport> {
        let text = self.detector.detect_text(encoded)?;
        let report = ScanReport::from_text(text);

        match &report.isbn {
            Some(isbn) => log::info!("Scan found ISBN {}", isbn),
            None if report.text.is_none() => log::info!("Scan found no text"),
            None => log::info!(
                "Scan found no usable code among {} candidate(s)",
                report.codes.len()
            ),
        }
        Ok(report)
    }
}
