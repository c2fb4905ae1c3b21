//! Book code recognition from cover photos
//!
//! A photo of the back cover is sent to a cloud text recognition service;
//! ISBN and JAN codes are then pulled out of the recognized text and
//! resolved to a single ISBN.

mod detector;
mod error;
mod scanner;
mod vision;

pub use detector::{CloudTextDetector, TextDetector};
pub use error::{ScanError, ScanResult};
pub use scanner::{strip_data_url, BarcodeScanner, ScanReport};
pub use vision::{build_request, parse_annotation, VisionClient};
