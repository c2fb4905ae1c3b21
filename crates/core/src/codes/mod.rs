//! Book barcode handling
//!
//! - `checksum`: ISBN-13 check digit computation and validation
//! - `classify`: tagging a scanned code as ISBN-13, ISBN-10, Japanese JAN or unknown
//! - `jan`: recovering an ISBN-13 from a Japanese book JAN
//! - `extract`: pulling candidate codes out of recognized text

mod checksum;
mod classify;
mod extract;
mod jan;

pub use checksum::{compute_check_digit, is_valid_isbn13};
pub use classify::{classify, normalize_code, CodeKind, ISBN_PREFIXES, JAN_PREFIXES};
pub use extract::{extract_codes, resolve_detected, DetectedCode, DetectedKind};
pub use jan::{convert_jan_to_isbn, jan_hypotheses, Hypothesis, HypothesisRule};
