//! ShelfScan core library
//!
//! Pure, synchronous building blocks shared by every other crate:
//! - `codes`: ISBN-13 checksum, code classification, JAN→ISBN conversion
//!   and extraction of codes from recognized text
//! - `plan`: ordering of external metadata lookups for a scanned code
//! - `types`: catalog domain models
//! - `error`: workspace-wide error vocabulary with severity and recovery hints
//!
//! Nothing in this crate performs I/O.

pub mod codes;
pub mod error;
pub mod plan;
pub mod types;

// Re-export commonly used types
pub use codes::{
    classify, compute_check_digit, convert_jan_to_isbn, extract_codes, is_valid_isbn13,
    jan_hypotheses, normalize_code, resolve_detected, CodeKind, DetectedCode, DetectedKind,
    Hypothesis, HypothesisRule,
};
pub use error::{AppError, ErrorSeverity, RecoveryAction};
pub use plan::{resolve_lookup_plan, LookupAttempt, LookupPlan, LookupSource};
pub use types::{BookId, BookRecord, CatalogBook, Validator};
