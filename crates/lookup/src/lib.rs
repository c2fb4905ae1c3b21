//! Book metadata lookup for ShelfScan
//!
//! Each external catalog is a [`MetadataSource`]. The [`LookupExecutor`] runs a
//! [`LookupPlan`](shelfscan_core::LookupPlan) against them strictly in order,
//! stopping at the first record. A failing source never aborts the plan; it is
//! reported and the next attempt runs.

mod error;
mod executor;
mod google_books;
mod http;
mod ndl;
mod openbd;
mod traits;

pub use error::{SourceError, SourceResult};
pub use executor::{AttemptReport, AttemptStatus, LookupExecutor, LookupOutcome};
pub use google_books::{parse_google_books, GoogleBooksSource};
pub use ndl::{parse_ndl, NdlSource};
pub use openbd::{parse_openbd, OpenBdSource};
pub use traits::{MetadataSource, SourceMetadata};
