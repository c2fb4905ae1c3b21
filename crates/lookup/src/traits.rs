//! Metadata source trait

use crate::SourceResult;
use shelfscan_core::BookRecord;

/// An external catalog that can be asked about one code
pub trait MetadataSource: Send + Sync {
    /// Looks up a code. `Ok(None)` means the catalog has no record.
    fn lookup(&self, code: &str) -> SourceResult<Option<BookRecord>>;

    /// Get metadata about the source
    fn metadata(&self) -> SourceMetadata;

    /// Check if source is available
    fn is_available(&self) -> bool;
}

/// Source metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: String,
    pub description: String,
    pub base_url: String,
    pub requires_auth: bool,
}
