//! Error types for lookup sources

use thiserror::Error;

/// Result type for lookup source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors from a single metadata source.
///
/// "No record for this code" is not an error; sources return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Transport failure or non-success HTTP status
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response body could not be understood
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Code cannot be sent to this source
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Source returned HTTP 429
    #[error("Rate limited")]
    RateLimited,

    /// Source cannot be used (no HTTP client, etc.)
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
