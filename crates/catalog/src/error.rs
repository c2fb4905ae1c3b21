//! Catalog errors

use shelfscan_core::{AppError, BookId};
use std::path::PathBuf;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog file {path} is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("Book not found: {0}")]
    NotFound(BookId),

    #[error("Invalid book: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("Remote store unavailable: {0}")]
    Remote(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    /// True for failures of the remote store itself, which a tiered store
    /// answers by falling back to its local cache
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Io { path, source } => AppError::StorageError {
                message: format!("catalog file {}", path.display()),
                source: Some(Box::new(source)),
            },
            CatalogError::Corrupted { path, reason } => AppError::CatalogCorrupted { path, reason },
            CatalogError::NotFound(id) => AppError::RecordNotFound {
                entity: "book".to_string(),
                identifier: id.to_string(),
            },
            CatalogError::Invalid(errors) => AppError::InvalidMetadata {
                field: "book".to_string(),
                value: errors.join("; "),
            },
            CatalogError::Remote(reason) => AppError::RemoteStoreUnavailable { reason },
            CatalogError::Import(reason) => AppError::ImportFailed { reason },
            CatalogError::Export(reason) => AppError::ExportFailed { reason },
            CatalogError::Serialization(e) => AppError::StorageError {
                message: e.to_string(),
                source: None,
            },
        }
    }
}
