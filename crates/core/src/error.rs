//! Error types and recovery strategies for ShelfScan
//!
//! Every crate keeps its own error enum; this module is the shared vocabulary
//! they map into when a caller needs to decide what to do next. Errors fall
//! into three severity tiers:
//! - **Recoverable**: worth trying again later (a metadata service is down, etc.)
//! - **Degraded**: feature unavailable but the catalog keeps working (remote store offline, etc.)
//! - **Fatal**: requires user intervention (corrupted local catalog, bad input, etc.)
//!
//! Note that "no metadata found" and "JAN did not convert" are not errors at all.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// The service may be back shortly
    RetryLater,
    /// Continue on the local catalog until the remote store is back
    UseLocalCache,
    /// Sign in again
    Reauthenticate,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryLater => write!(f, "Try again later"),
            Self::UseLocalCache => write!(f, "Using local catalog"),
            Self::Reauthenticate => write!(f, "Sign-in required"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be automatically recovered from
    Recoverable,
    /// Feature degraded but app can continue
    Degraded,
    /// Critical error requiring user action
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for ShelfScan
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid URL provided
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    // ===== Lookup Source Errors =====
    /// Remote service unreachable or refusing requests
    #[error("Service '{provider}' unavailable: {reason}")]
    SourceUnavailable { provider: String, reason: String },

    /// Invalid response from a remote service
    #[error("Invalid response from {provider}: {details}")]
    InvalidSourceResponse { provider: String, details: String },

    // ===== Storage Errors =====
    /// Catalog or token storage operation failed
    #[error("Storage error: {message}")]
    StorageError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote store unreachable; the local catalog is being used
    #[error("Remote store unavailable: {reason}")]
    RemoteStoreUnavailable { reason: String },

    /// Local catalog file cannot be parsed
    #[error("Catalog corrupted at {path}: {reason}")]
    CatalogCorrupted { path: PathBuf, reason: String },

    /// Record not found
    #[error("Record not found: {entity} with {identifier}")]
    RecordNotFound { entity: String, identifier: String },

    // ===== Metadata Errors =====
    /// Invalid metadata value
    #[error("Invalid metadata: {field} has invalid value '{value}'")]
    InvalidMetadata { field: String, value: String },

    // ===== Import/Export Errors =====
    /// Import file could not be read
    #[error("Import failed: {reason}")]
    ImportFailed { reason: String },

    /// Export could not be produced
    #[error("Export failed: {reason}")]
    ExportFailed { reason: String },

    // ===== File System Errors =====
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    // ===== Authentication Errors =====
    /// Sign-in is required before the operation can proceed
    #[error("Authentication required: {provider}")]
    AuthenticationRequired { provider: String },

    /// Authentication failed
    #[error("Authentication failed for {provider}: {reason}")]
    AuthenticationFailed { provider: String, reason: String },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SourceUnavailable { .. } => ErrorSeverity::Recoverable,

            Self::InvalidSourceResponse { .. }
            | Self::RemoteStoreUnavailable { .. }
            | Self::AuthenticationRequired { .. }
            | Self::AuthenticationFailed { .. } => ErrorSeverity::Degraded,

            _ => ErrorSeverity::Fatal,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::SourceUnavailable { .. } | Self::InvalidSourceResponse { .. } => {
                RecoveryAction::RetryLater
            }

            Self::RemoteStoreUnavailable { .. } => RecoveryAction::UseLocalCache,

            Self::AuthenticationRequired { .. } | Self::AuthenticationFailed { .. } => {
                RecoveryAction::Reauthenticate
            }

            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl { .. } => "The link provided is not valid.".to_string(),

            Self::SourceUnavailable { provider, .. } => {
                format!("{} is not reachable right now.", provider)
            }
            Self::InvalidSourceResponse { provider, .. } => {
                format!("{} returned data that could not be read.", provider)
            }

            Self::StorageError { .. } => {
                "The catalog could not be saved. Please try again.".to_string()
            }
            Self::RemoteStoreUnavailable { .. } => {
                "Working offline. Changes are kept locally.".to_string()
            }
            Self::CatalogCorrupted { .. } => {
                "The local catalog file is damaged. Restore it from an export.".to_string()
            }
            Self::RecordNotFound { .. } => "The requested book was not found.".to_string(),

            Self::InvalidMetadata { field, .. } => {
                format!("The value entered for {} is not valid.", field)
            }

            Self::ImportFailed { reason } => format!("Import failed: {}", reason),
            Self::ExportFailed { reason } => format!("Export failed: {}", reason),

            Self::FileNotFound { .. } => {
                "The file was not found. It may have been moved or deleted.".to_string()
            }
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),

            Self::AuthenticationRequired { .. } => "Please sign in to continue.".to_string(),
            Self::AuthenticationFailed { .. } => {
                "Sign-in failed. Please sign in again.".to_string()
            }

            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
        }
    }
}
