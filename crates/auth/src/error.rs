//! Error types for authentication

use shelfscan_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No client id configured
    #[error("OAuth client ID not configured")]
    NotConfigured,

    /// No usable token and no way to refresh; the user must sign in
    #[error("Sign-in required")]
    ReauthenticationRequired,

    /// Callback `state` does not match the pending authorization
    #[error("Invalid state parameter")]
    StateMismatch,

    /// A code arrived without a preceding authorization request
    #[error("No authorization in progress")]
    NoPendingAuthorization,

    /// A refresh is already running
    #[error("Token refresh already in progress")]
    RefreshInProgress,

    /// `finish_refresh` without `begin_refresh`
    #[error("No token refresh in progress")]
    NotRefreshing,

    /// The token endpoint rejected the request or could not be reached
    #[error("Token endpoint error: {0}")]
    Endpoint(String),

    /// Token endpoint answered with something unusable
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Token file could not be read or written
    #[error("Token storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Token file exists but does not parse
    #[error("Token storage corrupted at {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("Invalid authorization endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        const PROVIDER: &str = "Google";
        match err {
            AuthError::ReauthenticationRequired | AuthError::NotConfigured => {
                AppError::AuthenticationRequired {
                    provider: PROVIDER.to_string(),
                }
            }
            AuthError::Storage { path, source } => AppError::StorageError {
                message: format!("token file {}", path.display()),
                source: Some(Box::new(source)),
            },
            AuthError::InvalidUrl(e) => AppError::InvalidUrl { url: e.to_string() },
            other => AppError::AuthenticationFailed {
                provider: PROVIDER.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
