//! Scanner errors

use shelfscan_auth::AuthError;
use shelfscan_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

pub type ScanResult<T> = Result<T, ScanError>;

const PROVIDER: &str = "Cloud Vision";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Text recognition request failed: {0}")]
    Request(String),

    #[error("Text recognition returned HTTP {status}")]
    Http { status: u16 },

    #[error("Text recognition service error: {0}")]
    Service(String),

    #[error("Unexpected text recognition response: {0}")]
    InvalidResponse(String),

    #[error("Image is empty")]
    EmptyImage,

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Auth(e) => e.into(),
            ScanError::Request(_) | ScanError::Http { .. } => AppError::SourceUnavailable {
                provider: PROVIDER.to_string(),
                reason: err.to_string(),
            },
            ScanError::Service(details) | ScanError::InvalidResponse(details) => {
                AppError::InvalidSourceResponse {
                    provider: PROVIDER.to_string(),
                    details,
                }
            }
            ScanError::EmptyImage => AppError::InvalidArgument {
                argument: "image".to_string(),
                reason: "no image data".to_string(),
            },
            ScanError::ImageRead { path, source } => match source.kind() {
                std::io::ErrorKind::NotFound => AppError::FileNotFound { path },
                _ => AppError::IoError {
                    message: format!("reading {}", path.display()),
                    source,
                },
            },
        }
    }
}
