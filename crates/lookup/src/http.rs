//! Shared blocking HTTP plumbing for the catalog sources

use crate::{SourceError, SourceResult};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use std::time::Duration;

/// Builds the client every source uses.
///
/// Returns `None` when the TLS backend cannot be initialized; the source then
/// reports itself unavailable instead of failing at construction.
pub(crate) fn build_client(timeout_secs: u64) -> Option<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION"),
        ))
        .build()
        .map_err(|e| log::warn!("HTTP client unavailable: {}", e))
        .ok()
}

pub(crate) fn require_client(client: &Option<Client>) -> SourceResult<&Client> {
    client
        .as_ref()
        .ok_or_else(|| SourceError::Unavailable("HTTP client not available".to_string()))
}

/// Sends a GET and returns the body of a successful response
pub(crate) fn get_text(client: &Client, url: &str, query: &[(&str, &str)]) -> SourceResult<String> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(|e| SourceError::NetworkError(format!("Request failed: {}", e)))?;

    check_status(&response)?;

    response
        .text()
        .map_err(|e| SourceError::NetworkError(format!("Failed to read body: {}", e)))
}

fn check_status(response: &Response) -> SourceResult<()> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited);
    }
    if !status.is_success() {
        return Err(SourceError::NetworkError(format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )));
    }
    Ok(())
}

/// Turns an empty or whitespace-only string into `None`
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(" a ".to_string())), Some("a".to_string()));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_require_client_without_client() {
        let err = require_client(&None).unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
