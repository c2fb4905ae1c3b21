//! Cloud Vision `images:annotate` client

use crate::{ScanError, ScanResult};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use shelfscan_config::ScannerConfig;
use std::time::Duration;

/// Sends one image per request and returns the full recognized text
pub struct VisionClient {
    endpoint: String,
    feature_type: String,
    max_results: u32,
    client: Client,
}

impl VisionClient {
    pub fn from_config(config: &ScannerConfig) -> ScanResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))
            .build()
            .map_err(|e| ScanError::Request(format!("HTTP client unavailable: {}", e)))?;

        Ok(Self {
            endpoint: config.vision_endpoint.clone(),
            feature_type: config.feature_type.clone(),
            max_results: config.max_results,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Recognizes text in a base64-encoded image.
    ///
    /// `Ok(None)` means the service answered but found no text.
    pub fn annotate(&self, image_base64: &str, access_token: &str) -> ScanResult<Option<String>> {
        let body = build_request(image_base64, &self.feature_type, self.max_results);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .map_err(|e| ScanError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Text recognition failed with HTTP {}", status.as_u16());
            return Err(ScanError::Http {
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .map_err(|e| ScanError::Request(format!("Failed to read body: {}", e)))?;
        parse_annotation(&text)
    }
}

/// Request body for a single image
pub fn build_request(image_base64: &str, feature_type: &str, max_results: u32) -> Value {
    json!({
        "requests": [{
            "image": { "content": image_base64 },
            "features": [{ "type": feature_type, "maxResults": max_results }]
        }]
    })
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

/// Extracts the full-text annotation (the first one) from a response body
pub fn parse_annotation(body: &str) -> ScanResult<Option<String>> {
    let parsed: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| ScanError::InvalidResponse(e.to_string()))?;

    let Some(first) = parsed.responses.into_iter().next() else {
        return Ok(None);
    };

    if let Some(status) = first.error {
        return Err(ScanError::Service(status.message));
    }

    Ok(first
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description)
        .filter(|d| !d.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = build_request("aGVsbG8=", "TEXT_DETECTION", 10);
        let request = &body["requests"][0];
        assert_eq!(request["image"]["content"], "aGVsbG8=");
        assert_eq!(request["features"][0]["type"], "TEXT_DETECTION");
        assert_eq!(request["features"][0]["maxResults"], 10);
    }

    #[test]
    fn test_parse_first_annotation() {
        let body = r#"{
            "responses": [{
                "textAnnotations": [
                    {"locale": "ja", "description": "ISBN978-4-8222-8394-0\nC0055"},
                    {"description": "ISBN978-4-8222-8394-0"}
                ]
            }]
        }"#;
        assert_eq!(
            parse_annotation(body).unwrap().as_deref(),
            Some("ISBN978-4-8222-8394-0\nC0055")
        );
    }

    #[test]
    fn test_parse_no_text() {
        assert_eq!(parse_annotation(r#"{"responses":[{}]}"#).unwrap(), None);
        assert_eq!(parse_annotation(r#"{"responses":[]}"#).unwrap(), None);
        assert_eq!(parse_annotation("{}").unwrap(), None);
    }

    #[test]
    fn test_parse_service_error() {
        let body = r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#;
        let err = parse_annotation(body).unwrap_err();
        assert!(matches!(err, ScanError::Service(ref m) if m == "Bad image data."));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_annotation("<html>"),
            Err(ScanError::InvalidResponse(_))
        ));
    }
}
