//! Cloud text recognition configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Feature types the recognition endpoint accepts for book covers
pub const FEATURE_TYPES: [&str; 2] = ["TEXT_DETECTION", "DOCUMENT_TEXT_DETECTION"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScannerConfig {
    /// `images:annotate` endpoint
    pub vision_endpoint: String,

    /// Requested feature type
    pub feature_type: String,

    /// Maximum annotations returned per image
    pub max_results: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            vision_endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            feature_type: FEATURE_TYPES[0].to_string(),
            max_results: 10,
        }
    }
}

impl ConfigSection for ScannerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::is_http_url(&self.vision_endpoint, "scanner.vision_endpoint"),
            Validator::one_of(
                &self.feature_type.as_str(),
                &FEATURE_TYPES,
                "scanner.feature_type",
            ),
            Validator::in_range(self.max_results, 1, 50, "scanner.max_results"),
        ];

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.vision_endpoint = other.vision_endpoint;
        self.feature_type = other.feature_type;
        self.max_results = other.max_results;
    }

    fn section_name(&self) -> &'static str {
        "scanner"
    }
}
