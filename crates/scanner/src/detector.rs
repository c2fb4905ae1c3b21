//! Text detection seam

use crate::{ScanResult, VisionClient};
use shelfscan_auth::AccessTokenSource;

/// Turns an image into recognized text
pub trait TextDetector {
    /// `Ok(None)` when no text was found
    fn detect_text(&mut self, image_base64: &str) -> ScanResult<Option<String>>;
}

/// Cloud recognition authorized by an OAuth token source
pub struct CloudTextDetector<T> {
    vision: VisionClient,
    tokens: T,
}

impl<T: AccessTokenSource> CloudTextDetector<T> {
    pub fn new(vision: VisionClient, tokens: T) -> Self {
        Self { vision, tokens }
    }

    pub fn token_source(&self) -> &T {
        &self.tokens
    }
}

impl<T: AccessTokenSource> TextDetector for CloudTextDetector<T> {
    fn detect_text(&mut self, image_base64: &str) -> ScanResult<Option<String>> {
        let token = self.tokens.bearer_token()?;
        self.vision.annotate(image_base64, &token)
    }
}

impl<D: TextDetector + ?Sized> TextDetector for Box<D> {
    fn detect_text(&mut self, image_base64: &str) -> ScanResult<Option<String>> {
        (**self).detect_text(image_base64)
    }
}
