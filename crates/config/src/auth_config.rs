//! OAuth client configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// OAuth 2.0 client registration used for cloud text recognition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,

    /// Tokens are treated as expired this many seconds early
    pub expiry_margin_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080/auth/callback".to_string(),
            scope: "https://www.googleapis.com/auth/cloud-platform".to_string(),
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            expiry_margin_secs: 60,
        }
    }
}

impl AuthConfig {
    /// True once a client id has been configured
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty()
    }
}

impl ConfigSection for AuthConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::is_http_url(&self.redirect_uri, "auth.redirect_uri"),
            Validator::is_http_url(&self.authorization_endpoint, "auth.authorization_endpoint"),
            Validator::is_http_url(&self.token_endpoint, "auth.token_endpoint"),
            Validator::not_empty(&self.scope, "auth.scope"),
            Validator::in_range(self.expiry_margin_secs, 0, 3600, "auth.expiry_margin_secs"),
        ];

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.client_id = other.client_id;
        self.client_secret = other.client_secret;
        self.redirect_uri = other.redirect_uri;
        self.scope = other.scope;
        self.authorization_endpoint = other.authorization_endpoint;
        self.token_endpoint = other.token_endpoint;
        self.expiry_margin_secs = other.expiry_margin_secs;
    }

    fn section_name(&self) -> &'static str {
        "auth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_but_unconfigured() {
        let config = AuthConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.is_configured());
    }

    #[test]
    fn test_margin_bound() {
        let mut config = AuthConfig::default();
        config.expiry_margin_secs = 7200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_scope_rejected() {
        let mut config = AuthConfig::default();
        config.scope = String::new();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors[0].field, "auth.scope");
    }
}
