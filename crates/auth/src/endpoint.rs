//! OAuth token endpoint

use crate::{AuthError, AuthResult, TokenResponse};
use reqwest::blocking::Client;
use shelfscan_config::AuthConfig;
use std::time::Duration;

/// The two grant requests the client needs
pub trait TokenEndpoint: Send + Sync {
    /// `grant_type=authorization_code`
    fn exchange_code(&self, code: &str) -> AuthResult<TokenResponse>;

    /// `grant_type=refresh_token`
    fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse>;
}

impl<T: TokenEndpoint + ?Sized> TokenEndpoint for std::sync::Arc<T> {
    fn exchange_code(&self, code: &str) -> AuthResult<TokenResponse> {
        (**self).exchange_code(code)
    }

    fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        (**self).refresh(refresh_token)
    }
}

/// Posts form-encoded grants to the configured token URL
pub struct HttpTokenEndpoint {
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    client: Client,
}

impl HttpTokenEndpoint {
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))
            .build()
            .map_err(|e| AuthError::Endpoint(format!("HTTP client unavailable: {}", e)))?;

        Ok(Self {
            token_url: config.token_endpoint.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            client,
        })
    }

    fn post(&self, form: &[(&str, &str)]) -> AuthResult<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .form(form)
            .send()
            .map_err(|e| AuthError::Endpoint(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Endpoint(format!("HTTP {}", status.as_u16())));
        }

        response
            .json::<TokenResponse>()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

impl TokenEndpoint for HttpTokenEndpoint {
    fn exchange_code(&self, code: &str) -> AuthResult<TokenResponse> {
        self.post(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
    }

    fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        self.post(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
    }
}
