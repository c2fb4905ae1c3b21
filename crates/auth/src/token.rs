//! Token data

use crate::{AuthError, AuthResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens as persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// True while `now` is before expiry minus `margin`
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        !self.access_token.is_empty()
            && self
                .expires_at
                .checked_sub_signed(margin)
                .is_some_and(|deadline| now < deadline)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Builds a token set from an endpoint response received at `now`.
    ///
    /// A refresh response often omits the refresh token; `previous` keeps the
    /// one already held in that case. An `expires_in` that cannot be
    /// represented as a timestamp is rejected.
    pub fn from_response(
        response: TokenResponse,
        now: DateTime<Utc>,
        previous: Option<&TokenSet>,
    ) -> AuthResult<Self> {
        let expires_at = Duration::try_seconds(response.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::InvalidResponse(format!(
                    "expires_in out of range: {}",
                    response.expires_in
                ))
            })?;

        let refresh_token = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| previous.and_then(|p| p.refresh_token.clone()));

        Ok(Self {
            access_token: response.access_token,
            refresh_token,
            expires_at,
        })
    }
}

/// Body of a successful token endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}
