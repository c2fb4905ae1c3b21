//! Token lifecycle state machine

use crate::{AuthError, AuthResult, Clock, TokenEndpoint, TokenResponse, TokenSet, TokenStorage};
use chrono::Duration;
use shelfscan_config::AuthConfig;
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Where the client is in the token lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No tokens held
    Unauthenticated,
    /// Access token usable now
    Valid,
    /// Access token past its expiry margin
    Expired,
    /// A refresh has been started and not finished
    Refreshing,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "signed out"),
            Self::Valid => write!(f, "signed in"),
            Self::Expired => write!(f, "token expired"),
            Self::Refreshing => write!(f, "refreshing"),
        }
    }
}

/// Anything that can hand out a bearer token for an API call
pub trait AccessTokenSource {
    fn bearer_token(&mut self) -> AuthResult<String>;
}

/// OAuth 2.0 authorization-code client.
///
/// Construct one per application; nothing is global. Call [`load`](Self::load)
/// once to pick up tokens persisted by a previous run.
pub struct OAuthClient<S, C, E> {
    config: AuthConfig,
    storage: S,
    clock: C,
    endpoint: E,
    tokens: Option<TokenSet>,
    pending_state: Option<String>,
    refreshing: bool,
}

impl<S, C, E> OAuthClient<S, C, E>
where
    S: TokenStorage,
    C: Clock,
    E: TokenEndpoint,
{
    pub fn new(config: AuthConfig, storage: S, clock: C, endpoint: E) -> Self {
        Self {
            config,
            storage,
            clock,
            endpoint,
            tokens: None,
            pending_state: None,
            refreshing: false,
        }
    }

    /// Reads persisted tokens.
    ///
    /// A corrupted token file is cleared and the client starts signed out.
    pub fn load(&mut self) -> AuthState {
        self.tokens = match self.storage.load() {
            Ok(tokens) => tokens,
            Err(AuthError::Corrupted { path, reason }) => {
                log::warn!(
                    "Discarding corrupted tokens at {}: {}",
                    path.display(),
                    reason
                );
                if let Err(e) = self.storage.clear() {
                    log::warn!("Failed to clear token storage: {}", e);
                }
                None
            }
            Err(e) => {
                log::warn!("Failed to load tokens: {}", e);
                None
            }
        };
        self.state()
    }

    pub fn state(&self) -> AuthState {
        if self.refreshing {
            return AuthState::Refreshing;
        }

        match &self.tokens {
            None => AuthState::Unauthenticated,
            Some(tokens) if tokens.is_valid_at(self.clock.now(), self.margin()) => {
                AuthState::Valid
            }
            Some(_) => AuthState::Expired,
        }
    }

    pub fn tokens(&self) -> Option<&TokenSet> {
        self.tokens.as_ref()
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Builds the consent URL and remembers a fresh `state` for the callback
    pub fn authorization_url(&mut self) -> AuthResult<String> {
        self.require_configured()?;

        let state = Uuid::new_v4().simple().to_string();
        let mut url = Url::parse(&self.config.authorization_endpoint)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", &state);

        self.pending_state = Some(state);
        Ok(url.to_string())
    }

    /// Trades an authorization code for tokens.
    ///
    /// `state` must match the one issued by the last
    /// [`authorization_url`](Self::authorization_url) call; it is consumed
    /// whether or not it matches.
    pub fn exchange_code(&mut self, code: &str, state: &str) -> AuthResult<String> {
        let expected = self
            .pending_state
            .take()
            .ok_or(AuthError::NoPendingAuthorization)?;
        if expected != state {
            return Err(AuthError::StateMismatch);
        }

        let response = self.endpoint.exchange_code(code)?;
        self.store(response)
    }

    /// Returns a usable access token, refreshing it when expired
    pub fn access_token(&mut self) -> AuthResult<String> {
        self.require_configured()?;

        match self.state() {
            AuthState::Valid => self
                .tokens
                .as_ref()
                .map(|t| t.access_token.clone())
                .ok_or(AuthError::ReauthenticationRequired),
            AuthState::Expired if self.tokens.as_ref().is_some_and(TokenSet::can_refresh) => {
                let refresh_token = self.begin_refresh()?;
                let result = self.endpoint.refresh(&refresh_token);
                self.finish_refresh(result)
            }
            AuthState::Refreshing => Err(AuthError::RefreshInProgress),
            AuthState::Expired | AuthState::Unauthenticated => {
                Err(AuthError::ReauthenticationRequired)
            }
        }
    }

    /// Enters `Refreshing` and returns the refresh token to send
    pub fn begin_refresh(&mut self) -> AuthResult<String> {
        if self.refreshing {
            return Err(AuthError::RefreshInProgress);
        }

        let refresh_token = self
            .tokens
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::ReauthenticationRequired)?;

        log::debug!("Refreshing access token");
        self.refreshing = true;
        Ok(refresh_token)
    }

    /// Leaves `Refreshing` with the endpoint's answer.
    ///
    /// On failure every token is dropped, so the next call requires sign-in.
    pub fn finish_refresh(&mut self, result: AuthResult<TokenResponse>) -> AuthResult<String> {
        if !self.refreshing {
            return Err(AuthError::NotRefreshing);
        }
        self.refreshing = false;

        match result {
            Ok(response) => self.store(response),
            Err(e) => {
                log::warn!("Token refresh failed: {}", e);
                self.clear_tokens();
                Err(e)
            }
        }
    }

    /// Forgets every token, persisted or not
    pub fn logout(&mut self) -> AuthResult<()> {
        self.tokens = None;
        self.pending_state = None;
        self.refreshing = false;
        self.storage.clear()
    }

    fn store(&mut self, response: TokenResponse) -> AuthResult<String> {
        if response.access_token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "empty access_token".to_string(),
            ));
        }

        let tokens = TokenSet::from_response(response, self.clock.now(), self.tokens.as_ref())?;
        self.storage.save(&tokens)?;

        let access_token = tokens.access_token.clone();
        self.tokens = Some(tokens);
        log::info!("Signed in; token valid until {}", self.expiry_display());
        Ok(access_token)
    }

    fn clear_tokens(&mut self) {
        self.tokens = None;
        if let Err(e) = self.storage.clear() {
            log::warn!("Failed to clear token storage: {}", e);
        }
    }

    fn require_configured(&self) -> AuthResult<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(AuthError::NotConfigured)
        }
    }

    fn margin(&self) -> Duration {
        i64::try_from(self.config.expiry_margin_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    fn expiry_display(&self) -> String {
        self.tokens
            .as_ref()
            .map(|t| t.expires_at.to_rfc3339())
            .unwrap_or_default()
    }
}

impl<S, C, E> AccessTokenSource for OAuthClient<S, C, E>
where
    S: TokenStorage,
    C: Clock,
    E: TokenEndpoint,
{
    fn bearer_token(&mut self) -> AuthResult<String> {
        self.access_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, MemoryTokenStorage};
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeEndpoint {
        replies: Mutex<VecDeque<AuthResult<TokenResponse>>>,
        refresh_calls: Mutex<Vec<String>>,
    }

    impl FakeEndpoint {
        fn reply(&self, reply: AuthResult<TokenResponse>) {
            self.replies.lock().unwrap().push_back(reply);
        }

        fn next(&self) -> AuthResult<TokenResponse> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AuthError::Endpoint("no reply queued".to_string())))
        }
    }

    impl TokenEndpoint for FakeEndpoint {
        fn exchange_code(&self, _code: &str) -> AuthResult<TokenResponse> {
            self.next()
        }

        fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
            self.refresh_calls
                .lock()
                .unwrap()
                .push(refresh_token.to_string());
            self.next()
        }
    }

    fn token(access: &str, refresh: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_in: 3600,
        }
    }

    type TestClient = OAuthClient<Arc<MemoryTokenStorage>, Arc<ManualClock>, Arc<FakeEndpoint>>;

    struct Harness {
        client: TestClient,
        storage: Arc<MemoryTokenStorage>,
        clock: Arc<ManualClock>,
        endpoint: Arc<FakeEndpoint>,
    }

    fn harness() -> Harness {
        let config = AuthConfig {
            client_id: "client-123".to_string(),
            ..AuthConfig::default()
        };
        let storage = Arc::new(MemoryTokenStorage::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let endpoint = Arc::new(FakeEndpoint::default());
        let client = OAuthClient::new(
            config,
            Arc::clone(&storage),
            Arc::clone(&clock),
            Arc::clone(&endpoint),
        );
        Harness {
            client,
            storage,
            clock,
            endpoint,
        }
    }

    fn sign_in(h: &mut Harness, refresh: Option<&str>) {
        h.endpoint.reply(Ok(token("access-1", refresh)));
        let url = h.client.authorization_url().expect("Should build URL");
        let state = Url::parse(&url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .expect("state param");
        h.client.exchange_code("code", &state).expect("Should exchange");
    }

    #[test]
    fn test_starts_unauthenticated() {
        let mut h = harness();
        assert_eq!(h.client.load(), AuthState::Unauthenticated);
        assert!(matches!(
            h.client.access_token(),
            Err(AuthError::ReauthenticationRequired)
        ));
    }

    #[test]
    fn test_authorization_url_parameters() {
        let mut h = harness();
        let url = Url::parse(&h.client.authorization_url().unwrap()).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("client_id"), Some("client-123"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("prompt"), Some("consent"));
        assert!(get("state").is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn test_unconfigured_client() {
        let mut client = OAuthClient::new(
            AuthConfig::default(),
            MemoryTokenStorage::new(),
            ManualClock::new(Utc::now()),
            Arc::new(FakeEndpoint::default()),
        );
        assert!(matches!(
            client.authorization_url(),
            Err(AuthError::NotConfigured)
        ));
        assert!(matches!(client.access_token(), Err(AuthError::NotConfigured)));
    }

    #[test]
    fn test_exchange_persists_tokens() {
        let mut h = harness();
        sign_in(&mut h, Some("refresh-1"));

        assert_eq!(h.client.state(), AuthState::Valid);
        assert_eq!(h.client.access_token().unwrap(), "access-1");
        assert_eq!(
            h.storage.snapshot().unwrap().refresh_token.as_deref(),
            Some("refresh-1")
        );
    }

    #[test]
    fn test_state_mismatch_rejected_and_consumed() {
        let mut h = harness();
        h.client.authorization_url().unwrap();

        assert!(matches!(
            h.client.exchange_code("code", "forged"),
            Err(AuthError::StateMismatch)
        ));
        assert!(matches!(
            h.client.exchange_code("code", "forged"),
            Err(AuthError::NoPendingAuthorization)
        ));
        assert_eq!(h.client.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_expiry_margin() {
        let mut h = harness();
        sign_in(&mut h, None);

        h.clock.advance(Duration::seconds(3539));
        assert_eq!(h.client.state(), AuthState::Valid);

        h.clock.advance(Duration::seconds(1));
        assert_eq!(h.client.state(), AuthState::Expired);
    }

    #[test]
    fn test_expired_refreshes_transparently() {
        let mut h = harness();
        sign_in(&mut h, Some("refresh-1"));
        h.clock.advance(Duration::hours(2));

        h.endpoint.reply(Ok(token("access-2", None)));
        assert_eq!(h.client.access_token().unwrap(), "access-2");
        assert_eq!(h.client.state(), AuthState::Valid);
        assert_eq!(
            *h.endpoint.refresh_calls.lock().unwrap(),
            vec!["refresh-1".to_string()]
        );
        // Refresh token kept when the response omits it
        assert_eq!(
            h.client.tokens().unwrap().refresh_token.as_deref(),
            Some("refresh-1")
        );
    }

    #[test]
    fn test_expired_without_refresh_token_requires_sign_in() {
        let mut h = harness();
        sign_in(&mut h, None);
        h.clock.advance(Duration::hours(2));

        assert!(matches!(
            h.client.access_token(),
            Err(AuthError::ReauthenticationRequired)
        ));
    }

    #[test]
    fn test_refresh_failure_clears_tokens() {
        let mut h = harness();
        sign_in(&mut h, Some("refresh-1"));
        h.clock.advance(Duration::hours(2));

        h.endpoint
            .reply(Err(AuthError::Endpoint("HTTP 400".to_string())));
        assert!(h.client.access_token().is_err());
        assert_eq!(h.client.state(), AuthState::Unauthenticated);
        assert!(h.storage.snapshot().is_none());
    }

    #[test]
    fn test_explicit_refreshing_state() {
        let mut h = harness();
        sign_in(&mut h, Some("refresh-1"));
        h.clock.advance(Duration::hours(2));

        let refresh = h.client.begin_refresh().unwrap();
        assert_eq!(refresh, "refresh-1");
        assert_eq!(h.client.state(), AuthState::Refreshing);
        assert!(matches!(
            h.client.begin_refresh(),
            Err(AuthError::RefreshInProgress)
        ));
        assert!(matches!(
            h.client.access_token(),
            Err(AuthError::RefreshInProgress)
        ));

        h.client
            .finish_refresh(Ok(token("access-3", Some("refresh-2"))))
            .unwrap();
        assert_eq!(h.client.state(), AuthState::Valid);
        assert!(matches!(
            h.client.finish_refresh(Ok(token("x", None))),
            Err(AuthError::NotRefreshing)
        ));
    }

    #[test]
    fn test_load_restores_previous_session() {
        let mut h = harness();
        sign_in(&mut h, Some("refresh-1"));

        let mut restored = OAuthClient::new(
            h.client.config().clone(),
            Arc::clone(&h.storage),
            Arc::clone(&h.clock),
            Arc::clone(&h.endpoint),
        );
        assert_eq!(restored.load(), AuthState::Valid);
        assert_eq!(restored.bearer_token().unwrap(), "access-1");
    }

    #[test]
    fn test_logout() {
        let mut h = harness();
        sign_in(&mut h, Some("refresh-1"));

        h.client.logout().unwrap();
        assert_eq!(h.client.state(), AuthState::Unauthenticated);
        assert!(h.storage.snapshot().is_none());
    }

    #[test]
    fn test_unrepresentable_lifetime_rejected() {
        let mut h = harness();
        h.endpoint.reply(Ok(TokenResponse {
            access_token: "access-1".to_string(),
            refresh_token: None,
            expires_in: i64::MAX,
        }));
        let url = Url::parse(&h.client.authorization_url().unwrap()).unwrap();
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        assert!(matches!(
            h.client.exchange_code("code", &state),
            Err(AuthError::InvalidResponse(_))
        ));
        assert_eq!(h.client.state(), AuthState::Unauthenticated);
        assert!(h.storage.snapshot().is_none());
    }

    #[test]
    fn test_oversized_margin_treats_token_as_expired() {
        let config = AuthConfig {
            client_id: "client-123".to_string(),
            expiry_margin_secs: u64::MAX,
            ..AuthConfig::default()
        };
        let mut client = OAuthClient::new(
            config,
            MemoryTokenStorage::new(),
            ManualClock::new(Utc::now()),
            Arc::new(FakeEndpoint::default()),
        );
        client.tokens = Some(TokenSet {
            access_token: "access-1".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(1),
        });

        assert_eq!(client.state(), AuthState::Expired);
    }
}
