//! OAuth 2.0 sign-in for ShelfScan
//!
//! [`OAuthClient`] owns the token lifecycle as an explicit state machine:
//!
//! ```text
//! Unauthenticated --exchange_code--> Valid --time passes--> Expired
//!        ^                             ^                       |
//!        |                             +----finish_refresh-----+--begin_refresh--> Refreshing
//!        +----------------- logout / refresh failure ---------------------------------+
//! ```
//!
//! Storage, clock and token endpoint are injected so the whole lifecycle can
//! be driven deterministically in tests.

mod client;
mod clock;
mod endpoint;
mod error;
mod storage;
mod token;

pub use client::{AccessTokenSource, AuthState, OAuthClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use endpoint::{HttpTokenEndpoint, TokenEndpoint};
pub use error::{AuthError, AuthResult};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use token::{TokenResponse, TokenSet};

/// Client wired for real use: file storage, system clock, HTTP endpoint
pub type DefaultOAuthClient = OAuthClient<FileTokenStorage, SystemClock, HttpTokenEndpoint>;
