//! Port interfaces for the login flow
//!
//! These traits define the boundaries between the flow logic and the HTTP
//! adapters in `eventhorizon-infra`.

use std::fmt;

use async_trait::async_trait;
use eventhorizon_common::auth::{generate_state, AccessToken, ExchangeError, PkceError, PkcePair};
use eventhorizon_domain::{ApiError, ApiMethod, ApiResponse};
use serde_json::Value;

/// Everything the token endpoint needs to redeem one authorization code
#[derive(Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub code: String,
    pub verifier: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_endpoint: String,
}

impl fmt::Debug for ExchangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeRequest")
            .field("code", &"<redacted>")
            .field("verifier", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_endpoint", &self.token_endpoint)
            .finish()
    }
}

/// Redeems an authorization code plus verifier for an access token
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// One POST to the token endpoint, no retries
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AccessToken, ExchangeError>;
}

/// Bearer-authenticated access to the resource API
///
/// Any HTTP status is a successful call at this level; only transport and
/// encoding failures are errors.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn call(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<&Value>,
        token: &AccessToken,
    ) -> Result<ApiResponse, ApiError>;
}

/// Source of PKCE pairs and CSRF state values
pub trait Entropy: Send + Sync {
    /// # Errors
    /// `PkceError::EntropyUnavailable` when no secure randomness is available
    fn pkce_pair(&self) -> Result<PkcePair, PkceError>;

    /// # Errors
    /// `PkceError::EntropyUnavailable` when no secure randomness is available
    fn state(&self) -> Result<String, PkceError>;
}

/// Operating system random source
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn pkce_pair(&self) -> Result<PkcePair, PkceError> {
        PkcePair::generate()
    }

    fn state(&self) -> Result<String, PkceError> {
        generate_state()
    }
}
