//! Login flow and resource call failures

use eventhorizon_common::auth::{ExchangeError, PkceError, SessionError};
use eventhorizon_domain::{ApiError, HorizonError, ResponseBody};
use thiserror::Error;

/// Error type for every `AuthFlowController` and `EventsService` operation
#[derive(Debug, Error)]
pub enum FlowError {
    /// PKCE or state generation failed; no redirect was produced
    #[error(transparent)]
    Entropy(#[from] PkceError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The authorization server redirected back with `error=...`
    #[error("authorization denied: {error}{}", .description.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    AuthorizationDenied { error: String, description: Option<String> },

    #[error("callback carried no authorization code")]
    MissingCode,

    /// Callback `state` differs from the one issued at login start
    #[error("callback state does not match the pending login")]
    StateMismatch,

    /// No pending login for this session (expired, or never started)
    #[error("no code verifier found for this session; start the login again")]
    MissingVerifier,

    /// The same authorization code was delivered twice
    #[error("authorization code has already been used")]
    CodeAlreadyConsumed,

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("not authenticated")]
    NotAuthenticated,

    /// The resource API answered 401; the stored token was dropped
    #[error("session expired: access token rejected by the API")]
    SessionExpired { body: ResponseBody },

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The API answered with a status the operation does not accept
    #[error("API request rejected with HTTP {status}")]
    Rejected { status: u16, body: ResponseBody },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl FlowError {
    /// Whether the user has to begin a new login to recover
    #[must_use]
    pub const fn requires_restart(&self) -> bool {
        matches!(
            self,
            Self::Entropy(_)
                | Self::AuthorizationDenied { .. }
                | Self::MissingCode
                | Self::StateMismatch
                | Self::MissingVerifier
                | Self::Exchange(_)
                | Self::NotAuthenticated
                | Self::SessionExpired { .. }
        )
    }

    /// HTTP status attached to the failure, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Exchange(err) => err.status(),
            Self::SessionExpired { .. } => Some(401),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HorizonError> for FlowError {
    fn from(err: HorizonError) -> Self {
        match err {
            HorizonError::Decode(msg) => Self::Decode(msg),
            HorizonError::Config(msg) | HorizonError::InvalidInput(msg) | HorizonError::Internal(msg) => {
                Self::InvalidInput(msg)
            }
        }
    }
}
