//! OAuth 2.0 token types and token-endpoint failures

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Boxed error used as the `source` of transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Opaque bearer credential issued by the token endpoint
///
/// `Debug` never shows the value; read it through [`AccessToken::expose`].
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token, for the `Authorization` header or session storage
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// OAuth error response from the authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl OAuthErrorBody {
    /// Extract the `error` / `error_description` pair from a decoded body.
    #[must_use]
    pub fn from_value(body: &Value) -> Option<Self> {
        let error = body.get("error")?.as_str()?.to_string();
        let error_description =
            body.get("error_description").and_then(Value::as_str).map(str::to_string);
        Some(Self { error, error_description })
    }
}

impl fmt::Display for OAuthErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthErrorBody {}

/// Failure of the authorization-code-to-token exchange
///
/// Each variant maps to a different failure of the token endpoint, so
/// callers never have to parse messages.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Connection, TLS or timeout failure; no HTTP response was obtained
    #[error("token endpoint unreachable: {message}")]
    Transport {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The response body was not valid JSON; raw bytes are kept
    #[error("token endpoint returned a non-JSON body (HTTP {status}, {len} bytes)", len = .raw.len())]
    MalformedResponse { status: u16, raw: Vec<u8> },

    /// Non-200 status, or a JSON body without a string `access_token`
    #[error("token exchange rejected (HTTP {status}){}", oauth_suffix(.body))]
    ExchangeRejected { status: u16, body: Value },
}

fn oauth_suffix(body: &Value) -> String {
    OAuthErrorBody::from_value(body).map(|err| format!(": {err}")).unwrap_or_default()
}

impl ExchangeError {
    /// Provider error pair of a rejected exchange, when the body carries one
    #[must_use]
    pub fn oauth_error(&self) -> Option<OAuthErrorBody> {
        match self {
            Self::ExchangeRejected { body, .. } => OAuthErrorBody::from_value(body),
            _ => None,
        }
    }

    /// HTTP status, absent for transport failures
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { .. } => None,
            Self::MalformedResponse { status, .. } | Self::ExchangeRejected { status, .. } => {
                Some(*status)
            }
        }
    }

    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
