//! Error types used throughout the application

use thiserror::Error;

/// Boxed error used to carry an underlying transport cause across crates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for EventHorizon configuration and domain validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HorizonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for EventHorizon operations
pub type Result<T> = std::result::Result<T, HorizonError>;

/// Failures of a bearer-authenticated resource API call.
///
/// An HTTP response with any status code is *not* an error at this level;
/// it is returned as an [`crate::ApiResponse`]. Only failures to produce a
/// response at all end up here.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("transport error calling {url}: {message}")]
    Transport {
        url: String,
        message: String,
        #[source]
        source: BoxError,
    },

    /// The request body could not be encoded for the configured wire format.
    #[error("failed to encode request body: {0}")]
    Encoding(String),

    /// The request path could not be resolved into a URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// `true` when the server was never reached.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
