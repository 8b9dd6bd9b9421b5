//! Conversions from external infrastructure errors into domain errors.

use eventhorizon_common::auth::ExchangeError;
use eventhorizon_domain::{ApiError, HorizonError};
use reqwest::Error as HttpError;

use crate::http::TransportError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HorizonError);

impl From<InfraError> for HorizonError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HorizonError> for InfraError {
    fn from(value: HorizonError) -> Self {
        Self(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → HorizonError (client construction) */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(HorizonError::Config(format!("failed to build HTTP client: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → transport description */
/* -------------------------------------------------------------------------- */

/// Short, secret-free description of why no response was obtained
pub(crate) fn describe_transport(err: &HttpError) -> String {
    if err.is_timeout() {
        return "HTTP request timed out".into();
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return "HTTP connection failure".into();
    }

    if err.is_builder() {
        return format!("invalid HTTP request: {err}");
    }

    if err.is_body() || err.is_decode() {
        return "failed to read HTTP response body".into();
    }

    format!("HTTP request failed: {err}")
}

/* -------------------------------------------------------------------------- */
/* TransportError → port errors */
/* -------------------------------------------------------------------------- */

impl From<TransportError> for ApiError {
    fn from(value: TransportError) -> Self {
        Self::Transport { url: value.url, message: value.message, source: Box::new(value.source) }
    }
}

impl From<TransportError> for ExchangeError {
    fn from(value: TransportError) -> Self {
        Self::Transport { message: value.message, source: Box::new(value.source) }
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
