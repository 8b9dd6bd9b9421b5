use std::time::Duration;

use eventhorizon_domain::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};
use eventhorizon_domain::{ClientConfig, HorizonError};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder};
use thiserror::Error;
use tracing::debug;

use crate::errors::conversions::describe_transport;
use crate::errors::InfraError;

/// No HTTP response was obtained (connect, TLS, timeout, body read).
#[derive(Debug, Error)]
#[error("{message} ({url})")]
pub struct TransportError {
    pub url: String,
    pub message: String,
    #[source]
    pub source: reqwest::Error,
}

/// Status and fully read body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// HTTP client with bounded timeouts. Requests are sent exactly once.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, HorizonError> {
        Self::builder().build()
    }

    /// Client using the configured request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, HorizonError> {
        Self::builder().timeout(config.timeout()).build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send the request once and read the whole body.
    pub async fn send(&self, builder: RequestBuilder) -> Result<BufferedResponse, TransportError> {
        let request = builder.build().map_err(|err| TransportError {
            url: err.url().map(ToString::to_string).unwrap_or_default(),
            message: describe_transport(&err),
            source: err,
        })?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            TransportError { url: url.to_string(), message: describe_transport(&err), source: err }
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        let body = response.bytes().await.map_err(|err| TransportError {
            url: url.to_string(),
            message: describe_transport(&err),
            source: err,
        })?;

        Ok(BufferedResponse { status: status.as_u16(), body: body.to_vec() })
    }
}

/// Sent with every request so provider logs can attribute traffic.
pub const USER_AGENT: &str = concat!("eventhorizon-client/", env!("CARGO_PKG_VERSION"));

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    connect_timeout: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl HttpClientBuilder {
    /// Total time allowed for one request, body included
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpClient, HorizonError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout.min(self.timeout))
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .map_err(|err| HorizonError::from(InfraError::from(err)))?;

        Ok(HttpClient { client })
    }
}
