//! Authenticated API client
//!
//! Resolves paths against the configured base URL, attaches the bearer
//! token, encodes bodies per [`BodyEncoding`] and classifies response bodies.

use std::sync::Arc;

use async_trait::async_trait;
use eventhorizon_common::auth::AccessToken;
use eventhorizon_core::ResourceApi;
use eventhorizon_domain::{
    ApiError, ApiMethod, ApiResponse, BodyEncoding, ClientConfig, HorizonError, ResponseBody,
};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http::HttpClient;

/// `ResourceApi` over HTTP
pub struct ApiClient {
    http: HttpClient,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    pub fn new(config: Arc<ClientConfig>, http: HttpClient) -> Self {
        Self { http, config }
    }

    /// Client with its own HTTP client using the configured timeout
    pub fn from_config(config: Arc<ClientConfig>) -> Result<Self, HorizonError> {
        let http = HttpClient::from_config(&config)?;
        Ok(Self::new(config, http))
    }

    /// Absolute URL for `path`. Absolute inputs must share the configured
    /// base URL's origin, so the bearer token never leaves the provider.
    fn resolve(&self, path: &str) -> Result<String, ApiError> {
        let url = self.config.endpoint(path);
        let parsed = Url::parse(&url).map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))?;
        let base = Url::parse(&self.config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.config.base_url)))?;

        if parsed.origin() != base.origin() {
            warn!(url = %url, "refusing to send credentials to a foreign origin");
            return Err(ApiError::InvalidUrl(format!(
                "{url} is outside {}",
                base.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }
}

#[async_trait]
impl ResourceApi for ApiClient {
    #[instrument(skip(self, body, token), fields(method = %method, path = %path))]
    async fn call(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<&Value>,
        token: &AccessToken,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.resolve(path)?;
        debug!(url = %url, "API request");

        let mut builder = self
            .http
            .request(to_method(method), url.as_str())
            .bearer_auth(token.expose())
            .header(ACCEPT, "application/json");

        if let Some(body) = body.filter(|_| method.sends_body()) {
            builder = match self.config.body_encoding {
                BodyEncoding::Form => builder.form(&form_pairs(body)?),
                BodyEncoding::Json => builder.json(body),
            };
        }

        let response = self.http.send(builder).await?;
        let body = if response.status == 204 {
            ResponseBody::Empty
        } else {
            ResponseBody::from_bytes(&response.body)
        };

        Ok(ApiResponse::new(response.status, body))
    }
}

const fn to_method(method: ApiMethod) -> Method {
    match method {
        ApiMethod::Get => Method::GET,
        ApiMethod::Post => Method::POST,
        ApiMethod::Put => Method::PUT,
        ApiMethod::Patch => Method::PATCH,
        ApiMethod::Delete => Method::DELETE,
    }
}

/// Flatten a JSON object into `application/x-www-form-urlencoded` pairs.
///
/// Strings are sent as-is, numbers and booleans via their JSON text, `null`
/// as an empty value, and nested arrays/objects as JSON text.
///
/// # Errors
/// `ApiError::Encoding` when `body` is not a JSON object.
pub fn form_pairs(body: &Value) -> Result<Vec<(String, String)>, ApiError> {
    let Value::Object(map) = body else {
        return Err(ApiError::Encoding(format!(
            "form bodies must be JSON objects, got {}",
            kind(body)
        )));
    };

    Ok(map
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect())
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
