//! Authorization-code-to-token exchange over HTTP
//!
//! One form POST per code (RFC 6749 §4.1.3 plus the PKCE `code_verifier`).
//! Codes are single-use, so nothing here retries.

use async_trait::async_trait;
use eventhorizon_common::auth::{AccessToken, ExchangeError};
use eventhorizon_core::{ExchangeRequest, TokenExchanger};
use eventhorizon_domain::{ClientConfig, HorizonError};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::http::HttpClient;

/// `TokenExchanger` backed by the authorization server's token endpoint
#[derive(Clone, Debug)]
pub struct TokenExchangeClient {
    http: HttpClient,
}

impl TokenExchangeClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, HorizonError> {
        Ok(Self::new(HttpClient::from_config(config)?))
    }
}

#[async_trait]
impl TokenExchanger for TokenExchangeClient {
    #[instrument(skip(self, request), fields(endpoint = %request.token_endpoint))]
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AccessToken, ExchangeError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", request.code.as_str()),
            ("redirect_uri", request.redirect_uri.as_str()),
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
            ("code_verifier", request.verifier.as_str()),
        ];

        let builder = self
            .http
            .request(Method::POST, request.token_endpoint.as_str())
            .header(ACCEPT, "application/json")
            .form(&form);

        let response = self.http.send(builder).await?;
        debug!(status = response.status, "token endpoint responded");

        parse_token_response(response.status, response.body)
    }
}

/// Turn a token endpoint response into a token or a typed failure.
fn parse_token_response(status: u16, raw: Vec<u8>) -> Result<AccessToken, ExchangeError> {
    let body: Value = match serde_json::from_slice(&raw) {
        Ok(body) => body,
        Err(_) => {
            warn!(status, bytes = raw.len(), "token endpoint returned a non-JSON body");
            return Err(ExchangeError::MalformedResponse { status, raw });
        }
    };

    if status != 200 {
        warn!(status, "token exchange rejected");
        return Err(ExchangeError::ExchangeRejected { status, body });
    }

    match body.get("access_token").and_then(Value::as_str).filter(|token| !token.is_empty()) {
        Some(token) => Ok(AccessToken::new(token)),
        None => {
            warn!(status, "token response without access_token");
            Err(ExchangeError::ExchangeRejected { status, body })
        }
    }
}
