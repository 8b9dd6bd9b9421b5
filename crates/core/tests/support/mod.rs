//! Shared test helpers for `eventhorizon-core` integration tests.
//!
//! Lightweight in-memory fakes for the ports so flow tests can script the
//! token endpoint and the resource API without a network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use eventhorizon_common::auth::{
    AccessToken, ExchangeError, MemorySessionStore, PkceError, PkcePair, SessionStore,
};
use eventhorizon_core::{AuthFlowController, Entropy, ExchangeRequest, ResourceApi, TokenExchanger};
use eventhorizon_domain::{ApiError, ApiMethod, ApiResponse, BodyEncoding, ClientConfig, ResponseBody};
use parking_lot::Mutex;
use serde_json::Value;

pub fn test_config() -> ClientConfig {
    ClientConfig::new(
        "client-123",
        "secret-456",
        "https://events.example.com",
        "https://app.example.com/callback",
        "/accounts/api/me/",
        BodyEncoding::Json,
    )
}

/// Scripted `TokenExchanger` recording every request it receives.
#[derive(Default)]
pub struct FakeExchanger {
    responses: Mutex<VecDeque<Result<AccessToken, ExchangeError>>>,
    requests: Mutex<Vec<ExchangeRequest>>,
}

impl FakeExchanger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, result: Result<AccessToken, ExchangeError>) {
        self.responses.lock().push_back(result);
    }

    pub fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl TokenExchanger for FakeExchanger {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AccessToken, ExchangeError> {
        self.requests.lock().push(request.clone());
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(ExchangeError::ExchangeRejected {
                status: 400,
                body: serde_json::json!({"error": "invalid_grant"}),
            })
        })
    }
}

/// One request as seen by [`FakeApi`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: ApiMethod,
    pub path: String,
    pub body: Option<Value>,
    pub token: String,
}

/// Scripted `ResourceApi`. Unscripted calls answer 200 with an empty body.
#[derive(Default)]
pub struct FakeApi {
    responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: ResponseBody) {
        self.responses.lock().push_back(Ok(ApiResponse::new(status, body)));
    }

    pub fn respond_json(&self, status: u16, body: Value) {
        self.respond(status, ResponseBody::Json(body));
    }

    pub fn fail(&self, err: ApiError) {
        self.responses.lock().push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl ResourceApi for FakeApi {
    async fn call(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<&Value>,
        token: &AccessToken,
    ) -> Result<ApiResponse, ApiError> {
        self.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.cloned(),
            token: token.expose().to_string(),
        });
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(200, ResponseBody::Empty)))
    }
}

/// Entropy source that always fails
pub struct NoEntropy;

impl Entropy for NoEntropy {
    fn pkce_pair(&self) -> Result<PkcePair, PkceError> {
        Err(PkceError::EntropyUnavailable("getrandom: device not configured".to_string()))
    }

    fn state(&self) -> Result<String, PkceError> {
        Err(PkceError::EntropyUnavailable("getrandom: device not configured".to_string()))
    }
}

/// Controller wired to fakes, with handles kept for assertions
pub struct Harness {
    pub store: Arc<dyn SessionStore>,
    pub exchanger: Arc<FakeExchanger>,
    pub api: Arc<FakeApi>,
    pub flow: Arc<AuthFlowController>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemorySessionStore::new()))
    }

    pub fn with_store(store: Arc<dyn SessionStore>) -> Self {
        let exchanger = Arc::new(FakeExchanger::new());
        let api = Arc::new(FakeApi::new());
        let flow = Arc::new(AuthFlowController::new(
            Arc::new(test_config()),
            Arc::clone(&store),
            exchanger.clone(),
            api.clone(),
        ));
        Self { store, exchanger, api, flow }
    }
}
