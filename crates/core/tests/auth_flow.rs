//! Integration tests for the login state machine
//!
//! Drives `AuthFlowController` through full redirect round trips with
//! scripted ports.

mod support;

use std::sync::Arc;

use eventhorizon_common::auth::{challenge_for, AccessToken, ExchangeError, SessionId, SessionKey};
use eventhorizon_common::testing::{MockSessionStore, StoreOp};
use eventhorizon_core::{CallbackParams, FlowError, SessionState};
use eventhorizon_domain::{ApiError, ApiMethod, ResponseBody};
use serde_json::json;
use support::{Harness, NoEntropy};

fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Validates the happy path from login start to an authenticated call.
///
/// # Test Steps
/// 1. Begin login and inspect the redirect URL
/// 2. Deliver the callback with the matching state
/// 3. Check the exchange request and the resulting session state
/// 4. Make an API call with the stored token
#[tokio::test]
async fn test_full_login_round_trip() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::generate()?;

    let redirect = harness.flow.begin_login(&session).await?;
    assert!(redirect.url.starts_with("https://events.example.com/o/authorize/?"));
    assert_eq!(query_param(&redirect.url, "client_id").as_deref(), Some("client-123"));
    assert_eq!(
        query_param(&redirect.url, "redirect_uri").as_deref(),
        Some("https://app.example.com/callback")
    );
    assert_eq!(query_param(&redirect.url, "response_type").as_deref(), Some("code"));
    assert_eq!(query_param(&redirect.url, "scope").as_deref(), Some("openid read write"));
    assert_eq!(query_param(&redirect.url, "code_challenge_method").as_deref(), Some("S256"));
    assert_eq!(query_param(&redirect.url, "state"), Some(redirect.state.clone()));
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::AwaitingCallback);

    let stored_verifier = harness.store.get(&session, SessionKey::CodeVerifier).await?.expect("verifier stored");
    assert_eq!(query_param(&redirect.url, "code_challenge"), Some(challenge_for(&stored_verifier)));

    harness.exchanger.respond(Ok(AccessToken::new("tok-1")));
    harness
        .flow
        .handle_callback(&session, &CallbackParams::with_code("auth-code", Some(redirect.state)))
        .await?;

    let requests = harness.exchanger.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].code, "auth-code");
    assert_eq!(requests[0].verifier, stored_verifier);
    assert_eq!(requests[0].client_secret, "secret-456");
    assert_eq!(requests[0].token_endpoint, "https://events.example.com/o/token/");

    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Authenticated);
    assert_eq!(harness.store.get(&session, SessionKey::CodeVerifier).await?, None);
    assert_eq!(harness.flow.access_token(&session).await?.map(|t| t.expose().to_string()).as_deref(), Some("tok-1"));

    harness.api.respond_json(200, json!([]));
    let response = harness.flow.call(&session, ApiMethod::Get, "/api/events/", None).await?;
    assert_eq!(response.status, 200);
    assert_eq!(harness.api.last_call().map(|c| c.token).as_deref(), Some("tok-1"));
    Ok(())
}

/// Validates that two logins overwrite the verifier and the second
/// challenge belongs to the newest verifier.
#[tokio::test]
async fn test_second_login_overwrites_verifier() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("overwrite");

    let first = harness.flow.begin_login(&session).await?;
    let second = harness.flow.begin_login(&session).await?;
    let verifier = harness.store.get(&session, SessionKey::CodeVerifier).await?.expect("verifier");

    assert_ne!(first.state, second.state);
    assert_eq!(query_param(&second.url, "code_challenge"), Some(challenge_for(&verifier)));
    assert_ne!(query_param(&first.url, "code_challenge"), Some(challenge_for(&verifier)));

    // The first attempt's callback no longer matches the pending state
    let err = harness
        .flow
        .handle_callback(&session, &CallbackParams::with_code("c", Some(first.state)))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::StateMismatch));
    assert_eq!(harness.exchanger.call_count(), 0);
    Ok(())
}

/// Validates that a callback without a pending verifier makes no exchange.
#[tokio::test]
async fn test_callback_without_login_is_missing_verifier() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("fresh");

    let err = harness
        .flow
        .handle_callback(&session, &CallbackParams::with_code("code", None))
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::MissingVerifier));
    assert!(err.requires_restart());
    assert_eq!(harness.exchanger.call_count(), 0);
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Anonymous);
    Ok(())
}

/// Validates that a double-submitted callback is refused without a second
/// exchange and without disturbing the established session.
#[tokio::test]
async fn test_replayed_code_is_refused() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("replay");
    let redirect = harness.flow.begin_login(&session).await?;
    let params = CallbackParams::with_code("once", Some(redirect.state));

    harness.exchanger.respond(Ok(AccessToken::new("tok")));
    harness.flow.handle_callback(&session, &params).await?;
    let err = harness.flow.handle_callback(&session, &params).await.unwrap_err();

    assert!(matches!(err, FlowError::CodeAlreadyConsumed));
    assert_eq!(harness.exchanger.call_count(), 1);
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Authenticated);
    Ok(())
}

/// Validates that replaying a code whose exchange failed is still refused.
#[tokio::test]
async fn test_replay_after_failed_exchange() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("failed-replay");
    let redirect = harness.flow.begin_login(&session).await?;
    let params = CallbackParams::with_code("bad", Some(redirect.state));

    harness.exchanger.respond(Err(ExchangeError::ExchangeRejected {
        status: 400,
        body: json!({"error": "invalid_grant"}),
    }));
    let first = harness.flow.handle_callback(&session, &params).await.unwrap_err();
    let second = harness.flow.handle_callback(&session, &params).await.unwrap_err();

    assert!(matches!(first, FlowError::Exchange(ExchangeError::ExchangeRejected { status: 400, .. })));
    assert!(matches!(second, FlowError::CodeAlreadyConsumed));
    assert_eq!(harness.exchanger.call_count(), 1);
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Anonymous);
    Ok(())
}

/// Validates that an `error` callback is surfaced and clears the attempt.
#[tokio::test]
async fn test_authorization_denied() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("denied");
    let redirect = harness.flow.begin_login(&session).await?;

    let params = CallbackParams::from_query(&format!(
        "error=access_denied&error_description=User+said+no&state={}",
        redirect.state
    ));
    let err = harness.flow.handle_callback(&session, &params).await.unwrap_err();

    match err {
        FlowError::AuthorizationDenied { error, description } => {
            assert_eq!(error, "access_denied");
            assert_eq!(description.as_deref(), Some("User said no"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(harness.exchanger.call_count(), 0);
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Anonymous);
    Ok(())
}

/// Validates that an `error` callback without the pending state cannot
/// cancel someone else's login attempt.
#[tokio::test]
async fn test_error_callback_without_state_keeps_attempt() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("forged-denial");
    let redirect = harness.flow.begin_login(&session).await?;

    for query in ["error=access_denied", "error=access_denied&state=forged"] {
        let err = harness.flow.handle_callback(&session, &CallbackParams::from_query(query)).await.unwrap_err();
        assert!(matches!(err, FlowError::StateMismatch), "{query}: {err:?}");
    }

    assert_eq!(harness.flow.session_state(&session).await?, SessionState::AwaitingCallback);
    assert!(harness.store.get(&session, SessionKey::CodeVerifier).await?.is_some());

    harness.exchanger.respond(Ok(AccessToken::new("tok")));
    harness
        .flow
        .handle_callback(&session, &CallbackParams::with_code("code", Some(redirect.state)))
        .await?;
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Authenticated);
    Ok(())
}

/// Validates that a callback racing another one for the same attempt is
/// reported as already consumed, not as a missing login.
#[tokio::test]
async fn test_callback_losing_race_is_already_consumed() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("race");
    let redirect = harness.flow.begin_login(&session).await?;

    // Another callback has taken the verifier but not yet recorded the code.
    harness.store.take(&session, SessionKey::CodeVerifier).await?;

    let err = harness
        .flow
        .handle_callback(&session, &CallbackParams::with_code("code", Some(redirect.state)))
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::CodeAlreadyConsumed));
    assert!(!err.requires_restart());
    assert_eq!(harness.exchanger.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_callback_without_code() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("no-code");
    let redirect = harness.flow.begin_login(&session).await?;

    let params = CallbackParams { state: Some(redirect.state), ..CallbackParams::default() };
    let err = harness.flow.handle_callback(&session, &params).await.unwrap_err();

    assert!(matches!(err, FlowError::MissingCode));
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::AwaitingCallback);
    Ok(())
}

/// Validates that a failed exchange leaves no token and kills the attempt.
#[tokio::test]
async fn test_exchange_failure_stores_no_token() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("transport");
    let redirect = harness.flow.begin_login(&session).await?;

    harness.exchanger.respond(Err(ExchangeError::Transport {
        message: "connection refused".to_string(),
        source: "connection refused".into(),
    }));
    let err = harness
        .flow
        .handle_callback(&session, &CallbackParams::with_code("code", Some(redirect.state)))
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Exchange(ref e) if e.is_transport()));
    assert!(harness.flow.access_token(&session).await?.is_none());
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Anonymous);
    Ok(())
}

/// Validates that an unavailable random source aborts login with nothing
/// written to the session.
#[tokio::test]
async fn test_entropy_failure_aborts_login() -> anyhow::Result<()> {
    let store = Arc::new(MockSessionStore::new());
    let harness = Harness::with_store(store.clone());
    let flow = Arc::try_unwrap(harness.flow)
        .map_err(|_| anyhow::anyhow!("controller still shared"))?
        .with_entropy(Arc::new(NoEntropy));
    let session = SessionId::new("no-entropy");

    let err = flow.begin_login(&session).await.unwrap_err();

    assert!(matches!(err, FlowError::Entropy(_)));
    assert!(store.calls().iter().all(|(op, _)| *op != StoreOp::Put));
    assert_eq!(flow.session_state(&session).await?, SessionState::Anonymous);
    Ok(())
}

#[tokio::test]
async fn test_session_backend_failure_surfaces() -> anyhow::Result<()> {
    let store = Arc::new(MockSessionStore::new());
    let harness = Harness::with_store(store.clone());
    let session = SessionId::new("backend");

    store.fail_on(StoreOp::Put);
    let err = harness.flow.begin_login(&session).await.unwrap_err();

    assert!(matches!(err, FlowError::Session(_)));
    Ok(())
}

/// Validates that calls without a token never reach the API.
#[tokio::test]
async fn test_call_requires_token() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("anon");

    let err = harness.flow.call(&session, ApiMethod::Get, "/api/events/", None).await.unwrap_err();

    assert!(matches!(err, FlowError::NotAuthenticated));
    assert!(harness.api.calls().is_empty());
    Ok(())
}

/// Validates that a 401 ends the authenticated session.
#[tokio::test]
async fn test_unauthorized_response_expires_session() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("expired");
    harness.store.put(&session, SessionKey::AccessToken, "stale".to_string()).await?;

    harness.api.respond_json(401, json!({"detail": "Invalid token."}));
    let err = harness.flow.call(&session, ApiMethod::Get, "/api/events/", None).await.unwrap_err();

    match err {
        FlowError::SessionExpired { body } => {
            assert_eq!(body.field("detail"), Some(&json!("Invalid token.")));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Anonymous);
    Ok(())
}

/// Validates that error statuses other than 401 are returned to the caller
/// and transport failures stay distinct.
#[tokio::test]
async fn test_error_statuses_and_transport() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("statuses");
    harness.store.put(&session, SessionKey::AccessToken, "tok".to_string()).await?;

    harness.api.respond(404, ResponseBody::Raw(b"Not Found".to_vec()));
    let response = harness.flow.call(&session, ApiMethod::Get, "/api/events/99/", None).await?;
    assert_eq!(response.status, 404);

    harness.api.fail(ApiError::Transport {
        url: "https://events.example.com/api/events/".to_string(),
        message: "timed out".to_string(),
        source: "timed out".into(),
    });
    let err = harness.flow.call(&session, ApiMethod::Get, "/api/events/", None).await.unwrap_err();
    assert!(matches!(err, FlowError::Api(ref e) if e.is_transport()));
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Authenticated);
    Ok(())
}

/// Validates logout and that a new login drops any leftover token.
#[tokio::test]
async fn test_logout_and_stale_token_cleanup() -> anyhow::Result<()> {
    let harness = Harness::new();
    let session = SessionId::new("logout");
    harness.store.put(&session, SessionKey::AccessToken, "old".to_string()).await?;

    harness.flow.begin_login(&session).await?;
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::AwaitingCallback);
    assert!(harness.flow.access_token(&session).await?.is_none());

    harness.flow.logout(&session).await?;
    harness.flow.logout(&session).await?;
    assert_eq!(harness.flow.session_state(&session).await?, SessionState::Anonymous);
    Ok(())
}

/// Validates that sessions never observe each other's verifier or token.
#[tokio::test]
async fn test_sessions_are_independent() -> anyhow::Result<()> {
    let harness = Harness::new();
    let alice = SessionId::new("alice");
    let bob = SessionId::new("bob");

    let redirect = harness.flow.begin_login(&alice).await?;
    let err = harness
        .flow
        .handle_callback(&bob, &CallbackParams::with_code("code", Some(redirect.state)))
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::MissingVerifier));
    assert_eq!(harness.flow.session_state(&alice).await?, SessionState::AwaitingCallback);
    assert_eq!(harness.exchanger.call_count(), 0);
    Ok(())
}
