//! Integration tests for auth module
//!
//! Tests PKCE generation, session storage across a simulated redirect, and
//! the session store test double.

#![cfg(feature = "test-utils")]

use eventhorizon_common::auth::{
    challenge_for, MemorySessionStore, PkcePair, SessionError, SessionId, SessionKey,
    SessionStore,
};
use eventhorizon_common::testing::{MockSessionStore, StoreOp};

/// Validates that a verifier stored at login start is the one read back on
/// the callback, and that its challenge can be recomputed by a server.
///
/// # Test Steps
/// 1. Generate a pair and store the verifier under a fresh session id
/// 2. Read it back through a second handle, as a callback handler would
/// 3. Recompute the challenge from what was read
#[tokio::test(flavor = "multi_thread")]
async fn test_verifier_survives_redirect() -> anyhow::Result<()> {
    let store = MemorySessionStore::new();
    let session = SessionId::generate()?;
    let pair = PkcePair::generate()?;

    store.put(&session, SessionKey::CodeVerifier, pair.verifier().to_string()).await?;

    let callback_session = SessionId::new(session.as_str());
    let read = store.take(&callback_session, SessionKey::CodeVerifier).await?;

    assert_eq!(read.as_deref(), Some(pair.verifier()));
    assert_eq!(challenge_for(pair.verifier()), pair.challenge());
    assert_eq!(store.get(&callback_session, SessionKey::CodeVerifier).await?, None);
    Ok(())
}

/// Validates that a second login attempt overwrites the first verifier.
#[tokio::test]
async fn test_new_attempt_overwrites_verifier() -> anyhow::Result<()> {
    let store = MemorySessionStore::new();
    let session = SessionId::generate()?;
    let first = PkcePair::generate()?;
    let second = PkcePair::generate()?;

    store.put(&session, SessionKey::CodeVerifier, first.verifier().to_string()).await?;
    store.put(&session, SessionKey::CodeVerifier, second.verifier().to_string()).await?;

    let stored = store.get(&session, SessionKey::CodeVerifier).await?;
    assert_eq!(stored.as_deref(), Some(second.verifier()));
    Ok(())
}

/// Validates `MockSessionStore` failure injection and call recording.
///
/// Assertions:
/// - Confirms an injected `Put` failure surfaces as `SessionError::Backend`.
/// - Confirms reads still work and every call is logged in order.
/// - Confirms `heal` restores normal behavior.
#[tokio::test]
async fn test_mock_store_injects_failures() -> anyhow::Result<()> {
    let store = MockSessionStore::new();
    let session = SessionId::new("mock-session");

    store.fail_on(StoreOp::Put);
    let err = store.put(&session, SessionKey::AccessToken, "t".into()).await.unwrap_err();
    assert!(matches!(err, SessionError::Backend(_)));
    assert_eq!(store.get(&session, SessionKey::AccessToken).await?, None);

    store.heal();
    store.put(&session, SessionKey::AccessToken, "t".into()).await?;
    store.clear(&session).await?;

    assert_eq!(
        store.calls(),
        vec![
            (StoreOp::Put, Some(SessionKey::AccessToken)),
            (StoreOp::Get, Some(SessionKey::AccessToken)),
            (StoreOp::Put, Some(SessionKey::AccessToken)),
            (StoreOp::Clear, None),
        ]
    );
    Ok(())
}
