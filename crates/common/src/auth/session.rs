//! Per-session key/value storage for the login flow
//!
//! The verifier written at login start must still be readable when the
//! authorization server redirects back, possibly on a different request
//! handler. Stores are keyed by an opaque [`SessionId`] and never leak values
//! across sessions.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use super::pkce::{random_token, PkceError};

/// Opaque, unguessable session identifier
///
/// `Display` and `Debug` only show a short prefix so ids can be logged
/// without handing out a usable session reference.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    const LOG_PREFIX_LEN: usize = 8;

    /// New random id (32 bytes from the OS random source)
    ///
    /// # Errors
    /// Returns `PkceError::EntropyUnavailable` if the OS random source fails
    pub fn generate() -> Result<Self, PkceError> {
        random_token().map(Self)
    }

    /// Wrap an id received from elsewhere (e.g. a session cookie)
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(Self::LOG_PREFIX_LEN)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..", self.short())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({self})")
    }
}

/// Values the login flow keeps per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// PKCE verifier of the pending login attempt
    CodeVerifier,
    /// Bearer token after a successful exchange
    AccessToken,
    /// CSRF state of the pending login attempt
    OAuthState,
    /// SHA-256 hex digest of the last code handed to the exchange
    ConsumedCode,
}

impl SessionKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CodeVerifier => "code_verifier",
            Self::AccessToken => "access_token",
            Self::OAuthState => "oauth_state",
            Self::ConsumedCode => "consumed_code",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session backend failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session backend unavailable: {0}")]
    Backend(String),
}

/// Storage capability for per-session flow values
///
/// Implementations must make `take` atomic: of two concurrent `take` calls
/// for the same key, at most one observes the value.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, session: &SessionId, key: SessionKey, value: String)
        -> Result<(), SessionError>;

    /// Read a value without removing it
    async fn get(&self, session: &SessionId, key: SessionKey)
        -> Result<Option<String>, SessionError>;

    /// Read and remove a value in one step
    async fn take(&self, session: &SessionId, key: SessionKey)
        -> Result<Option<String>, SessionError>;

    async fn remove(&self, session: &SessionId, key: SessionKey) -> Result<(), SessionError>;

    /// Drop every value of the session
    async fn clear(&self, session: &SessionId) -> Result<(), SessionError>;
}

/// In-process session store without expiry
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions holding at least one value
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.iter().filter(|entry| !entry.value().is_empty()).count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(
        &self,
        session: &SessionId,
        key: SessionKey,
        value: String,
    ) -> Result<(), SessionError> {
        self.sessions.entry(session.clone()).or_default().insert(key, value);
        Ok(())
    }

    async fn get(
        &self,
        session: &SessionId,
        key: SessionKey,
    ) -> Result<Option<String>, SessionError> {
        Ok(self.sessions.get(session).and_then(|values| values.get(&key).cloned()))
    }

    async fn take(
        &self,
        session: &SessionId,
        key: SessionKey,
    ) -> Result<Option<String>, SessionError> {
        // get_mut holds the shard write lock for the duration of the remove
        Ok(self.sessions.get_mut(session).and_then(|mut values| values.remove(&key)))
    }

    async fn remove(&self, session: &SessionId, key: SessionKey) -> Result<(), SessionError> {
        if let Some(mut values) = self.sessions.get_mut(session) {
            values.remove(&key);
        }
        Ok(())
    }

    async fn clear(&self, session: &SessionId) -> Result<(), SessionError> {
        if self.sessions.remove(session).is_some() {
            debug!(session = %session, "session cleared");
        }
        Ok(())
    }
}
