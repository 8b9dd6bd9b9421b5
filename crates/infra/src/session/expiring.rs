//! Expiring session store
//!
//! [`SessionStore`] backed by a bounded `moka` cache. A session that is not
//! touched for `session_ttl` is dropped together with its verifier and
//! token, so abandoned login attempts do not accumulate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventhorizon_common::auth::{SessionError, SessionId, SessionKey, SessionStore};
use eventhorizon_domain::ClientConfig;
use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::debug;

type SessionValues = Arc<Mutex<HashMap<SessionKey, String>>>;

/// Default bound on live sessions
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

/// In-process session store with idle expiry and a capacity bound
#[derive(Clone)]
pub struct ExpiringSessionStore {
    sessions: Cache<SessionId, SessionValues>,
}

impl ExpiringSessionStore {
    #[must_use]
    pub fn new(ttl: Duration, max_sessions: u64) -> Self {
        let sessions = Cache::builder().max_capacity(max_sessions).time_to_idle(ttl).build();
        Self { sessions }
    }

    /// Store using the configured session lifetime
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.session_ttl(), DEFAULT_MAX_SESSIONS)
    }

    /// Number of live sessions, after pending evictions are applied
    #[must_use]
    pub fn session_count(&self) -> u64 {
        self.sessions.run_pending_tasks();
        self.sessions.entry_count()
    }
}

impl std::fmt::Debug for ExpiringSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringSessionStore")
            .field("sessions", &self.sessions.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for ExpiringSessionStore {
    async fn put(
        &self,
        session: &SessionId,
        key: SessionKey,
        value: String,
    ) -> Result<(), SessionError> {
        let values = self.sessions.get_with(session.clone(), SessionValues::default);
        values.lock().insert(key, value);
        Ok(())
    }

    async fn get(
        &self,
        session: &SessionId,
        key: SessionKey,
    ) -> Result<Option<String>, SessionError> {
        Ok(self.sessions.get(session).and_then(|values| values.lock().get(&key).cloned()))
    }

    async fn take(
        &self,
        session: &SessionId,
        key: SessionKey,
    ) -> Result<Option<String>, SessionError> {
        Ok(self.sessions.get(session).and_then(|values| values.lock().remove(&key)))
    }

    async fn remove(&self, session: &SessionId, key: SessionKey) -> Result<(), SessionError> {
        if let Some(values) = self.sessions.get(session) {
            values.lock().remove(&key);
        }
        Ok(())
    }

    async fn clear(&self, session: &SessionId) -> Result<(), SessionError> {
        self.sessions.invalidate(session);
        debug!(session = %session, "session cleared");
        Ok(())
    }
}
