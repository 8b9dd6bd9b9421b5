//! Mock implementations of the auth traits

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{MemorySessionStore, SessionError, SessionId, SessionKey, SessionStore};

/// Session store operation, as recorded by [`MockSessionStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Put,
    Get,
    Take,
    Remove,
    Clear,
}

/// In-memory session store that records calls and can be told to fail.
///
/// Clones share state, so a test can keep a handle after moving one into the
/// code under test.
#[derive(Debug, Clone, Default)]
pub struct MockSessionStore {
    inner: Arc<MemorySessionStore>,
    failing: Arc<Mutex<Vec<StoreOp>>>,
    calls: Arc<Mutex<Vec<(StoreOp, Option<SessionKey>)>>>,
}

impl MockSessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `op` return `SessionError::Backend`.
    pub fn fail_on(&self, op: StoreOp) {
        self.failing.lock().push(op);
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    /// Calls seen so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<(StoreOp, Option<SessionKey>)> {
        self.calls.lock().clone()
    }

    fn record(&self, op: StoreOp, key: Option<SessionKey>) -> Result<(), SessionError> {
        self.calls.lock().push((op, key));
        if self.failing.lock().contains(&op) {
            return Err(SessionError::Backend(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn put(
        &self,
        session: &SessionId,
        key: SessionKey,
        value: String,
    ) -> Result<(), SessionError> {
        self.record(StoreOp::Put, Some(key))?;
        self.inner.put(session, key, value).await
    }

    async fn get(
        &self,
        session: &SessionId,
        key: SessionKey,
    ) -> Result<Option<String>, SessionError> {
        self.record(StoreOp::Get, Some(key))?;
        self.inner.get(session, key).await
    }

    async fn take(
        &self,
        session: &SessionId,
        key: SessionKey,
    ) -> Result<Option<String>, SessionError> {
        self.record(StoreOp::Take, Some(key))?;
        self.inner.take(session, key).await
    }

    async fn remove(&self, session: &SessionId, key: SessionKey) -> Result<(), SessionError> {
        self.record(StoreOp::Remove, Some(key))?;
        self.inner.remove(session, key).await
    }

    async fn clear(&self, session: &SessionId) -> Result<(), SessionError> {
        self.record(StoreOp::Clear, None)?;
        self.inner.clear(session).await
    }
}
