//! Events service - resource operations for the signed-in user

use std::sync::Arc;

use eventhorizon_common::auth::SessionId;
use eventhorizon_domain::constants::{EVENTS_COLLECTION, REGISTRATIONS_COLLECTION};
use eventhorizon_domain::{
    ApiMethod, ApiResponse, Collection, Event, EventId, EventPayload, Registration, UserInfo,
};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::auth::{AuthFlowController, FlowError};

const OK: &[u16] = &[200];
const CREATED: &[u16] = &[201];
const NO_CONTENT: &[u16] = &[204];

/// Event operations on behalf of one session
///
/// Every call goes through [`AuthFlowController::call`], so a missing or
/// expired token surfaces as `NotAuthenticated` / `SessionExpired`. Any other
/// unexpected status becomes `FlowError::Rejected`.
pub struct EventsService {
    flow: Arc<AuthFlowController>,
}

impl EventsService {
    pub fn new(flow: Arc<AuthFlowController>) -> Self {
        Self { flow }
    }

    /// The signed-in user, from the configured identity endpoint
    pub async fn whoami(&self, session: &SessionId) -> Result<UserInfo, FlowError> {
        let path = self.flow.config().identity_path.clone();
        let response = self.expect(session, ApiMethod::Get, &path, None, OK).await?;
        Ok(response.decode()?)
    }

    /// One page of events (`page` is 1-based, omitted for the first page)
    pub async fn list_events(
        &self,
        session: &SessionId,
        page: Option<u32>,
    ) -> Result<Vec<Event>, FlowError> {
        let mut path = self.collection_path();
        if let Some(page) = page {
            path.push_str(&format!("?page={page}"));
        }
        let response = self.expect(session, ApiMethod::Get, &path, None, OK).await?;
        Ok(response.decode::<Collection<Event>>()?.into_items())
    }

    pub async fn get_event(&self, session: &SessionId, id: EventId) -> Result<Event, FlowError> {
        let response = self.expect(session, ApiMethod::Get, &self.event_path(id, ""), None, OK).await?;
        Ok(response.decode()?)
    }

    /// Create an event; the server makes the caller its organizer.
    pub async fn create_event(
        &self,
        session: &SessionId,
        payload: &EventPayload,
    ) -> Result<Event, FlowError> {
        payload.validate()?;
        let body = payload.to_value()?;
        let response =
            self.expect(session, ApiMethod::Post, &self.collection_path(), Some(&body), CREATED).await?;
        Ok(response.decode()?)
    }

    /// Full update (PUT)
    pub async fn update_event(
        &self,
        session: &SessionId,
        id: EventId,
        payload: &EventPayload,
    ) -> Result<Event, FlowError> {
        payload.validate()?;
        let body = payload.to_value()?;
        let response =
            self.expect(session, ApiMethod::Put, &self.event_path(id, ""), Some(&body), OK).await?;
        Ok(response.decode()?)
    }

    /// Partial update (PATCH) of the given fields only
    pub async fn patch_event(
        &self,
        session: &SessionId,
        id: EventId,
        fields: &Map<String, Value>,
    ) -> Result<Event, FlowError> {
        if fields.is_empty() {
            return Err(FlowError::InvalidInput("no fields to update".to_string()));
        }
        let body = Value::Object(fields.clone());
        let response =
            self.expect(session, ApiMethod::Patch, &self.event_path(id, ""), Some(&body), OK).await?;
        Ok(response.decode()?)
    }

    pub async fn delete_event(&self, session: &SessionId, id: EventId) -> Result<(), FlowError> {
        self.expect(session, ApiMethod::Delete, &self.event_path(id, ""), None, NO_CONTENT).await?;
        Ok(())
    }

    /// Register the signed-in user; the server may place them on the waitlist.
    pub async fn register(
        &self,
        session: &SessionId,
        id: EventId,
        answers: Value,
    ) -> Result<Registration, FlowError> {
        let body = json!({ "answers": answers });
        let response = self
            .expect(session, ApiMethod::Post, &self.event_path(id, "register/"), Some(&body), &[200, 201])
            .await?;
        Ok(response.decode()?)
    }

    /// Cancel the signed-in user's registration. 404 means not registered.
    pub async fn unregister(&self, session: &SessionId, id: EventId) -> Result<(), FlowError> {
        let empty = Value::Object(Map::new());
        self.expect(
            session,
            ApiMethod::Post,
            &self.event_path(id, "unregister/"),
            Some(&empty),
            &[200, 204],
        )
        .await?;
        Ok(())
    }

    pub async fn my_registrations(&self, session: &SessionId) -> Result<Vec<Registration>, FlowError> {
        let path = self.flow.config().api_resource_path(REGISTRATIONS_COLLECTION);
        let response = self.expect(session, ApiMethod::Get, &path, None, OK).await?;
        Ok(response.decode::<Collection<Registration>>()?.into_items())
    }

    /// Registrations of an event; the server answers 403 unless the caller
    /// organizes it.
    pub async fn event_registrations(
        &self,
        session: &SessionId,
        id: EventId,
    ) -> Result<Vec<Registration>, FlowError> {
        let response = self
            .expect(session, ApiMethod::Get, &self.event_path(id, "registrations/"), None, OK)
            .await?;
        Ok(response.decode::<Collection<Registration>>()?.into_items())
    }

    /// Public page of the event, when the server assigned it a slug
    #[must_use]
    pub fn share_url(&self, event: &Event) -> Option<String> {
        event
            .slug
            .as_deref()
            .filter(|slug| !slug.is_empty())
            .map(|slug| self.flow.config().event_share_url(slug))
    }

    /// Whether edit/delete controls should be offered for `event`.
    ///
    /// Display-level only; the server enforces ownership on its own.
    #[must_use]
    pub fn can_modify(event: &Event, me: &UserInfo) -> bool {
        event.is_organized_by(me.id)
    }

    fn collection_path(&self) -> String {
        self.flow.config().api_resource_path(EVENTS_COLLECTION)
    }

    fn event_path(&self, id: EventId, action: &str) -> String {
        self.flow.config().api_resource_path(&format!("{EVENTS_COLLECTION}{id}/{action}"))
    }

    async fn expect(
        &self,
        session: &SessionId,
        method: ApiMethod,
        path: &str,
        body: Option<&Value>,
        accepted: &[u16],
    ) -> Result<ApiResponse, FlowError> {
        let response = self.flow.call(session, method, path, body).await?;
        if accepted.contains(&response.status) {
            debug!(status = response.status, path = %path, "request accepted");
            return Ok(response);
        }
        warn!(status = response.status, method = %method, path = %path, "request rejected");
        Err(FlowError::Rejected { status: response.status, body: response.body })
    }
}
