//! Event and registration resources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{HorizonError, Result};
use crate::impl_wire_enum_conversions;
use crate::types::user::UserInfo;

pub type EventId = i64;

/// Event as returned by the resource API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Read-only; set by the server to the creating user
    #[serde(default)]
    pub organizer: Option<UserInfo>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_registered: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Whether `user_id` is the organizer of this event.
    #[must_use]
    pub fn is_organized_by(&self, user_id: crate::UserId) -> bool {
        self.organizer.as_ref().is_some_and(|organizer| organizer.id == user_id)
    }
}

/// Writable event fields, used for create (POST) and full update (PUT)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl EventPayload {
    /// Local sanity checks; the server stays the source of truth.
    ///
    /// # Errors
    /// Returns `HorizonError::InvalidInput` for an empty title or an end time
    /// before the start time.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(HorizonError::InvalidInput("event title must not be empty".to_string()));
        }
        if self.end_time < self.start_time {
            return Err(HorizonError::InvalidInput(
                "event end_time must not be before start_time".to_string(),
            ));
        }
        Ok(())
    }

    /// JSON object form used as the request body.
    ///
    /// # Errors
    /// Returns `HorizonError::Internal` if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| HorizonError::Internal(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    Waitlisted,
    Cancelled,
    #[serde(other)]
    Other,
}

impl_wire_enum_conversions!(RegistrationStatus {
    Registered => "registered",
    Waitlisted => "waitlisted",
    Cancelled => "cancelled",
    Other => "other",
});

/// Registration of a participant for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    #[serde(default)]
    pub event: Option<EventId>,
    #[serde(default)]
    pub event_title: Option<String>,
    #[serde(default)]
    pub participant_info: Option<UserInfo>,
    #[serde(default)]
    pub status: Option<RegistrationStatus>,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}
