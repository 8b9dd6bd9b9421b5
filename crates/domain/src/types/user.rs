//! User identity types
//!
//! Shape of the identity endpoint response and of nested organizer /
//! participant objects in event payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type UserId = i64;

/// Authenticated user as reported by the identity endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Fields this client does not model (e.g. nested `profile`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    /// "First Last" when either is set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        let full = format!("{first} {last}");
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
