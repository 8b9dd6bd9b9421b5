//! Domain types and models
//!
//! The transport layer treats resource bodies as opaque JSON; the typed views
//! here are layered on top by the services that need them.

pub mod api;
pub mod event;
pub mod user;

pub use api::{ApiMethod, ApiResponse, Collection, ResponseBody};
pub use event::{Event, EventId, EventPayload, Registration, RegistrationStatus};
pub use user::{UserId, UserInfo};
