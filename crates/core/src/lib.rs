//! # EventHorizon Core
//!
//! Authentication flow and resource operations - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port interfaces for the token endpoint and the resource API
//! - The login state machine (`AuthFlowController`)
//! - Typed event/registration operations (`EventsService`)
//!
//! ## Architecture Principles
//! - Only depends on `eventhorizon-common` and `eventhorizon-domain`
//! - No HTTP or storage code
//! - All external dependencies via traits

pub mod auth;
pub mod events;
pub mod ports;

// Re-export specific items to avoid ambiguity
pub use auth::{
    AuthFlowController, CallbackParams, FlowError, LoginRedirect, SessionState,
};
pub use events::EventsService;
pub use ports::{Entropy, ExchangeRequest, OsEntropy, ResourceApi, TokenExchanger};
