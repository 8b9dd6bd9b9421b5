//! Typed event and registration operations over the authenticated API

pub mod service;

pub use service::EventsService;
