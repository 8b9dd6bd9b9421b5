//! Session storage with idle expiry

pub mod expiring;

pub use expiring::ExpiringSessionStore;
