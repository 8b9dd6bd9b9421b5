//! Common auth building blocks shared across EventHorizon crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: PKCE generation, access token and token-endpoint error types
//! - `runtime`: async session store trait and the in-memory store
//! - `test-utils`: session store doubles for failure-path tests
//! - `observability`: tracing (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "test-utils")]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use auth::{AccessToken, ExchangeError, OAuthErrorBody, PkceError, PkcePair};
#[cfg(feature = "runtime")]
pub use auth::{MemorySessionStore, SessionError, SessionId, SessionKey, SessionStore};
