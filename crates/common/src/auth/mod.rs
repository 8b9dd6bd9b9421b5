//! OAuth 2.0 Authorization Code + PKCE building blocks
//!
//! Everything here is transport-agnostic: the HTTP adapters live in
//! `eventhorizon-infra` and the flow itself in `eventhorizon-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  AuthFlowController  │  (eventhorizon-core)
//! └──────────┬───────────┘
//!            │
//!            ├──► PkcePair          (verifier / challenge generation)
//!            ├──► SessionStore      (verifier + token across the redirect)
//!            └──► ExchangeError     (token endpoint failure taxonomy)
//! ```
//!
//! # Module Organization
//!
//! - **[`pkce`]**: PKCE pair and CSRF state generation
//! - **[`types`]**: `AccessToken`, OAuth error bodies, `ExchangeError`
//! - **`session`**: `SessionStore` trait and `MemorySessionStore` (`runtime`)
//!
//! # Security Features
//!
//! - **PKCE**: S256 challenge, verifier drawn from the OS random source
//! - **No weak fallback**: entropy failure aborts the login attempt
//! - **Redaction**: verifier, token and client secret never appear in `Debug`
//!   or error `Display`

pub mod pkce;
#[cfg(feature = "runtime")]
pub mod session;
pub mod types;

pub use pkce::{challenge_for, generate_state, random_token, PkceError, PkcePair};
#[cfg(feature = "runtime")]
pub use session::{MemorySessionStore, SessionError, SessionId, SessionKey, SessionStore};
pub use types::{AccessToken, BoxError, ExchangeError, OAuthErrorBody};
