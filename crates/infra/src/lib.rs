//! # EventHorizon Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP client construction (timeouts, TLS)
//! - Token endpoint and resource API adapters
//! - Session store with idle expiry
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `eventhorizon-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod oauth;
pub mod observability;
pub mod session;

// Re-export commonly used items
pub use api::ApiClient;
pub use errors::InfraError;
pub use http::{BufferedResponse, HttpClient, HttpClientBuilder, TransportError};
pub use oauth::TokenExchangeClient;
pub use observability::{init_tracing, LogFormat};
pub use session::ExpiringSessionStore;
