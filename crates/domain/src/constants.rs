//! Application constants
//!
//! Centralized location for the provider endpoints and defaults used by the
//! EventHorizon client.

// Django OAuth Toolkit endpoints
pub const DEFAULT_AUTHORIZE_PATH: &str = "/o/authorize/";
pub const DEFAULT_TOKEN_PATH: &str = "/o/token/";

// Resource API router
pub const DEFAULT_API_PATH: &str = "/api/";
pub const EVENTS_COLLECTION: &str = "events/";
pub const REGISTRATIONS_COLLECTION: &str = "registrations/";

// Scopes requested by the reference clients
pub const DEFAULT_SCOPES: &[&str] = &["openid", "read", "write"];

// Network and session bounds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

// PKCE (RFC 7636 §4.2)
pub const PKCE_CHALLENGE_METHOD: &str = "S256";
