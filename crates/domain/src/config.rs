//! Client configuration
//!
//! Static settings for one registered OAuth application on an EventHorizon
//! instance: credentials, redirect URI, endpoint paths and wire format.
//! Loading lives in `eventhorizon-infra`; this module only defines the shape
//! and its invariants.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_PATH, DEFAULT_AUTHORIZE_PATH, DEFAULT_SCOPES, DEFAULT_SESSION_TTL_SECS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_PATH,
};
use crate::errors::{HorizonError, Result};
use crate::impl_wire_enum_conversions;

/// Encoding used for request bodies sent to the resource API.
///
/// The EventHorizon deployments disagree on this (the PHP dashboard posts
/// form fields, the CLI posts JSON), so it is always configured explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// `application/x-www-form-urlencoded`
    Form,
    /// `application/json`
    Json,
}

impl_wire_enum_conversions!(BodyEncoding {
    Form => "form",
    Json => "json",
});

/// Configuration for the EventHorizon OAuth client
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// OAuth client ID from the Django OAuth Toolkit application
    pub client_id: String,

    /// OAuth client secret (confidential client)
    pub client_secret: String,

    /// Base URL of the EventHorizon instance (e.g. `http://127.0.0.1:8000`)
    pub base_url: String,

    /// Redirect URI registered for this client
    pub redirect_uri: String,

    /// Path of the "who am I" endpoint. Deployments expose this at different
    /// paths (`/accounts/api/me/`, `/api/users/me/`), so it has no default.
    pub identity_path: String,

    /// Wire format for resource API request bodies
    pub body_encoding: BodyEncoding,

    #[serde(default = "default_authorize_path")]
    pub authorize_path: String,

    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Prefix of the resource API router
    #[serde(default = "default_api_path")]
    pub api_path: String,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Upper bound for every outbound HTTP call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Idle lifetime of a server-side session
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_authorize_path() -> String {
    DEFAULT_AUTHORIZE_PATH.to_string()
}

fn default_token_path() -> String {
    DEFAULT_TOKEN_PATH.to_string()
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

impl ClientConfig {
    /// Create a configuration with default endpoint paths, scopes and limits.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
        redirect_uri: impl Into<String>,
        identity_path: impl Into<String>,
        body_encoding: BodyEncoding,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: base_url.into(),
            redirect_uri: redirect_uri.into(),
            identity_path: identity_path.into(),
            body_encoding,
            authorize_path: default_authorize_path(),
            token_path: default_token_path(),
            api_path: default_api_path(),
            scopes: default_scopes(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }

    /// Check the invariants the rest of the client relies on.
    ///
    /// # Errors
    /// Returns `HorizonError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("client_id", &self.client_id)?;
        require_non_empty("client_secret", &self.client_secret)?;
        require_non_empty("identity_path", &self.identity_path)?;
        require_http_url("base_url", &self.base_url)?;
        require_http_url("redirect_uri", &self.redirect_uri)?;

        if self.scopes.iter().any(|scope| scope.trim().is_empty() || scope.contains(' ')) {
            return Err(HorizonError::Config(
                "scopes must be non-empty and must not contain spaces".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(HorizonError::Config("timeout_secs must be greater than zero".to_string()));
        }
        if self.session_ttl_secs == 0 {
            return Err(HorizonError::Config(
                "session_ttl_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Authorization endpoint the user agent is redirected to
    #[must_use]
    pub fn authorize_url(&self) -> String {
        self.endpoint(&self.authorize_path)
    }

    /// Token endpoint used for the code exchange
    #[must_use]
    pub fn token_url(&self) -> String {
        self.endpoint(&self.token_path)
    }

    /// Absolute URL for the identity endpoint
    #[must_use]
    pub fn identity_url(&self) -> String {
        self.endpoint(&self.identity_path)
    }

    /// Path (relative to `base_url`) of a resource under the API router,
    /// e.g. `api_resource_path("events/7/")` → `/api/events/7/`.
    #[must_use]
    pub fn api_resource_path(&self, relative: &str) -> String {
        join_path(&self.api_path, relative)
    }

    /// Resolve a path against `base_url`; absolute URLs pass through.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if is_absolute_url(path) {
            return path.to_string();
        }
        join_path(&self.base_url, path)
    }

    /// Public page of an event, as shared from the dashboard.
    #[must_use]
    pub fn event_share_url(&self, slug: &str) -> String {
        self.endpoint(&format!("/events/{slug}"))
    }

    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// Timeout applied to every outbound request
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Idle lifetime of a session
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("identity_path", &self.identity_path)
            .field("body_encoding", &self.body_encoding)
            .field("authorize_path", &self.authorize_path)
            .field("token_path", &self.token_path)
            .field("api_path", &self.api_path)
            .field("scopes", &self.scopes)
            .field("timeout_secs", &self.timeout_secs)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}

/// `true` for `http://` and `https://` URLs.
#[must_use]
pub fn is_absolute_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn join_path(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HorizonError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_http_url(field: &str, value: &str) -> Result<()> {
    require_non_empty(field, value)?;
    if !is_absolute_url(value) {
        return Err(HorizonError::Config(format!("{field} must be an http(s) URL: {value}")));
    }
    Ok(())
}
