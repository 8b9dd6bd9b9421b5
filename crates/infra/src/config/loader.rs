//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Environment variables, when every required one is set
//! 2. Otherwise a config file, either given explicitly or probed
//! 3. JSON and TOML are both accepted (detected by extension)
//!
//! Every loaded configuration passes [`ClientConfig::validate`].
//!
//! ## Environment Variables
//! Required:
//! - `EVENTHORIZON_CLIENT_ID`
//! - `EVENTHORIZON_CLIENT_SECRET`
//! - `EVENTHORIZON_BASE_URL`
//! - `EVENTHORIZON_REDIRECT_URI`
//! - `EVENTHORIZON_IDENTITY_PATH`
//! - `EVENTHORIZON_BODY_ENCODING`: `form` or `json`
//!
//! Optional:
//! - `EVENTHORIZON_AUTHORIZE_PATH`, `EVENTHORIZON_TOKEN_PATH`,
//!   `EVENTHORIZON_API_PATH`
//! - `EVENTHORIZON_SCOPES`: space-separated
//! - `EVENTHORIZON_TIMEOUT_SECS`, `EVENTHORIZON_SESSION_TTL_SECS`
//!
//! ## File Locations
//! Probed in order, first match wins:
//! 1. `./eventhorizon.{json,toml}`, then `./config.{json,toml}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use eventhorizon_domain::{BodyEncoding, ClientConfig, HorizonError, Result};

const FILE_STEMS: &[&str] = &["eventhorizon", "config"];
const EXTENSIONS: &[&str] = &["json", "toml"];

/// Required environment variables; all must be set for the env path
const REQUIRED_ENV: &[&str] = &[
    "EVENTHORIZON_CLIENT_ID",
    "EVENTHORIZON_CLIENT_SECRET",
    "EVENTHORIZON_BASE_URL",
    "EVENTHORIZON_REDIRECT_URI",
    "EVENTHORIZON_IDENTITY_PATH",
    "EVENTHORIZON_BODY_ENCODING",
];

/// Load configuration, preferring the environment over files.
///
/// The file is only consulted when a required variable is unset. A complete
/// but invalid environment is an error, not a reason to fall back.
///
/// # Errors
/// Returns `HorizonError::Config` when the environment is complete but
/// invalid, or when no file yields a valid configuration.
pub fn load() -> Result<ClientConfig> {
    let missing: Vec<&str> =
        REQUIRED_ENV.iter().copied().filter(|key| std::env::var(key).is_err()).collect();

    if missing.is_empty() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!(missing = ?missing, "Environment incomplete, trying config file");
    load_from_file(None)
}

/// Load configuration from `EVENTHORIZON_*` environment variables.
///
/// # Errors
/// Returns `HorizonError::Config` if a required variable is missing or a
/// value fails to parse or validate.
pub fn load_from_env() -> Result<ClientConfig> {
    let body_encoding = env_var("EVENTHORIZON_BODY_ENCODING")?
        .parse::<BodyEncoding>()
        .map_err(HorizonError::Config)?;

    let mut config = ClientConfig::new(
        env_var("EVENTHORIZON_CLIENT_ID")?,
        env_var("EVENTHORIZON_CLIENT_SECRET")?,
        env_var("EVENTHORIZON_BASE_URL")?,
        env_var("EVENTHORIZON_REDIRECT_URI")?,
        env_var("EVENTHORIZON_IDENTITY_PATH")?,
        body_encoding,
    );

    if let Some(path) = env_opt("EVENTHORIZON_AUTHORIZE_PATH") {
        config.authorize_path = path;
    }
    if let Some(path) = env_opt("EVENTHORIZON_TOKEN_PATH") {
        config.token_path = path;
    }
    if let Some(path) = env_opt("EVENTHORIZON_API_PATH") {
        config.api_path = path;
    }
    if let Some(scopes) = env_opt("EVENTHORIZON_SCOPES") {
        config.scopes = scopes.split_whitespace().map(str::to_string).collect();
    }
    if let Some(secs) = env_u64("EVENTHORIZON_TIMEOUT_SECS")? {
        config.timeout_secs = secs;
    }
    if let Some(secs) = env_u64("EVENTHORIZON_SESSION_TTL_SECS")? {
        config.session_ttl_secs = secs;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file.
///
/// If `path` is `None`, [`probe_config_paths`] picks the file.
///
/// # Errors
/// Returns `HorizonError::Config` if the file is missing, unreadable,
/// malformed or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HorizonError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HorizonError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HorizonError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| HorizonError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| HorizonError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(HorizonError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file.
///
/// Returns the first existing candidate, or `None`.
#[must_use]
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
        dirs.push(cwd.join("../.."));
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| {
            FILE_STEMS.iter().flat_map(move |stem| {
                EXTENSIONS.iter().map(move |ext| dir.join(format!("{stem}.{ext}")))
            })
        })
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| HorizonError::Config(format!("Missing required environment variable: {key}")))
}

/// Unset and blank values both count as absent.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    env_opt(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| HorizonError::Config(format!("Invalid {key}: {e}")))
        })
        .transpose()
}
