//! Outer response envelope of the resource API

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{HorizonError, Result};

/// HTTP methods supported against the resource API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl ApiMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether a request body is attached for this method
    #[must_use]
    pub const fn sends_body(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded response body.
///
/// A body that is not valid JSON is kept as raw bytes instead of being
/// coerced to `null`, so callers can tell "absent" from "unparseable".
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No body (204, or whitespace only)
    Empty,
    /// Valid JSON document
    Json(Value),
    /// Anything else, byte for byte
    Raw(Vec<u8>),
}

impl ResponseBody {
    /// Classify raw response bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        serde_json::from_slice(bytes).map_or_else(|_| Self::Raw(bytes.to_vec()), Self::Json)
    }

    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Top-level field of a JSON object body
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_json().and_then(|value| value.get(name))
    }

    /// Lossy text rendering for diagnostics and error messages.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Json(value) => value.to_string(),
            Self::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Status code plus decoded body of one resource API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    #[must_use]
    pub const fn new(status: u16, body: ResponseBody) -> Self {
        Self { status, body }
    }

    /// 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// 401, the token was rejected
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Deserialize the body into a typed view.
    ///
    /// # Errors
    /// Returns `HorizonError::Decode` when the body is raw bytes or does not
    /// match the expected shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = match &self.body {
            ResponseBody::Json(value) => value.clone(),
            ResponseBody::Empty => Value::Null,
            ResponseBody::Raw(bytes) => {
                return Err(HorizonError::Decode(format!(
                    "expected JSON body, got {} raw bytes",
                    bytes.len()
                )))
            }
        };
        serde_json::from_value(value).map_err(|e| HorizonError::Decode(e.to_string()))
    }
}

/// Collection payload: either a bare array or a DRF page object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Collection<T> {
    Page {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
    },
    Items(Vec<T>),
}

impl<T> Collection<T> {
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Page { results, .. } => results,
            Self::Items(items) => items,
        }
    }
}
