//! Redirect callback parameters

use url::form_urlencoded;

/// Query parameters the authorization server appends to the redirect URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Successful redirect carrying a code
    #[must_use]
    pub fn with_code(code: impl Into<String>, state: Option<String>) -> Self {
        Self { code: Some(code.into()), state, ..Self::default() }
    }

    /// Parse a raw query string (with or without the leading `?`)
    ///
    /// Values are percent-decoded. Unknown parameters are ignored; for
    /// repeated ones the first occurrence wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match name.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}
