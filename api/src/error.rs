//! Error taxonomy for API calls.
//!
//! ERROR HANDLING
//! ==============
//! Auth failures are resolved inside [`crate::ApiClient`] (refresh, retry, or
//! forced logout). Everything else surfaces here so views can pick between a
//! visible message (validation) and a silent no-op (likes, search, polling).

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

use crate::transport::TransportError;

/// Non-success HTTP response with its parsed error body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("HTTP {status}: {body}")]
pub struct HttpError {
    pub status: u16,
    /// Parsed JSON error body, or `{"detail": "Unknown error"}` when unparseable.
    pub body: Value,
}

impl HttpError {
    /// Build from a raw response body, substituting the generic detail when
    /// the body is not JSON.
    #[must_use]
    pub fn from_body(status: u16, raw: &str) -> Self {
        let body = serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({ "detail": "Unknown error" }));
        Self { status, body }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Flatten a per-field error structure into one message.
    ///
    /// `{"username": ["taken"], "password": ["too short", "too common"]}`
    /// becomes `"taken too short too common"`. Returns `None` when the body
    /// carries no string leaves.
    #[must_use]
    pub fn flattened_message(&self) -> Option<String> {
        let mut parts = Vec::new();
        collect_strings(&self.body, &mut parts);
        if parts.is_empty() { None } else { Some(parts.join(" ")) }
    }
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Errors produced by [`crate::ApiClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Authorization failed and could not be refreshed; the session was
    /// cleared and the call abandoned.
    #[error("session expired")]
    SessionExpired,

    /// The response body did not match the expected schema.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// A body was expected but the server returned none.
    #[error("response body was empty")]
    EmptyBody,

    /// Input rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// The HTTP error, when this failure came from a server response.
    #[must_use]
    pub fn http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.http().is_some_and(HttpError::is_not_found)
    }

    /// Message suitable for showing under a form.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Http(err) => err.flattened_message().unwrap_or_else(|| fallback.to_owned()),
            _ => fallback.to_owned(),
        }
    }
}
