//! Backend error taxonomy
//!
//! Every failure talking to the studio backend is reduced to one of these
//! variants. Structured validation errors (`{"detail": [{"loc": .., "msg": ..}]}`)
//! are kept field by field so callers can branch on them; everything else is
//! collapsed to a status and an optional server message.

use serde_json::Value;
use thiserror::Error;

/// A single rejected field from a validation response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. `rooms.0.area`), empty if unknown
    pub field: String,
    pub message: String,
}

/// Errors that can occur when calling the studio backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, DNS failure or timeout
    #[error("backend unreachable: {0}")]
    NetworkUnreachable(String),

    /// Request rejected by server-side validation
    #[error("request rejected: {}", join_messages(.0))]
    ValidationRejected(Vec<FieldError>),

    /// Non-success status with an optional `detail` message
    #[error("server error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    ServerError { status: u16, detail: Option<String> },

    /// 404 for the requested resource
    #[error("not found: {0}")]
    NotFound(String),

    /// Anything else, including undecodable response bodies
    #[error("unexpected backend error: {0}")]
    Unknown(String),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApiError {
    /// Build an error from a non-success status and its raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("detail").cloned());

        match (status, detail) {
            (_, Some(Value::Array(items))) => {
                ApiError::ValidationRejected(items.iter().map(field_error).collect())
            }
            (404, Some(Value::String(message))) => ApiError::NotFound(message),
            (404, _) => ApiError::NotFound(body.trim().to_string()),
            (status, Some(Value::String(message))) => ApiError::ServerError {
                status,
                detail: Some(message),
            },
            (status, _) => ApiError::ServerError {
                status,
                detail: None,
            },
        }
    }

    /// Whether this is a 404, which read-type lookups treat as absence
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Validation errors, if the server returned a structured list
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            ApiError::ValidationRejected(errors) => Some(errors),
            _ => None,
        }
    }

    /// Reduce to one human-readable line for inline display
    ///
    /// Structured validation messages are joined with `", "`, a plain server
    /// `detail` is shown as-is, everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::ValidationRejected(errors) if !errors.is_empty() => join_messages(errors),
            ApiError::ServerError {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

fn field_error(item: &Value) -> FieldError {
    let message = item
        .get("msg")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| item.to_string());

    // FastAPI locations start with where the value came from ("body", "query")
    let field = item
        .get("loc")
        .and_then(Value::as_array)
        .map(|loc| {
            loc.iter()
                .filter(|part| !matches!(part.as_str(), Some("body" | "query" | "path")))
                .map(|part| match part {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_default();

    FieldError { field, message }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::NetworkUnreachable(err.to_string())
        } else if err.is_decode() {
            ApiError::Unknown(format!("invalid response body: {err}"))
        } else if let Some(status) = err.status() {
            ApiError::ServerError {
                status: status.as_u16(),
                detail: None,
            }
        } else if err.is_request() {
            ApiError::NetworkUnreachable(err.to_string())
        } else {
            ApiError::Unknown(err.to_string())
        }
    }
}
