//! Response mapping.
//!
//! # Responsibilities
//! - Map every per-request failure to exactly one status code
//! - Keep client-facing messages generic; internal detail is only logged
//!
//! # Design Decisions
//! - JSON bodies everywhere: `{"success":true}` or `{"error": "..."}`
//! - CORS headers are added by the dispatcher, not here

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::mail::{FormError, MailError};

/// Per-request failure.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("no route for request")]
    NotFound,

    #[error("origin is not configured")]
    UnknownOrigin,

    #[error("client exceeded its request budget")]
    RateLimited,

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("invalid form data: {0}")]
    InvalidForm(#[from] FormError),

    #[error("mail delivery failed: {0}")]
    MailTransport(#[from] MailError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::UnknownOrigin => StatusCode::FORBIDDEN,
            RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::MalformedJson(_) | RelayError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            RelayError::MailTransport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::NotFound => "Not found".to_string(),
            RelayError::UnknownOrigin => "Forbidden".to_string(),
            RelayError::RateLimited => "Too many requests".to_string(),
            RelayError::PayloadTooLarge => "Payload too large".to_string(),
            RelayError::MalformedJson(_) => "Invalid JSON".to_string(),
            RelayError::InvalidForm(e) => format!("Invalid form data: {e}"),
            RelayError::MailTransport(_) => "Failed to send email".to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// `200 {"success":true}`.
pub fn sent() -> Response {
    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}

/// `204` with no body, for preflight requests.
pub fn preflight() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(RelayError::UnknownOrigin.status(), StatusCode::FORBIDDEN);
        assert_eq!(RelayError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            RelayError::InvalidForm(FormError::InvalidEmail).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_public_message_hides_detail() {
        let err: RelayError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.public_message(), "Invalid JSON");

        let err = RelayError::InvalidForm(FormError::Empty("name"));
        assert_eq!(err.public_message(), "Invalid form data: `name` must not be empty");
    }
}
