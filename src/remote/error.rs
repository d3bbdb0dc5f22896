//! Classification of non-2xx responses from the clinic API.

use std::fmt;

use http::StatusCode;
use serde::Deserialize;

use crate::error::ConsoleError;

/// A non-2xx response from the API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    pub fn with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Build from a response body. JSON bodies of the form
    /// `{"message": ...}` or `{"error": ...}` are unwrapped; anything else is
    /// used as-is, falling back to the status reason.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error));

        let message = match parsed {
            Some(message) => message,
            None if !body.trim().is_empty() => body.trim().to_string(),
            None => status.canonical_reason().unwrap_or("Unknown").to_string(),
        };

        Self::with_status(message, status)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status.as_u16())
    }
}

impl From<ApiError> for ConsoleError {
    fn from(error: ApiError) -> Self {
        if error.is_unauthorized() {
            return ConsoleError::Unauthorized(error.message);
        }
        ConsoleError::Api {
            status: error.status.as_u16(),
            message: error.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_message_is_unwrapped() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"message": "queue entry not found"}"#,
        );
        assert_eq!(err.message, "queue entry not found");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_field_is_unwrapped() {
        let err = ApiError::from_body(StatusCode::NOT_FOUND, r#"{"error": "no such doctor"}"#);
        assert_eq!(err.message, "no such doctor");
    }

    #[test]
    fn test_plain_body_and_empty_body() {
        let err = ApiError::from_body(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(err.message, "upstream down");

        let err = ApiError::from_body(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.message, "Internal Server Error");
        assert!(err.is_server_error());
    }

    #[test]
    fn test_unauthorized_maps_to_unauthorized() {
        let err: ConsoleError = ApiError::from_body(StatusCode::UNAUTHORIZED, "").into();
        assert!(matches!(err, ConsoleError::Unauthorized(_)));

        let err: ConsoleError = ApiError::from_body(StatusCode::FORBIDDEN, "nope").into();
        assert!(matches!(err, ConsoleError::Unauthorized(ref m) if m == "nope"));
    }

    #[test]
    fn test_other_status_maps_to_api_error() {
        let err: ConsoleError = ApiError::from_body(StatusCode::CONFLICT, "taken").into();
        match err {
            ConsoleError::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "taken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_includes_status() {
        let err = ApiError::with_status("bad", StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "bad (400)");
    }
}
