use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of gateway errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// HTTP status error (4xx, 5xx) other than an authorization rejection
    HttpStatus,
    /// Authorization rejected (expired, invalid, or missing token)
    Unauthorized,
    /// Connection failure or request timeout
    Timeout,
    /// Failed to parse the response body
    Parse,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayErrorKind::HttpStatus => write!(f, "http_status"),
            GatewayErrorKind::Unauthorized => write!(f, "unauthorized"),
            GatewayErrorKind::Timeout => write!(f, "timeout"),
            GatewayErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the backend gateway with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error category
    pub kind: GatewayErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl GatewayError {
    /// Creates a new gateway error.
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error.
    ///
    /// 401 responses are classified as `Unauthorized` — the global
    /// session-invalid signal handled by the session store.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = if status == 401 {
            GatewayErrorKind::Unauthorized
        } else {
            GatewayErrorKind::HttpStatus
        };

        let message = format!("HTTP {}", status);
        let details = if body.is_empty() {
            None
        } else {
            // Try to extract a cleaner error message from JSON
            if let Ok(json) = serde_json::from_str::<Value>(body)
                && let Some(msg) = json
                    .get("message")
                    .or_else(|| json.get("error"))
                    .and_then(|v| v.as_str())
            {
                return Self {
                    kind,
                    message: format!("HTTP {}: {}", status, msg),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind,
            message,
            details,
        }
    }

    /// Creates a timeout / connection error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    /// Creates a response-parsing error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Parse, message)
    }

    /// Returns true if this error is the global session-invalid signal.
    pub fn is_unauthorized(&self) -> bool {
        self.kind == GatewayErrorKind::Unauthorized
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: 401 responses classify as Unauthorized.
    #[test]
    fn test_401_is_unauthorized() {
        let err = GatewayError::http_status(401, "");
        assert_eq!(err.kind, GatewayErrorKind::Unauthorized);
        assert!(err.is_unauthorized());
    }

    /// Test: other statuses classify as HttpStatus.
    #[test]
    fn test_other_statuses_are_http_status() {
        for status in [400, 403, 404, 409, 500] {
            let err = GatewayError::http_status(status, "");
            assert_eq!(err.kind, GatewayErrorKind::HttpStatus, "status {status}");
            assert!(!err.is_unauthorized());
        }
    }

    /// Test: message is extracted from a JSON error body.
    #[test]
    fn test_message_extracted_from_json_body() {
        let err = GatewayError::http_status(400, r#"{"message": "setup already complete"}"#);
        assert_eq!(err.message, "HTTP 400: setup already complete");
        assert!(err.details.is_some());
    }

    /// Test: non-JSON bodies are kept as details.
    #[test]
    fn test_plain_body_kept_as_details() {
        let err = GatewayError::http_status(500, "boom");
        assert_eq!(err.message, "HTTP 500");
        assert_eq!(err.details.as_deref(), Some("boom"));
    }
}
