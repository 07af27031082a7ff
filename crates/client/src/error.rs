//! Errors raised by the HTTP adapter and the client-side stores.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Coarse classification of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    ServerFault,
    NetworkUnreachable,
    ClientConfigError,
    ValidationRejected,
    Decode,
}

impl ApiErrorKind {
    /// Kind of a non-2xx response status.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            500..=599 => ApiErrorKind::ServerFault,
            _ => ApiErrorKind::ValidationRejected,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} {reason}")]
    Status {
        kind: ApiErrorKind,
        status: u16,
        reason: String,
        /// Parsed JSON error body, when the server sent one.
        body: Option<Value>,
    },

    /// No response: connection refused, DNS failure, timeout.
    #[error("network unreachable: {0}")]
    Network(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    ClientConfig(String),

    /// A 2xx response whose body does not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status_error(status: StatusCode, body: Option<Value>) -> Self {
        ApiError::Status {
            kind: ApiErrorKind::from_status(status),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Status { kind, .. } => *kind,
            ApiError::Network(_) => ApiErrorKind::NetworkUnreachable,
            ApiError::ClientConfig(_) => ApiErrorKind::ClientConfigError,
            ApiError::Decode(_) => ApiErrorKind::Decode,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ApiErrorKind::Unauthorized
    }

    /// `detail` field of the error body (the REST framework's error text).
    pub fn detail(&self) -> Option<&str> {
        self.body_field("detail")
    }

    /// `message` field of the error body (custom API actions).
    pub fn server_message(&self) -> Option<&str> {
        self.body_field("message")
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    fn body_field(&self, field: &str) -> Option<&str> {
        self.body()
            .and_then(|b| b.get(field))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::ClientConfig(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_statuses() {
        let cases = [
            (401, ApiErrorKind::Unauthorized),
            (403, ApiErrorKind::Forbidden),
            (404, ApiErrorKind::NotFound),
            (500, ApiErrorKind::ServerFault),
            (503, ApiErrorKind::ServerFault),
            (400, ApiErrorKind::ValidationRejected),
            (409, ApiErrorKind::ValidationRejected),
        ];
        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(ApiErrorKind::from_status(status), kind, "status {code}");
        }
    }

    #[test]
    fn exposes_detail_and_message() {
        let err = ApiError::status_error(
            StatusCode::BAD_REQUEST,
            Some(json!({"detail": "Credenciales incompletas", "message": "  "})),
        );
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.detail(), Some("Credenciales incompletas"));
        assert_eq!(err.server_message(), None);
        assert_eq!(err.to_string(), "HTTP 400 Bad Request");

        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.kind(), ApiErrorKind::NetworkUnreachable);
        assert!(err.detail().is_none());
    }
}
