//! Structured errors for the vitrine HTTP API.
//!
//! Every failure is rendered as `{"error": {"type": ..., "message": ...}}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Errors returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed body or a request the coordinator rejected.
    #[error("Bad input data")]
    BadInput,

    /// The crawl backing the request failed.
    #[error("{0}")]
    RequestFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadInput => StatusCode::BAD_REQUEST,
            ApiError::RequestFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadInput => "bad_input",
            ApiError::RequestFailed(_) => "request_failed",
        }
    }
}

impl From<vitrine_core::Error> for ApiError {
    fn from(err: vitrine_core::Error) -> Self {
        match err {
            vitrine_core::Error::BadInput(_) => ApiError::BadInput,
            vitrine_core::Error::ServiceFailed(message) => ApiError::RequestFailed(message),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "search request failed");
        }
        let body = ErrorEnvelope { error: ErrorBody { kind: self.kind(), message: self.to_string() } };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_core_error() {
        let err: ApiError = vitrine_core::Error::BadInput("limit".into()).into();
        assert!(matches!(err, ApiError::BadInput));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Bad input data");

        let err: ApiError = vitrine_core::Error::ServiceFailed("HTTP error: 503".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "request_failed");
        assert_eq!(err.to_string(), "HTTP error: 503");
    }

    #[test]
    fn test_envelope_shape() {
        let body = ErrorEnvelope { error: ErrorBody { kind: "bad_input", message: "Bad input data".into() } };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({"error": {"type": "bad_input", "message": "Bad input data"}}));
    }
}
