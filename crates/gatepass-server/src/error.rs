// ── HTTP error mapping ──
//
// Core errors are recovered here and translated into a structured JSON
// body plus a status code. Nothing from the storage layer escapes raw.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use gatepass_core::CoreError;

/// A core failure ready for transport.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match err {
            CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            CoreError::InvalidInput { .. }
            | CoreError::AlreadyInitialized { .. }
            | CoreError::NotInitialized { .. }
            | CoreError::QuotaExceeded { .. } => StatusCode::BAD_REQUEST,
            CoreError::ConcurrentUpdate { .. } => StatusCode::CONFLICT,
            CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatepass_core::TokenId;

    #[test]
    fn status_mapping_follows_error_kind() {
        let id = TokenId::generate();
        let cases = [
            (CoreError::NotFound { id }, StatusCode::NOT_FOUND),
            (
                CoreError::AlreadyInitialized { id },
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::NotInitialized { id }, StatusCode::BAD_REQUEST),
            (
                CoreError::QuotaExceeded { max_scans: 2 },
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::ConcurrentUpdate { id }, StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }
}
