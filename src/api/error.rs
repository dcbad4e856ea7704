//! API error types and conversions

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::aggregate::NotReady;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
///
/// Errors are answered with a plain-text body.
#[derive(Debug)]
pub enum ApiError {
    /// No sample has been collected yet
    NotReady(String),

    /// The response body could not be serialized
    Encode(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotReady(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Encode(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not encode JSON: {msg}"),
            ),
        };

        (status, message).into_response()
    }
}

impl From<NotReady> for ApiError {
    fn from(err: NotReady) -> Self {
        ApiError::NotReady(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Encode(err.to_string())
    }
}
