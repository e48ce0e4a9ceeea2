//! JSON response shapes.
//!
//! Every response body is JSON with `Content-Type: application/json`.
//! Errors use `{"error": message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::error::{DecodeError, StoreError};

/// Message returned for a malformed path id.
pub const MSG_INVALID_ID: &str = "invalid ID";
/// Message returned for an undecodable body.
pub const MSG_BAD_BODY: &str = "could not decode request body";
/// Message returned when the item does not exist.
pub const MSG_ITEM_NOT_FOUND: &str = "item with ID does not exist";
/// Message returned for unmatched routes under `/items/`.
pub const MSG_NO_ENDPOINT: &str = "endpoint does not exist";
/// Message returned for any other unregistered path.
pub const MSG_NOT_FOUND: &str = "not found";
/// Message returned when a request exceeds the request timeout.
pub const MSG_REQUEST_TIMEOUT: &str = "request timed out";

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// Serialize `payload` with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, payload: T) -> Response {
    (status, Json(payload)).into_response()
}

/// 200 with payload.
pub fn success<T: Serialize>(payload: T) -> Response {
    json_response(StatusCode::OK, payload)
}

/// 201 with payload.
pub fn created<T: Serialize>(payload: T) -> Response {
    json_response(StatusCode::CREATED, payload)
}

/// 204 with an empty JSON object, kept for client compatibility.
pub fn no_content() -> Response {
    json_response(StatusCode::NO_CONTENT, json!({}))
}

/// 400 with error message.
pub fn bad_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// 404 with error message.
pub fn not_found(message: impl Into<String>) -> Response {
    error_response(StatusCode::NOT_FOUND, message)
}

/// 408 with error message.
pub fn request_timeout(message: impl Into<String>) -> Response {
    error_response(StatusCode::REQUEST_TIMEOUT, message)
}

/// 500 with error message.
pub fn internal_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    json_response(
        status,
        ErrorBody {
            error: message.into(),
        },
    )
}

/// Handler-level error, rendered as one of the fixed error shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 400.
    BadRequest(String),
    /// 404.
    NotFound(String),
    /// 500.
    Internal(String),
}

impl ApiError {
    /// Map a store failure, using `context` as the message for internal errors.
    pub fn from_store(err: StoreError, context: &str) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(MSG_ITEM_NOT_FOUND.to_string()),
            StoreError::Operation(reason) => {
                tracing::error!(%reason, "{context}");
                ApiError::Internal(context.to_string())
            }
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidId(_) => ApiError::BadRequest(MSG_INVALID_ID.to_string()),
            DecodeError::Body(_) => ApiError::BadRequest(MSG_BAD_BODY.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => bad_request(message),
            ApiError::NotFound(message) => not_found(message),
            ApiError::Internal(message) => internal_error(message),
        }
    }
}
