//! API error responses
//!
//! Client mistakes map to 400 with `{error}`; anything unexpected maps to
//! 500 with `{error, message}`. Handler panics are converted to the same
//! 500 shape by [`panic_response`].

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request; nothing was processed
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected fault; `message` is safe to show to the caller
    #[error("{error}: {message}")]
    Internal { error: String, message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal { error, message } => {
                error!("{}: {}", error, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": error, "message": message })),
                )
                    .into_response()
            }
        }
    }
}

/// Response for a panic caught inside a handler
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown internal error".to_string()
    };

    ApiError::internal("Content filtering failed", message).into_response()
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
