//! Application error taxonomy.
//!
//! Every handler failure is converted to a response at the route boundary;
//! nothing here is fatal to the process. Internal errors are logged
//! server-side and surfaced to the client as a generic 500 with no detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// User-correctable input problem (bad description, id, or filter).
    #[error("{0}")]
    Validation(String),

    /// Unknown task id.
    #[error("Task not found")]
    NotFound,

    /// Client exceeded the request budget for the current window.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimit,

    /// Missing or malformed CSRF token.
    #[error("{0}")]
    Security(&'static str),

    /// Unexpected failure; detail stays server-side.
    #[error("An unexpected error occurred")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            AppError::Security(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Unhandled error in request handler");
        }

        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
