//! Request errors and their `{ success: false, error }` envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::llm::LlmError;

/// Message returned when a chat request body is not usable.
pub const INVALID_MESSAGES: &str = "Invalid messages format";

/// Failure envelope sent to clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error text.
    pub error: String,
}

/// Errors produced while handling a request.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input; rejected before history is touched.
    Validation(String),
    /// The completion provider failed; history is left unchanged.
    Provider(LlmError),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        Self::Provider(e)
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Provider(e) => {
                let text = e.to_string();
                if text.is_empty() {
                    "Internal server error".to_string()
                } else {
                    text
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
