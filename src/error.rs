//! Host-level error type

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::state::TimerId;

/// Errors surfaced by the host layer around the timer engines
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Timer {0} not found")]
    TimerNotFound(TimerId),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Failed to lock {0}")]
    Lock(&'static str),

    #[error("Failed to access state file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode state file: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::TimerNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
            AppError::Lock(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "status": "error", "message": self.to_string() }))).into_response()
    }
}
