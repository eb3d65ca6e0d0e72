//! Error types for the visualization server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use algoscope_algorithms::ValidationError;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any algorithm ran
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking worker panicked or was cancelled
    #[error("Worker failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Request is well formed but cannot be served
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::Json(_) | Error::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Io(_) | Error::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
