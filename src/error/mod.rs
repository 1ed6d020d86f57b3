//! Error types shared by the client library and the bridge service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid setting. Raised at construction, never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection, TLS or timeout failure while talking to the broker.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request hook failed: {0}")]
    Hook(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl AppError {
    /// True for failures that happened while sending a message to the broker.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Transport(_) | AppError::Hook(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Transport(e) => (StatusCode::BAD_GATEWAY, format!("Broker unreachable: {}", e)),
            AppError::Hook(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Serialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Serialization error: {}", e),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
