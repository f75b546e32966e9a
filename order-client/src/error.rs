//! Client error types

use shared::order::OrderSnapshot;
use thiserror::Error;

use crate::reconciler::EditError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required or token rejected
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The order moved on; `current` is the server's view of it
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        current: Option<Box<OrderSnapshot>>,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Local edit rejected before reaching the server
    #[error(transparent)]
    Edit(#[from] EditError),
}

impl ClientError {
    /// Server's current order attached to a conflict
    pub fn current_order(&self) -> Option<&OrderSnapshot> {
        match self {
            ClientError::Conflict { current, .. } => current.as_deref(),
            _ => None,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::WebSocket(err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
