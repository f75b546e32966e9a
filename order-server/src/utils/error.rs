//! Unified error handling
//!
//! [`AppError`] is what HTTP handlers return. It renders into the shared
//! [`ApiResponse`] envelope with a stable error code:
//!
//! | Code | HTTP | Meaning |
//! |------|------|---------|
//! | E0002 | 400 | validation failed |
//! | E0003 | 404 | order, item or catalog entry not found |
//! | E0006 | 400 | malformed request |
//! | E0007 | 409 | illegal transition (`data` = current order) |
//! | E2001 | 403 | permission denied |
//! | E3001 | 401 | authentication required |
//! | E3002 | 401 | invalid token |
//! | E3003 | 401 | token expired |
//! | E9001 | 500 | internal error |
//! | E9002 | 500 | database error |
//!
//! ```ignore
//! Err(AppError::not_found("Order ord-1"))
//! Ok(ok(snapshot))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::ApiResponse;
use shared::order::OrderSnapshot;
use tracing::error;

use crate::auth::JwtError;
use crate::orders::ManagerError;

/// Application error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication (4xx) ==========
    #[error("Authentication required")]
    /// 401
    Unauthorized,

    #[error("Token expired")]
    /// 401
    TokenExpired,

    #[error("Invalid token")]
    /// 401
    InvalidToken,

    #[error("Permission denied: {0}")]
    /// 403
    Forbidden(String),

    // ========== Business logic (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 404
    NotFound(String),

    #[error("Validation failed: {0}")]
    /// 400
    Validation(String),

    /// The order is not in a state that permits the command (409)
    #[error("Illegal transition: {message}")]
    IllegalTransition {
        message: String,
        current: Option<Box<OrderSnapshot>>,
    },

    // ========== System (5xx) ==========
    #[error("Database error: {0}")]
    /// 500
    Database(String),

    #[error("Internal server error: {0}")]
    /// 500
    Internal(String),

    #[error("Invalid request: {0}")]
    /// 400
    Invalid(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable error code rendered in the envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "E3001",
            AppError::InvalidToken => "E3002",
            AppError::TokenExpired => "E3003",
            AppError::Forbidden(_) => "E2001",
            AppError::NotFound(_) => "E0003",
            AppError::Validation(_) => "E0002",
            AppError::IllegalTransition { .. } => "E0007",
            AppError::Database(_) => "E9002",
            AppError::Internal(_) => "E9001",
            AppError::Invalid(_) => "E0006",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Invalid(_) => StatusCode::BAD_REQUEST,
            AppError::IllegalTransition { .. } => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            AppError::Unauthorized => ApiResponse::error(code, "Please login first"),
            AppError::TokenExpired => ApiResponse::error(code, "Token expired"),
            AppError::InvalidToken => ApiResponse::error(code, "Invalid token"),
            AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Invalid(msg) => ApiResponse::error(code, msg),
            AppError::IllegalTransition { message, current } => match current {
                Some(order) => match serde_json::to_value(&order) {
                    Ok(data) => ApiResponse::error_with_data(code, message, data),
                    Err(e) => {
                        error!(error = %e, "Failed to serialize current order");
                        ApiResponse::error(code, message)
                    }
                },
                None => ApiResponse::error(code, message),
            },
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                ApiResponse::error(code, "Database error")
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                ApiResponse::error(code, "Internal server error")
            }
        };

        (status, Json::<ApiResponse<serde_json::Value>>(body)).into_response()
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => AppError::Database(e.to_string()),
            ManagerError::OrderNotFound(id) => AppError::NotFound(format!("Order {}", id)),
            ManagerError::ItemNotFound(id) => AppError::NotFound(format!("Item {}", id)),
            ManagerError::CatalogEntryNotFound(id) => {
                AppError::NotFound(format!("Catalog entry {}", id))
            }
            ManagerError::IllegalTransition { message, current } => {
                AppError::IllegalTransition { message, current }
            }
            ManagerError::Validation(msg) => AppError::Validation(msg),
            ManagerError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::ExpiredToken => AppError::TokenExpired,
            JwtError::InvalidToken(_) | JwtError::InvalidSignature => AppError::InvalidToken,
            JwtError::GenerationFailed(msg) => AppError::Internal(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}
