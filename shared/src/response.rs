//! HTTP envelope shared by the order server and its clients
//!
//! ```json
//! { "code": "E0000", "message": "Success", "data": { "order_id": "ord-1" } }
//! ```
//!
//! Failures use the same shape with an error code. A rejected transition
//! still carries `data`: the order as it currently stands.

use serde::{Deserialize, Serialize};

/// Code of every successful response
pub const API_CODE_SUCCESS: &str = "E0000";

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn new(code: impl Into<String>, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(API_CODE_SUCCESS, "Success", Some(data))
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, None)
    }

    /// Error that still hands state back to the caller
    pub fn error_with_data(code: impl Into<String>, message: impl Into<String>, data: T) -> Self {
        Self::new(code, message, Some(data))
    }

    pub fn is_success(&self) -> bool {
        self.code == API_CODE_SUCCESS
    }
}
