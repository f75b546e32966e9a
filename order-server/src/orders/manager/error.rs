use super::super::storage::StorageError;
use super::super::traits::OrderError;
use shared::order::{CommandError, CommandErrorCode, OrderSnapshot};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Catalog entry not found: {0}")]
    CatalogEntryNotFound(String),

    /// Rejected by the state machine; carries the order as it stands now
    #[error("Illegal transition: {message}")]
    IllegalTransition {
        message: String,
        current: Option<Box<OrderSnapshot>>,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ManagerError {
    /// Attach the current order to a conflict
    pub fn with_current(self, current: Option<OrderSnapshot>) -> Self {
        match self {
            ManagerError::IllegalTransition { message, .. } => ManagerError::IllegalTransition {
                message,
                current: current.map(Box::new),
            },
            other => other,
        }
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                tracing::error!(error = %e, "Storage error occurred");
                (CommandErrorCode::StorageError, e.to_string())
            }
            ManagerError::OrderNotFound(id) => (
                CommandErrorCode::OrderNotFound,
                format!("Order not found: {}", id),
            ),
            ManagerError::ItemNotFound(id) => (
                CommandErrorCode::ItemNotFound,
                format!("Item not found: {}", id),
            ),
            ManagerError::CatalogEntryNotFound(id) => (
                CommandErrorCode::CatalogEntryNotFound,
                format!("Catalog entry not found: {}", id),
            ),
            ManagerError::IllegalTransition { message, .. } => {
                (CommandErrorCode::IllegalTransition, message)
            }
            ManagerError::Validation(msg) => (CommandErrorCode::ValidationFailed, msg),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg),
        };
        CommandError::new(code, message)
    }
}

impl From<OrderError> for ManagerError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => ManagerError::OrderNotFound(id),
            OrderError::ItemNotFound(id) => ManagerError::ItemNotFound(id),
            OrderError::CatalogEntryNotFound(id) => ManagerError::CatalogEntryNotFound(id),
            OrderError::IllegalTransition(message) => ManagerError::IllegalTransition {
                message,
                current: None,
            },
            OrderError::Validation(msg) => ManagerError::Validation(msg),
            OrderError::Storage(msg) => ManagerError::Internal(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
