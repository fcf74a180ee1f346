use crate::settlement::SettlementError;
use crate::store::StorageError;
use crate::wallet::LedgerError;
use shared::order::TransitionError;
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Order {order_id} already claimed by driver {assigned_to}")]
    ConflictAlreadyAssigned {
        order_id: String,
        assigned_to: String,
    },

    #[error("Settlement error: {0}")]
    Settlement(#[from] SettlementError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid order draft: {0}")]
    InvalidDraft(String),
}

impl ManagerError {
    /// Validation and conflict errors are final; storage-class failures
    /// may be retried by the caller (settlement idempotency makes the
    /// retry safe)
    pub fn is_retryable(&self) -> bool {
        match self {
            ManagerError::Storage(_) => true,
            ManagerError::Settlement(SettlementError::Storage(_)) => true,
            ManagerError::Settlement(SettlementError::Ledger(LedgerError::Storage(_))) => true,
            ManagerError::Ledger(LedgerError::Storage(_)) => true,
            _ => false,
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
