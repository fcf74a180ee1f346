//! Shared types for the Courier marketplace core
//!
//! Domain types used across crates: order lifecycle states and transition
//! errors, actor roles, wallet and ledger models, and the status-change
//! event consumed by the notification layer.

pub mod order;
pub mod role;
pub mod wallet;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{
    Order, OrderDraft, OrderStatus, PaymentMethod, PaymentRecord, PaymentStatus, StatusChange,
    TransitionError,
};
pub use role::{Actor, ActorRole};
pub use wallet::{TransactionStatus, TransactionType, Wallet, WalletTransaction};
