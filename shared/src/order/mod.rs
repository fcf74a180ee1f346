//! Order domain types
//!
//! - **status**: the order lifecycle state machine labels
//! - **types**: order, draft, payment record, status-change event
//! - **error**: client-facing transition rejection reasons

pub mod error;
pub mod status;
pub mod types;

pub use error::TransitionError;
pub use status::OrderStatus;
pub use types::{Order, OrderDraft, PaymentMethod, PaymentRecord, PaymentStatus, StatusChange};
