//! Audit and reconciliation
//!
//! A read-only verification pass over the stored orders, payments, and
//! ledger. Used for integrity checking from the CLI and from tests - it is
//! not part of the normal settlement path and never mutates anything.

pub mod checker;
pub mod types;

pub use checker::run_quick_audit;
pub use types::{AuditCheck, AuditReport, AuditStatus};
