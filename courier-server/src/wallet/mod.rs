//! Wallet ledger
//!
//! Wallets are mutated exclusively through ledger operations; every
//! mutation appends an immutable `WalletTransaction`. Settlement-driven
//! credits and debts are idempotent per `(order_id, user_id, type)`.

pub mod ledger;

pub use ledger::{LedgerError, LedgerResult, WalletLedger};
