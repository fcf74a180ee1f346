//! Courier Server - delivery marketplace settlement core
//!
//! # Architecture
//!
//! The order lifecycle state machine coupled with financial settlement:
//! who may move an order between statuses, and how every collected cent is
//! partitioned exactly once into platform fee, business earnings, and
//! driver earnings when an order is delivered.
//!
//! - **Transition validation** (`orders::transition`): pure checks over
//!   the lifecycle graph and the role permission table
//! - **Lifecycle manager** (`orders::manager`): the single authoritative
//!   mutation path - intake, transitions, driver claims, settlement
//! - **Commission calculator** (`settlement::calculator`): pure markup and
//!   commission math over integer cents
//! - **Settlement engine** (`settlement::engine`): idempotent,
//!   transactional crediting on delivery
//! - **Wallet ledger** (`wallet`): append-only transactions behind every
//!   balance change
//! - **Audit** (`audit`): read-only reconciliation battery
//!
//! # Module structure
//!
//! ```text
//! courier-server/src/
//! ├── core/          # Configuration
//! ├── store/         # redb storage (orders, payments, wallets, ledger)
//! ├── orders/        # Transition validation + lifecycle manager
//! ├── settlement/    # Commission calculator + settlement engine
//! ├── wallet/        # Wallet ledger
//! ├── audit/         # Reconciliation checks
//! └── utils/         # Logging
//! ```

pub mod audit;
pub mod core;
pub mod orders;
pub mod settlement;
pub mod store;
pub mod utils;
pub mod wallet;

// Re-export public types
pub use audit::{AuditReport, AuditStatus, run_quick_audit};
pub use crate::core::Config;
pub use orders::{ManagerError, OrderManager, TransitionOutcome, validate_transition};
pub use settlement::{SettlementEngine, SettlementSummary, compute_settlement};
pub use store::MarketStorage;
pub use utils::{init_logger, init_logger_with_file};
pub use wallet::WalletLedger;

pub fn print_banner() {
    println!(
        r#"
   ______                 _
  / ____/___  __  _______(_)__  _____
 / /   / __ \/ / / / ___/ / _ \/ ___/
/ /___/ /_/ / /_/ / /  / /  __/ /
\____/\____/\__,_/_/  /_/\___/_/
        settlement core
"#
    );
}
