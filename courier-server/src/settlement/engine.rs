//! Settlement engine
//!
//! Runs exactly when an order enters `Delivered`. The whole settlement -
//! earnings fields on the order, ledger entries, wallet balances, payment
//! completion - happens inside one write transaction: a failure anywhere
//! rolls everything back and the order stays in its pre-transition state.
//!
//! # Settlement Flow
//!
//! ```text
//! settle_in_txn(order)
//!     ├─ 1. Earnings already set? → return prior summary (re-entry)
//!     ├─ 2. compute_settlement(order)
//!     ├─ 3. Write earnings + delivered_at + status onto the order
//!     ├─ 4. Credit business earnings (INCOME)
//!     ├─ 5. Driver assigned?
//!     │      cash → credit CASH_INCOME + record CASH_DEBT,
//!     │             mark payment record completed
//!     │      card → credit INCOME
//!     └─ 6. Return summary of amounts moved
//! ```
//!
//! Re-entry is not an error: a retried settlement (crash recovery,
//! duplicate trigger) returns the original summary without posting
//! anything, and the ledger's settlement index backstops even that.

use crate::store::{MarketStorage, StorageError};
use crate::wallet::{LedgerError, WalletLedger};
use redb::WriteTransaction;
use serde::{Deserialize, Serialize};
use shared::order::{Order, OrderStatus, PaymentMethod, PaymentStatus};
use shared::wallet::TransactionType;
use thiserror::Error;

/// Settlement errors
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order {order_id} is {status}, settlement only runs on delivery")]
    NotDelivered {
        order_id: String,
        status: OrderStatus,
    },
}

pub type SettlementResult<T> = Result<T, SettlementError>;

/// Summary of a completed settlement, amounts in cents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementSummary {
    pub order_id: String,
    pub platform_fee: i64,
    pub business_earnings: i64,
    pub delivery_earnings: i64,
    /// Debt recorded against the driver (zero for card orders or when no
    /// driver was assigned)
    pub cash_owed: i64,
    /// True when this call found the order already settled and posted
    /// nothing
    pub already_settled: bool,
}

/// Settlement engine over marketplace storage
#[derive(Clone)]
pub struct SettlementEngine {
    storage: MarketStorage,
    ledger: WalletLedger,
}

impl SettlementEngine {
    pub fn new(storage: MarketStorage, ledger: WalletLedger) -> Self {
        Self { storage, ledger }
    }

    /// Settle an already-delivered order in its own transaction
    ///
    /// Safe to call any number of times; used for crash-recovery re-entry.
    /// Orders in any non-terminal state are rejected - settlement is only
    /// ever triggered by the transition into `Delivered`.
    pub fn settle_order(&self, order_id: &str) -> SettlementResult<SettlementSummary> {
        let txn = self.storage.begin_write()?;
        let mut order = match self.storage.load_order(&txn, order_id) {
            Ok(order) => order,
            Err(StorageError::OrderNotFound(id)) => return Err(SettlementError::OrderNotFound(id)),
            Err(e) => return Err(e.into()),
        };

        if !order.is_settled() && order.status != OrderStatus::Delivered {
            return Err(SettlementError::NotDelivered {
                order_id: order.id.clone(),
                status: order.status,
            });
        }

        let summary = self.settle_in_txn(&txn, &mut order)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(summary)
    }

    /// Settle an order inside the caller's write transaction
    ///
    /// Writes the earnings fields, the delivered status and timestamp, and
    /// all ledger postings. The caller commits; nothing is visible until
    /// then.
    pub fn settle_in_txn(
        &self,
        txn: &WriteTransaction,
        order: &mut Order,
    ) -> SettlementResult<SettlementSummary> {
        // Idempotent re-entry: earnings fields are written exactly once
        if order.is_settled() {
            tracing::info!(order_id = %order.id, "Settlement already completed, returning prior summary");
            return Ok(self.prior_summary(order));
        }

        let split = crate::settlement::compute_settlement(order);
        let now = chrono::Utc::now().timestamp_millis();

        order.platform_fee = Some(split.platform_fee);
        order.business_earnings = Some(split.business_earnings);
        order.delivery_earnings = Some(split.delivery_earnings);
        order.delivered_at = Some(now);
        order.status = OrderStatus::Delivered;
        self.storage.store_order(txn, order)?;

        let short = order.short_id().to_string();

        if split.business_earnings > 0 {
            self.ledger.credit(
                txn,
                &order.business_id,
                split.business_earnings,
                &order.id,
                TransactionType::Income,
                format!("Earnings for order {}", short),
                now,
            )?;
        }

        let mut cash_owed_recorded = 0;
        if let Some(driver_id) = order.delivery_person_id.clone() {
            match order.payment_method {
                PaymentMethod::Cash => {
                    if split.delivery_earnings > 0 {
                        self.ledger.credit(
                            txn,
                            &driver_id,
                            split.delivery_earnings,
                            &order.id,
                            TransactionType::CashIncome,
                            format!("Delivery commission (cash) for order {}", short),
                            now,
                        )?;
                    }
                    if split.cash_owed > 0 {
                        self.ledger.record_debt(
                            txn,
                            &driver_id,
                            split.cash_owed,
                            &order.id,
                            format!("Cash collected for order {}", short),
                            now,
                        )?;
                        cash_owed_recorded = split.cash_owed;
                    }
                    // Cash changes hands at the door; the payment record
                    // completes with the delivery
                    if let Some(mut payment) = self.storage.load_payment(txn, &order.id)? {
                        payment.status = PaymentStatus::Completed;
                        self.storage.store_payment(txn, &payment)?;
                    }
                }
                PaymentMethod::Card => {
                    if split.delivery_earnings > 0 {
                        self.ledger.credit(
                            txn,
                            &driver_id,
                            split.delivery_earnings,
                            &order.id,
                            TransactionType::Income,
                            format!("Delivery commission for order {}", short),
                            now,
                        )?;
                    }
                }
            }
        }

        tracing::info!(
            order_id = %order.id,
            platform_fee = split.platform_fee,
            business_earnings = split.business_earnings,
            delivery_earnings = split.delivery_earnings,
            cash_owed = cash_owed_recorded,
            "Order settled"
        );

        Ok(SettlementSummary {
            order_id: order.id.clone(),
            platform_fee: split.platform_fee,
            business_earnings: split.business_earnings,
            delivery_earnings: split.delivery_earnings,
            cash_owed: cash_owed_recorded,
            already_settled: false,
        })
    }

    /// Summary reconstructed from an already-settled order's fields
    fn prior_summary(&self, order: &Order) -> SettlementSummary {
        let delivery_earnings = order.delivery_earnings.unwrap_or(0);
        let cash_owed = match (order.payment_method, &order.delivery_person_id) {
            (PaymentMethod::Cash, Some(_)) => order.total - delivery_earnings,
            _ => 0,
        };
        SettlementSummary {
            order_id: order.id.clone(),
            platform_fee: order.platform_fee.unwrap_or(0),
            business_earnings: order.business_earnings.unwrap_or(0),
            delivery_earnings,
            cash_owed,
            already_settled: true,
        }
    }
}
