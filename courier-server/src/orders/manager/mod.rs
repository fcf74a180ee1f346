//! OrderManager - the single authoritative lifecycle path
//!
//! Every order mutation goes through here: intake from checkout, status
//! transitions (with the driver-claim compare-and-swap), and settlement on
//! delivery. One write transaction per operation; a failure anywhere
//! leaves the order exactly as it was.
//!
//! The broadcast channel is the notification seam: subscribers receive a
//! `StatusChange` after every committed transition and take care of
//! push/SMS/email delivery outside the core.

mod error;
pub use error::*;

use crate::orders::transition::validate_transition;
use crate::settlement::{SettlementEngine, SettlementSummary};
use crate::store::{MarketStorage, StorageError};
use crate::wallet::WalletLedger;
use shared::order::{
    Order, OrderDraft, OrderStatus, PaymentMethod, PaymentRecord, PaymentStatus, StatusChange,
};
use shared::role::{Actor, ActorRole};
use std::path::Path;
use tokio::sync::broadcast;

/// Status-change broadcast capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Result of an executed transition
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// Order state after the transition
    pub order: Order,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    /// Present when the transition entered `Delivered`
    pub settlement: Option<SettlementSummary>,
}

/// Order lifecycle manager
pub struct OrderManager {
    storage: MarketStorage,
    ledger: WalletLedger,
    engine: SettlementEngine,
    event_tx: broadcast::Sender<StatusChange>,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("storage", &"<MarketStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl OrderManager {
    /// Open (or create) the database at the given path
    pub fn open(db_path: impl AsRef<Path>) -> ManagerResult<Self> {
        Ok(Self::with_storage(MarketStorage::open(db_path)?))
    }

    /// Build a manager over existing storage
    pub fn with_storage(storage: MarketStorage) -> Self {
        let ledger = WalletLedger::new(storage.clone());
        let engine = SettlementEngine::new(storage.clone(), ledger.clone());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            ledger,
            engine,
            event_tx,
        }
    }

    /// Subscribe to status-change events
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.event_tx.subscribe()
    }

    /// The wallet ledger (withdrawals and administrative cash clearing)
    pub fn ledger(&self) -> &WalletLedger {
        &self.ledger
    }

    // ========== Intake ==========

    /// Accept a new order from the checkout collaborator
    ///
    /// Money arrives pre-computed; the total invariant is re-checked here
    /// because every later settlement figure builds on it. The order and
    /// its payment record are written together: card payments are already
    /// captured by the gateway, cash stays pending until delivery.
    pub fn register_order(&self, draft: OrderDraft) -> ManagerResult<Order> {
        if draft.subtotal < 0 || draft.delivery_fee < 0 {
            return Err(ManagerError::InvalidDraft(format!(
                "negative amounts: subtotal={}, delivery_fee={}",
                draft.subtotal, draft.delivery_fee
            )));
        }
        if draft.total != draft.subtotal + draft.delivery_fee {
            return Err(ManagerError::InvalidDraft(format!(
                "total {} != subtotal {} + delivery_fee {}",
                draft.total, draft.subtotal, draft.delivery_fee
            )));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: draft.customer_id,
            business_id: draft.business_id,
            delivery_person_id: None,
            subtotal: draft.subtotal,
            delivery_fee: draft.delivery_fee,
            total: draft.total,
            platform_fee: None,
            business_earnings: None,
            delivery_earnings: None,
            payment_method: draft.payment_method,
            status: OrderStatus::Pending,
            created_at: now,
            delivered_at: None,
        };
        let payment = PaymentRecord {
            order_id: order.id.clone(),
            method: order.payment_method,
            amount: order.total,
            status: match order.payment_method {
                PaymentMethod::Card => PaymentStatus::Completed,
                PaymentMethod::Cash => PaymentStatus::Pending,
            },
            created_at: now,
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_order(&txn, &order)?;
        self.storage.store_payment(&txn, &payment)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            business_id = %order.business_id,
            total = order.total,
            method = ?order.payment_method,
            "Order registered"
        );
        Ok(order)
    }

    // ========== Transitions ==========

    /// Execute a status transition on behalf of an actor
    ///
    /// Validation, the pickup claim, the status write, and (for delivery)
    /// the full settlement share one write transaction. The status-change
    /// event goes out only after commit.
    pub fn execute_transition(
        &self,
        order_id: &str,
        target: OrderStatus,
        actor: &Actor,
    ) -> ManagerResult<TransitionOutcome> {
        let txn = self.storage.begin_write()?;
        let mut order = match self.storage.load_order(&txn, order_id) {
            Ok(order) => order,
            Err(StorageError::OrderNotFound(id)) => return Err(ManagerError::OrderNotFound(id)),
            Err(e) => return Err(e.into()),
        };

        // A claim that finds the order already in another driver's hands
        // lost the race - reported as a conflict, not as a bad edge
        if target == OrderStatus::PickedUp && actor.role == ActorRole::DeliveryDriver {
            if let Some(assigned) = order.delivery_person_id.as_deref() {
                if assigned != actor.id {
                    return Err(ManagerError::ConflictAlreadyAssigned {
                        order_id: order.id.clone(),
                        assigned_to: assigned.to_string(),
                    });
                }
            }
        }

        validate_transition(&order, target, actor)?;

        // Label refresh (en-route re-asserted): validated, but no write,
        // no event
        if order.status == target {
            return Ok(TransitionOutcome {
                old_status: order.status,
                new_status: target,
                order,
                settlement: None,
            });
        }

        // The pickup claim: the assignment rides in the same write
        // transaction as the status change, so the first committed claim
        // wins
        if target == OrderStatus::PickedUp
            && actor.role == ActorRole::DeliveryDriver
            && order.delivery_person_id.is_none()
        {
            order.delivery_person_id = Some(actor.id.clone());
        }

        let old_status = order.status;
        let settlement = if target == OrderStatus::Delivered {
            // Engine writes status, delivered_at and earnings itself
            Some(self.engine.settle_in_txn(&txn, &mut order)?)
        } else {
            order.status = target;
            self.storage.store_order(&txn, &order)?;
            None
        };

        txn.commit().map_err(StorageError::from)?;

        let event = StatusChange {
            order_id: order.id.clone(),
            old_status,
            new_status: target,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        // No subscribers is fine (e.g. tests, CLI)
        let _ = self.event_tx.send(event);

        tracing::info!(
            order_id = %order.id,
            from = %old_status,
            to = %target,
            actor = %actor.id,
            role = %actor.role,
            "Transition executed"
        );

        Ok(TransitionOutcome {
            old_status,
            new_status: target,
            order,
            settlement,
        })
    }

    /// Re-run settlement on a delivered order (crash recovery, safe to
    /// repeat)
    pub fn settle_order(&self, order_id: &str) -> ManagerResult<SettlementSummary> {
        Ok(self.engine.settle_order(order_id)?)
    }

    // ========== Reads ==========

    pub fn get_order(&self, order_id: &str) -> ManagerResult<Option<Order>> {
        Ok(self.storage.get_order(order_id)?)
    }

    pub fn get_payment(&self, order_id: &str) -> ManagerResult<Option<PaymentRecord>> {
        Ok(self.storage.get_payment(order_id)?)
    }

    pub fn get_wallet(&self, user_id: &str) -> ManagerResult<Option<shared::wallet::Wallet>> {
        Ok(self.storage.get_wallet(user_id)?)
    }

    pub fn transactions_for_user(
        &self,
        user_id: &str,
    ) -> ManagerResult<Vec<shared::wallet::WalletTransaction>> {
        Ok(self.storage.transactions_for_user(user_id)?)
    }

    /// The underlying storage (read-only consumers such as the audit
    /// checker)
    pub fn storage(&self) -> &MarketStorage {
        &self.storage
    }
}

#[cfg(test)]
mod tests;
