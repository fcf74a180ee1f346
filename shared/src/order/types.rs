//! Order, payment, and event types
//!
//! All monetary amounts are integer minor-currency units (cents). Floating
//! point never touches stored money.

use super::status::OrderStatus;
use serde::{Deserialize, Serialize};

/// How the customer pays for the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Charged through the payment gateway before delivery
    #[default]
    Card,
    /// Collected in cash by the driver at the door
    Cash,
}

/// Order - the unit of lifecycle and settlement
///
/// The three earnings fields are unset until the order reaches `Delivered`,
/// at which point settlement writes them exactly once. They are never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (assigned by server)
    pub id: String,
    /// Customer who placed the order
    pub customer_id: String,
    /// Business fulfilling the order
    pub business_id: String,
    /// Driver assigned via the pickup claim (None until claimed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_person_id: Option<String>,
    /// Product subtotal in cents, platform markup already baked in
    pub subtotal: i64,
    /// Delivery fee in cents
    pub delivery_fee: i64,
    /// Total in cents (subtotal + delivery_fee)
    pub total: i64,
    /// Platform commission in cents, set at settlement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fee: Option<i64>,
    /// Business payout in cents, set at settlement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_earnings: Option<i64>,
    /// Driver commission in cents, set at settlement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_earnings: Option<i64>,
    /// Payment method
    pub payment_method: PaymentMethod,
    /// Order status
    pub status: OrderStatus,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Delivery timestamp, set on transition to `Delivered`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
}

impl Order {
    /// Short id for ledger descriptions and logs
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }

    /// Whether settlement has already written the earnings fields
    pub fn is_settled(&self) -> bool {
        self.platform_fee.is_some() && self.business_earnings.is_some()
    }
}

/// Order intake from the checkout collaborator
///
/// Money is pre-computed upstream; the core re-validates the
/// `total == subtotal + delivery_fee` invariant before accepting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_id: String,
    pub business_id: String,
    /// Subtotal in cents, markup included
    pub subtotal: i64,
    /// Delivery fee in cents
    pub delivery_fee: i64,
    /// Total in cents
    pub total: i64,
    pub payment_method: PaymentMethod,
}

/// Payment record status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Cash orders stay pending until collected at delivery
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Payment record - one per order
///
/// Card orders are completed at creation (the gateway collaborator has
/// already moved the funds); cash orders complete at delivery settlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub order_id: String,
    pub method: PaymentMethod,
    /// Amount in cents (equals the order total)
    pub amount: i64,
    pub status: PaymentStatus,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

/// Status-change event broadcast after every committed transition
///
/// The notification layer (push/SMS/email) subscribes to these; delivery
/// mechanics live entirely outside the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusChange {
    pub order_id: String,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
}
