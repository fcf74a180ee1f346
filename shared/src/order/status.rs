//! Order lifecycle states
//!
//! Older clients use two interchangeable labels for the driver-en-route
//! state (`ON_THE_WAY` / `IN_TRANSIT`). There is one canonical `OnTheWay`
//! variant; the legacy label is still accepted on the wire via a serde
//! alias.

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created by customer checkout, awaiting business confirmation
    #[default]
    Pending,
    /// Accepted by the business
    Confirmed,
    /// Being prepared
    Preparing,
    /// Ready for pickup by a driver
    Ready,
    /// Claimed and picked up by a driver
    PickedUp,
    /// Driver en route to the customer (legacy label: `IN_TRANSIT`)
    #[serde(alias = "IN_TRANSIT")]
    OnTheWay,
    /// Delivered and settled (terminal)
    Delivered,
    /// Cancelled (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::OnTheWay => "ON_THE_WAY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", label)
    }
}
