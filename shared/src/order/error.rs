//! Transition rejection reasons
//!
//! These are client-facing: every variant carries the current and requested
//! states, and the Display text is the human-readable reason shown to the
//! client. Validation failures are final - callers must not retry them.

use super::status::OrderStatus;
use crate::role::ActorRole;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a status transition request was rejected
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionError {
    /// The requested edge does not exist in the state graph
    #[error("no transition from {current} to {requested}")]
    InvalidTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// The role may not target this state at all
    #[error("{role} may not move an order from {current} to {requested}")]
    Forbidden {
        role: ActorRole,
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// The actor does not own the business on the order
    #[error("actor {actor_id} does not own business {business_id} (order is {current}, requested {requested})")]
    NotOwner {
        actor_id: String,
        business_id: String,
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// The actor is not the driver assigned to the order
    #[error("actor {actor_id} is not the driver assigned to this order (order is {current}, requested {requested})")]
    NotAssigned {
        actor_id: String,
        current: OrderStatus,
        requested: OrderStatus,
    },
}

impl TransitionError {
    /// The state the order was in when the request was rejected
    pub fn current(&self) -> OrderStatus {
        match self {
            TransitionError::InvalidTransition { current, .. }
            | TransitionError::Forbidden { current, .. }
            | TransitionError::NotOwner { current, .. }
            | TransitionError::NotAssigned { current, .. } => *current,
        }
    }

    /// The state the request asked for
    pub fn requested(&self) -> OrderStatus {
        match self {
            TransitionError::InvalidTransition { requested, .. }
            | TransitionError::Forbidden { requested, .. }
            | TransitionError::NotOwner { requested, .. }
            | TransitionError::NotAssigned { requested, .. } => *requested,
        }
    }
}
