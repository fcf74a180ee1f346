//! State transition validation
//!
//! Pure functions deciding whether a requested status change is allowed.
//! Two independent checks are ANDed: the structural edge must exist in the
//! lifecycle graph, and the actor's role must be permitted to target the
//! requested state. Ownership and assignment gates come on top for
//! business owners and drivers.
//!
//! The graph is a compile-time-checked match over closed enums - there is
//! no way to smuggle an unknown state or role string past it.
//!
//! ```text
//! PENDING ──► CONFIRMED ──► PREPARING ──► READY ──► PICKED_UP ──► ON_THE_WAY ──► DELIVERED
//!    │            │             │           │           │             │
//!    └────────────┴─────────────┴───────────┴───────────┴─────────────┴──► CANCELLED
//! ```

use shared::order::{Order, OrderStatus, TransitionError};
use shared::role::{Actor, ActorRole};

/// Whether the edge `current -> target` exists in the lifecycle graph
///
/// `OnTheWay -> OnTheWay` is a legal label refresh: older driver clients
/// re-assert the en-route state under its legacy `IN_TRANSIT` label, and
/// that must not be rejected.
pub fn is_valid_edge(current: OrderStatus, target: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (current, target),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Confirmed, Preparing)
            | (Confirmed, Cancelled)
            | (Preparing, Ready)
            | (Preparing, Cancelled)
            | (Ready, PickedUp)
            | (Ready, Cancelled)
            | (PickedUp, OnTheWay)
            | (PickedUp, Cancelled)
            | (OnTheWay, OnTheWay)
            | (OnTheWay, Delivered)
            | (OnTheWay, Cancelled)
    )
}

/// Whether the role may set an order to `target` at all
pub fn role_may_target(role: ActorRole, target: OrderStatus) -> bool {
    use OrderStatus::*;
    match role {
        ActorRole::Customer => matches!(target, Cancelled),
        ActorRole::BusinessOwner => matches!(target, Confirmed | Preparing | Ready | Cancelled),
        ActorRole::DeliveryDriver => matches!(target, PickedUp | OnTheWay | Delivered),
        ActorRole::Admin | ActorRole::SuperAdmin => true,
    }
}

/// Validate a transition request against the graph, the role table, and
/// the ownership/assignment gates
///
/// The pickup claim itself (atomically assigning an unassigned order) is a
/// compare-and-swap performed by the manager inside the write transaction,
/// and the manager resolves claim conflicts before calling in here; a
/// pickup request is therefore structurally valid for any driver.
pub fn validate_transition(
    order: &Order,
    target: OrderStatus,
    actor: &Actor,
) -> Result<(), TransitionError> {
    let current = order.status;

    // Structural check first: a nonexistent edge is invalid for everyone,
    // admins included
    if !is_valid_edge(current, target) {
        return Err(TransitionError::InvalidTransition {
            current,
            requested: target,
        });
    }

    // Admin roles bypass the role table and all gates
    if actor.role.is_admin() {
        return Ok(());
    }

    if !role_may_target(actor.role, target) {
        return Err(TransitionError::Forbidden {
            role: actor.role,
            current,
            requested: target,
        });
    }

    match actor.role {
        // Regret window: a customer may only cancel before the business
        // has acted on the order
        ActorRole::Customer => {
            if current != OrderStatus::Pending {
                return Err(TransitionError::Forbidden {
                    role: actor.role,
                    current,
                    requested: target,
                });
            }
        }

        ActorRole::BusinessOwner => {
            if actor.id != order.business_id {
                return Err(TransitionError::NotOwner {
                    actor_id: actor.id.clone(),
                    business_id: order.business_id.clone(),
                    current,
                    requested: target,
                });
            }
        }

        ActorRole::DeliveryDriver => match target {
            // The pickup claim: valid while unassigned (the manager CAS
            // decides the winner) or as a retry by the assignee
            OrderStatus::PickedUp => {}
            _ => {
                if order.delivery_person_id.as_deref() != Some(actor.id.as_str()) {
                    return Err(TransitionError::NotAssigned {
                        actor_id: actor.id.clone(),
                        current,
                        requested: target,
                    });
                }
            }
        },

        ActorRole::Admin | ActorRole::SuperAdmin => unreachable!("handled above"),
    }

    Ok(())
}
