//! Actor roles
//!
//! The authentication collaborator resolves every request to an
//! `(actor_id, role)` pair before it reaches the core; the core trusts
//! that input. For business owners the collaborator resolves the actor id
//! to the business they own.

use serde::{Deserialize, Serialize};

/// Role of the actor requesting a transition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Customer,
    BusinessOwner,
    DeliveryDriver,
    Admin,
    SuperAdmin,
}

impl ActorRole {
    /// Admin roles bypass ownership and assignment gates
    pub fn is_admin(&self) -> bool {
        matches!(self, ActorRole::Admin | ActorRole::SuperAdmin)
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActorRole::Customer => "CUSTOMER",
            ActorRole::BusinessOwner => "BUSINESS_OWNER",
            ActorRole::DeliveryDriver => "DELIVERY_DRIVER",
            ActorRole::Admin => "ADMIN",
            ActorRole::SuperAdmin => "SUPER_ADMIN",
        };
        write!(f, "{}", label)
    }
}

/// Authenticated actor attached to a transition request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}
