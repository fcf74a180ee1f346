//! Order lifecycle module
//!
//! - **transition**: pure validation of status changes (graph + roles +
//!   gates)
//! - **manager**: the single authoritative lifecycle path - intake,
//!   transition execution with the driver-claim compare-and-swap,
//!   settlement on delivery, and the status-change broadcast
//!
//! # Transition Flow
//!
//! ```text
//! execute_transition(order_id, target, actor)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Load order
//!     ├─ 3. Driver claim on an already-claimed order? → conflict
//!     ├─ 4. validate_transition (graph ∧ role ∧ gates)
//!     ├─ 5. Target PICKED_UP while unassigned? → claim delivery_person_id
//!     ├─ 6. Target DELIVERED? → settlement engine (same transaction)
//!     ├─ 7. Commit
//!     └─ 8. Broadcast StatusChange
//! ```

pub mod manager;
pub mod transition;

pub use manager::{ManagerError, ManagerResult, OrderManager, TransitionOutcome};
pub use transition::{is_valid_edge, role_may_target, validate_transition};
