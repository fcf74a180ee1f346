use super::*;
use crate::store::MarketStorage;
use shared::order::{OrderDraft, PaymentMethod, TransitionError};

mod test_claims;

fn create_test_manager() -> OrderManager {
    OrderManager::with_storage(MarketStorage::open_in_memory().unwrap())
}

/// Draft matching the worked example: 12000 subtotal (markup included),
/// 2500 delivery fee, 14500 total
fn create_draft(method: PaymentMethod) -> OrderDraft {
    OrderDraft {
        customer_id: "cust-1".to_string(),
        business_id: "biz-1".to_string(),
        subtotal: 12000,
        delivery_fee: 2500,
        total: 14500,
        payment_method: method,
    }
}

fn customer() -> Actor {
    Actor::new("cust-1", ActorRole::Customer)
}

fn business() -> Actor {
    Actor::new("biz-1", ActorRole::BusinessOwner)
}

fn driver(id: &str) -> Actor {
    Actor::new(id, ActorRole::DeliveryDriver)
}

fn admin() -> Actor {
    Actor::new("admin-1", ActorRole::Admin)
}

/// Walk an order from Pending to Ready through the business owner
fn drive_to_ready(manager: &OrderManager, order_id: &str) {
    let business = business();
    for target in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ] {
        manager
            .execute_transition(order_id, target, &business)
            .unwrap();
    }
}

/// Walk an order all the way to Delivered with the given driver
fn drive_to_delivered(
    manager: &OrderManager,
    order_id: &str,
    driver_id: &str,
) -> TransitionOutcome {
    drive_to_ready(manager, order_id);
    let driver = driver(driver_id);
    manager
        .execute_transition(order_id, OrderStatus::PickedUp, &driver)
        .unwrap();
    manager
        .execute_transition(order_id, OrderStatus::OnTheWay, &driver)
        .unwrap();
    manager
        .execute_transition(order_id, OrderStatus::Delivered, &driver)
        .unwrap()
}
