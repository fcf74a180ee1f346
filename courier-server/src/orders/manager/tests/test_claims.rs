use super::*;
use std::sync::Arc;

#[test]
fn test_pickup_claims_the_order() {
    let manager = create_test_manager();
    let order = manager.register_order(create_draft(PaymentMethod::Card)).unwrap();
    drive_to_ready(&manager, &order.id);

    let outcome = manager
        .execute_transition(&order.id, OrderStatus::PickedUp, &driver("driver-1"))
        .unwrap();
    assert_eq!(outcome.order.delivery_person_id.as_deref(), Some("driver-1"));
}

#[test]
fn test_second_driver_loses_the_claim() {
    let manager = create_test_manager();
    let order = manager.register_order(create_draft(PaymentMethod::Card)).unwrap();
    drive_to_ready(&manager, &order.id);

    manager
        .execute_transition(&order.id, OrderStatus::PickedUp, &driver("driver-1"))
        .unwrap();

    let result = manager.execute_transition(&order.id, OrderStatus::PickedUp, &driver("driver-2"));
    assert!(matches!(
        result,
        Err(ManagerError::ConflictAlreadyAssigned { ref assigned_to, .. }) if assigned_to == "driver-1"
    ));

    // Assignment did not change hands
    let order = manager.get_order(&order.id).unwrap().unwrap();
    assert_eq!(order.delivery_person_id.as_deref(), Some("driver-1"));
}

#[test]
fn test_claim_retry_by_the_assignee_is_harmless() {
    let manager = create_test_manager();
    let order = manager.register_order(create_draft(PaymentMethod::Card)).unwrap();
    drive_to_ready(&manager, &order.id);

    let d = driver("driver-1");
    manager
        .execute_transition(&order.id, OrderStatus::PickedUp, &d)
        .unwrap();

    // Duplicate tap: the edge Ready -> PickedUp no longer exists, so the
    // retry is rejected structurally rather than reassigning anything
    let result = manager.execute_transition(&order.id, OrderStatus::PickedUp, &d);
    assert!(matches!(
        result,
        Err(ManagerError::Transition(TransitionError::InvalidTransition { .. }))
    ));
    let order = manager.get_order(&order.id).unwrap().unwrap();
    assert_eq!(order.delivery_person_id.as_deref(), Some("driver-1"));
}

#[test]
fn test_unassigned_driver_cannot_advance_the_order() {
    let manager = create_test_manager();
    let order = manager.register_order(create_draft(PaymentMethod::Card)).unwrap();
    drive_to_ready(&manager, &order.id);
    manager
        .execute_transition(&order.id, OrderStatus::PickedUp, &driver("driver-1"))
        .unwrap();

    let result = manager.execute_transition(&order.id, OrderStatus::OnTheWay, &driver("driver-2"));
    assert!(matches!(
        result,
        Err(ManagerError::Transition(TransitionError::NotAssigned { .. }))
    ));
}

#[test]
fn test_concurrent_claims_have_exactly_one_winner() {
    let manager = Arc::new(create_test_manager());
    let order = manager.register_order(create_draft(PaymentMethod::Card)).unwrap();
    drive_to_ready(&manager, &order.id);

    let handles: Vec<_> = ["driver-1", "driver-2"]
        .into_iter()
        .map(|driver_id| {
            let manager = Arc::clone(&manager);
            let order_id = order.id.clone();
            std::thread::spawn(move || {
                manager.execute_transition(
                    &order_id,
                    OrderStatus::PickedUp,
                    &driver(driver_id),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(ManagerError::ConflictAlreadyAssigned { .. })))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(conflicts, 1);

    // The order ends up assigned to exactly one of the two
    let order = manager.get_order(&order.id).unwrap().unwrap();
    let assigned = order.delivery_person_id.as_deref().unwrap();
    assert!(assigned == "driver-1" || assigned == "driver-2");
}

#[test]
fn test_admin_transition_does_not_assign_a_driver() {
    let manager = create_test_manager();
    let order = manager.register_order(create_draft(PaymentMethod::Card)).unwrap();
    drive_to_ready(&manager, &order.id);

    // An admin forcing the state forward is not a claim
    manager
        .execute_transition(&order.id, OrderStatus::PickedUp, &admin())
        .unwrap();
    let order = manager.get_order(&order.id).unwrap().unwrap();
    assert!(order.delivery_person_id.is_none());
}
