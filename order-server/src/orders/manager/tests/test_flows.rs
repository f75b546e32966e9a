use super::*;
use shared::order::{HistoryAction, PaymentMethod, PaymentStatus, QuantityChange};

#[test]
fn test_rejected_order_is_resubmitted_with_minimal_changes() {
    let manager = create_test_manager();
    let order = create_order(&manager, vec![line("pho", 1), line("com", 1)]);
    assert_eq!(order.total_amount, 150_000.0);

    let rejected = respond(&manager, &order.order_id, false, Some("table full")).unwrap();
    assert_eq!(rejected.waiter_response.status, ReviewStatus::Rejected);
    assert_eq!(rejected.waiter_response.reason.as_deref(), Some("table full"));
    assert_eq!(rejected.staff_id.as_deref(), Some("waiter-1"));

    let resubmitted = manager
        .execute_command(customer_cmd(OrderCommandPayload::Resubmit {
            order_id: order.order_id.clone(),
            changes: ItemChanges {
                add: vec![line("tra", 2)],
                remove: vec![],
                quantity: vec![],
            },
        }))
        .unwrap();

    assert_eq!(resubmitted.items.len(), 3);
    assert_eq!(resubmitted.total_amount, 210_000.0);
    assert_eq!(resubmitted.status, OrderStatus::Pending);
    assert_eq!(resubmitted.waiter_response.status, ReviewStatus::Pending);
    assert!(resubmitted.waiter_response.reason.is_none());
    // Untouched items keep their identity
    assert_eq!(resubmitted.items[0].item_id, order.items[0].item_id);
    assert_eq!(resubmitted.items[1].item_id, order.items[1].item_id);

    let actions: Vec<_> = resubmitted
        .confirmation_history
        .iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            HistoryAction::Created,
            HistoryAction::StaffRejected,
            HistoryAction::Resubmitted
        ]
    );

    // The fresh review can be approved and confirmed
    respond(&manager, &order.order_id, true, None).unwrap();
    let confirmed = confirm(&manager, &order.order_id).unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert!(confirmed.customer_confirmed);
}

#[test]
fn test_resubmit_removes_and_requantifies() {
    let manager = create_test_manager();
    let order = create_order(&manager, vec![line("pho", 1), line("com", 1)]);

    let updated = manager
        .execute_command(customer_cmd(OrderCommandPayload::Resubmit {
            order_id: order.order_id.clone(),
            changes: ItemChanges {
                add: vec![],
                remove: vec![order.items[1].item_id.clone()],
                quantity: vec![QuantityChange {
                    item_id: order.items[0].item_id.clone(),
                    quantity: 3,
                }],
            },
        }))
        .unwrap();

    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].quantity, 3);
    assert_eq!(updated.total_amount, 150_000.0);

    // The removed item no longer resolves
    assert!(
        manager
            .storage()
            .item_owner(&order.items[1].item_id)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_resubmit_against_stale_view_conflicts() {
    let manager = create_test_manager();
    let order = create_order(&manager, vec![line("pho", 1), line("com", 1)]);
    let stale_item = order.items[1].item_id.clone();

    manager
        .execute_command(customer_cmd(OrderCommandPayload::CancelItem {
            order_id: order.order_id.clone(),
            item_id: stale_item.clone(),
        }))
        .unwrap();

    let result = manager.execute_command(customer_cmd(OrderCommandPayload::Resubmit {
        order_id: order.order_id.clone(),
        changes: ItemChanges {
            add: vec![],
            remove: vec![],
            quantity: vec![QuantityChange {
                item_id: stale_item,
                quantity: 2,
            }],
        },
    }));

    match result {
        Err(ManagerError::IllegalTransition { current, .. }) => {
            assert_eq!(current.unwrap().items.len(), 1);
        }
        other => panic!("Expected IllegalTransition, got {:?}", other),
    }
}

#[test]
fn test_kitchen_flow_auto_readies_order() {
    let manager = create_test_manager();
    let order = confirmed_order(
        &manager,
        vec![line("pho", 1), line("com", 1), line("tra", 1)],
    );

    let preparing = start_preparing(&manager, &order.order_id).unwrap();
    assert_eq!(preparing.status, OrderStatus::Preparing);
    assert!(
        preparing
            .items
            .iter()
            .all(|i| i.status == ItemStatus::Preparing)
    );

    let first = mark_ready(&manager, &order.items[0].item_id).unwrap();
    assert_eq!(first.status, ItemStatus::Ready);
    assert_eq!(first.prepared_by.as_deref(), Some("chef-1"));
    mark_ready(&manager, &order.items[1].item_id).unwrap();
    let snapshot = manager.get_snapshot(&order.order_id).unwrap().unwrap();
    assert_eq!(snapshot.status, OrderStatus::Preparing);

    mark_ready(&manager, &order.items[2].item_id).unwrap();
    let snapshot = manager.get_snapshot(&order.order_id).unwrap().unwrap();
    assert_eq!(snapshot.status, OrderStatus::Ready);
}

#[test]
fn test_full_lifecycle_settles_payment() {
    let manager = create_test_manager();
    let order = confirmed_order(&manager, vec![line("pho", 2)]);

    // confirmed → preparing through the manual path behaves like start-preparing
    let preparing = set_status(&manager, &order.order_id, OrderStatus::Preparing).unwrap();
    assert_eq!(preparing.items[0].status, ItemStatus::Preparing);

    let item = manager
        .execute_item_command(kitchen_cmd(OrderCommandPayload::SetItemStatus {
            item_id: order.items[0].item_id.clone(),
            status: ItemStatus::Ready,
        }))
        .unwrap();
    assert_eq!(item.status, ItemStatus::Ready);

    let served = set_status(&manager, &order.order_id, OrderStatus::Served).unwrap();
    assert_eq!(served.items[0].status, ItemStatus::Served);
    let served_at = served.served_at.expect("served_at set");
    assert_eq!(served.payment.status, PaymentStatus::Unpaid);

    let paid = manager
        .execute_command(waiter_cmd(OrderCommandPayload::SetOrderStatus {
            order_id: order.order_id.clone(),
            status: OrderStatus::Paid,
            payment_method: Some(PaymentMethod::Card),
        }))
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.served_at, Some(served_at));
    assert_eq!(paid.payment.status, PaymentStatus::Paid);
    assert_eq!(paid.payment.amount_paid, 100_000.0);
    assert_eq!(paid.payment.method, PaymentMethod::Card);
    assert!(paid.payment.pay_time.is_some());

    // Terminal
    assert!(matches!(
        set_status(&manager, &order.order_id, OrderStatus::Cancelled),
        Err(ManagerError::IllegalTransition { .. })
    ));
}

#[test]
fn test_ready_requires_every_item_done() {
    let manager = create_test_manager();
    let order = confirmed_order(&manager, vec![line("pho", 1), line("com", 1)]);
    start_preparing(&manager, &order.order_id).unwrap();
    mark_ready(&manager, &order.items[0].item_id).unwrap();

    assert!(matches!(
        set_status(&manager, &order.order_id, OrderStatus::Ready),
        Err(ManagerError::IllegalTransition { .. })
    ));
}

#[test]
fn test_item_status_moves_one_step_only() {
    let manager = create_test_manager();
    let order = confirmed_order(&manager, vec![line("pho", 1)]);
    start_preparing(&manager, &order.order_id).unwrap();

    let result = manager.execute_item_command(kitchen_cmd(OrderCommandPayload::SetItemStatus {
        item_id: order.items[0].item_id.clone(),
        status: ItemStatus::Served,
    }));
    assert!(matches!(result, Err(ManagerError::IllegalTransition { .. })));
}

#[test]
fn test_adding_items_after_confirmation_reopens_review() {
    let manager = create_test_manager();
    let order = confirmed_order(&manager, vec![line("pho", 1)]);

    let reopened = manager
        .execute_command(customer_cmd(OrderCommandPayload::AddItems {
            order_id: order.order_id.clone(),
            lines: vec![line("tra", 1)],
        }))
        .unwrap();

    assert_eq!(reopened.status, OrderStatus::Pending);
    assert!(!reopened.customer_confirmed);
    assert_eq!(reopened.waiter_response.status, ReviewStatus::Pending);
    assert_eq!(reopened.total_amount, 80_000.0);
}

#[test]
fn test_review_only_while_pending() {
    let manager = create_test_manager();
    let order = create_order(&manager, vec![line("pho", 1)]);
    respond(&manager, &order.order_id, true, None).unwrap();

    // Already reviewed
    assert!(matches!(
        respond(&manager, &order.order_id, false, Some("changed my mind")),
        Err(ManagerError::IllegalTransition { .. })
    ));

    confirm(&manager, &order.order_id).unwrap();
    assert!(matches!(
        respond(&manager, &order.order_id, true, None),
        Err(ManagerError::IllegalTransition { .. })
    ));

    // Rejection requires a reason
    let other = create_order(&manager, vec![line("com", 1)]);
    assert!(matches!(
        respond(&manager, &other.order_id, false, None),
        Err(ManagerError::Validation(_))
    ));
}

#[test]
fn test_cancel_item_rules() {
    let manager = create_test_manager();
    let order = create_order(&manager, vec![line("pho", 2), line("com", 1)]);

    let updated = manager
        .execute_command(customer_cmd(OrderCommandPayload::CancelItem {
            order_id: order.order_id.clone(),
            item_id: order.items[0].item_id.clone(),
        }))
        .unwrap();
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.total_amount, 100_000.0);

    respond(&manager, &order.order_id, true, None).unwrap();
    confirm(&manager, &order.order_id).unwrap();
    start_preparing(&manager, &order.order_id).unwrap();

    let result = manager.execute_command(customer_cmd(OrderCommandPayload::CancelItem {
        order_id: order.order_id.clone(),
        item_id: order.items[1].item_id.clone(),
    }));
    assert!(matches!(result, Err(ManagerError::IllegalTransition { .. })));
}

#[test]
fn test_cancelled_order_rejects_edits() {
    let manager = create_test_manager();
    let order = create_order(&manager, vec![line("pho", 1)]);
    let cancelled = set_status(&manager, &order.order_id, OrderStatus::Cancelled).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.payment.status, PaymentStatus::Unpaid);

    let result = manager.execute_command(customer_cmd(OrderCommandPayload::AddItems {
        order_id: order.order_id.clone(),
        lines: vec![line("tra", 1)],
    }));
    assert!(matches!(result, Err(ManagerError::IllegalTransition { .. })));
}
