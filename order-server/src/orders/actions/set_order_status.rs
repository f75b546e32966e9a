//! SetOrderStatus command handler
//!
//! Manual order status transitions. `confirmed → preparing` is the same
//! operation as start-preparing and emits `PreparationStarted`.

use async_trait::async_trait;

use super::new_event;
use crate::orders::rules;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    EventPayload, ItemStatus, OrderEvent, OrderEventType, OrderStatus, PaymentMethod,
};

/// SetOrderStatus action
#[derive(Debug, Clone)]
pub struct SetOrderStatusAction {
    pub order_id: String,
    pub status: OrderStatus,
    /// Settlement method, only meaningful when moving to `paid`
    pub payment_method: Option<PaymentMethod>,
}

#[async_trait]
impl CommandHandler for SetOrderStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        rules::check_status_transition(&snapshot, self.status)?;

        let seq = ctx.next_sequence();
        let event = if self.status == OrderStatus::Preparing {
            new_event(
                seq,
                &self.order_id,
                metadata,
                OrderEventType::PreparationStarted,
                EventPayload::PreparationStarted {
                    item_ids: snapshot
                        .items_in(ItemStatus::Pending)
                        .map(|i| i.item_id.clone())
                        .collect(),
                },
            )
        } else {
            let payment_method = match self.status {
                OrderStatus::Paid => self.payment_method,
                _ => None,
            };
            new_event(
                seq,
                &self.order_id,
                metadata,
                OrderEventType::OrderStatusChanged,
                EventPayload::OrderStatusChanged {
                    from: snapshot.status,
                    to: self.status,
                    payment_method,
                },
            )
        };

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::{item, metadata, seed};
    use crate::orders::storage::OrderStorage;
    use shared::Role;

    fn action(status: OrderStatus) -> SetOrderStatusAction {
        SetOrderStatusAction {
            order_id: "order-1".to_string(),
            status,
            payment_method: Some(PaymentMethod::Card),
        }
    }

    #[tokio::test]
    async fn test_confirmed_to_preparing_starts_preparation() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(
            &storage,
            OrderStatus::Confirmed,
            vec![
                item("order-1", "i-1", 10.0, ItemStatus::Pending),
                item("order-1", "i-2", 10.0, ItemStatus::Pending),
            ],
        );
        let mut ctx = CommandContext::new(&storage);

        let events = action(OrderStatus::Preparing)
            .execute(&mut ctx, &metadata(Role::Waiter))
            .await
            .unwrap();
        assert_eq!(events[0].event_type, OrderEventType::PreparationStarted);
        if let EventPayload::PreparationStarted { item_ids } = &events[0].payload {
            assert_eq!(item_ids, &vec!["i-1".to_string(), "i-2".to_string()]);
        } else {
            panic!("Expected PreparationStarted payload");
        }
    }

    #[tokio::test]
    async fn test_pay_carries_method_only_when_paying() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::Served, vec![]);
        let mut ctx = CommandContext::new(&storage);

        let events = action(OrderStatus::Paid)
            .execute(&mut ctx, &metadata(Role::Waiter))
            .await
            .unwrap();
        match &events[0].payload {
            EventPayload::OrderStatusChanged {
                from,
                to,
                payment_method,
            } => {
                assert_eq!(*from, OrderStatus::Served);
                assert_eq!(*to, OrderStatus::Paid);
                assert_eq!(*payment_method, Some(PaymentMethod::Card));
            }
            other => panic!("Expected OrderStatusChanged payload, got {:?}", other),
        }

        let storage = OrderStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::Served, vec![]);
        let mut ctx = CommandContext::new(&storage);
        let events = action(OrderStatus::Cancelled)
            .execute(&mut ctx, &metadata(Role::Waiter))
            .await
            .unwrap();
        assert!(matches!(
            events[0].payload,
            EventPayload::OrderStatusChanged {
                payment_method: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_ready_requires_finished_items() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(
            &storage,
            OrderStatus::Preparing,
            vec![
                item("order-1", "i-1", 10.0, ItemStatus::Ready),
                item("order-1", "i-2", 10.0, ItemStatus::Preparing),
            ],
        );
        let mut ctx = CommandContext::new(&storage);

        let result = action(OrderStatus::Ready)
            .execute(&mut ctx, &metadata(Role::Waiter))
            .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn test_terminal_orders_cannot_move() {
        for status in [OrderStatus::Paid, OrderStatus::Cancelled] {
            let storage = OrderStorage::open_in_memory().unwrap();
            seed(&storage, status, vec![]);
            let mut ctx = CommandContext::new(&storage);

            let result = action(OrderStatus::Cancelled)
                .execute(&mut ctx, &metadata(Role::Admin))
                .await;
            assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
        }
    }
}
