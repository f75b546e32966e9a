//! SetItemStatus command handler
//!
//! Kitchen moves one item a single step forward. Readying the last
//! outstanding item of a preparing order also readies the order.

use async_trait::async_trait;

use super::new_event;
use crate::orders::rules;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, ItemStatus, OrderEvent, OrderEventType};

/// SetItemStatus action
#[derive(Debug, Clone)]
pub struct SetItemStatusAction {
    /// Owning order, resolved from the item index
    pub order_id: String,
    pub item_id: String,
    pub status: ItemStatus,
}

#[async_trait]
impl CommandHandler for SetItemStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        let item = rules::require_item(&snapshot, &self.item_id)?;
        rules::check_item_transition(&snapshot, item, self.status)?;

        let preparer_id =
            (self.status == ItemStatus::Ready).then(|| metadata.operator_id.clone());

        let seq = ctx.next_sequence();
        Ok(vec![new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::ItemStatusChanged,
            EventPayload::ItemStatusChanged {
                item_id: self.item_id.clone(),
                from: item.status,
                to: self.status,
                preparer_id,
                order_ready: rules::completes_order(&snapshot, &self.item_id, self.status),
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::{item, metadata, seed};
    use crate::orders::storage::OrderStorage;
    use shared::Role;
    use shared::order::OrderStatus;

    fn set(item_id: &str, status: ItemStatus) -> SetItemStatusAction {
        SetItemStatusAction {
            order_id: "order-1".to_string(),
            item_id: item_id.to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn test_last_item_ready_flags_order_ready() {
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

        let events = set("i-2", ItemStatus::Ready)
            .execute(&mut ctx, &metadata(Role::Kitchen))
            .await
            .unwrap();
        match &events[0].payload {
            EventPayload::ItemStatusChanged {
                from,
                to,
                order_ready,
                preparer_id,
                ..
            } => {
                assert_eq!(*from, ItemStatus::Preparing);
                assert_eq!(*to, ItemStatus::Ready);
                assert!(*order_ready);
                assert_eq!(preparer_id.as_deref(), Some("user-1"));
            }
            other => panic!("Expected ItemStatusChanged payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backward_move_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(
            &storage,
            OrderStatus::Preparing,
            vec![item("order-1", "i-1", 10.0, ItemStatus::Ready)],
        );
        let mut ctx = CommandContext::new(&storage);

        let result = set("i-1", ItemStatus::Preparing)
            .execute(&mut ctx, &metadata(Role::Kitchen))
            .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn test_unknown_item_is_not_found() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::Preparing, vec![]);
        let mut ctx = CommandContext::new(&storage);

        let result = set("ghost", ItemStatus::Ready)
            .execute(&mut ctx, &metadata(Role::Kitchen))
            .await;
        assert!(matches!(result, Err(OrderError::ItemNotFound(_))));
    }
}
