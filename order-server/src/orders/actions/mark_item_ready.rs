//! MarkItemReady command handler

use async_trait::async_trait;

use super::new_event;
use crate::orders::rules;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, ItemStatus, OrderEvent, OrderEventType};

/// MarkItemReady action
///
/// Records who prepared the item. The item must be in preparation.
#[derive(Debug, Clone)]
pub struct MarkItemReadyAction {
    pub order_id: String,
    pub item_id: String,
    pub preparer_id: String,
}

#[async_trait]
impl CommandHandler for MarkItemReadyAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        let item = rules::require_item(&snapshot, &self.item_id)?;
        if item.status != ItemStatus::Preparing {
            return Err(OrderError::IllegalTransition(format!(
                "item {} is {}, only items in preparation can be marked ready",
                item.item_id, item.status
            )));
        }
        rules::check_item_transition(&snapshot, item, ItemStatus::Ready)?;

        let preparer_id = self.preparer_id.trim();
        if preparer_id.is_empty() {
            return Err(OrderError::Validation("preparer is required".to_string()));
        }

        let seq = ctx.next_sequence();
        Ok(vec![new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::ItemStatusChanged,
            EventPayload::ItemStatusChanged {
                item_id: self.item_id.clone(),
                from: ItemStatus::Preparing,
                to: ItemStatus::Ready,
                preparer_id: Some(preparer_id.to_string()),
                order_ready: rules::completes_order(&snapshot, &self.item_id, ItemStatus::Ready),
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

    fn ready(item_id: &str) -> MarkItemReadyAction {
        MarkItemReadyAction {
            order_id: "order-1".to_string(),
            item_id: item_id.to_string(),
            preparer_id: "chef-7".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mark_ready_records_preparer() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(
            &storage,
            OrderStatus::Preparing,
            vec![
                item("order-1", "i-1", 10.0, ItemStatus::Preparing),
                item("order-1", "i-2", 10.0, ItemStatus::Preparing),
            ],
        );
        let mut ctx = CommandContext::new(&storage);

        let events = ready("i-1")
            .execute(&mut ctx, &metadata(Role::Kitchen))
            .await
            .unwrap();
        match &events[0].payload {
            EventPayload::ItemStatusChanged {
                preparer_id,
                order_ready,
                ..
            } => {
                assert_eq!(preparer_id.as_deref(), Some("chef-7"));
                assert!(!order_ready);
            }
            other => panic!("Expected ItemStatusChanged payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mark_ready_requires_preparing_item() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(
            &storage,
            OrderStatus::Preparing,
            vec![item("order-1", "i-1", 10.0, ItemStatus::Pending)],
        );
        let mut ctx = CommandContext::new(&storage);

        let result = ready("i-1")
            .execute(&mut ctx, &metadata(Role::Kitchen))
            .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }
}
