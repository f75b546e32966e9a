//! CreateOrder command handler
//!
//! Creates the order, its items and its unpaid payment in one event.

use async_trait::async_trait;

use super::{ResolvedLine, build_items, new_event};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, PaymentMethod};

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    /// Pre-generated by the manager so the order lock can be taken up front
    pub order_id: String,
    pub table_id: Option<String>,
    pub customer_id: Option<String>,
    pub lines: Vec<ResolvedLine>,
    pub payment_method: Option<PaymentMethod>,
}

#[async_trait]
impl CommandHandler for CreateOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.lines.is_empty() {
            return Err(OrderError::Validation(
                "an order needs at least one item".to_string(),
            ));
        }

        let items = build_items(&self.order_id, &self.lines)?;
        let seq = ctx.next_sequence();

        let event = new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::OrderCreated,
            EventPayload::OrderCreated {
                customer_id: self.customer_id.clone(),
                table_id: self.table_id.clone(),
                items,
                payment_id: shared::util::prefixed_id("pay"),
                payment_method: self.payment_method.unwrap_or_default(),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::{metadata, resolved};
    use crate::orders::storage::OrderStorage;
    use shared::Role;
    use shared::order::ItemStatus;

    fn action(lines: Vec<ResolvedLine>) -> CreateOrderAction {
        CreateOrderAction {
            order_id: "order-1".to_string(),
            table_id: Some("T1".to_string()),
            customer_id: Some("cust-1".to_string()),
            lines,
            payment_method: None,
        }
    }

    #[tokio::test]
    async fn test_create_order_freezes_catalog_prices() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut ctx = CommandContext::new(&storage);

        let events = action(vec![resolved("d-1", 50_000.0, 1), resolved("d-2", 100_000.0, 1)])
            .execute(&mut ctx, &metadata(Role::Customer))
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, OrderEventType::OrderCreated);
        if let EventPayload::OrderCreated {
            items,
            customer_id,
            payment_method,
            ..
        } = &events[0].payload
        {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].price, 50_000.0);
            assert_eq!(items[0].name, "Dish d-1");
            assert_eq!(items[0].order_id, "order-1");
            assert!(items.iter().all(|i| i.status == ItemStatus::Pending));
            assert_eq!(customer_id.as_deref(), Some("cust-1"));
            assert_eq!(*payment_method, PaymentMethod::Cash);
        } else {
            panic!("Expected OrderCreated payload");
        }
    }

    #[tokio::test]
    async fn test_create_order_without_lines_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut ctx = CommandContext::new(&storage);

        let result = action(vec![])
            .execute(&mut ctx, &metadata(Role::Guest))
            .await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_order_rejects_bad_quantity() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut ctx = CommandContext::new(&storage);

        let result = action(vec![resolved("d-1", 10.0, 0)])
            .execute(&mut ctx, &metadata(Role::Guest))
            .await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }
}
