//! StaffRespond command handler
//!
//! Floor staff approve the current order content or reject it with a reason.

use async_trait::async_trait;

use super::new_event;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus, ReviewStatus};

/// StaffRespond action
#[derive(Debug, Clone)]
pub struct StaffRespondAction {
    pub order_id: String,
    pub approved: bool,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for StaffRespondAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        if snapshot.status != OrderStatus::Pending {
            return Err(OrderError::IllegalTransition(format!(
                "order {} is {}, only pending orders can be reviewed",
                snapshot.order_id, snapshot.status
            )));
        }
        if snapshot.waiter_response.status != ReviewStatus::Pending {
            return Err(OrderError::IllegalTransition(format!(
                "order {} was already reviewed",
                snapshot.order_id
            )));
        }

        let reason = self
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        if self.approved {
            if snapshot.customer_confirmed {
                return Err(OrderError::IllegalTransition(format!(
                    "order {} is already confirmed by the customer",
                    snapshot.order_id
                )));
            }
        } else if reason.is_none() {
            return Err(OrderError::Validation(
                "a rejection needs a reason".to_string(),
            ));
        }

        let seq = ctx.next_sequence();
        let event = new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::StaffResponded,
            EventPayload::StaffResponded {
                staff_id: metadata.operator_id.clone(),
                approved: self.approved,
                reason,
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::{metadata, seed};
    use crate::orders::storage::OrderStorage;
    use shared::Role;

    fn respond(approved: bool, reason: Option<&str>) -> StaffRespondAction {
        StaffRespondAction {
            order_id: "order-1".to_string(),
            approved,
            reason: reason.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_rejection_carries_trimmed_reason() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::Pending, vec![]);
        let mut ctx = CommandContext::new(&storage);

        let events = respond(false, Some("  table full "))
            .execute(&mut ctx, &metadata(Role::Waiter))
            .await
            .unwrap();
        match &events[0].payload {
            EventPayload::StaffResponded {
                staff_id,
                approved,
                reason,
            } => {
                assert_eq!(staff_id, "user-1");
                assert!(!approved);
                assert_eq!(reason.as_deref(), Some("table full"));
            }
            other => panic!("Expected StaffResponded payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejection_without_reason_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::Pending, vec![]);
        let mut ctx = CommandContext::new(&storage);

        let result = respond(false, Some("   "))
            .execute(&mut ctx, &metadata(Role::Waiter))
            .await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_second_review_conflicts() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut snapshot = seed(&storage, OrderStatus::Pending, vec![]);
        snapshot.waiter_response.status = ReviewStatus::Approved;
        let txn = storage.write().unwrap();
        txn.put_order(&snapshot).unwrap();
        txn.commit().unwrap();
        let mut ctx = CommandContext::new(&storage);

        let result = respond(true, None)
            .execute(&mut ctx, &metadata(Role::Waiter))
            .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn test_review_after_confirmation_conflicts() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::Confirmed, vec![]);
        let mut ctx = CommandContext::new(&storage);

        let result = respond(true, None)
            .execute(&mut ctx, &metadata(Role::Waiter))
            .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }
}
