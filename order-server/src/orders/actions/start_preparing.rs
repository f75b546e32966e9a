//! StartPreparing command handler
//!
//! Kitchen picks up a confirmed order: every pending item moves to preparing.

use async_trait::async_trait;

use super::new_event;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, ItemStatus, OrderEvent, OrderEventType, OrderStatus};

/// StartPreparing action
#[derive(Debug, Clone)]
pub struct StartPreparingAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for StartPreparingAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if snapshot.status != OrderStatus::Confirmed {
            return Err(OrderError::IllegalTransition(format!(
                "order {} is {}, only confirmed orders can start preparing",
                snapshot.order_id, snapshot.status
            )));
        }

        let item_ids = snapshot
            .items_in(ItemStatus::Pending)
            .map(|i| i.item_id.clone())
            .collect();

        let seq = ctx.next_sequence();
        Ok(vec![new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::PreparationStarted,
            EventPayload::PreparationStarted { item_ids },
        )])
    }
}
