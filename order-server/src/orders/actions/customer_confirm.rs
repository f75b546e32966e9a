//! CustomerConfirm command handler

use async_trait::async_trait;

use super::new_event;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus, ReviewStatus};

/// CustomerConfirm action
///
/// Accepts a staff-approved order and releases it to the kitchen.
#[derive(Debug, Clone)]
pub struct CustomerConfirmAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for CustomerConfirmAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        let ready_to_confirm = snapshot.status == OrderStatus::Pending
            && snapshot.waiter_response.status == ReviewStatus::Approved
            && !snapshot.customer_confirmed;
        if !ready_to_confirm {
            return Err(OrderError::IllegalTransition(format!(
                "order {} is not awaiting customer confirmation",
                snapshot.order_id
            )));
        }

        let seq = ctx.next_sequence();
        Ok(vec![new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::CustomerConfirmed,
            EventPayload::CustomerConfirmed {},
        )])
    }
}
