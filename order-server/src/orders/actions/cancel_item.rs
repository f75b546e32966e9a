//! CancelItem command handler
//!
//! Removes a single pending item. Cancellation is terminal.

use async_trait::async_trait;

use super::new_event;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::{money, rules};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// CancelItem action
#[derive(Debug, Clone)]
pub struct CancelItemAction {
    pub order_id: String,
    pub item_id: String,
}

#[async_trait]
impl CommandHandler for CancelItemAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        rules::ensure_modifiable(&snapshot)?;

        let item = rules::require_listed_item(&snapshot, &self.item_id)?;
        rules::ensure_item_pending(item)?;

        let seq = ctx.next_sequence();
        let event = new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::ItemCancelled,
            EventPayload::ItemCancelled {
                item_id: item.item_id.clone(),
                item_name: item.name.clone(),
                line_total: money::to_f64(money::line_total(item)),
            },
        );

        Ok(vec![event])
    }
}
