//! AddItems command handler
//!
//! Adds items to an existing order and sends it back for staff review.

use async_trait::async_trait;

use super::{ResolvedLine, build_items, new_event};
use crate::orders::rules;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// AddItems action
#[derive(Debug, Clone)]
pub struct AddItemsAction {
    pub order_id: String,
    pub lines: Vec<ResolvedLine>,
}

#[async_trait]
impl CommandHandler for AddItemsAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Validate order status
        rules::ensure_modifiable(&snapshot)?;
        if self.lines.is_empty() {
            return Err(OrderError::Validation("no items to add".to_string()));
        }

        // 3. Freeze catalog data into new items
        let items = build_items(&self.order_id, &self.lines)?;

        // 4. Create event
        let seq = ctx.next_sequence();
        let event = new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::ItemsAdded,
            EventPayload::ItemsAdded { items },
        );

        Ok(vec![event])
    }
}
