//! Resubmit command handler
//!
//! Replays a customer's staged edits as one minimal change set: new lines,
//! removed items and quantity changes. Untouched items keep their identity.
//! An empty change set is still a resubmission and sends the order back for
//! review.

use async_trait::async_trait;
use std::collections::HashSet;

use super::{ResolvedLine, build_items, new_event};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::{money, rules};
use shared::order::{EventPayload, OrderEvent, OrderEventType, QuantityChange};

/// Resubmit action
#[derive(Debug, Clone)]
pub struct ResubmitAction {
    pub order_id: String,
    pub add: Vec<ResolvedLine>,
    pub remove: Vec<String>,
    pub quantity: Vec<QuantityChange>,
}

#[async_trait]
impl CommandHandler for ResubmitAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        rules::ensure_modifiable(&snapshot)?;

        // Removals: each item once, still present and pending
        let mut removed = HashSet::new();
        for item_id in &self.remove {
            if !removed.insert(item_id.as_str()) {
                return Err(OrderError::Validation(format!(
                    "item {} is removed twice",
                    item_id
                )));
            }
            let item = rules::require_listed_item(&snapshot, item_id)?;
            rules::ensure_item_pending(item)?;
        }

        // Quantity changes: pending items not being removed
        let mut requantified = HashSet::new();
        for change in &self.quantity {
            if removed.contains(change.item_id.as_str()) {
                return Err(OrderError::Validation(format!(
                    "item {} is both removed and re-quantified",
                    change.item_id
                )));
            }
            if !requantified.insert(change.item_id.as_str()) {
                return Err(OrderError::Validation(format!(
                    "item {} has more than one quantity change",
                    change.item_id
                )));
            }
            let item = rules::require_listed_item(&snapshot, &change.item_id)?;
            rules::ensure_item_pending(item)?;
            money::validate_quantity(change.quantity)?;
        }

        let added = build_items(&self.order_id, &self.add)?;

        let seq = ctx.next_sequence();
        let event = new_event(
            seq,
            &self.order_id,
            metadata,
            OrderEventType::OrderResubmitted,
            EventPayload::OrderResubmitted {
                added,
                removed: self.remove.clone(),
                quantity: self.quantity.clone(),
            },
        );

        Ok(vec![event])
    }
}
