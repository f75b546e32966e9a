//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    CartLine, CatalogEntry, EventPayload, ItemStatus, OrderEvent, OrderEventType, OrderItem,
};

mod add_items;
mod cancel_item;
mod create_order;
mod customer_confirm;
mod mark_item_ready;
mod resubmit;
mod set_item_status;
mod set_order_status;
mod staff_respond;
mod start_preparing;

pub use add_items::AddItemsAction;
pub use cancel_item::CancelItemAction;
pub use create_order::CreateOrderAction;
pub use customer_confirm::CustomerConfirmAction;
pub use mark_item_ready::MarkItemReadyAction;
pub use resubmit::ResubmitAction;
pub use set_item_status::SetItemStatusAction;
pub use set_order_status::SetOrderStatusAction;
pub use staff_respond::StaffRespondAction;
pub use start_preparing::StartPreparingAction;

/// Cart line paired with the catalog entry it resolved to
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub line: CartLine,
    pub entry: CatalogEntry,
}

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    CreateOrder(CreateOrderAction),
    AddItems(AddItemsAction),
    CancelItem(CancelItemAction),
    Resubmit(ResubmitAction),
    SetOrderStatus(SetOrderStatusAction),
    StaffRespond(StaffRespondAction),
    CustomerConfirm(CustomerConfirmAction),
    StartPreparing(StartPreparingAction),
    SetItemStatus(SetItemStatusAction),
    MarkItemReady(MarkItemReadyAction),
}

/// Manual implementation of CommandHandler for CommandAction
#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::CreateOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::AddItems(action) => action.execute(ctx, metadata).await,
            CommandAction::CancelItem(action) => action.execute(ctx, metadata).await,
            CommandAction::Resubmit(action) => action.execute(ctx, metadata).await,
            CommandAction::SetOrderStatus(action) => action.execute(ctx, metadata).await,
            CommandAction::StaffRespond(action) => action.execute(ctx, metadata).await,
            CommandAction::CustomerConfirm(action) => action.execute(ctx, metadata).await,
            CommandAction::StartPreparing(action) => action.execute(ctx, metadata).await,
            CommandAction::SetItemStatus(action) => action.execute(ctx, metadata).await,
            CommandAction::MarkItemReady(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Build an event stamped with the command's operator
pub(crate) fn new_event(
    sequence: u64,
    order_id: &str,
    metadata: &CommandMetadata,
    event_type: OrderEventType,
    payload: EventPayload,
) -> OrderEvent {
    OrderEvent::new(
        sequence,
        order_id.to_string(),
        metadata.operator_id.clone(),
        metadata.operator_role,
        metadata.command_id.clone(),
        Some(metadata.timestamp),
        event_type,
        payload,
    )
}

/// Validate resolved lines and freeze them into pending order items
pub(crate) fn build_items(
    order_id: &str,
    lines: &[ResolvedLine],
) -> Result<Vec<OrderItem>, OrderError> {
    let now = shared::util::now_millis();
    lines
        .iter()
        .map(|resolved| {
            money::validate_cart_line(&resolved.line, &resolved.entry)?;
            Ok(OrderItem {
                item_id: shared::util::prefixed_id("itm"),
                order_id: order_id.to_string(),
                catalog: resolved.line.catalog.clone(),
                item_type: resolved.line.catalog.variant,
                name: resolved.entry.name.clone(),
                price: resolved.entry.price,
                expense: resolved.entry.expense,
                quantity: resolved.line.quantity,
                status: ItemStatus::Pending,
                prepared_by: None,
                note: normalize_note(resolved.line.note.as_deref()),
                created_at: now,
                updated_at: now,
            })
        })
        .collect()
}

/// Blank notes are stored as no note
pub(crate) fn normalize_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}
