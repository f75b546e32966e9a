//! Edit Reconciler
//!
//! Client-side staging buffer for changes to an order that is waiting on
//! the customer (rejected by staff, or opened for editing on purpose).
//!
//! ```text
//! live order ──┬─ items_to_remove ────┐
//!              ├─ quantity_overrides ─┼─► display list
//!              └─ items_to_add ───────┘
//!
//! live order + buffer ─► plan() ─► resubmit
//! ```
//!
//! Nothing reaches the server until [`EditReconciler::resubmit`], which sends
//! one minimal change set. A failed resubmission leaves the buffer intact.

mod diff;
mod display;

use std::collections::{BTreeSet, HashMap};

use shared::order::{
    CatalogEntry, ItemChanges, ItemStatus, MAX_QUANTITY, OrderSnapshot, OrderStatus,
    ReviewStatus,
};
use shared::util::prefixed_id;
use thiserror::Error;

pub use display::{DisplayRow, RowKey, StagedItem};

use crate::{ClientResult, OrderApi};

/// Local edit errors (never sent to the server)
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditError {
    #[error("order {order_id} is {status} and cannot be edited")]
    NotEditable {
        order_id: String,
        status: OrderStatus,
    },

    #[error("no edit in progress")]
    NotEditing,

    #[error("quantity must be between 1 and {max}, got {0}", max = MAX_QUANTITY)]
    InvalidQuantity(i32),

    #[error("row {0:?} is not on the display list")]
    UnknownRow(RowKey),

    #[error("item {item_id} is already {status}")]
    ItemLocked { item_id: String, status: ItemStatus },
}

/// Staging buffer over one order
#[derive(Debug, Clone)]
pub struct EditReconciler {
    order: OrderSnapshot,
    editing: bool,
    items_to_add: Vec<StagedItem>,
    items_to_remove: BTreeSet<String>,
    quantity_overrides: HashMap<String, i32>,
    display: Vec<DisplayRow>,
}

impl EditReconciler {
    /// Wrap a live order; a rejected order opens for editing right away
    pub fn new(order: OrderSnapshot) -> Self {
        let mut reconciler = Self {
            editing: false,
            order,
            items_to_add: Vec::new(),
            items_to_remove: BTreeSet::new(),
            quantity_overrides: HashMap::new(),
            display: Vec::new(),
        };
        reconciler.editing = reconciler.is_rejected();
        reconciler.refresh();
        reconciler
    }

    pub fn order(&self) -> &OrderSnapshot {
        &self.order
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn display(&self) -> &[DisplayRow] {
        &self.display
    }

    pub fn staged(&self) -> &[StagedItem] {
        &self.items_to_add
    }

    /// Total of the display list
    pub fn display_total(&self) -> f64 {
        self.display.iter().map(DisplayRow::line_total).sum()
    }

    pub fn has_changes(&self) -> bool {
        !self.plan().is_empty()
    }

    /// Open the order for editing
    pub fn begin_edit(&mut self) -> Result<(), EditError> {
        if self.order.status.is_terminal() {
            return Err(EditError::NotEditable {
                order_id: self.order.order_id.clone(),
                status: self.order.status,
            });
        }
        self.editing = true;
        Ok(())
    }

    /// Drop every staged change; a rejected order stays open
    pub fn discard(&mut self) {
        self.clear_buffer();
        self.editing = self.is_rejected();
        self.refresh();
    }

    /// Stage an addition, merging into a matching row when there is one
    ///
    /// A matching pending server row grows through a quantity override; a
    /// matching staged row grows in place. Anything else becomes a new
    /// staged row.
    pub fn add(
        &mut self,
        entry: &CatalogEntry,
        quantity: i32,
        note: Option<&str>,
    ) -> Result<RowKey, EditError> {
        self.ensure_editing()?;
        check_quantity(quantity)?;
        let note = display::normalize_note(note);

        let merge_target = self
            .display
            .iter()
            .find(|row| {
                row.merges_with(&entry.catalog, note)
                    && row.status.is_none_or(|s| s == ItemStatus::Pending)
            })
            .map(|row| (row.key.clone(), row.quantity));

        // Merged totals stay in range too; the buffer is untouched on error
        if let Some((_, current)) = &merge_target {
            check_quantity(current.saturating_add(quantity))?;
        }

        let key = match merge_target {
            Some((RowKey::Server(item_id), current)) => {
                self.quantity_overrides
                    .insert(item_id.clone(), current + quantity);
                RowKey::Server(item_id)
            }
            Some((RowKey::Staged(temp_id), current)) => {
                if let Some(staged) = self
                    .items_to_add
                    .iter_mut()
                    .find(|s| s.temp_id == temp_id)
                {
                    staged.quantity = current + quantity;
                }
                RowKey::Staged(temp_id)
            }
            None => {
                let temp_id = prefixed_id("tmp");
                self.items_to_add.push(StagedItem {
                    temp_id: temp_id.clone(),
                    catalog: entry.catalog.clone(),
                    name: entry.name.clone(),
                    price: entry.price,
                    quantity,
                    note: note.map(str::to_string),
                });
                RowKey::Staged(temp_id)
            }
        };

        self.refresh();
        Ok(key)
    }

    /// Stage a removal
    ///
    /// Removing a staged row just forgets it; a server row is queued for
    /// removal on resubmission.
    pub fn remove(&mut self, key: &RowKey) -> Result<(), EditError> {
        self.ensure_editing()?;
        match key {
            RowKey::Staged(temp_id) => {
                let before = self.items_to_add.len();
                self.items_to_add.retain(|s| &s.temp_id != temp_id);
                if self.items_to_add.len() == before {
                    return Err(EditError::UnknownRow(key.clone()));
                }
            }
            RowKey::Server(item_id) => {
                self.ensure_pending(item_id, key)?;
                self.quantity_overrides.remove(item_id);
                self.items_to_remove.insert(item_id.clone());
            }
        }
        self.refresh();
        Ok(())
    }

    /// Set a row's quantity; zero or less removes the row
    pub fn set_quantity(&mut self, key: &RowKey, quantity: i32) -> Result<(), EditError> {
        self.ensure_editing()?;
        if quantity <= 0 {
            return self.remove(key);
        }
        check_quantity(quantity)?;
        match key {
            RowKey::Staged(temp_id) => {
                let staged = self
                    .items_to_add
                    .iter_mut()
                    .find(|s| &s.temp_id == temp_id)
                    .ok_or_else(|| EditError::UnknownRow(key.clone()))?;
                staged.quantity = quantity;
            }
            RowKey::Server(item_id) => {
                if self.items_to_remove.contains(item_id) {
                    return Err(EditError::UnknownRow(key.clone()));
                }
                let live = self.ensure_pending(item_id, key)?;
                if quantity == live {
                    self.quantity_overrides.remove(item_id);
                } else {
                    self.quantity_overrides.insert(item_id.clone(), quantity);
                }
            }
        }
        self.refresh();
        Ok(())
    }

    /// Minimal change set for the current buffer
    pub fn plan(&self) -> ItemChanges {
        diff::plan(
            &self.order.items,
            &self.items_to_remove,
            &self.quantity_overrides,
            &self.items_to_add,
        )
    }

    /// Send the staged changes as one resubmission
    ///
    /// On success the buffer is cleared and the returned order becomes the
    /// new base. On failure nothing changes locally so the customer can
    /// retry.
    pub async fn resubmit<A>(&mut self, api: &A) -> ClientResult<&OrderSnapshot>
    where
        A: OrderApi + ?Sized,
    {
        self.ensure_editing()?;
        let changes = self.plan();
        tracing::debug!(
            order_id = %self.order.order_id,
            add = changes.add.len(),
            remove = changes.remove.len(),
            quantity = changes.quantity.len(),
            "Resubmitting order"
        );

        match api.resubmit(&self.order.order_id, changes).await {
            Ok(order) => {
                self.order = order;
                self.clear_buffer();
                self.editing = self.is_rejected();
                self.refresh();
                Ok(&self.order)
            }
            Err(e) => {
                tracing::warn!(order_id = %self.order.order_id, error = %e, "Resubmission failed");
                Err(e)
            }
        }
    }

    /// Replace the live base with a newer server view
    ///
    /// Staged removals and overrides for items that are gone or no longer
    /// pending are dropped; staged additions are kept.
    pub fn rebase(&mut self, order: OrderSnapshot) {
        if order.order_id != self.order.order_id {
            tracing::warn!(
                expected = %self.order.order_id,
                got = %order.order_id,
                "Ignoring rebase onto another order"
            );
            return;
        }
        self.order = order;

        let order = &self.order;
        let still_pending = |id: &String| {
            order
                .find_item(id)
                .is_some_and(|i| i.status == ItemStatus::Pending)
        };
        self.items_to_remove.retain(|id| still_pending(id));
        self.quantity_overrides.retain(|id, _| still_pending(id));

        if self.order.status.is_terminal() {
            self.clear_buffer();
            self.editing = false;
        } else if self.is_rejected() {
            self.editing = true;
        }
        self.refresh();
    }

    fn is_rejected(&self) -> bool {
        self.order.status == OrderStatus::Pending
            && self.order.waiter_response.status == ReviewStatus::Rejected
    }

    fn ensure_editing(&self) -> Result<(), EditError> {
        if self.editing {
            Ok(())
        } else {
            Err(EditError::NotEditing)
        }
    }

    /// Live quantity of a pending server item
    fn ensure_pending(&self, item_id: &str, key: &RowKey) -> Result<i32, EditError> {
        let item = self
            .order
            .find_item(item_id)
            .ok_or_else(|| EditError::UnknownRow(key.clone()))?;
        if item.status != ItemStatus::Pending {
            return Err(EditError::ItemLocked {
                item_id: item_id.to_string(),
                status: item.status,
            });
        }
        Ok(item.quantity)
    }

    fn clear_buffer(&mut self) {
        self.items_to_add.clear();
        self.items_to_remove.clear();
        self.quantity_overrides.clear();
    }

    fn refresh(&mut self) {
        self.display = display::build(
            &self.order.items,
            &self.items_to_remove,
            &self.quantity_overrides,
            &self.items_to_add,
        );
    }
}

fn check_quantity(quantity: i32) -> Result<(), EditError> {
    if (1..=MAX_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(EditError::InvalidQuantity(quantity))
    }
}

#[cfg(test)]
pub(crate) mod tests;
