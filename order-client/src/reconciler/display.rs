//! Display list: what the customer sees while editing

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use shared::order::{CatalogRef, ItemStatus, OrderItem};

/// Row identity in the display list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RowKey {
    /// Existing server item
    Server(String),
    /// Uncommitted addition (temporary id)
    Staged(String),
}

impl RowKey {
    pub fn is_staged(&self) -> bool {
        matches!(self, RowKey::Staged(_))
    }
}

/// Addition waiting for resubmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedItem {
    pub temp_id: String,
    pub catalog: CatalogRef,
    /// Preview only; the server re-resolves name and price
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub key: RowKey,
    pub catalog: CatalogRef,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// None for staged rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

impl DisplayRow {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Same catalog entry, variant and note
    pub fn merges_with(&self, catalog: &CatalogRef, note: Option<&str>) -> bool {
        same_line(&self.catalog, self.note.as_deref(), catalog, note)
    }

    fn from_item(item: &OrderItem, quantity: i32) -> Self {
        Self {
            key: RowKey::Server(item.item_id.clone()),
            catalog: item.catalog.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity,
            note: item.note.clone(),
            status: Some(item.status),
        }
    }

    fn from_staged(staged: &StagedItem) -> Self {
        Self {
            key: RowKey::Staged(staged.temp_id.clone()),
            catalog: staged.catalog.clone(),
            name: staged.name.clone(),
            price: staged.price,
            quantity: staged.quantity,
            note: staged.note.clone(),
            status: None,
        }
    }
}

/// Blank notes count as no note
pub(crate) fn normalize_note(note: Option<&str>) -> Option<&str> {
    note.map(str::trim).filter(|n| !n.is_empty())
}

pub(crate) fn same_line(
    a: &CatalogRef,
    a_note: Option<&str>,
    b: &CatalogRef,
    b_note: Option<&str>,
) -> bool {
    a == b && normalize_note(a_note) == normalize_note(b_note)
}

/// Live items minus removals, with overrides, followed by staged additions
pub(crate) fn build(
    items: &[OrderItem],
    to_remove: &BTreeSet<String>,
    overrides: &HashMap<String, i32>,
    to_add: &[StagedItem],
) -> Vec<DisplayRow> {
    items
        .iter()
        .filter(|item| !to_remove.contains(&item.item_id))
        .map(|item| {
            let quantity = overrides
                .get(&item.item_id)
                .copied()
                .unwrap_or(item.quantity);
            DisplayRow::from_item(item, quantity)
        })
        .chain(to_add.iter().map(DisplayRow::from_staged))
        .collect()
}
