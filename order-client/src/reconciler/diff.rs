//! Minimal change set between the live order and the staged edits

use std::collections::{BTreeSet, HashMap};

use shared::order::{CartLine, ItemChanges, OrderItem, QuantityChange};

use super::display::{StagedItem, normalize_note};

/// Changes that turn `items` into the display list
///
/// Untouched items appear nowhere in the result, so the server keeps their
/// identity, status and preparer.
pub(crate) fn plan(
    items: &[OrderItem],
    to_remove: &BTreeSet<String>,
    overrides: &HashMap<String, i32>,
    to_add: &[StagedItem],
) -> ItemChanges {
    let remove = items
        .iter()
        .filter(|item| to_remove.contains(&item.item_id))
        .map(|item| item.item_id.clone())
        .collect();

    let quantity = items
        .iter()
        .filter(|item| !to_remove.contains(&item.item_id))
        .filter_map(|item| {
            let wanted = *overrides.get(&item.item_id)?;
            (wanted != item.quantity).then(|| QuantityChange {
                item_id: item.item_id.clone(),
                quantity: wanted,
            })
        })
        .collect();

    let add = to_add
        .iter()
        .map(|staged| CartLine {
            catalog: staged.catalog.clone(),
            quantity: staged.quantity,
            note: normalize_note(staged.note.as_deref()).map(str::to_string),
        })
        .collect();

    ItemChanges {
        add,
        remove,
        quantity,
    }
}
