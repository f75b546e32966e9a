//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::{CartLine, CatalogEntry, OrderItem, OrderSnapshot};

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed catalog price per unit
const MAX_PRICE: f64 = 100_000_000.0;
pub use shared::order::MAX_QUANTITY;

/// Convert f64 to Decimal (NaN/Infinity become zero)
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Validate a quantity for a new or edited line
pub fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate a cart line against its resolved catalog entry
pub fn validate_cart_line(line: &CartLine, entry: &CatalogEntry) -> Result<(), OrderError> {
    validate_quantity(line.quantity)?;

    if !entry.available {
        return Err(OrderError::Validation(format!(
            "{} ({}) is not available",
            entry.name, line.catalog
        )));
    }
    if !entry.price.is_finite() || entry.price < 0.0 || entry.price > MAX_PRICE {
        return Err(OrderError::Validation(format!(
            "catalog price for {} is out of range: {}",
            line.catalog, entry.price
        )));
    }
    if !entry.expense.is_finite() || entry.expense < 0.0 {
        return Err(OrderError::Validation(format!(
            "catalog expense for {} is out of range: {}",
            line.catalog, entry.expense
        )));
    }
    Ok(())
}

/// price × quantity for one line
pub fn line_total(item: &OrderItem) -> Decimal {
    to_decimal(item.price) * Decimal::from(item.quantity)
}

/// Σ price × quantity over the snapshot's items
pub fn items_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(line_total).sum()
}

/// Recompute `total_amount` from the attached items
pub fn recalculate_total(snapshot: &mut OrderSnapshot) {
    snapshot.total_amount = to_f64(items_total(&snapshot.items));
}

/// Subtract one line from the running total (never below zero)
pub fn subtract_line(snapshot: &mut OrderSnapshot, line_total: f64) {
    let remaining = to_decimal(snapshot.total_amount) - to_decimal(line_total);
    snapshot.total_amount = to_f64(remaining.max(Decimal::ZERO));
}

/// Amount settled on payment: total minus discount, clamped at zero
pub fn payable_amount(snapshot: &OrderSnapshot) -> f64 {
    let due = to_decimal(snapshot.total_amount) - to_decimal(snapshot.discount);
    to_f64(due.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{CatalogRef, CatalogVariant, ItemStatus};

    fn item(price: f64, quantity: i32) -> OrderItem {
        OrderItem {
            item_id: uuid::Uuid::new_v4().to_string(),
            order_id: "order-1".to_string(),
            catalog: CatalogRef::dish("d-1"),
            item_type: CatalogVariant::Dish,
            name: "Pho".to_string(),
            price,
            expense: 0.0,
            quantity,
            status: ItemStatus::Pending,
            prepared_by: None,
            note: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_total_has_no_float_drift() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.items = vec![item(0.1, 3), item(0.2, 1)];
        recalculate_total(&mut snapshot);
        assert_eq!(snapshot.total_amount, 0.5);
    }

    #[test]
    fn test_subtract_line_matches_recompute() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.items = vec![item(50_000.0, 1), item(100_000.0, 1), item(30_000.0, 2)];
        recalculate_total(&mut snapshot);
        assert_eq!(snapshot.total_amount, 210_000.0);

        let removed = snapshot.items.pop().unwrap();
        subtract_line(&mut snapshot, to_f64(line_total(&removed)));
        assert_eq!(snapshot.total_amount, 150_000.0);
        assert_eq!(to_f64(items_total(&snapshot.items)), snapshot.total_amount);
    }

    #[test]
    fn test_payable_amount_clamps_at_zero() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.total_amount = 20.0;
        snapshot.discount = 5.5;
        assert_eq!(payable_amount(&snapshot), 14.5);
        snapshot.discount = 25.0;
        assert_eq!(payable_amount(&snapshot), 0.0);
    }

    #[test]
    fn test_validate_cart_line() {
        let entry = CatalogEntry {
            catalog: CatalogRef::dish("d-1"),
            name: "Pho".to_string(),
            price: 50_000.0,
            expense: 20_000.0,
            available: true,
        };
        let line = CartLine {
            catalog: CatalogRef::dish("d-1"),
            quantity: 2,
            note: None,
        };
        assert!(validate_cart_line(&line, &entry).is_ok());

        let zero = CartLine {
            quantity: 0,
            ..line.clone()
        };
        assert!(matches!(
            validate_cart_line(&zero, &entry),
            Err(OrderError::Validation(_))
        ));

        let sold_out = CatalogEntry {
            available: false,
            ..entry.clone()
        };
        assert!(validate_cart_line(&line, &sold_out).is_err());

        let bad_price = CatalogEntry {
            price: f64::NAN,
            ..entry
        };
        assert!(validate_cart_line(&line, &bad_price).is_err());
    }
}
