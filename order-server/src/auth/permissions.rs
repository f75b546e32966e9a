//! Order access rules
//!
//! | actor | may |
//! |-------|-----|
//! | guest (no token) | read and edit guest orders by id |
//! | customer | read and edit own orders and guest orders |
//! | waiter | review, change status, read event logs |
//! | kitchen | start preparing, move items |
//! | admin | everything staff may do |

use shared::Role;
use shared::order::{OrderSnapshot, OrderStatus};

use crate::AppError;
use crate::auth::CurrentUser;

/// Operator id recorded for unauthenticated diners
pub const GUEST_OPERATOR: &str = "guest";

/// Waiters, kitchen and admins
pub fn is_staff(role: &Role) -> bool {
    role.is_floor_staff() || role.is_kitchen()
}

pub fn is_floor_staff(role: &Role) -> bool {
    role.is_floor_staff()
}

pub fn is_kitchen(role: &Role) -> bool {
    role.is_kitchen()
}

/// Operator identity for a ledger command
pub fn operator(user: Option<&CurrentUser>) -> (String, Role) {
    match user {
        Some(user) => (user.id.clone(), user.role),
        None => (GUEST_OPERATOR.to_string(), Role::Guest),
    }
}

/// The caller owns the order (or the order is a guest order)
pub fn is_owner(user: Option<&CurrentUser>, order: &OrderSnapshot) -> bool {
    match user {
        Some(user) => order.is_owned_by(&user.id),
        None => order.is_guest_order(),
    }
}

/// Read access: staff, or the owner
pub fn ensure_order_access(
    user: Option<&CurrentUser>,
    order: &OrderSnapshot,
) -> Result<(), AppError> {
    if user.is_some_and(|u| is_staff(&u.role)) || is_owner(user, order) {
        Ok(())
    } else {
        Err(AppError::forbidden("Not your order"))
    }
}

/// Edit access: the owner only
pub fn ensure_order_owner(
    user: Option<&CurrentUser>,
    order: &OrderSnapshot,
) -> Result<(), AppError> {
    if is_owner(user, order) {
        Ok(())
    } else {
        Err(AppError::forbidden("Not your order"))
    }
}

/// Status changes: floor staff, or the owner cancelling a pending order
pub fn ensure_may_set_status(
    user: Option<&CurrentUser>,
    order: &OrderSnapshot,
    target: OrderStatus,
) -> Result<(), AppError> {
    if user.is_some_and(|u| u.role.is_floor_staff()) {
        return Ok(());
    }
    if target == OrderStatus::Cancelled
        && order.status == OrderStatus::Pending
        && is_owner(user, order)
    {
        return Ok(());
    }
    Err(AppError::forbidden("Waiter role required"))
}
