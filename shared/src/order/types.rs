//! Order value types shared by the ledger, the hub and the clients

use serde::{Deserialize, Serialize};

/// Largest quantity a single line may carry
pub const MAX_QUANTITY: i32 = 9999;

/// Order status
///
/// ```text
/// Pending → Confirmed → Preparing → Ready → Served → Paid
///    └──────────┴───────────┴─────────┴───────┴──→ Cancelled
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Paid and Cancelled accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "served" => Ok(OrderStatus::Served),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Item status, strictly forward: Pending → Preparing → Ready → Served
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
}

impl ItemStatus {
    /// Position in the forward-only item lifecycle
    pub fn rank(&self) -> u8 {
        match self {
            ItemStatus::Pending => 0,
            ItemStatus::Preparing => 1,
            ItemStatus::Ready => 2,
            ItemStatus::Served => 3,
        }
    }

    /// Ready or served items count as done for the kitchen
    pub fn is_done(&self) -> bool {
        matches!(self, ItemStatus::Ready | ItemStatus::Served)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Preparing => "preparing",
            ItemStatus::Ready => "ready",
            ItemStatus::Served => "served",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff review status (nested inside a pending order)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Floor staff decision on the current order content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WaiterResponse {
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<i64>,
}

impl WaiterResponse {
    /// Fresh review awaiting staff
    pub fn pending() -> Self {
        Self::default()
    }
}

// ============================================================================
// Payment
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
    EWallet,
}

/// Payment record, one per order
///
/// `status == Paid` exactly when the owning order is paid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub payment_id: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub amount_paid: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_time: Option<i64>,
}

impl Payment {
    pub fn unpaid(payment_id: String, method: PaymentMethod) -> Self {
        Self {
            payment_id,
            method,
            status: PaymentStatus::Unpaid,
            amount_paid: 0.0,
            pay_time: None,
        }
    }
}

// ============================================================================
// Catalog references and items
// ============================================================================

/// What a line points at in the menu
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CatalogVariant {
    Dish,
    Combo,
}

/// Tagged catalog reference: `{ "variant": "dish", "id": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CatalogRef {
    pub variant: CatalogVariant,
    pub id: String,
}

impl CatalogRef {
    pub fn dish(id: impl Into<String>) -> Self {
        Self {
            variant: CatalogVariant::Dish,
            id: id.into(),
        }
    }

    pub fn combo(id: impl Into<String>) -> Self {
        Self {
            variant: CatalogVariant::Combo,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variant {
            CatalogVariant::Dish => write!(f, "dish:{}", self.id),
            CatalogVariant::Combo => write!(f, "combo:{}", self.id),
        }
    }
}

/// Cart line as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub catalog: CatalogRef,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Resolved catalog entry (name/price snapshot source)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub catalog: CatalogRef,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub expense: f64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Order line with name/price/expense frozen at order time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub item_id: String,
    pub order_id: String,
    pub catalog: CatalogRef,
    pub item_type: CatalogVariant,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub expense: f64,
    pub quantity: i32,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// Confirmation history
// ============================================================================

/// Kind of entry in an order's confirmation history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    ItemsAdded,
    ItemCancelled,
    Resubmitted,
    StaffApproved,
    StaffRejected,
    CustomerConfirmed,
    StatusChanged,
}

/// Append-only audit entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmationEntry {
    pub action: HistoryAction,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ============================================================================
// Resubmission changes
// ============================================================================

/// New quantity for an existing server item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuantityChange {
    pub item_id: String,
    pub quantity: i32,
}

/// Minimal edit set replayed on resubmission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ItemChanges {
    #[serde(default)]
    pub add: Vec<CartLine>,
    #[serde(default)]
    pub remove: Vec<String>,
    #[serde(default)]
    pub quantity: Vec<QuantityChange>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.quantity.is_empty()
    }
}

// ============================================================================
// Command result types
// ============================================================================

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    ItemNotFound,
    CatalogEntryNotFound,
    IllegalTransition,
    ValidationFailed,
    InternalError,
    StorageError,
}

/// Command error surfaced to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}
