//! Order entity - One customer tab, bound to a table or to takeaway.
//!
//! Line items, the snapshot of items already sent to the kitchen, and the payments
//! captured so far are stored as JSON documents inside the order row, so an order
//! is always read and written as a whole.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Lifecycle state of an order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Open for free editing, not yet visible to the kitchen
    #[sea_orm(string_value = "active")]
    Active,
    /// Sent to the kitchen at least once
    #[sea_orm(string_value = "preparing")]
    Preparing,
    /// The kitchen marked every item as prepared
    #[sea_orm(string_value = "ready")]
    Ready,
    /// Paid and frozen
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Voided; excluded from occupancy and revenue
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Whether the order still holds its table (`active`, `preparing` or `ready`).
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Active | Self::Preparing | Self::Ready)
    }

    /// Whether the order reached a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Lowercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a payment was made.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash into the drawer
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Card terminal
    #[sea_orm(string_value = "card")]
    Card,
    /// Bank transfer
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
        })
    }
}

/// Identity of an order line for merging and for the kitchen floor lookup.
///
/// Two entries with different notes, or one with and one without a custom price,
/// are distinct rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// Catalog id of the item
    pub menu_item_id: String,
    /// Variant selector (e.g. flavor)
    pub notes: String,
    /// Whether the line carries its own price
    pub custom_priced: bool,
}

/// A single line of an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Catalog id of the item
    pub menu_item_id: String,
    /// Number of units, always greater than zero
    pub quantity: u32,
    /// Variant selector (e.g. flavor); empty when not applicable
    #[serde(default)]
    pub notes: String,
    /// Overrides the catalog price when present
    #[serde(default)]
    pub custom_price: Option<f64>,
}

impl OrderItem {
    /// Plain catalog-priced line without notes.
    #[must_use]
    pub fn new(menu_item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            quantity,
            notes: String::new(),
            custom_price: None,
        }
    }

    /// Sets the variant notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets a custom unit price.
    #[must_use]
    pub const fn with_custom_price(mut self, price: f64) -> Self {
        self.custom_price = Some(price);
        self
    }

    /// Merge identity of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            menu_item_id: self.menu_item_id.clone(),
            notes: self.notes.clone(),
            custom_priced: self.custom_price.is_some(),
        }
    }
}

/// Ordered list of order lines stored as a JSON column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OrderItems(pub Vec<OrderItem>);

impl Deref for OrderItems {
    type Target = [OrderItem];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<OrderItem>> for OrderItems {
    fn from(items: Vec<OrderItem>) -> Self {
        Self(items)
    }
}

/// A payment captured against an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// How it was paid
    pub method: PaymentMethod,
    /// Amount applied to the order balance
    pub amount: f64,
    /// Cash handed over by the customer, if counted
    pub received: Option<f64>,
    /// When the payment was captured
    pub at: DateTimeUtc,
}

/// Payments stored as a JSON column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Payments(pub Vec<Payment>);

impl Deref for Payments {
    type Target = [Payment];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Timestamp-derived identifier, assigned at creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Table number, `None` for takeaway
    pub table_id: Option<i32>,
    /// Current line items
    #[sea_orm(column_type = "Json")]
    pub items: OrderItems,
    /// Items as last sent to the kitchen (the locked floor)
    #[sea_orm(column_type = "Json")]
    pub sent_items: OrderItems,
    /// Payments captured so far
    #[sea_orm(column_type = "Json")]
    pub payments: Payments,
    /// Lifecycle state
    pub status: OrderStatus,
    /// Sum of line prices, recomputed on every item change
    pub total: f64,
    /// Free text for the kitchen or the cashier
    pub notes: String,
    /// When the order was opened
    pub created_at: DateTimeUtc,
    /// Username that opened the order
    pub created_by: String,
    /// Last modification
    pub updated_at: DateTimeUtc,
    /// When payment was captured
    pub completed_at: Option<DateTimeUtc>,
    /// Method of the payment that closed the order
    pub payment_method: Option<PaymentMethod>,
}

impl Model {
    /// Whether this is a takeaway order.
    #[must_use]
    pub const fn is_takeaway(&self) -> bool {
        self.table_id.is_none()
    }

    /// Sum of all captured payments.
    #[must_use]
    pub fn paid_amount(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Remaining balance: total minus prior payments, never negative.
    #[must_use]
    pub fn outstanding(&self) -> f64 {
        crate::core::round_cents((self.total - self.paid_amount()).max(0.0))
    }

    /// Whether the current items differ from what the kitchen has seen.
    #[must_use]
    pub fn has_unsent_changes(&self) -> bool {
        self.items != self.sent_items
    }

    /// Creation order: `created_at`, then the numeric parts of a `{millis}-{seq}`
    /// id, then the raw id.
    #[must_use]
    pub fn cmp_age(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| id_parts(&self.id).cmp(&id_parts(&other.id)))
            .then_with(|| self.id.cmp(&other.id))
    }
}

fn id_parts(id: &str) -> Option<(i64, u64)> {
    let (millis, seq) = id.split_once('-')?;
    Some((millis.parse().ok()?, seq.parse().ok()?))
}

/// `Order` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
