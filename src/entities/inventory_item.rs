//! Inventory item entity - Stock of ingredients and supplies.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the item (e.g. "Rice")
    pub name: String,
    /// Quantity on hand, never negative
    pub quantity: f64,
    /// Unit of measure (e.g. "kg", "unit")
    pub unit: String,
    /// Threshold at or below which the item counts as low stock
    pub min_quantity: f64,
    /// When the record was created
    pub created_at: DateTimeUtc,
    /// Username that created the record
    pub created_by: String,
    /// When the record was last modified
    pub updated_at: DateTimeUtc,
}

/// `InventoryItem` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
