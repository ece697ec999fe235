//! Inventory business logic - stock of ingredients and supplies.
//!
//! Quantities never go negative: an adjustment that would take an item below zero
//! is rejected and leaves the stored quantity unchanged.

use crate::{
    entities::{InventoryItem, inventory_item},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Editable fields of an inventory item.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryInput {
    /// Item name
    pub name: String,
    /// Quantity on hand
    pub quantity: f64,
    /// Unit of measure
    pub unit: String,
    /// Low-stock threshold
    pub min_quantity: f64,
}

impl InventoryInput {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Inventory item name cannot be empty"));
        }
        if self.unit.trim().is_empty() {
            return Err(Error::validation("Inventory unit cannot be empty"));
        }
        for amount in [self.quantity, self.min_quantity] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidAmount { amount });
            }
        }
        Ok(())
    }
}

fn not_found(item_id: i64) -> Error {
    Error::RecordNotFound {
        kind: "Inventory item",
        id: item_id.to_string(),
    }
}

/// Retrieves every inventory item, ordered by name.
pub async fn get_all_items<C>(db: &C) -> Result<Vec<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    InventoryItem::find()
        .order_by_asc(inventory_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an inventory item by id.
pub async fn get_item_by_id<C>(db: &C, item_id: i64) -> Result<Option<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    InventoryItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Items at or below their low-stock threshold.
pub async fn get_low_stock_items<C>(db: &C) -> Result<Vec<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    Ok(get_all_items(db)
        .await?
        .into_iter()
        .filter(is_low_stock)
        .collect())
}

/// Whether `item` has reached its threshold.
#[must_use]
pub fn is_low_stock(item: &inventory_item::Model) -> bool {
    item.quantity <= item.min_quantity
}

/// Adds an item to the inventory.
pub async fn create_item<C>(
    db: &C,
    input: InventoryInput,
    created_by: &str,
) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    input.validate()?;
    let now = Utc::now();

    let item = inventory_item::ActiveModel {
        name: Set(input.name.trim().to_string()),
        quantity: Set(input.quantity),
        unit: Set(input.unit.trim().to_string()),
        min_quantity: Set(input.min_quantity),
        created_at: Set(now),
        created_by: Set(created_by.to_string()),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = item.insert(db).await?;
    info!(
        "Inventory item {} added: {} {} {}",
        result.id, result.quantity, result.unit, result.name
    );
    Ok(result)
}

/// Overwrites the editable fields of an inventory item.
pub async fn update_item<C>(
    db: &C,
    item_id: i64,
    input: InventoryInput,
) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    input.validate()?;
    let existing = get_item_by_id(db, item_id)
        .await?
        .ok_or_else(|| not_found(item_id))?;

    let mut active: inventory_item::ActiveModel = existing.into();
    active.name = Set(input.name.trim().to_string());
    active.quantity = Set(input.quantity);
    active.unit = Set(input.unit.trim().to_string());
    active.min_quantity = Set(input.min_quantity);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Adds `delta` to the stored quantity (negative to consume stock).
///
/// Runs inside a transaction so the read and the write see the same row.
///
/// # Errors
/// Returns `Validation` if the result would be negative.
pub async fn adjust_quantity(
    db: &DatabaseConnection,
    item_id: i64,
    delta: f64,
) -> Result<inventory_item::Model> {
    if !delta.is_finite() {
        return Err(Error::InvalidAmount { amount: delta });
    }
    let txn = db.begin().await?;
    let existing = get_item_by_id(&txn, item_id)
        .await?
        .ok_or_else(|| not_found(item_id))?;

    let next = existing.quantity + delta;
    if next < 0.0 {
        return Err(Error::validation(format!(
            "Not enough {}: {} {} in stock, adjustment {}",
            existing.name, existing.quantity, existing.unit, delta
        )));
    }

    let mut active: inventory_item::ActiveModel = existing.into();
    active.quantity = Set(next);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    if is_low_stock(&updated) {
        warn!(
            "Low stock: {} ({} {} left)",
            updated.name, updated.quantity, updated.unit
        );
    }
    Ok(updated)
}

/// Deletes an inventory item.
pub async fn delete_item<C>(db: &C, item_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = InventoryItem::delete_by_id(item_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(item_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn rice(quantity: f64) -> InventoryInput {
        InventoryInput {
            name: "Rice".to_string(),
            quantity,
            unit: "kg".to_string(),
            min_quantity: 5.0,
        }
    }

    #[tokio::test]
    async fn test_adjust_quantity() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_item(&db, rice(10.0), "admin").await?;

        let item = adjust_quantity(&db, item.id, -4.0).await?;
        assert_eq!(item.quantity, 6.0);
        let item = adjust_quantity(&db, item.id, 2.5).await?;
        assert_eq!(item.quantity, 8.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_never_goes_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_item(&db, rice(3.0), "admin").await?;

        let result = adjust_quantity(&db, item.id, -3.5).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        let stored = get_item_by_id(&db, item.id).await?;
        assert_eq!(stored.map(|i| i.quantity), Some(3.0));

        // Exactly to zero is fine
        let emptied = adjust_quantity(&db, item.id, -3.0).await?;
        assert_eq!(emptied.quantity, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_low_stock() -> Result<()> {
        let db = setup_test_db().await?;
        create_item(&db, rice(5.0), "admin").await?;
        let mut oil = rice(20.0);
        oil.name = "Oil".to_string();
        oil.unit = "l".to_string();
        create_item(&db, oil, "admin").await?;

        let low: Vec<String> = get_low_stock_items(&db)
            .await?
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(low, vec!["Rice".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_items_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(create_item(&db, rice(-1.0), "admin").await.is_err());
        let mut nameless = rice(1.0);
        nameless.name = String::new();
        assert!(create_item(&db, nameless, "admin").await.is_err());
        assert!(get_all_items(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_item() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_item(&db, rice(10.0), "admin").await?;
        let updated = update_item(&db, item.id, rice(12.0)).await?;
        assert_eq!(updated.quantity, 12.0);
        assert!(updated.updated_at >= item.updated_at);

        delete_item(&db, item.id).await?;
        assert!(matches!(
            delete_item(&db, item.id).await,
            Err(Error::RecordNotFound { .. })
        ));
        Ok(())
    }
}
