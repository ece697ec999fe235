//! Order persistence - the `orders` collection of the backing store.
//!
//! Orders are written whole: an upsert replaces every column of the row with the
//! given id, so the most recent write for an id wins.

use crate::{
    entities::{Order, order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves every order, oldest first.
pub async fn get_all_orders<C>(db: &C) -> Result<Vec<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .order_by_asc(order::Column::CreatedAt)
        .order_by_asc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an order by id.
pub async fn get_order_by_id<C>(db: &C, order_id: &str) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

fn to_active_model(model: &order::Model) -> order::ActiveModel {
    order::ActiveModel {
        id: Set(model.id.clone()),
        table_id: Set(model.table_id),
        items: Set(model.items.clone()),
        sent_items: Set(model.sent_items.clone()),
        payments: Set(model.payments.clone()),
        status: Set(model.status),
        total: Set(model.total),
        notes: Set(model.notes.clone()),
        created_at: Set(model.created_at),
        created_by: Set(model.created_by.clone()),
        updated_at: Set(model.updated_at),
        completed_at: Set(model.completed_at),
        payment_method: Set(model.payment_method),
    }
}

/// Inserts the order, or overwrites the stored row with the same id.
pub async fn upsert_order<C>(db: &C, model: &order::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = Order::find_by_id(model.id.clone()).one(db).await?;
    let active = to_active_model(model);
    if existing.is_some() {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}

/// Deletes the order with `order_id`.
///
/// # Errors
/// Returns `OrderNotFound` when no row was deleted.
pub async fn delete_order<C>(db: &C, order_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Order::delete_by_id(order_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::OrderNotFound {
            id: order_id.to_string(),
        });
    }
    Ok(())
}
