//! Table occupancy - derived from the order list, never stored.

use crate::entities::order;
use serde::Serialize;

/// Whether a table has an open order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// No open order
    Available,
    /// Bound to an open order
    Occupied,
}

/// A dine-in table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Table number, `1..=table_count`
    pub id: i32,
    /// Occupancy
    pub status: TableStatus,
    /// The open order bound to the table, if any
    pub order_id: Option<String>,
}

/// The oldest open order bound to `table_id`.
#[must_use]
pub fn open_order_for_table(orders: &[order::Model], table_id: i32) -> Option<&order::Model> {
    orders
        .iter()
        .filter(|o| o.table_id == Some(table_id) && o.status.is_open())
        .min_by(|a, b| a.cmp_age(b))
}

/// Maps the table pool `1..=table_count` to occupancy.
///
/// A table is occupied iff some `active`, `preparing` or `ready` order references it.
#[must_use]
pub fn derive_tables(table_count: u32, orders: &[order::Model]) -> Vec<Table> {
    let count = i32::try_from(table_count).unwrap_or(i32::MAX);
    (1..=count)
        .map(|id| {
            let open = open_order_for_table(orders, id);
            Table {
                id,
                status: if open.is_some() {
                    TableStatus::Occupied
                } else {
                    TableStatus::Available
                },
                order_id: open.map(|o| o.id.clone()),
            }
        })
        .collect()
}

/// Open takeaway orders, oldest first.
#[must_use]
pub fn open_takeaway_orders(orders: &[order::Model]) -> Vec<&order::Model> {
    let mut open: Vec<&order::Model> = orders
        .iter()
        .filter(|o| o.is_takeaway() && o.status.is_open())
        .collect();
    open.sort_by(|a, b| a.cmp_age(b));
    open
}
