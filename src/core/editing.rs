//! Order editing session - local edits of an order's lines against the kitchen floor.
//!
//! An editing session is opened from an order and holds a working copy of its items
//! together with the snapshot last sent to the kitchen. Lines may always grow, but a
//! line that was sent cannot drop below its sent quantity, and cannot be deleted while
//! that quantity is non-zero. Rejected edits leave the session untouched.

use crate::entities::order::{self, LineKey, OrderItem, OrderStatus};
use crate::errors::{Error, Result};

/// Quantity of `key` in the sent snapshot, zero when the line was never sent.
#[must_use]
pub fn sent_quantity(sent: &[OrderItem], key: &LineKey) -> u32 {
    sent.iter()
        .filter(|item| item.key() == *key)
        .fold(0, |total, item| total.saturating_add(item.quantity))
}

/// Checks one line change against the floor.
///
/// `requested` is the new quantity; zero means the line is being deleted.
pub fn check_line_floor(sent: &[OrderItem], key: &LineKey, requested: u32) -> Result<()> {
    let floor = sent_quantity(sent, key);
    if requested < floor {
        return Err(Error::EditRejected {
            menu_item_id: key.menu_item_id.clone(),
            sent: floor,
            requested,
        });
    }
    Ok(())
}

/// Checks a complete replacement list against the floor: every sent line must still
/// be present with at least its sent quantity.
pub fn check_floor(sent: &[OrderItem], items: &[OrderItem]) -> Result<()> {
    for sent_item in sent {
        let key = sent_item.key();
        let requested = items
            .iter()
            .filter(|item| item.key() == key)
            .fold(0_u32, |total, item| total.saturating_add(item.quantity));
        check_line_floor(sent, &key, requested)?;
    }
    Ok(())
}

fn grow_line(line: &mut OrderItem, quantity: u32) -> Result<()> {
    line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
        Error::validation(format!("Quantity for '{}' is too large", line.menu_item_id))
    })?;
    Ok(())
}

/// Collapses lines sharing a [`LineKey`] into one, keeping first-seen order and the
/// first line's custom price.
///
/// # Errors
/// Returns `Validation` if a merged quantity does not fit in a `u32`.
pub fn merge_lines(items: Vec<OrderItem>) -> Result<Vec<OrderItem>> {
    let mut merged: Vec<OrderItem> = Vec::with_capacity(items.len());
    for item in items {
        let key = item.key();
        if let Some(existing) = merged.iter_mut().find(|m| m.key() == key) {
            grow_line(existing, item.quantity)?;
        } else {
            merged.push(item);
        }
    }
    Ok(merged)
}

/// Per-order working copy used by an order screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEditingSession {
    order_id: String,
    status: OrderStatus,
    items: Vec<OrderItem>,
    sent: Vec<OrderItem>,
}

impl OrderEditingSession {
    /// Opens a session over the current state of `order`.
    #[must_use]
    pub fn open(order: &order::Model) -> Self {
        Self {
            order_id: order.id.clone(),
            status: order.status,
            items: order.items.0.clone(),
            sent: order.sent_items.0.clone(),
        }
    }

    /// Id of the order being edited.
    #[must_use]
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Status of the order when the session was opened.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Working copy of the lines.
    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Lines as last sent to the kitchen.
    #[must_use]
    pub fn sent_items(&self) -> &[OrderItem] {
        &self.sent
    }

    fn ensure_editable(&self) -> Result<()> {
        if matches!(self.status, OrderStatus::Active | OrderStatus::Preparing) {
            Ok(())
        } else {
            Err(Error::OrderNotEditable {
                id: self.order_id.clone(),
                status: self.status,
            })
        }
    }

    /// Adds `item`, merging into an existing line with the same key.
    pub fn add_item(&mut self, item: OrderItem) -> Result<()> {
        self.ensure_editable()?;
        if item.quantity == 0 {
            return Err(Error::validation(format!(
                "Quantity for '{}' must be greater than zero",
                item.menu_item_id
            )));
        }
        let key = item.key();
        if let Some(existing) = self.items.iter_mut().find(|i| i.key() == key) {
            grow_line(existing, item.quantity)?;
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    /// Sets the quantity of the line identified by `key`; zero deletes it.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<()> {
        self.ensure_editable()?;
        let position = self
            .items
            .iter()
            .position(|i| i.key() == *key)
            .ok_or_else(|| Error::validation(format!("No line for '{}'", key.menu_item_id)))?;
        check_line_floor(&self.sent, key, quantity)?;
        if quantity == 0 {
            self.items.remove(position);
        } else {
            self.items[position].quantity = quantity;
        }
        Ok(())
    }

    /// Deletes the line identified by `key`.
    pub fn remove_line(&mut self, key: &LineKey) -> Result<()> {
        self.set_quantity(key, 0)
    }

    /// Whether the working copy differs from what the kitchen has seen.
    #[must_use]
    pub fn has_unsent_changes(&self) -> bool {
        self.items != self.sent
    }

    /// Quantities not yet sent to the kitchen, line by line.
    #[must_use]
    pub fn unsent_items(&self) -> Vec<OrderItem> {
        self.items
            .iter()
            .filter_map(|item| {
                let pending = item
                    .quantity
                    .saturating_sub(sent_quantity(&self.sent, &item.key()));
                (pending > 0).then(|| OrderItem {
                    quantity: pending,
                    ..item.clone()
                })
            })
            .collect()
    }
}
