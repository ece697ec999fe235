//! Order lifecycle - the state machine behind every order.
//!
//! ```text
//! active -> preparing -> (ready ->) completed
//!   \          |  ^          |          |
//!    \         +--+          |          |
//!     +------> cancelled <---+----------+
//! ```
//!
//! Every function here is pure: it takes the current order and returns the next
//! version, or an error and no change. Persisting the result is the store's job.

use crate::core::editing::{check_floor, merge_lines};
use crate::core::menu::MenuCatalog;
use crate::core::payment::{self, PaymentMethod, PaymentReceipt};
use crate::core::round_cents;
use crate::entities::order::{self, OrderItem, OrderItems, OrderStatus, Payment, Payments};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};

/// Whether `from -> to` is a legal move.
#[must_use]
pub const fn is_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::{Active, Cancelled, Completed, Preparing, Ready};
    matches!(
        (from, to),
        (Active | Preparing, Preparing)
            | (Preparing, Ready)
            | (Preparing | Ready, Completed)
            | (Active | Preparing | Ready | Completed, Cancelled)
    )
}

/// Fails with `InvalidTransition` unless `from -> to` is legal.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<()> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition { from, to })
    }
}

/// Sum of unit price times quantity over `items`, rounded to cents.
pub fn order_total(items: &[OrderItem], catalog: &MenuCatalog) -> Result<f64> {
    let mut total = 0.0;
    for item in items {
        total += catalog.price_of(item)? * f64::from(item.quantity);
    }
    Ok(round_cents(total))
}

fn prepare_lines(
    items: Vec<OrderItem>,
    takeaway: bool,
    catalog: &MenuCatalog,
) -> Result<Vec<OrderItem>> {
    for item in &items {
        catalog.validate_line(item, takeaway)?;
    }
    merge_lines(items)
}

/// Fields needed to open an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Assigned identifier
    pub id: String,
    /// Table number, `None` for takeaway
    pub table_id: Option<i32>,
    /// Initial lines, possibly empty
    pub items: Vec<OrderItem>,
    /// Free text
    pub notes: String,
    /// Username opening the order
    pub created_by: String,
}

/// Builds a fresh `active` order.
pub fn open(new: NewOrder, catalog: &MenuCatalog, now: DateTime<Utc>) -> Result<order::Model> {
    let items = prepare_lines(new.items, new.table_id.is_none(), catalog)?;
    let total = order_total(&items, catalog)?;
    Ok(order::Model {
        id: new.id,
        table_id: new.table_id,
        items: OrderItems(items),
        sent_items: OrderItems::default(),
        payments: Payments::default(),
        status: OrderStatus::Active,
        total,
        notes: new.notes.trim().to_string(),
        created_at: now,
        created_by: new.created_by,
        updated_at: now,
        completed_at: None,
        payment_method: None,
    })
}

fn ensure_items_editable(order: &order::Model) -> Result<()> {
    if matches!(order.status, OrderStatus::Active | OrderStatus::Preparing) {
        Ok(())
    } else {
        Err(Error::OrderNotEditable {
            id: order.id.clone(),
            status: order.status,
        })
    }
}

/// Replaces the lines of an `active` or `preparing` order, enforcing the kitchen
/// floor, and recomputes the total.
pub fn replace_items(
    order: &order::Model,
    items: Vec<OrderItem>,
    catalog: &MenuCatalog,
    now: DateTime<Utc>,
) -> Result<order::Model> {
    ensure_items_editable(order)?;
    let items = prepare_lines(items, order.is_takeaway(), catalog)?;
    check_floor(&order.sent_items, &items)?;
    let total = order_total(&items, catalog)?;
    Ok(order::Model {
        items: OrderItems(items),
        total,
        updated_at: now,
        ..order.clone()
    })
}

/// Sends `items` to the kitchen: the order becomes `preparing` and `items` the new floor.
pub fn send_to_kitchen(
    order: &order::Model,
    items: Vec<OrderItem>,
    catalog: &MenuCatalog,
    now: DateTime<Utc>,
) -> Result<order::Model> {
    if items.is_empty() {
        return Err(Error::EmptyOrder);
    }
    check_transition(order.status, OrderStatus::Preparing)?;
    let mut next = replace_items(order, items, catalog, now)?;
    next.sent_items = next.items.clone();
    next.status = OrderStatus::Preparing;
    Ok(next)
}

/// Kitchen finished every item.
pub fn mark_ready(order: &order::Model, now: DateTime<Utc>) -> Result<order::Model> {
    check_transition(order.status, OrderStatus::Ready)?;
    Ok(order::Model {
        status: OrderStatus::Ready,
        updated_at: now,
        ..order.clone()
    })
}

/// Notes stay editable only until the order first goes to the kitchen.
pub fn update_notes(order: &order::Model, notes: &str, now: DateTime<Utc>) -> Result<order::Model> {
    if order.status != OrderStatus::Active {
        return Err(Error::OrderNotEditable {
            id: order.id.clone(),
            status: order.status,
        });
    }
    Ok(order::Model {
        notes: notes.trim().to_string(),
        updated_at: now,
        ..order.clone()
    })
}

fn ensure_payable(order: &order::Model) -> Result<()> {
    if matches!(order.status, OrderStatus::Preparing | OrderStatus::Ready) {
        Ok(())
    } else {
        Err(Error::OrderNotEditable {
            id: order.id.clone(),
            status: order.status,
        })
    }
}

fn with_payment(order: &order::Model, receipt: &PaymentReceipt, now: DateTime<Utc>) -> order::Model {
    let mut payments = order.payments.0.clone();
    if receipt.amount > 0.0 {
        payments.push(Payment {
            method: receipt.method,
            amount: receipt.amount,
            received: receipt.received,
            at: now,
        });
    }
    order::Model {
        payments: Payments(payments),
        updated_at: now,
        ..order.clone()
    }
}

/// Captures part of the balance without closing the order.
pub fn record_payment(
    order: &order::Model,
    method: PaymentMethod,
    amount: f64,
    received: Option<f64>,
    now: DateTime<Utc>,
) -> Result<(order::Model, PaymentReceipt)> {
    ensure_payable(order)?;
    payment::check_partial(amount, order.outstanding())?;
    let receipt = payment::capture(round_cents(amount), method, received)?;
    Ok((with_payment(order, &receipt, now), receipt))
}

/// Captures the outstanding balance and closes the order.
pub fn complete(
    order: &order::Model,
    method: PaymentMethod,
    received: Option<f64>,
    now: DateTime<Utc>,
) -> Result<(order::Model, PaymentReceipt)> {
    check_transition(order.status, OrderStatus::Completed)?;
    let receipt = payment::capture(order.outstanding(), method, received)?;
    let mut next = with_payment(order, &receipt, now);
    next.status = OrderStatus::Completed;
    next.completed_at = Some(now);
    next.payment_method = Some(method);
    Ok((next, receipt))
}

/// Voids the order. Irreversible.
pub fn cancel(order: &order::Model, now: DateTime<Utc>) -> Result<order::Model> {
    check_transition(order.status, OrderStatus::Cancelled)?;
    Ok(order::Model {
        status: OrderStatus::Cancelled,
        updated_at: now,
        ..order.clone()
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::Iterable;

    fn active_order(items: Vec<OrderItem>) -> order::Model {
        open(
            NewOrder {
                id: "o-1".to_string(),
                table_id: Some(4),
                items,
                notes: " sin cebolla ".to_string(),
                created_by: "maria".to_string(),
            },
            &test_catalog(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_transition_table() {
        use OrderStatus::{Active, Cancelled, Completed, Preparing, Ready};
        assert!(is_allowed(Active, Preparing));
        assert!(is_allowed(Preparing, Preparing));
        assert!(is_allowed(Preparing, Ready));
        assert!(is_allowed(Ready, Completed));
        assert!(is_allowed(Preparing, Completed));
        assert!(is_allowed(Active, Cancelled));
        assert!(is_allowed(Ready, Cancelled));
        assert!(is_allowed(Completed, Cancelled));
        assert!(!is_allowed(Active, Completed));
        assert!(!is_allowed(Active, Ready));
        assert!(!is_allowed(Ready, Preparing));
        // Terminal states never come back
        for to in OrderStatus::iter() {
            assert!(!is_allowed(Cancelled, to));
            if to != Cancelled {
                assert!(!is_allowed(Completed, to));
            }
        }
    }

    #[test]
    fn test_open_computes_total_and_merges() {
        let order = active_order(vec![
            OrderItem::new("encebollado", 1),
            OrderItem::new("encebollado", 1),
            OrderItem::new("coca-cola", 1),
        ]);
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total, 11.5);
        assert_eq!(order.notes, "sin cebolla");
        assert!(order.sent_items.is_empty());
    }

    #[test]
    fn test_takeaway_rejects_dine_in_only_items() {
        let result = open(
            NewOrder {
                id: "t-1".to_string(),
                table_id: None,
                items: vec![OrderItem::new("seco-de-pollo", 1)],
                notes: String::new(),
                created_by: "maria".to_string(),
            },
            &test_catalog(),
            Utc::now(),
        );
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_send_empty_rejected() {
        let order = active_order(vec![]);
        let result = send_to_kitchen(&order, vec![], &test_catalog(), Utc::now());
        assert!(matches!(result, Err(Error::EmptyOrder)));
    }

    #[test]
    fn test_send_snapshots_floor() {
        let order = active_order(vec![]);
        let sent = send_to_kitchen(
            &order,
            vec![OrderItem::new("encebollado", 2)],
            &test_catalog(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(sent.status, OrderStatus::Preparing);
        assert_eq!(sent.sent_items, sent.items);
        assert_eq!(sent.total, 10.0);

        // Shrinking below the floor is rejected on replacement too
        let result = replace_items(
            &sent,
            vec![OrderItem::new("encebollado", 1)],
            &test_catalog(),
            Utc::now(),
        );
        assert!(matches!(result, Err(Error::EditRejected { .. })));

        // Re-sending establishes a new floor
        let resent = send_to_kitchen(
            &sent,
            vec![OrderItem::new("encebollado", 3)],
            &test_catalog(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(resent.sent_items[0].quantity, 3);
    }

    #[test]
    fn test_total_uses_custom_price() {
        let order = active_order(vec![
            OrderItem::new("encebollado", 2).with_custom_price(4.25),
            OrderItem::new("jugo", 3).with_notes("mora"),
        ]);
        assert_eq!(order.total, 14.5);
    }

    #[test]
    fn test_notes_frozen_after_send() {
        let order = active_order(vec![OrderItem::new("encebollado", 1)]);
        let order = update_notes(&order, "para llevar", Utc::now()).unwrap();
        assert_eq!(order.notes, "para llevar");
        let items = order.items.0.clone();
        let sent = send_to_kitchen(&order, items, &test_catalog(), Utc::now()).unwrap();
        assert!(matches!(
            update_notes(&sent, "x", Utc::now()),
            Err(Error::OrderNotEditable { .. })
        ));
    }

    #[test]
    fn test_complete_requires_preparing_or_ready() {
        let order = active_order(vec![OrderItem::new("encebollado", 1)]);
        let result = complete(&order, PaymentMethod::Card, None, Utc::now());
        assert!(matches!(
            result,
            Err(Error::InvalidTransition {
                from: OrderStatus::Active,
                to: OrderStatus::Completed
            })
        ));
    }

    #[test]
    fn test_partial_then_complete() {
        let order = active_order(vec![]);
        let order = send_to_kitchen(
            &order,
            vec![OrderItem::new("encebollado", 4)],
            &test_catalog(),
            Utc::now(),
        )
        .unwrap();
        let (order, _) =
            record_payment(&order, PaymentMethod::Card, 8.0, None, Utc::now()).unwrap();
        assert_eq!(order.outstanding(), 12.0);

        let (order, receipt) =
            complete(&order, PaymentMethod::Cash, Some(20.0), Utc::now()).unwrap();
        assert_eq!(receipt.amount, 12.0);
        assert_eq!(receipt.change, 8.0);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(order.paid_amount(), 20.0);
        assert_eq!(order.outstanding(), 0.0);
        assert!(order.completed_at.is_some());
    }

    #[test]
    fn test_cancel_is_terminal() {
        let order = active_order(vec![OrderItem::new("encebollado", 1)]);
        let cancelled = cancel(&order, Utc::now()).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(cancel(&cancelled, Utc::now()).is_err());
        assert!(mark_ready(&cancelled, Utc::now()).is_err());
        assert!(replace_items(&cancelled, vec![], &test_catalog(), Utc::now()).is_err());
    }
}
