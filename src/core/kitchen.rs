//! Kitchen display queue.
//!
//! The kitchen sees orders in `preparing`, oldest first. Marking one ready goes
//! through `OrderStore::mark_ready`.

use crate::core::menu::MenuCatalog;
use crate::entities::order::{self, OrderStatus};

/// One line as shown on a kitchen ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketLine {
    /// Menu name, or the raw id for items not in the catalog
    pub name: String,
    /// Quantity sent to the kitchen
    pub quantity: u32,
    /// Variant selector
    pub notes: String,
}

/// Orders waiting on the kitchen, first in first out.
#[must_use]
pub fn kitchen_queue(orders: &[order::Model]) -> Vec<&order::Model> {
    let mut queue: Vec<&order::Model> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Preparing)
        .collect();
    queue.sort_by(|a, b| a.cmp_age(b));
    queue
}

/// Lines of the ticket the kitchen works from: what was last sent.
#[must_use]
pub fn ticket_lines(order: &order::Model, catalog: &MenuCatalog) -> Vec<TicketLine> {
    order
        .sent_items
        .iter()
        .map(|item| TicketLine {
            name: catalog
                .get(&item.menu_item_id)
                .map_or_else(|| item.menu_item_id.clone(), |m| m.name.clone()),
            quantity: item.quantity,
            notes: item.notes.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::{OrderItem, OrderItems};
    use crate::test_utils::*;

    #[test]
    fn test_queue_is_fifo_and_filtered() {
        let mut late = sample_order("o-late", Some(1), OrderStatus::Preparing);
        late.created_at += chrono::Duration::minutes(10);
        let early = sample_order("o-early", Some(2), OrderStatus::Preparing);
        let ready = sample_order("o-ready", Some(3), OrderStatus::Ready);
        let active = sample_order("o-active", Some(4), OrderStatus::Active);
        let orders = vec![late, ready, early, active];

        let ids: Vec<&str> = kitchen_queue(&orders).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o-early", "o-late"]);
    }

    #[test]
    fn test_same_instant_ties_follow_id_sequence() {
        let tenth = sample_order("1741618800000-10", Some(1), OrderStatus::Preparing);
        let ninth = sample_order("1741618800000-9", Some(2), OrderStatus::Preparing);
        let orders = vec![tenth, ninth];

        let ids: Vec<&str> = kitchen_queue(&orders).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1741618800000-9", "1741618800000-10"]);
    }

    #[test]
    fn test_ticket_lines_show_sent_items() {
        let mut order = sample_order("o-1", Some(1), OrderStatus::Preparing);
        order.sent_items = OrderItems(vec![
            OrderItem::new("jugo", 2).with_notes("mora"),
            OrderItem::new("special", 1).with_custom_price(3.0),
        ]);
        order.items = OrderItems(vec![OrderItem::new("coca-cola", 1)]);

        let lines = ticket_lines(&order, &test_catalog());
        assert_eq!(
            lines,
            vec![
                TicketLine {
                    name: "Jugo natural".to_string(),
                    quantity: 2,
                    notes: "mora".to_string(),
                },
                TicketLine {
                    name: "special".to_string(),
                    quantity: 1,
                    notes: String::new(),
                },
            ]
        );
    }
}
