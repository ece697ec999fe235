//! Order store - the single owner of the authoritative order list.
//!
//! Every mutation follows the same path: check the caller's role, run the pure
//! lifecycle step against the in-memory copy, replace that copy, persist the order,
//! and publish the reloaded collection on the change feed. A failed persist is
//! reported to the caller but the in-memory update stands; the next snapshot from
//! the backend decides what is true.

use crate::core::auth::{Session, require_admin, require_kitchen, require_order_taker};
use crate::core::editing::OrderEditingSession;
use crate::core::feed::{ChangeFeed, Snapshot, Subscription};
use crate::core::kitchen;
use crate::core::lifecycle::{self, NewOrder};
use crate::core::menu::MenuCatalog;
use crate::core::order as order_db;
use crate::core::payment::{PaymentMethod, PaymentReceipt};
use crate::core::tables::{self, Table};
use crate::entities::order::{self, OrderItem, OrderStatus};
use crate::errors::{Error, Result};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// An admin's request to void an order, waiting for confirmation.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a cancellation does nothing until it is confirmed"]
pub struct PendingCancellation {
    order_id: String,
    status: OrderStatus,
    total: f64,
}

impl PendingCancellation {
    /// Order to be voided.
    #[must_use]
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Status the order had when cancellation was requested.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Total that will be voided, for the confirmation prompt.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }
}

/// In-memory order list synchronized with the backing store.
#[derive(Debug)]
pub struct OrderStore {
    db: Arc<DatabaseConnection>,
    catalog: Arc<MenuCatalog>,
    table_count: u32,
    orders: Arc<RwLock<Vec<order::Model>>>,
    feed: ChangeFeed<order::Model>,
    sequence: AtomicU64,
}

impl OrderStore {
    /// Loads every order from the database into a new store.
    #[instrument(skip(db, catalog))]
    pub async fn load(
        db: Arc<DatabaseConnection>,
        catalog: Arc<MenuCatalog>,
        table_count: u32,
    ) -> Result<Self> {
        let orders = order_db::get_all_orders(db.as_ref()).await?;
        info!("Loaded {} orders", orders.len());
        Ok(Self {
            db,
            catalog,
            table_count,
            orders: Arc::new(RwLock::new(orders)),
            feed: ChangeFeed::new(),
            sequence: AtomicU64::new(0),
        })
    }

    /// Change feed of the `orders` collection.
    #[must_use]
    pub const fn feed(&self) -> &ChangeFeed<order::Model> {
        &self.feed
    }

    /// Subscribes to order snapshots.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<order::Model> {
        self.feed.subscribe()
    }

    /// Keeps the in-memory copy in step with the feed: every snapshot replaces it
    /// wholesale. A burst of snapshots is applied once, newest only.
    #[must_use]
    pub fn listen(&self) -> JoinHandle<()> {
        let orders = Arc::clone(&self.orders);
        let mut subscription = self.feed.subscribe();
        tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                let snapshot = subscription.latest().unwrap_or(snapshot);
                let mut guard = orders.write().await;
                guard.clone_from(&snapshot);
                debug!("Order list replaced from snapshot ({} orders)", guard.len());
            }
        })
    }

    /// Replaces the in-memory copy with `snapshot`.
    pub async fn apply_snapshot(&self, snapshot: Snapshot<order::Model>) {
        let mut guard = self.orders.write().await;
        guard.clone_from(&snapshot);
    }

    /// Reloads the collection from the database, replaces the in-memory copy with
    /// it and publishes it.
    pub async fn refresh(&self) -> Result<()> {
        let all = order_db::get_all_orders(self.db.as_ref()).await?;
        self.orders.write().await.clone_from(&all);
        self.feed.publish(all);
        Ok(())
    }

    /// Copy of every order.
    pub async fn orders(&self) -> Vec<order::Model> {
        self.orders.read().await.clone()
    }

    /// Copy of a single order.
    ///
    /// # Errors
    /// Returns `OrderNotFound` for unknown ids.
    pub async fn get(&self, order_id: &str) -> Result<order::Model> {
        self.orders
            .read()
            .await
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| Error::OrderNotFound {
                id: order_id.to_string(),
            })
    }

    /// Table pool with derived occupancy.
    pub async fn tables(&self) -> Vec<Table> {
        tables::derive_tables(self.table_count, &self.orders.read().await)
    }

    /// Orders waiting on the kitchen, oldest first.
    pub async fn kitchen_queue(&self) -> Vec<order::Model> {
        kitchen::kitchen_queue(&self.orders.read().await)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Open takeaway orders, oldest first.
    pub async fn takeaway_orders(&self) -> Vec<order::Model> {
        tables::open_takeaway_orders(&self.orders.read().await)
            .into_iter()
            .cloned()
            .collect()
    }

    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}", Utc::now().timestamp_millis())
    }

    fn check_table(&self, table_id: i32) -> Result<()> {
        let in_range = u32::try_from(table_id).is_ok_and(|t| (1..=self.table_count).contains(&t));
        if in_range {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "Table {table_id} does not exist (1..={})",
                self.table_count
            )))
        }
    }

    async fn persist(&self, order: &order::Model) -> Result<()> {
        order_db::upsert_order(self.db.as_ref(), order)
            .await
            .inspect_err(|e| error!("Failed to persist order {}: {}", order.id, e))?;
        self.refresh().await
    }

    /// Applies `change` to the order under the write lock, then persists.
    async fn update_with<R, F>(&self, order_id: &str, change: F) -> Result<(order::Model, R)>
    where
        F: FnOnce(&order::Model) -> Result<(order::Model, R)>,
    {
        let (next, extra) = {
            let mut orders = self.orders.write().await;
            let slot = orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| Error::OrderNotFound {
                    id: order_id.to_string(),
                })?;
            let (next, extra) = change(slot)?;
            slot.clone_from(&next);
            (next, extra)
        };
        self.persist(&next).await?;
        Ok((next, extra))
    }

    async fn update<F>(&self, order_id: &str, change: F) -> Result<order::Model>
    where
        F: FnOnce(&order::Model) -> Result<order::Model>,
    {
        self.update_with(order_id, |o| change(o).map(|next| (next, ())))
            .await
            .map(|(next, ())| next)
    }

    /// Opens a new order on `table_id`, or a takeaway order when `None`.
    ///
    /// # Errors
    /// - `Unauthorized` for the kitchen role
    /// - `Validation` for a table outside the pool or invalid lines
    /// - `TableOccupied` when the table already has an open order
    #[instrument(skip(self, session, items), fields(user = %session.username))]
    pub async fn create_order(
        &self,
        session: &Session,
        table_id: Option<i32>,
        items: Vec<OrderItem>,
        notes: &str,
    ) -> Result<order::Model> {
        require_order_taker(session, "open orders")?;
        if let Some(table) = table_id {
            self.check_table(table)?;
        }
        let created = {
            let mut orders = self.orders.write().await;
            if let Some(table) = table_id
                && let Some(open) = tables::open_order_for_table(&orders, table)
            {
                return Err(Error::TableOccupied {
                    table_id: table,
                    order_id: open.id.clone(),
                });
            }
            let created = lifecycle::open(
                NewOrder {
                    id: self.next_id(),
                    table_id,
                    items,
                    notes: notes.to_string(),
                    created_by: session.username.clone(),
                },
                &self.catalog,
                Utc::now(),
            )?;
            orders.push(created.clone());
            created
        };
        info!(
            "Order {} opened on {}",
            created.id,
            table_id.map_or_else(|| "takeaway".to_string(), |t| format!("table {t}"))
        );
        self.persist(&created).await?;
        Ok(created)
    }

    /// The open order on `table_id`, creating an empty one if the table is free.
    pub async fn open_table(&self, session: &Session, table_id: i32) -> Result<order::Model> {
        require_order_taker(session, "open orders")?;
        self.check_table(table_id)?;
        let existing = tables::open_order_for_table(&self.orders.read().await, table_id).cloned();
        match existing {
            Some(order) => Ok(order),
            None => self.create_order(session, Some(table_id), Vec::new(), "").await,
        }
    }

    /// Starts an editing session over the current state of an order.
    pub async fn open_editor(&self, order_id: &str) -> Result<OrderEditingSession> {
        Ok(OrderEditingSession::open(&self.get(order_id).await?))
    }

    /// Stores the editor's lines without sending them to the kitchen.
    #[instrument(skip(self, session, editor), fields(order_id = %editor.order_id()))]
    pub async fn save_items(
        &self,
        session: &Session,
        editor: &OrderEditingSession,
    ) -> Result<order::Model> {
        require_order_taker(session, "edit orders")?;
        let items = editor.items().to_vec();
        self.update(editor.order_id(), |o| {
            lifecycle::replace_items(o, items, &self.catalog, Utc::now())
        })
        .await
    }

    /// Sends the editor's lines to the kitchen; they become the new floor and the
    /// editor is reopened over the result.
    #[instrument(skip(self, session, editor), fields(order_id = %editor.order_id()))]
    pub async fn send_to_kitchen(
        &self,
        session: &Session,
        editor: &mut OrderEditingSession,
    ) -> Result<order::Model> {
        require_order_taker(session, "send orders to the kitchen")?;
        let items = editor.items().to_vec();
        let sent = self
            .update(editor.order_id(), |o| {
                lifecycle::send_to_kitchen(o, items, &self.catalog, Utc::now())
            })
            .await?;
        info!("Order {} sent to the kitchen ({} lines)", sent.id, sent.items.len());
        *editor = OrderEditingSession::open(&sent);
        Ok(sent)
    }

    /// Replaces the order notes; only while the order is `active`.
    pub async fn update_notes(
        &self,
        session: &Session,
        order_id: &str,
        notes: &str,
    ) -> Result<order::Model> {
        require_order_taker(session, "edit orders")?;
        self.update(order_id, |o| lifecycle::update_notes(o, notes, Utc::now()))
            .await
    }

    /// Kitchen marks an order as prepared.
    #[instrument(skip(self, session), fields(user = %session.username))]
    pub async fn mark_ready(&self, session: &Session, order_id: &str) -> Result<order::Model> {
        require_kitchen(session, "mark orders ready")?;
        let ready = self
            .update(order_id, |o| lifecycle::mark_ready(o, Utc::now()))
            .await?;
        info!("Order {} is ready", ready.id);
        Ok(ready)
    }

    /// Captures part of the balance.
    pub async fn record_payment(
        &self,
        session: &Session,
        order_id: &str,
        method: PaymentMethod,
        amount: f64,
        received: Option<f64>,
    ) -> Result<(order::Model, PaymentReceipt)> {
        require_order_taker(session, "take payments")?;
        self.update_with(order_id, |o| {
            lifecycle::record_payment(o, method, amount, received, Utc::now())
        })
        .await
    }

    /// Captures the outstanding balance and closes the order.
    ///
    /// # Errors
    /// - `InvalidTransition` unless the order is `preparing` or `ready`
    /// - `InsufficientPayment` when cash received does not cover the balance
    #[instrument(skip(self, session), fields(user = %session.username))]
    pub async fn complete_order(
        &self,
        session: &Session,
        order_id: &str,
        method: PaymentMethod,
        received: Option<f64>,
    ) -> Result<(order::Model, PaymentReceipt)> {
        require_order_taker(session, "take payments")?;
        let (order, receipt) = self
            .update_with(order_id, |o| {
                lifecycle::complete(o, method, received, Utc::now())
            })
            .await?;
        info!(
            "Order {} completed: {:.2} by {}, change {:.2}",
            order.id, receipt.amount, method, receipt.change
        );
        Ok((order, receipt))
    }

    /// First step of voiding an order. Nothing changes until
    /// [`OrderStore::confirm_cancellation`] is called with the result.
    pub async fn request_cancellation(
        &self,
        session: &Session,
        order_id: &str,
    ) -> Result<PendingCancellation> {
        require_admin(session, "cancel orders")?;
        let order = self.get(order_id).await?;
        lifecycle::check_transition(order.status, OrderStatus::Cancelled)?;
        Ok(PendingCancellation {
            order_id: order.id,
            status: order.status,
            total: order.total,
        })
    }

    /// Voids the order named in `pending`. Irreversible.
    #[instrument(skip(self, session, pending), fields(order_id = %pending.order_id))]
    pub async fn confirm_cancellation(
        &self,
        session: &Session,
        pending: PendingCancellation,
    ) -> Result<order::Model> {
        require_admin(session, "cancel orders")?;
        let cancelled = self
            .update(&pending.order_id, |o| lifecycle::cancel(o, Utc::now()))
            .await?;
        info!(
            "Order {} cancelled by {} (was {})",
            cancelled.id, session.username, pending.status
        );
        Ok(cancelled)
    }

    /// Removes an order from the collection entirely.
    pub async fn delete_order(&self, session: &Session, order_id: &str) -> Result<()> {
        require_admin(session, "delete orders")?;
        {
            let mut orders = self.orders.write().await;
            let before = orders.len();
            orders.retain(|o| o.id != order_id);
            if orders.len() == before {
                return Err(Error::OrderNotFound {
                    id: order_id.to_string(),
                });
            }
        }
        order_db::delete_order(self.db.as_ref(), order_id)
            .await
            .inspect_err(|e| error!("Failed to delete order {}: {}", order_id, e))?;
        self.refresh().await?;
        info!("Order {} deleted by {}", order_id, session.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::report::{Bucket, DateRange, Reports};
    use crate::core::tables::TableStatus;
    use crate::test_utils::*;
    use chrono::FixedOffset;

    #[tokio::test]
    async fn test_create_order_persists_and_occupies_table() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();

        let order = store
            .create_order(&waiter, Some(3), vec![OrderItem::new("encebollado", 2)], "")
            .await?;
        assert_eq!(order.total, 10.0);
        assert_eq!(order.created_by, "maria");

        let stored = order_db::get_order_by_id(store.db.as_ref(), &order.id).await?.unwrap();
        assert_eq!(stored, order);

        let tables = store.tables().await;
        assert_eq!(tables[2].status, TableStatus::Occupied);
        assert_eq!(tables[2].order_id.as_deref(), Some(order.id.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn test_second_order_on_occupied_table_rejected() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();
        let first = store.create_order(&waiter, Some(1), vec![], "").await?;
        let result = store.create_order(&waiter, Some(1), vec![], "").await;
        assert!(matches!(
            result,
            Err(Error::TableOccupied { table_id: 1, ref order_id }) if *order_id == first.id
        ));

        // open_table hands back the existing order
        let reopened = store.open_table(&waiter, 1).await?;
        assert_eq!(reopened.id, first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_table_out_of_range() -> Result<()> {
        let store = setup_store().await?;
        let result = store
            .create_order(&employee_session(), Some(99), vec![], "")
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_kitchen_cannot_open_orders() -> Result<()> {
        let store = setup_store().await?;
        let result = store.create_order(&kitchen_session(), Some(1), vec![], "").await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_order_ids_are_unique() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();
        let a = store.create_order(&waiter, None, vec![], "").await?;
        let b = store.create_order(&waiter, None, vec![], "").await?;
        assert_ne!(a.id, b.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_empty_order_rejected() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();
        let order = store.create_order(&waiter, Some(2), vec![], "").await?;
        let mut editor = store.open_editor(&order.id).await?;
        let result = store.send_to_kitchen(&waiter, &mut editor).await;
        assert!(matches!(result, Err(Error::EmptyOrder)));
        assert_eq!(store.get(&order.id).await?.status, OrderStatus::Active);
        Ok(())
    }

    /// Walks the full dine-in flow: order, send, add, pay cash with change.
    #[tokio::test]
    async fn test_dine_in_scenario() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();

        let order = store.open_table(&waiter, 5).await?;
        let mut editor = store.open_editor(&order.id).await?;
        editor.add_item(OrderItem::new("encebollado", 2))?;
        let saved = store.save_items(&waiter, &editor).await?;
        assert_eq!(saved.total, 10.0);
        assert_eq!(saved.status, OrderStatus::Active);

        let sent = store.send_to_kitchen(&waiter, &mut editor).await?;
        assert_eq!(sent.status, OrderStatus::Preparing);
        assert_eq!(sent.sent_items.0, vec![OrderItem::new("encebollado", 2)]);
        assert!(!editor.has_unsent_changes());

        let key = OrderItem::new("encebollado", 1).key();
        assert!(matches!(
            editor.remove_line(&key),
            Err(Error::EditRejected { .. })
        ));

        editor.add_item(OrderItem::new("coca-cola", 1))?;
        assert!(editor.has_unsent_changes());
        let saved = store.save_items(&waiter, &editor).await?;
        assert_eq!(saved.total, 11.5);
        assert!(saved.has_unsent_changes());

        let (completed, receipt) = store
            .complete_order(&waiter, &order.id, PaymentMethod::Cash, Some(12.0))
            .await?;
        assert_eq!(receipt.change, 0.5);
        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(completed.payment_method, Some(PaymentMethod::Cash));

        let tables = store.tables().await;
        assert_eq!(tables[4].status, TableStatus::Available);
        Ok(())
    }

    #[tokio::test]
    async fn test_store_rejects_floor_violation_from_stale_editor() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();
        let order = store
            .create_order(&waiter, Some(1), vec![OrderItem::new("encebollado", 2)], "")
            .await?;
        let stale = store.open_editor(&order.id).await?;
        let mut editor = store.open_editor(&order.id).await?;
        store.send_to_kitchen(&waiter, &mut editor).await?;

        // A stale editor removes the line before it knew it was sent
        let mut stale = stale;
        stale.remove_line(&OrderItem::new("encebollado", 1).key())?;
        let result = store.save_items(&waiter, &stale).await;
        assert!(matches!(result, Err(Error::EditRejected { .. })));
        assert_eq!(store.get(&order.id).await?.items.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_kitchen_flow() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();
        let cook = kitchen_session();

        let first = store
            .create_order(&waiter, Some(1), vec![OrderItem::new("encebollado", 1)], "")
            .await?;
        let second = store
            .create_order(&waiter, Some(2), vec![OrderItem::new("jugo", 1)], "")
            .await?;
        for id in [&second.id, &first.id] {
            let mut editor = store.open_editor(id).await?;
            store.send_to_kitchen(&waiter, &mut editor).await?;
        }

        let queue: Vec<String> = store.kitchen_queue().await.into_iter().map(|o| o.id).collect();
        assert_eq!(queue, vec![first.id.clone(), second.id.clone()]);

        assert!(matches!(
            store.mark_ready(&waiter, &first.id).await,
            Err(Error::Unauthorized { .. })
        ));
        let ready = store.mark_ready(&cook, &first.id).await?;
        assert_eq!(ready.status, OrderStatus::Ready);
        assert_eq!(store.kitchen_queue().await.len(), 1);

        // Ready orders still hold their table
        assert_eq!(store.tables().await[0].status, TableStatus::Occupied);

        let (done, _) = store
            .complete_order(&waiter, &first.id, PaymentMethod::Card, None)
            .await?;
        assert_eq!(done.status, OrderStatus::Completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancellation_requires_admin_and_confirmation() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();
        let admin = admin_session();
        let order = store
            .create_order(&waiter, Some(4), vec![OrderItem::new("encebollado", 1)], "")
            .await?;

        assert!(matches!(
            store.request_cancellation(&waiter, &order.id).await,
            Err(Error::Unauthorized { .. })
        ));

        let pending = store.request_cancellation(&admin, &order.id).await?;
        assert_eq!(pending.total(), 5.0);
        // Nothing happens before confirmation
        assert_eq!(store.get(&order.id).await?.status, OrderStatus::Active);

        let cancelled = store.confirm_cancellation(&admin, pending).await?;
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(store.tables().await[3].status, TableStatus::Available);

        // Irreversible
        assert!(matches!(
            store.request_cancellation(&admin, &order.id).await,
            Err(Error::InvalidTransition { .. })
        ));
        let mut editor = store.open_editor(&order.id).await?;
        assert!(editor.add_item(OrderItem::new("jugo", 1)).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_completed_order_leaves_revenue() -> Result<()> {
        let store = setup_store().await?;
        let admin = admin_session();
        let order = store
            .create_order(&admin, Some(5), vec![OrderItem::new("encebollado", 2)], "")
            .await?;
        let mut editor = store.open_editor(&order.id).await?;
        store.send_to_kitchen(&admin, &mut editor).await?;
        store
            .complete_order(&admin, &order.id, PaymentMethod::Cash, Some(10.0))
            .await?;

        let reports = Reports::new(&admin, FixedOffset::east_opt(0).unwrap())?;
        let day = Utc::now().date_naive();
        let range = DateRange::day(day);
        let orders = store.orders().await;
        assert_eq!(reports.sales_by_period(&orders, range, Bucket::Day)[0].total, 10.0);
        assert_eq!(reports.expected_cash_in_drawer(&orders, &[], day, 20.0), 30.0);

        let pending = store.request_cancellation(&admin, &order.id).await?;
        assert_eq!(pending.status(), OrderStatus::Completed);
        store.confirm_cancellation(&admin, pending).await?;

        let orders = store.orders().await;
        assert!(reports.sales_by_period(&orders, range, Bucket::Day).is_empty());
        assert_eq!(reports.expected_cash_in_drawer(&orders, &[], day, 20.0), 20.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_quantities_rejected() -> Result<()> {
        let store = setup_store().await?;
        let result = store
            .create_order(
                &employee_session(),
                Some(6),
                vec![OrderItem::new("jugo", u32::MAX), OrderItem::new("jugo", 1)],
                "",
            )
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(store.orders().await.is_empty());
        assert_eq!(store.tables().await[5].status, TableStatus::Available);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_payment_reduces_outstanding() -> Result<()> {
        let store = setup_store().await?;
        let waiter = employee_session();
        let order = store
            .create_order(&waiter, Some(1), vec![OrderItem::new("encebollado", 4)], "")
            .await?;
        let mut editor = store.open_editor(&order.id).await?;
        store.send_to_kitchen(&waiter, &mut editor).await?;

        let (partial, _) = store
            .record_payment(&waiter, &order.id, PaymentMethod::Transfer, 5.0, None)
            .await?;
        assert_eq!(partial.outstanding(), 15.0);

        let result = store
            .complete_order(&waiter, &order.id, PaymentMethod::Cash, Some(10.0))
            .await;
        assert!(matches!(result, Err(Error::InsufficientPayment { .. })));

        let (_, receipt) = store
            .complete_order(&waiter, &order.id, PaymentMethod::Cash, Some(15.0))
            .await?;
        assert_eq!(receipt.amount, 15.0);
        assert_eq!(receipt.change, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_listener_replaces_memory_from_snapshots() -> Result<()> {
        let store = setup_store().await?;
        let mut subscription = store.subscribe();
        let waiter = employee_session();
        let order = store.create_order(&waiter, Some(1), vec![], "").await?;

        let snapshot = subscription.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, order.id);

        // Applying an empty snapshot empties the in-memory copy
        store.apply_snapshot(Arc::new(Vec::new())).await;
        assert!(store.orders().await.is_empty());

        // Refresh brings back what the database holds
        store.refresh().await?;
        assert_eq!(store.orders().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_listener_applies_newest_snapshot() -> Result<()> {
        let store = setup_store().await?;
        let listener = store.listen();
        let newest = vec![sample_order("o-2", Some(2), OrderStatus::Active)];
        store
            .feed()
            .publish(vec![sample_order("o-1", Some(1), OrderStatus::Active)]);
        store.feed().publish(newest.clone());

        for _ in 0..100 {
            if store.orders().await == newest {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(store.orders().await, newest);
        listener.abort();
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_order_admin_only() -> Result<()> {
        let store = setup_store().await?;
        let order = store
            .create_order(&employee_session(), None, vec![], "")
            .await?;
        assert!(store.delete_order(&employee_session(), &order.id).await.is_err());
        store.delete_order(&admin_session(), &order.id).await?;
        assert!(matches!(
            store.get(&order.id).await,
            Err(Error::OrderNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_store_reloads_persisted_orders() -> Result<()> {
        let store = setup_store().await?;
        let order = store
            .create_order(&employee_session(), Some(2), vec![OrderItem::new("jugo", 2)], "")
            .await?;
        let reloaded =
            OrderStore::load(Arc::clone(&store.db), Arc::new(test_catalog()), TEST_TABLE_COUNT)
                .await?;
        assert_eq!(reloaded.get(&order.id).await?, order);
        Ok(())
    }
}
