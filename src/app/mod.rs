//! Application context - everything a running POS needs, created once at startup.
//!
//! [`AppContext`] owns the database connection, the menu catalog, the order store,
//! the per-collection change feeds and the signed-in session. Screens talk to it
//! instead of reaching for globals; [`AppContext::shutdown`] tears it all down.

mod records;
mod reports;

use crate::config::Config;
use crate::config::database::{create_connection, create_tables, get_database_url};
use crate::core::access::{self, Navigation, Screen};
use crate::core::auth::{IdentityProvider, Session, SessionStore};
use crate::core::feed::ChangeFeed;
use crate::core::kitchen::{self, TicketLine};
use crate::core::menu::MenuCatalog;
use crate::core::store::OrderStore;
use crate::core::tables::Table;
use crate::entities::{DailyDataModel, EmployeeModel, ExpenseModel, InventoryItemModel, order};
use crate::errors::{Error, Result};
use chrono::FixedOffset;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Change feeds of the record collections.
#[derive(Debug, Default)]
pub struct RecordFeeds {
    /// `expenses` collection
    pub expenses: ChangeFeed<ExpenseModel>,
    /// `employees` collection
    pub employees: ChangeFeed<EmployeeModel>,
    /// `inventory` collection
    pub inventory: ChangeFeed<InventoryItemModel>,
    /// `dailyData` collection
    pub daily: ChangeFeed<DailyDataModel>,
}

/// A kitchen ticket: an order waiting on the kitchen with its lines resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct KitchenTicket {
    /// The order
    pub order: order::Model,
    /// Lines as sent to the kitchen
    pub lines: Vec<TicketLine>,
}

/// Shared state of a running POS.
#[derive(Debug)]
pub struct AppContext {
    config: Arc<Config>,
    db: Arc<DatabaseConnection>,
    catalog: Arc<MenuCatalog>,
    offset: FixedOffset,
    identity: IdentityProvider,
    sessions: SessionStore,
    session: RwLock<Option<Session>>,
    orders: OrderStore,
    feeds: RecordFeeds,
    listeners: Vec<JoinHandle<()>>,
}

impl AppContext {
    /// Connects to the configured database, creates missing tables and builds the
    /// context.
    #[instrument(skip(config), fields(restaurant = %config.restaurant.name))]
    pub async fn init(config: Config) -> Result<Self> {
        let database_url = get_database_url(&config);
        let db = create_connection(&database_url).await?;
        create_tables(&db).await?;
        info!("Database ready");
        Self::with_connection(config, Arc::new(db)).await
    }

    /// Builds the context over an existing connection whose tables already exist.
    pub async fn with_connection(config: Config, db: Arc<DatabaseConnection>) -> Result<Self> {
        let catalog = Arc::new(MenuCatalog::new(config.menu.clone())?);
        let offset = config.utc_offset()?;
        let identity = IdentityProvider::new(config.users.clone());
        let sessions = SessionStore::new(config.session_path());

        let orders =
            OrderStore::load(Arc::clone(&db), Arc::clone(&catalog), config.restaurant.table_count)
                .await?;
        let listeners = vec![orders.listen()];

        let restored = sessions
            .restore()?
            .filter(|s| {
                let known = config
                    .users
                    .iter()
                    .any(|u| u.username == s.username && u.role == s.role);
                if !known {
                    warn!("Discarding saved session for unknown user '{}'", s.username);
                }
                known
            });
        if let Some(session) = &restored {
            info!("Restored session for '{}' ({})", session.username, session.role);
        }

        info!(
            "{} ready: {} tables, {} menu items",
            config.restaurant.name,
            config.restaurant.table_count,
            catalog.full_menu().len()
        );
        Ok(Self {
            config: Arc::new(config),
            db,
            catalog,
            offset,
            identity,
            sessions,
            session: RwLock::new(restored),
            orders,
            feeds: RecordFeeds::default(),
            listeners,
        })
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Database connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Menu catalog.
    #[must_use]
    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    /// The order store.
    #[must_use]
    pub const fn orders(&self) -> &OrderStore {
        &self.orders
    }

    /// Change feeds of the record collections.
    #[must_use]
    pub const fn feeds(&self) -> &RecordFeeds {
        &self.feeds
    }

    /// Offset used to bucket timestamps into business days.
    #[must_use]
    pub const fn utc_offset(&self) -> FixedOffset {
        self.offset
    }

    /// The signed-in session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// The signed-in session.
    ///
    /// # Errors
    /// Returns `NotAuthenticated` when nobody is signed in.
    pub async fn current_session(&self) -> Result<Session> {
        self.session().await.ok_or(Error::NotAuthenticated)
    }

    /// Signs in and returns the role's home screen.
    ///
    /// Failing to persist the session is logged but does not fail the sign-in.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Navigation> {
        let session = self.identity.authenticate(username, password)?;
        if let Err(e) = self.sessions.save(&session) {
            warn!("Could not persist session: {}", e);
        }
        let home = Screen::home(session.role);
        *self.session.write().await = Some(session);
        Ok(access::resolve(self.session().await.as_ref(), home))
    }

    /// Signs out and returns the login screen.
    pub async fn sign_out(&self) -> Result<Navigation> {
        let previous = self.session.write().await.take();
        if let Some(session) = previous {
            info!("User '{}' signed out", session.username);
        }
        self.sessions.clear()?;
        Ok(access::resolve(None, Screen::Login))
    }

    /// Resolves a navigation request for the current session.
    pub async fn navigate(&self, screen: Screen) -> Navigation {
        access::resolve(self.session().await.as_ref(), screen)
    }

    /// Resolves a request to open an order screen.
    pub async fn navigate_to_order(&self, order_id: &str) -> Navigation {
        let orders = self.orders.orders().await;
        access::resolve_order(self.session().await.as_ref(), order_id, &orders)
    }

    /// Table grid for the current session.
    pub async fn tables(&self) -> Result<Vec<Table>> {
        let session = self.current_session().await?;
        crate::core::auth::require_order_taker(&session, "view tables")?;
        Ok(self.orders.tables().await)
    }

    /// Opens, or reopens, the order on a table for the current session.
    pub async fn open_table(&self, table_id: i32) -> Result<order::Model> {
        let session = self.current_session().await?;
        self.orders.open_table(&session, table_id).await
    }

    /// Tickets for the kitchen display, oldest first.
    pub async fn kitchen_board(&self) -> Result<Vec<KitchenTicket>> {
        let session = self.current_session().await?;
        crate::core::auth::require_kitchen(&session, "view the kitchen display")?;
        Ok(self
            .orders
            .kitchen_queue()
            .await
            .into_iter()
            .map(|order| KitchenTicket {
                lines: kitchen::ticket_lines(&order, &self.catalog),
                order,
            })
            .collect())
    }

    /// Stops the background listeners and closes the database.
    ///
    /// The connection stays open if another owner still shares it.
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            db,
            orders,
            listeners,
            ..
        } = self;
        for listener in &listeners {
            listener.abort();
        }
        drop(orders);
        match Arc::try_unwrap(db) {
            Ok(db) => {
                db.close().await?;
                info!("Shut down cleanly");
            }
            Err(_) => warn!("Database connection still shared, leaving it open"),
        }
        Ok(())
    }
}
