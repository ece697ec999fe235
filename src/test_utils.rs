//! Shared test utilities for the POS.
//!
//! This module provides common helper functions for setting up test databases,
//! a fixed configuration and menu, sessions for each role, and orders with
//! sensible defaults.

use crate::{
    app::AppContext,
    config::Config,
    core::{
        auth::{Role, Session},
        menu::MenuCatalog,
        store::OrderStore,
    },
    entities::order::{self, OrderItems, OrderStatus, Payments},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;

/// Number of tables in the test restaurant.
pub const TEST_TABLE_COUNT: u32 = 8;

const TEST_CONFIG: &str = r#"
[restaurant]
name = "Test Cevicheria"
table_count = 8
utc_offset_hours = 0
default_opening_float = 20.0

[[users]]
username = "admin"
password = "admin123"
role = "admin"

[[users]]
username = "maria"
password = "mesera"
role = "employee"

[[users]]
username = "cocina"
password = "fogon"
role = "kitchen"

[[menu]]
id = "encebollado"
name = "Encebollado"
price = 5.0
category = "soups"
takeaway = true

[[menu]]
id = "coca-cola"
name = "Coca-Cola"
price = 1.5
category = "drinks"
takeaway = true

[[menu]]
id = "seco-de-pollo"
name = "Seco de pollo"
price = 6.5
category = "mains"

[[menu]]
id = "jugo"
name = "Jugo natural"
price = 2.0
category = "drinks"
takeaway = true
flavors = ["mora", "naranja"]

[[menu]]
id = "cerveza"
name = "Cerveza"
price = 2.5
category = "drinks"
"#;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The test restaurant configuration.
///
/// # Users
/// * `admin` / `admin123` - admin
/// * `maria` / `mesera` - employee
/// * `cocina` / `fogon` - kitchen
///
/// # Panics
/// Panics if the embedded TOML is invalid.
#[allow(clippy::unwrap_used)]
pub fn test_config() -> Config {
    Config::from_toml(TEST_CONFIG).unwrap()
}

/// Catalog built from [`test_config`].
///
/// # Panics
/// Panics if the embedded menu is invalid.
#[allow(clippy::unwrap_used)]
pub fn test_catalog() -> MenuCatalog {
    MenuCatalog::new(test_config().menu).unwrap()
}

/// Session for the `admin` user.
pub fn admin_session() -> Session {
    Session::new("admin", Role::Admin)
}

/// Session for the `maria` employee.
pub fn employee_session() -> Session {
    Session::new("maria", Role::Employee)
}

/// Session for the `cocina` kitchen user.
pub fn kitchen_session() -> Session {
    Session::new("cocina", Role::Kitchen)
}

/// A session file path unique to `name`, removed if a previous run left it behind.
pub fn temp_session_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir()
        .join(format!("restaurant-pos-tests-{}", std::process::id()))
        .join(format!("{name}.json"));
    let _ = std::fs::remove_file(&path);
    path
}

/// Monday 2025-03-10, 15:00 UTC.
///
/// # Panics
/// Never; the timestamp is a constant.
#[allow(clippy::unwrap_used)]
pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap()
}

/// The business day of [`test_time`].
pub fn test_day() -> NaiveDate {
    test_time().date_naive()
}

/// Creates an order with no lines in `status`, created at [`test_time`] by `maria`.
///
/// # Defaults
/// * `total`: 0.0
/// * `notes`: empty
/// * `completed_at`: set for completed orders
pub fn sample_order(id: &str, table_id: Option<i32>, status: OrderStatus) -> order::Model {
    let created_at = test_time();
    order::Model {
        id: id.to_string(),
        table_id,
        items: OrderItems::default(),
        sent_items: OrderItems::default(),
        payments: Payments::default(),
        status,
        total: 0.0,
        notes: String::new(),
        created_at,
        created_by: "maria".to_string(),
        updated_at: created_at,
        completed_at: (status == OrderStatus::Completed).then_some(created_at),
        payment_method: None,
    }
}

/// Sets up an empty order store over a fresh database.
pub async fn setup_store() -> Result<OrderStore> {
    let db = setup_test_db().await?;
    OrderStore::load(Arc::new(db), Arc::new(test_catalog()), TEST_TABLE_COUNT).await
}

/// Sets up a complete application context with nobody signed in.
/// `name` keeps the session file apart from other tests.
pub async fn setup_context(name: &str) -> Result<AppContext> {
    let mut config = test_config();
    config.storage.session_path = Some(temp_session_path(name));
    let db = setup_test_db().await?;
    AppContext::with_connection(config, Arc::new(db)).await
}
