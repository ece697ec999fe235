//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs,
//! and are created with `IF NOT EXISTS` so a restart reuses the existing file.

use crate::config::Config;
use crate::entities::{DailyData, Employee, Expense, InventoryItem, Order};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/restaurant_pos.sqlite?mode=rwc";

/// Resolves the database URL: `DATABASE_URL` from the environment, then the
/// `[storage]` section of the config, then a default local `SQLite` file.
#[must_use]
pub fn get_database_url(config: &Config) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        config
            .storage
            .database_url
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    })
}

/// Establishes a connection to the database at `database_url`, creating the
/// directory of a `SQLite` file if it does not exist yet.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(file) = database_url
        .strip_prefix("sqlite://")
        .and_then(|rest| rest.split('?').next())
        && let Some(parent) = Path::new(file).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    debug!("Connecting to database: {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, Order).await?;
    create_table(db, Expense).await?;
    create_table(db, Employee).await?;
    create_table(db, InventoryItem).await?;
    create_table(db, DailyData).await?;
    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
