//! Application configuration loading from config.toml
//!
//! The TOML file describes the restaurant (table pool, business-day offset, default
//! opening float), where data is stored, the static credential table and the menu
//! catalog. Everything is validated once at load time so the rest of the crate can
//! rely on it.

use crate::config::menu::MenuItemConfig;
use crate::config::users::UserConfig;
use crate::errors::{Error, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_SESSION_PATH: &str = "data/session.json";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Restaurant-wide settings
    pub restaurant: RestaurantConfig,
    /// Storage locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Static credential table
    pub users: Vec<UserConfig>,
    /// Menu catalog
    pub menu: Vec<MenuItemConfig>,
}

/// Restaurant-wide settings
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantConfig {
    /// Display name
    pub name: String,
    /// Number of dine-in tables, numbered `1..=table_count`
    pub table_count: u32,
    /// Offset from UTC used to decide which business day a timestamp belongs to
    #[serde(default)]
    pub utc_offset_hours: i32,
    /// Opening float assumed for days that were never opened explicitly
    #[serde(default)]
    pub default_opening_float: f64,
}

/// Storage locations
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    /// `SQLite` URL; `DATABASE_URL` in the environment takes precedence
    pub database_url: Option<String>,
    /// File holding the persisted session
    pub session_path: Option<PathBuf>,
}

impl Config {
    /// Parses and validates a configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse config.toml: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<()> {
        if self.restaurant.table_count == 0 {
            return Err(config_error("table_count must be at least 1"));
        }
        if i32::try_from(self.restaurant.table_count).is_err() {
            return Err(config_error("table_count is too large"));
        }
        if !(-12..=14).contains(&self.restaurant.utc_offset_hours) {
            return Err(config_error("utc_offset_hours must be between -12 and 14"));
        }
        let float = self.restaurant.default_opening_float;
        if !float.is_finite() || float < 0.0 {
            return Err(Error::InvalidAmount { amount: float });
        }
        if self.users.is_empty() {
            return Err(config_error("at least one user must be configured"));
        }

        let mut usernames = HashSet::new();
        for user in &self.users {
            user.validate()?;
            if !usernames.insert(user.username.as_str()) {
                return Err(config_error(&format!(
                    "duplicate username '{}'",
                    user.username
                )));
            }
        }

        let mut ids = HashSet::new();
        for item in &self.menu {
            item.validate()?;
            if !ids.insert(item.id.as_str()) {
                return Err(config_error(&format!("duplicate menu id '{}'", item.id)));
            }
        }
        Ok(())
    }

    /// Business-day offset as a chrono timezone.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.restaurant.utc_offset_hours * 3600)
            .ok_or_else(|| config_error("utc_offset_hours out of range"))
    }

    /// Where the session file lives.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.storage
            .session_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH))
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

/// Loads the configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing or fail validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    Config::from_toml(&contents)
}

/// Loads the configuration from `POS_CONFIG`, or ./config.toml when unset
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("POS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
