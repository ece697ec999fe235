//! Menu catalog configuration loaded from config.toml

use crate::errors::{Error, Result};
use serde::Deserialize;

/// Configuration for a single menu item
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemConfig {
    /// Stable identifier referenced by order lines
    pub id: String,
    /// Display name
    pub name: String,
    /// Catalog unit price
    pub price: f64,
    /// Category used for grouping and reports
    pub category: String,
    /// Whether the item can be sold for takeaway
    #[serde(default)]
    pub takeaway: bool,
    /// Flavor or variant options offered for this item
    #[serde(default)]
    pub flavors: Vec<String>,
}

impl MenuItemConfig {
    /// Rejects blank ids and negative or non-finite prices.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Config {
                message: "Menu item id cannot be empty".to_string(),
            });
        }
        if self.price < 0.0 || !self.price.is_finite() {
            return Err(Error::InvalidAmount { amount: self.price });
        }
        Ok(())
    }
}
