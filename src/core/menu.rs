//! Menu catalog - the static, read-only list of sellable items.
//!
//! The catalog is built once from config.toml and shared behind an `Arc`. It prices
//! order lines (honouring custom prices) and exposes the full menu and the
//! takeaway-eligible subset.

use crate::config::menu::MenuItemConfig;
use crate::entities::order::OrderItem;
use crate::errors::{Error, Result};
use std::collections::HashMap;

/// A sellable item.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    /// Stable identifier referenced by order lines
    pub id: String,
    /// Display name
    pub name: String,
    /// Catalog unit price
    pub price: f64,
    /// Category used for grouping and reports
    pub category: String,
    /// Whether the item can be sold for takeaway
    pub takeaway: bool,
    /// Flavor or variant options
    pub flavors: Vec<String>,
}

impl From<MenuItemConfig> for MenuItem {
    fn from(config: MenuItemConfig) -> Self {
        Self {
            id: config.id,
            name: config.name,
            price: config.price,
            category: config.category,
            takeaway: config.takeaway,
            flavors: config.flavors,
        }
    }
}

/// Lookup structure over the configured menu.
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
    index: HashMap<String, usize>,
}

impl MenuCatalog {
    /// Builds the catalog, rejecting duplicate ids and invalid prices.
    pub fn new(items: Vec<MenuItemConfig>) -> Result<Self> {
        let mut catalog = Self::default();
        for config in items {
            config.validate()?;
            if catalog.index.contains_key(&config.id) {
                return Err(Error::Config {
                    message: format!("duplicate menu id '{}'", config.id),
                });
            }
            catalog
                .index
                .insert(config.id.clone(), catalog.items.len());
            catalog.items.push(config.into());
        }
        Ok(catalog)
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Every item, in configuration order.
    #[must_use]
    pub fn full_menu(&self) -> &[MenuItem] {
        &self.items
    }

    /// Items that may be sold for takeaway.
    #[must_use]
    pub fn takeaway_menu(&self) -> Vec<&MenuItem> {
        self.items.iter().filter(|item| item.takeaway).collect()
    }

    /// Distinct categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    /// Unit price of a line: its custom price, else the catalog price.
    ///
    /// # Errors
    /// Returns `MenuItemNotFound` when the line has no custom price and its id is
    /// not in the catalog.
    pub fn price_of(&self, item: &OrderItem) -> Result<f64> {
        if let Some(price) = item.custom_price {
            return Ok(price);
        }
        self.get(&item.menu_item_id)
            .map(|menu_item| menu_item.price)
            .ok_or_else(|| Error::MenuItemNotFound {
                id: item.menu_item_id.clone(),
            })
    }

    /// Validates a line before it enters an order.
    ///
    /// Quantities must be positive, custom prices non-negative and finite, and
    /// catalog-priced lines must reference a known item. Takeaway orders only
    /// accept takeaway-eligible catalog items.
    pub fn validate_line(&self, item: &OrderItem, takeaway: bool) -> Result<()> {
        if item.quantity == 0 {
            return Err(Error::validation(format!(
                "Quantity for '{}' must be greater than zero",
                item.menu_item_id
            )));
        }
        if let Some(price) = item.custom_price {
            if price < 0.0 || !price.is_finite() {
                return Err(Error::InvalidAmount { amount: price });
            }
            return Ok(());
        }
        let menu_item = self
            .get(&item.menu_item_id)
            .ok_or_else(|| Error::MenuItemNotFound {
                id: item.menu_item_id.clone(),
            })?;
        if takeaway && !menu_item.takeaway {
            return Err(Error::validation(format!(
                "'{}' is not available for takeaway",
                menu_item.name
            )));
        }
        Ok(())
    }
}
