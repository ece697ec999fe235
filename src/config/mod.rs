/// Application configuration (config.toml)
pub mod app;

/// Database configuration and connection management
pub mod database;

/// Menu catalog entries
pub mod menu;

/// Static credential table entries
pub mod users;

pub use app::{Config, load_config, load_default_config};
