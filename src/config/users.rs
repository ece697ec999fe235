//! User configuration module for the static credential table.
//!
//! Each `[[users]]` entry in config.toml maps a username and password to a role.
//! There is no hashing: the table is a fixed list shipped with the deployment.

use crate::core::auth::Role;
use crate::errors::{Error, Result};
use serde::Deserialize;

/// A single credential entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Login name
    pub username: String,
    /// Plain password
    pub password: String,
    /// Role granted on sign-in
    pub role: Role,
}

impl UserConfig {
    /// Rejects entries with blank usernames or passwords.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Config {
                message: "Username cannot be empty".to_string(),
            });
        }
        if self.password.is_empty() {
            return Err(Error::Config {
                message: format!("Password for '{}' cannot be empty", self.username),
            });
        }
        Ok(())
    }
}
