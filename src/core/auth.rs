//! Identity and session handling.
//!
//! Credentials come from a fixed table in config.toml. A successful sign-in yields a
//! [`Session`] that is written to a small JSON file so the identity survives a
//! restart, the same way the browser client kept it in local storage.

use crate::config::users::UserConfig;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a signed-in user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Floor staff: takes orders and payments
    #[serde(alias = "waiter")]
    Employee,
    /// Full access, including reports and records
    Admin,
    /// Kitchen display only
    Kitchen,
}

impl Role {
    /// Admins reach every screen.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether the role may open, edit and charge orders.
    #[must_use]
    pub const fn can_take_orders(self) -> bool {
        matches!(self, Self::Employee | Self::Admin)
    }

    /// Whether the role may advance kitchen tickets.
    #[must_use]
    pub const fn can_work_kitchen(self) -> bool {
        matches!(self, Self::Kitchen | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Employee => "employee",
            Self::Admin => "admin",
            Self::Kitchen => "kitchen",
        })
    }
}

/// The signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Username from the credential table
    pub username: String,
    /// Role granted at sign-in
    pub role: Role,
    /// When the user signed in
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    /// Builds a session for `username` with `role`, stamped now.
    #[must_use]
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
            signed_in_at: Utc::now(),
        }
    }
}

/// Resolves username/password pairs against the static credential table.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    credentials: Vec<UserConfig>,
}

impl IdentityProvider {
    /// Wraps a credential table.
    #[must_use]
    pub const fn new(credentials: Vec<UserConfig>) -> Self {
        Self { credentials }
    }

    /// Checks the credentials and returns a fresh session.
    ///
    /// # Errors
    /// Returns `InvalidCredentials` for an unknown username or a wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        let user = self
            .credentials
            .iter()
            .find(|c| c.username == username && c.password == password)
            .ok_or_else(|| {
                warn!("Failed sign-in attempt for '{}'", username);
                Error::InvalidCredentials {
                    username: username.to_string(),
                }
            })?;
        info!("User '{}' signed in as {}", user.username, user.role);
        Ok(Session::new(user.username.clone(), user.role))
    }
}

/// Persists the current session between restarts.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Session file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `session` to disk, creating the parent directory if needed.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents)?;
        debug!("Session for '{}' saved to {:?}", session.username, self.path);
        Ok(())
    }

    /// Reads the saved session. A missing or unreadable file means signed out.
    pub fn restore(&self) -> Result<Option<Session>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Ignoring corrupt session file {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    /// Removes the saved session.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn unauthorized(session: &Session, action: &str) -> Error {
    warn!(
        "User '{}' ({}) tried to {}",
        session.username, session.role, action
    );
    Error::Unauthorized {
        role: session.role,
        action: action.to_string(),
    }
}

/// Fails unless the session belongs to an admin.
pub fn require_admin(session: &Session, action: &str) -> Result<()> {
    if session.role.is_admin() {
        Ok(())
    } else {
        Err(unauthorized(session, action))
    }
}

/// Fails unless the session may take orders.
pub fn require_order_taker(session: &Session, action: &str) -> Result<()> {
    if session.role.can_take_orders() {
        Ok(())
    } else {
        Err(unauthorized(session, action))
    }
}

/// Fails unless the session may work the kitchen display.
pub fn require_kitchen(session: &Session, action: &str) -> Result<()> {
    if session.role.can_work_kitchen() {
        Ok(())
    } else {
        Err(unauthorized(session, action))
    }
}
