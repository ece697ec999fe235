//! Unified error types for the POS service.
//!
//! Every fallible operation returns [`Result`]. Errors are grouped by [`ErrorKind`]
//! so the presentation layer can decide how to surface them: validation problems
//! inline, authorization problems as a rejected action, persistence failures as a
//! notice, and missing records as a redirect back to a listing.

use crate::core::auth::Role;
use crate::entities::order::OrderStatus;
use thiserror::Error;

/// Broad classification of an [`Error`], used at the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or a rule violation on otherwise valid data
    Validation,
    /// The current session may not perform the action
    Authorization,
    /// The database or the filesystem failed
    Persistence,
    /// The referenced record does not exist (anymore)
    NotFound,
    /// Configuration or other startup problems
    Internal,
}

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Invalid username or password for '{username}'")]
    InvalidCredentials { username: String },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Role '{role}' is not allowed to {action}")]
    Unauthorized { role: Role, action: String },

    #[error("Order not found: {id}")]
    OrderNotFound { id: String },

    #[error("{kind} not found: {id}")]
    RecordNotFound { kind: &'static str, id: String },

    #[error("Menu item not found: {id}")]
    MenuItemNotFound { id: String },

    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order {id} cannot be edited while {status}")]
    OrderNotEditable { id: String, status: OrderStatus },

    #[error(
        "Edit rejected for '{menu_item_id}': {sent} already sent to the kitchen, requested {requested}"
    )]
    EditRejected {
        menu_item_id: String,
        sent: u32,
        requested: u32,
    },

    #[error("Cannot send an order without items to the kitchen")]
    EmptyOrder,

    #[error("Table {table_id} already has an open order ({order_id})")]
    TableOccupied { table_id: i32, order_id: String },

    #[error("Insufficient payment: received {received:.2}, outstanding {outstanding:.2}")]
    InsufficientPayment { received: f64, outstanding: f64 },

    #[error("Integer conversion error: {0}")]
    TryFromInt(#[from] std::num::TryFromIntError),
}

impl Error {
    /// Classifies the error for presentation.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidCredentials { .. }
            | Self::InvalidTransition { .. }
            | Self::OrderNotEditable { .. }
            | Self::EditRejected { .. }
            | Self::EmptyOrder
            | Self::TableOccupied { .. }
            | Self::InsufficientPayment { .. } => ErrorKind::Validation,
            Self::NotAuthenticated | Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::Database(_) | Self::Io(_) | Self::Serialization(_) => ErrorKind::Persistence,
            Self::OrderNotFound { .. }
            | Self::RecordNotFound { .. }
            | Self::MenuItemNotFound { .. } => ErrorKind::NotFound,
            Self::Config { .. } | Self::EnvVar(_) | Self::TryFromInt(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
