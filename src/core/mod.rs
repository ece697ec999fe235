//! Core business logic - framework-agnostic order, record and reporting operations.

/// Role-gated screens and redirects
pub mod access;
/// Identity provider, sessions and role checks
pub mod auth;
/// Daily cash drawer bookkeeping
pub mod daily;
/// Order line editing with the kitchen floor
pub mod editing;
/// Staff records
pub mod employee;
/// Expense records
pub mod expense;
/// Full-snapshot change notifications
pub mod feed;
/// Stock records
pub mod inventory;
/// Kitchen display queue
pub mod kitchen;
/// Order state machine
pub mod lifecycle;
/// Menu catalog lookups
pub mod menu;
/// Order persistence
pub mod order;
/// Payment capture
pub mod payment;
/// Aggregated reports
pub mod report;
/// In-memory order store
pub mod store;
/// Table occupancy
pub mod tables;

/// Rounds a monetary amount to whole cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
