//! Expense entity - Money paid out by the restaurant.
//!
//! Expenses tagged with the `cash` source were paid from the physical drawer and
//! take part in the daily cash reconciliation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where the money for an expense came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseSource {
    /// Paid out of the cash drawer
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Paid from the bank account or card
    #[sea_orm(string_value = "bank")]
    Bank,
}

impl std::fmt::Display for ExpenseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
        })
    }
}

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What was bought (e.g. "Gas refill")
    pub description: String,
    /// Amount paid, always positive
    pub amount: f64,
    /// Grouping for reports (e.g. "supplies", "services")
    pub category: String,
    /// Cash drawer or bank
    pub source: ExpenseSource,
    /// Business day the expense belongs to
    pub date: Date,
    /// When the record was created
    pub created_at: DateTimeUtc,
    /// Username that recorded the expense
    pub created_by: String,
}

/// `Expense` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
