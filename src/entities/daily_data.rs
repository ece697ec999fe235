//! Daily data entity - Per-business-day cash drawer bookkeeping, keyed by date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Daily data database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_data")]
pub struct Model {
    /// Calendar date of the business day
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,
    /// Cash placed in the drawer when the day opened
    pub opening_float: f64,
    /// Cash counted when the day was closed
    pub counted_cash: Option<f64>,
    /// When the day was closed
    pub closed_at: Option<DateTimeUtc>,
    /// When the record was created
    pub created_at: DateTimeUtc,
    /// Username that opened the day
    pub created_by: String,
}

/// `DailyData` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
