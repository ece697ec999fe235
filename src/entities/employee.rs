//! Employee entity - Staff records kept by the administrator.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Job title (e.g. "waiter", "cook")
    pub position: String,
    /// Contact phone, if known
    pub phone: Option<String>,
    /// Monthly salary
    pub salary: f64,
    /// Inactive employees are kept for history
    pub active: bool,
    /// When the record was created
    pub created_at: DateTimeUtc,
    /// Username that created the record
    pub created_by: String,
}

/// `Employee` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
