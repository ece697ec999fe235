//! Expense business logic - recording money paid out of the restaurant.
//!
//! Expenses are plain records: created by admins, listed by business day for the
//! reports, and edited or deleted freely. Cash-sourced expenses feed the drawer
//! reconciliation in [`crate::core::report`].

use crate::{
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

pub use crate::entities::expense::ExpenseSource;

/// Editable fields of an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseInput {
    /// What was bought
    pub description: String,
    /// Amount paid, must be positive
    pub amount: f64,
    /// Grouping for reports
    pub category: String,
    /// Cash drawer or bank
    pub source: ExpenseSource,
    /// Business day the expense belongs to
    pub date: NaiveDate,
}

impl ExpenseInput {
    fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(Error::validation("Expense description cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(Error::validation("Expense category cannot be empty"));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.amount,
            });
        }
        Ok(())
    }
}

fn not_found(expense_id: i64) -> Error {
    Error::RecordNotFound {
        kind: "Expense",
        id: expense_id.to_string(),
    }
}

/// Retrieves every expense, oldest business day first.
pub async fn get_all_expenses<C>(db: &C) -> Result<Vec<expense::Model>>
where
    C: ConnectionTrait,
{
    Expense::find()
        .order_by_asc(expense::Column::Date)
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves expenses whose business day falls in `from..=to`.
pub async fn get_expenses_in_range<C>(
    db: &C,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<expense::Model>>
where
    C: ConnectionTrait,
{
    Expense::find()
        .filter(expense::Column::Date.between(from, to))
        .order_by_asc(expense::Column::Date)
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an expense by id.
pub async fn get_expense_by_id<C>(db: &C, expense_id: i64) -> Result<Option<expense::Model>>
where
    C: ConnectionTrait,
{
    Expense::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Records a new expense after validating it.
pub async fn create_expense<C>(
    db: &C,
    input: ExpenseInput,
    created_by: &str,
) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    input.validate()?;

    let expense = expense::ActiveModel {
        description: Set(input.description.trim().to_string()),
        amount: Set(input.amount),
        category: Set(input.category.trim().to_string()),
        source: Set(input.source),
        date: Set(input.date),
        created_at: Set(Utc::now()),
        created_by: Set(created_by.to_string()),
        ..Default::default()
    };

    let result = expense.insert(db).await?;
    info!(
        "Expense {} recorded: {:.2} ({}, {})",
        result.id, result.amount, result.category, result.source
    );
    Ok(result)
}

/// Overwrites the editable fields of an expense.
pub async fn update_expense<C>(
    db: &C,
    expense_id: i64,
    input: ExpenseInput,
) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    input.validate()?;
    let existing = get_expense_by_id(db, expense_id)
        .await?
        .ok_or_else(|| not_found(expense_id))?;

    let mut active: expense::ActiveModel = existing.into();
    active.description = Set(input.description.trim().to_string());
    active.amount = Set(input.amount);
    active.category = Set(input.category.trim().to_string());
    active.source = Set(input.source);
    active.date = Set(input.date);
    active.update(db).await.map_err(Into::into)
}

/// Deletes an expense.
pub async fn delete_expense<C>(db: &C, expense_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Expense::delete_by_id(expense_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(expense_id));
    }
    info!("Expense {} deleted", expense_id);
    Ok(())
}
