//! Employee business logic - staff records kept by the administrator.
//!
//! Employees are never required for sign-in; the credential table lives in
//! config.toml. These records exist for payroll and contact details. Deactivating
//! keeps the history, deleting removes the row.

use crate::{
    entities::{Employee, employee},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Editable fields of an employee.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeInput {
    /// Full name
    pub name: String,
    /// Job title
    pub position: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Monthly salary, zero or more
    pub salary: f64,
}

impl EmployeeInput {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Employee name cannot be empty"));
        }
        if self.position.trim().is_empty() {
            return Err(Error::validation("Employee position cannot be empty"));
        }
        if !self.salary.is_finite() || self.salary < 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.salary,
            });
        }
        Ok(())
    }

    fn phone(&self) -> Option<String> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
    }
}

fn not_found(employee_id: i64) -> Error {
    Error::RecordNotFound {
        kind: "Employee",
        id: employee_id.to_string(),
    }
}

/// Retrieves every employee, ordered alphabetically by name.
pub async fn get_all_employees<C>(db: &C) -> Result<Vec<employee::Model>>
where
    C: ConnectionTrait,
{
    Employee::find()
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves employees still on staff.
pub async fn get_active_employees<C>(db: &C) -> Result<Vec<employee::Model>>
where
    C: ConnectionTrait,
{
    Employee::find()
        .filter(employee::Column::Active.eq(true))
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an employee by id.
pub async fn get_employee_by_id<C>(db: &C, employee_id: i64) -> Result<Option<employee::Model>>
where
    C: ConnectionTrait,
{
    Employee::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an active employee record.
pub async fn create_employee<C>(
    db: &C,
    input: EmployeeInput,
    created_by: &str,
) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    input.validate()?;

    let employee = employee::ActiveModel {
        name: Set(input.name.trim().to_string()),
        position: Set(input.position.trim().to_string()),
        phone: Set(input.phone()),
        salary: Set(input.salary),
        active: Set(true),
        created_at: Set(Utc::now()),
        created_by: Set(created_by.to_string()),
        ..Default::default()
    };

    let result = employee.insert(db).await?;
    info!("Employee {} added: {}", result.id, result.name);
    Ok(result)
}

/// Overwrites the editable fields of an employee.
pub async fn update_employee<C>(
    db: &C,
    employee_id: i64,
    input: EmployeeInput,
) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    input.validate()?;
    let existing = get_employee_by_id(db, employee_id)
        .await?
        .ok_or_else(|| not_found(employee_id))?;

    let mut active: employee::ActiveModel = existing.into();
    active.name = Set(input.name.trim().to_string());
    active.position = Set(input.position.trim().to_string());
    active.phone = Set(input.phone());
    active.salary = Set(input.salary);
    active.update(db).await.map_err(Into::into)
}

/// Marks an employee as active or inactive.
pub async fn set_employee_active<C>(
    db: &C,
    employee_id: i64,
    active: bool,
) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    let existing = get_employee_by_id(db, employee_id)
        .await?
        .ok_or_else(|| not_found(employee_id))?;

    let mut model: employee::ActiveModel = existing.into();
    model.active = Set(active);
    let result = model.update(db).await?;
    info!(
        "Employee {} marked {}",
        result.id,
        if active { "active" } else { "inactive" }
    );
    Ok(result)
}

/// Deletes an employee record.
pub async fn delete_employee<C>(db: &C, employee_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Employee::delete_by_id(employee_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(employee_id));
    }
    Ok(())
}
