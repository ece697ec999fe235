//! Admin record screens: expenses, employees, inventory and the daily cash drawer.
//!
//! Every mutation checks the signed-in role, writes through the core module and then
//! publishes the freshly loaded collection on its feed.

use super::AppContext;
use crate::core::auth::require_admin;
use crate::core::daily::{self, DayClose};
use crate::core::employee::{self, EmployeeInput};
use crate::core::expense::{self, ExpenseInput};
use crate::core::inventory::{self, InventoryInput};
use crate::core::report::DateRange;
use crate::entities::{DailyDataModel, EmployeeModel, ExpenseModel, InventoryItemModel};
use crate::errors::Result;
use chrono::NaiveDate;
use tracing::debug;

impl AppContext {
    async fn admin_username(&self, action: &str) -> Result<String> {
        let session = self.current_session().await?;
        require_admin(&session, action)?;
        Ok(session.username)
    }

    async fn publish_expenses(&self) -> Result<()> {
        let all = expense::get_all_expenses(self.db()).await?;
        let delivered = self.feeds.expenses.publish(all);
        debug!("Expenses snapshot delivered to {} subscribers", delivered);
        Ok(())
    }

    async fn publish_employees(&self) -> Result<()> {
        self.feeds
            .employees
            .publish(employee::get_all_employees(self.db()).await?);
        Ok(())
    }

    async fn publish_inventory(&self) -> Result<()> {
        self.feeds
            .inventory
            .publish(inventory::get_all_items(self.db()).await?);
        Ok(())
    }

    async fn publish_daily(&self) -> Result<()> {
        self.feeds
            .daily
            .publish(daily::get_all_daily_data(self.db()).await?);
        Ok(())
    }

    // Expenses

    /// Lists expenses in `range`.
    pub async fn expenses(&self, range: DateRange) -> Result<Vec<ExpenseModel>> {
        self.admin_username("view expenses").await?;
        expense::get_expenses_in_range(self.db(), range.from, range.to).await
    }

    /// Records an expense.
    pub async fn add_expense(&self, input: ExpenseInput) -> Result<ExpenseModel> {
        let username = self.admin_username("record expenses").await?;
        let created = expense::create_expense(self.db(), input, &username).await?;
        self.publish_expenses().await?;
        Ok(created)
    }

    /// Edits an expense.
    pub async fn update_expense(
        &self,
        expense_id: i64,
        input: ExpenseInput,
    ) -> Result<ExpenseModel> {
        self.admin_username("edit expenses").await?;
        let updated = expense::update_expense(self.db(), expense_id, input).await?;
        self.publish_expenses().await?;
        Ok(updated)
    }

    /// Deletes an expense.
    pub async fn delete_expense(&self, expense_id: i64) -> Result<()> {
        self.admin_username("delete expenses").await?;
        expense::delete_expense(self.db(), expense_id).await?;
        self.publish_expenses().await
    }

    // Employees

    /// Lists every employee.
    pub async fn employees(&self) -> Result<Vec<EmployeeModel>> {
        self.admin_username("view employees").await?;
        employee::get_all_employees(self.db()).await
    }

    /// Adds an employee.
    pub async fn add_employee(&self, input: EmployeeInput) -> Result<EmployeeModel> {
        let username = self.admin_username("add employees").await?;
        let created = employee::create_employee(self.db(), input, &username).await?;
        self.publish_employees().await?;
        Ok(created)
    }

    /// Edits an employee.
    pub async fn update_employee(
        &self,
        employee_id: i64,
        input: EmployeeInput,
    ) -> Result<EmployeeModel> {
        self.admin_username("edit employees").await?;
        let updated = employee::update_employee(self.db(), employee_id, input).await?;
        self.publish_employees().await?;
        Ok(updated)
    }

    /// Marks an employee as no longer on staff.
    pub async fn deactivate_employee(&self, employee_id: i64) -> Result<EmployeeModel> {
        self.admin_username("edit employees").await?;
        let updated = employee::set_employee_active(self.db(), employee_id, false).await?;
        self.publish_employees().await?;
        Ok(updated)
    }

    /// Deletes an employee record.
    pub async fn delete_employee(&self, employee_id: i64) -> Result<()> {
        self.admin_username("delete employees").await?;
        employee::delete_employee(self.db(), employee_id).await?;
        self.publish_employees().await
    }

    // Inventory

    /// Lists the inventory.
    pub async fn inventory(&self) -> Result<Vec<InventoryItemModel>> {
        self.admin_username("view inventory").await?;
        inventory::get_all_items(self.db()).await
    }

    /// Items at or below their threshold.
    pub async fn low_stock(&self) -> Result<Vec<InventoryItemModel>> {
        self.admin_username("view inventory").await?;
        inventory::get_low_stock_items(self.db()).await
    }

    /// Adds an inventory item.
    pub async fn add_inventory_item(&self, input: InventoryInput) -> Result<InventoryItemModel> {
        let username = self.admin_username("edit inventory").await?;
        let created = inventory::create_item(self.db(), input, &username).await?;
        self.publish_inventory().await?;
        Ok(created)
    }

    /// Edits an inventory item.
    pub async fn update_inventory_item(
        &self,
        item_id: i64,
        input: InventoryInput,
    ) -> Result<InventoryItemModel> {
        self.admin_username("edit inventory").await?;
        let updated = inventory::update_item(self.db(), item_id, input).await?;
        self.publish_inventory().await?;
        Ok(updated)
    }

    /// Adds `delta` to an item's stock.
    pub async fn adjust_stock(&self, item_id: i64, delta: f64) -> Result<InventoryItemModel> {
        self.admin_username("edit inventory").await?;
        let updated = inventory::adjust_quantity(self.db(), item_id, delta).await?;
        self.publish_inventory().await?;
        Ok(updated)
    }

    /// Deletes an inventory item.
    pub async fn delete_inventory_item(&self, item_id: i64) -> Result<()> {
        self.admin_username("edit inventory").await?;
        inventory::delete_item(self.db(), item_id).await?;
        self.publish_inventory().await
    }

    // Daily data

    /// Record for a business day, if it was opened.
    pub async fn daily_data(&self, day: NaiveDate) -> Result<Option<DailyDataModel>> {
        self.admin_username("view the cash drawer").await?;
        daily::get_daily_data(self.db(), day).await
    }

    /// Opens a business day with `opening_float` in the drawer.
    pub async fn open_day(&self, day: NaiveDate, opening_float: f64) -> Result<DailyDataModel> {
        let username = self.admin_username("open the cash drawer").await?;
        let record = daily::open_day(self.db(), day, opening_float, &username).await?;
        self.publish_daily().await?;
        Ok(record)
    }

    /// Closes a business day with the counted cash.
    ///
    /// Days that were never opened are opened with the configured default float
    /// first.
    pub async fn close_day(&self, day: NaiveDate, counted_cash: f64) -> Result<DayClose> {
        let username = self.admin_username("close the cash drawer").await?;
        if daily::get_daily_data(self.db(), day).await?.is_none() {
            daily::open_day(
                self.db(),
                day,
                self.config.restaurant.default_opening_float,
                &username,
            )
            .await?;
        }
        let expected = self.expected_cash(day).await?;
        let close = daily::close_day(self.db(), day, counted_cash, expected).await?;
        self.publish_daily().await?;
        Ok(close)
    }
}
