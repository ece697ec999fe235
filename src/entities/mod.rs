//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the persisted collections of the POS.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod daily_data;
pub mod employee;
pub mod expense;
pub mod inventory_item;
pub mod order;

// Re-export specific types to avoid conflicts
pub use daily_data::{Column as DailyDataColumn, Entity as DailyData, Model as DailyDataModel};
pub use employee::{Column as EmployeeColumn, Entity as Employee, Model as EmployeeModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use inventory_item::{
    Column as InventoryItemColumn, Entity as InventoryItem, Model as InventoryItemModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
