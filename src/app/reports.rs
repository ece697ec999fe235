//! Admin report screen.

use super::AppContext;
use crate::core::daily;
use crate::core::expense;
use crate::core::report::{
    Bucket, CategoryTotal, DailySummary, DateRange, MethodTotal, PeriodTotal, Reports,
};
use crate::errors::Result;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// Everything the report screen shows for a range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    /// Range covered
    pub range: DateRange,
    /// Revenue per period
    pub sales: Vec<PeriodTotal>,
    /// Revenue per menu category
    pub by_category: Vec<CategoryTotal>,
    /// Money collected per payment method
    pub by_payment_method: Vec<MethodTotal>,
    /// Expenses per period
    pub expenses: Vec<PeriodTotal>,
    /// Expenses per category
    pub expenses_by_category: Vec<CategoryTotal>,
}

impl AppContext {
    async fn reports(&self) -> Result<Reports> {
        let session = self.current_session().await?;
        Reports::new(&session, self.offset)
    }

    /// Business day it is right now.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Sales and expense figures for `range`, grouped by `bucket`.
    pub async fn sales_report(&self, range: DateRange, bucket: Bucket) -> Result<SalesReport> {
        let reports = self.reports().await?;
        let orders = self.orders.orders().await;
        let expenses = expense::get_expenses_in_range(self.db(), range.from, range.to).await?;
        Ok(SalesReport {
            range,
            sales: reports.sales_by_period(&orders, range, bucket),
            by_category: reports.sales_by_category(&orders, range, &self.catalog),
            by_payment_method: reports.sales_by_payment_method(&orders, range),
            expenses: reports.expenses_by_period(&expenses, range, bucket),
            expenses_by_category: reports.expenses_by_category(&expenses, range),
        })
    }

    /// Cash that should be in the drawer at the end of `day`.
    ///
    /// Uses the day's opening float, or the configured default when the day was
    /// never opened.
    pub async fn expected_cash(&self, day: NaiveDate) -> Result<f64> {
        let reports = self.reports().await?;
        let opening_float = daily::get_daily_data(self.db(), day)
            .await?
            .map_or(self.config.restaurant.default_opening_float, |d| {
                d.opening_float
            });
        let orders = self.orders.orders().await;
        let expenses = expense::get_expenses_in_range(self.db(), day, day).await?;
        Ok(reports.expected_cash_in_drawer(&orders, &expenses, day, opening_float))
    }

    /// Summary of a single business day.
    pub async fn daily_summary(&self, day: NaiveDate) -> Result<DailySummary> {
        let reports = self.reports().await?;
        let orders = self.orders.orders().await;
        let expenses = expense::get_expenses_in_range(self.db(), day, day).await?;
        Ok(reports.daily_summary(&orders, &expenses, day))
    }
}
