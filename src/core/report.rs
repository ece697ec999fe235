//! Report generation - aggregated sales, expense and cash drawer figures.
//!
//! Reports are pure computations over the order and expense collections. They are
//! admin-only: a [`Reports`] value can only be built from an admin session, and every
//! report goes through it. Timestamps are bucketed into business days using the
//! restaurant's fixed UTC offset.

use crate::core::auth::{Session, require_admin};
use crate::core::menu::MenuCatalog;
use crate::core::round_cents;
use crate::entities::expense::{self, ExpenseSource};
use crate::entities::order::{self, OrderStatus, PaymentMethod};
use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc};
use sea_orm::Iterable;
use serde::Serialize;
use std::collections::BTreeMap;

/// Category name for lines whose item is no longer on the menu.
const UNCATEGORIZED: &str = "other";

/// Inclusive range of business days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// First day in the range
    pub from: NaiveDate,
    /// Last day in the range
    pub to: NaiveDate,
}

impl DateRange {
    /// Builds `from..=to`.
    ///
    /// # Errors
    /// Returns `Validation` when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(Error::validation(format!(
                "Range start {from} is after its end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// A range covering one day.
    #[must_use]
    pub const fn day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    /// Whether `day` falls in the range.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        (self.from..=self.to).contains(&day)
    }
}

/// Granularity of period reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// One row per business day
    Day,
    /// Weeks starting on Monday
    Week,
    /// Calendar months
    Month,
}

impl Bucket {
    /// First day of the bucket containing `day`.
    #[must_use]
    pub fn start_of(self, day: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => day,
            Self::Week => day
                .checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
                .unwrap_or(day),
            Self::Month => day.with_day(1).unwrap_or(day),
        }
    }
}

/// Total for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    /// First day of the period
    pub period: NaiveDate,
    /// Sum of amounts
    pub total: f64,
    /// Number of records summed
    pub count: usize,
}

/// Total for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category name
    pub category: String,
    /// Sum of amounts
    pub total: f64,
}

/// Total collected with one payment method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodTotal {
    /// Payment method
    pub method: PaymentMethod,
    /// Sum of payments
    pub total: f64,
}

/// Figures for a single business day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// Business day
    pub date: NaiveDate,
    /// Revenue from orders completed that day
    pub revenue: f64,
    /// Orders completed that day
    pub completed_orders: usize,
    /// Orders opened that day and later cancelled
    pub cancelled_orders: usize,
    /// Expenses booked on that day
    pub expenses: f64,
    /// Revenue minus expenses
    pub net: f64,
}

/// Handle for computing reports, obtainable by admins only.
#[derive(Debug, Clone, Copy)]
pub struct Reports {
    offset: FixedOffset,
}

impl Reports {
    /// Checks that `session` may view reports.
    ///
    /// # Errors
    /// Returns `Unauthorized` for non-admin sessions.
    pub fn new(session: &Session, offset: FixedOffset) -> Result<Self> {
        require_admin(session, "view reports")?;
        Ok(Self { offset })
    }

    /// Business day a timestamp falls on.
    #[must_use]
    pub fn business_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    fn sale_day(&self, order: &order::Model) -> NaiveDate {
        self.business_day(order.completed_at.unwrap_or(order.created_at))
    }

    fn completed_in<'a>(
        &'a self,
        orders: &'a [order::Model],
        range: DateRange,
    ) -> impl Iterator<Item = &'a order::Model> + 'a {
        orders
            .iter()
            .filter(move |o| o.status == OrderStatus::Completed && range.contains(self.sale_day(o)))
    }

    /// Revenue of completed orders grouped by period, oldest period first.
    #[must_use]
    pub fn sales_by_period(
        &self,
        orders: &[order::Model],
        range: DateRange,
        bucket: Bucket,
    ) -> Vec<PeriodTotal> {
        let mut periods: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for order in self.completed_in(orders, range) {
            let entry = periods
                .entry(bucket.start_of(self.sale_day(order)))
                .or_default();
            entry.0 += order.total;
            entry.1 += 1;
        }
        into_period_totals(periods)
    }

    /// Line revenue of completed orders per menu category, largest first.
    #[must_use]
    pub fn sales_by_category(
        &self,
        orders: &[order::Model],
        range: DateRange,
        catalog: &MenuCatalog,
    ) -> Vec<CategoryTotal> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for order in self.completed_in(orders, range) {
            for item in order.items.iter() {
                let Ok(price) = catalog.price_of(item) else {
                    continue;
                };
                let category = catalog
                    .get(&item.menu_item_id)
                    .map_or(UNCATEGORIZED, |m| m.category.as_str());
                *totals.entry(category.to_string()).or_default() +=
                    price * f64::from(item.quantity);
            }
        }
        into_category_totals(totals)
    }

    /// Money collected per payment method on completed orders, in a fixed method order.
    #[must_use]
    pub fn sales_by_payment_method(
        &self,
        orders: &[order::Model],
        range: DateRange,
    ) -> Vec<MethodTotal> {
        let completed: Vec<&order::Model> = self.completed_in(orders, range).collect();
        PaymentMethod::iter()
            .map(|method| MethodTotal {
                method,
                total: round_cents(
                    completed
                        .iter()
                        .flat_map(|o| o.payments.iter())
                        .filter(|p| p.method == method)
                        .map(|p| p.amount)
                        .sum(),
                ),
            })
            .collect()
    }

    /// Expenses in range per category, largest first.
    #[must_use]
    pub fn expenses_by_category(
        &self,
        expenses: &[expense::Model],
        range: DateRange,
    ) -> Vec<CategoryTotal> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for expense in expenses.iter().filter(|e| range.contains(e.date)) {
            *totals.entry(expense.category.clone()).or_default() += expense.amount;
        }
        into_category_totals(totals)
    }

    /// Expenses grouped by period, oldest period first.
    #[must_use]
    pub fn expenses_by_period(
        &self,
        expenses: &[expense::Model],
        range: DateRange,
        bucket: Bucket,
    ) -> Vec<PeriodTotal> {
        let mut periods: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for expense in expenses.iter().filter(|e| range.contains(e.date)) {
            let entry = periods.entry(bucket.start_of(expense.date)).or_default();
            entry.0 += expense.amount;
            entry.1 += 1;
        }
        into_period_totals(periods)
    }

    /// Cash that should be in the drawer at the end of `day`.
    ///
    /// Opening float, plus cash payments taken that day on orders that ended up
    /// completed, minus expenses paid from the drawer that day.
    #[must_use]
    pub fn expected_cash_in_drawer(
        &self,
        orders: &[order::Model],
        expenses: &[expense::Model],
        day: NaiveDate,
        opening_float: f64,
    ) -> f64 {
        let cash_in: f64 = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .flat_map(|o| o.payments.iter())
            .filter(|p| p.method == PaymentMethod::Cash && self.business_day(p.at) == day)
            .map(|p| p.amount)
            .sum();
        let cash_out: f64 = expenses
            .iter()
            .filter(|e| e.source == ExpenseSource::Cash && e.date == day)
            .map(|e| e.amount)
            .sum();
        round_cents(opening_float + cash_in - cash_out)
    }

    /// Revenue, order counts and expenses for `day`.
    #[must_use]
    pub fn daily_summary(
        &self,
        orders: &[order::Model],
        expenses: &[expense::Model],
        day: NaiveDate,
    ) -> DailySummary {
        let range = DateRange::day(day);
        let (revenue, completed_orders) = self
            .completed_in(orders, range)
            .fold((0.0, 0), |(sum, n), o| (sum + o.total, n + 1));
        let cancelled_orders = orders
            .iter()
            .filter(|o| {
                o.status == OrderStatus::Cancelled && self.business_day(o.created_at) == day
            })
            .count();
        let expenses: f64 = expenses
            .iter()
            .filter(|e| e.date == day)
            .map(|e| e.amount)
            .sum();
        let revenue = round_cents(revenue);
        let expenses = round_cents(expenses);
        DailySummary {
            date: day,
            revenue,
            completed_orders,
            cancelled_orders,
            expenses,
            net: round_cents(revenue - expenses),
        }
    }
}

fn into_period_totals(periods: BTreeMap<NaiveDate, (f64, usize)>) -> Vec<PeriodTotal> {
    periods
        .into_iter()
        .map(|(period, (total, count))| PeriodTotal {
            period,
            total: round_cents(total),
            count,
        })
        .collect()
}

fn into_category_totals(totals: BTreeMap<String, f64>) -> Vec<CategoryTotal> {
    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            total: round_cents(total),
        })
        .collect();
    rows.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    rows
}
