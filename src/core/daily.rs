//! Daily cash drawer bookkeeping, one record per business day.
//!
//! Opening a day stores the float placed in the drawer. Closing it stores the cash
//! actually counted and reports how far that is from what the day's sales and cash
//! expenses say should be there.

use crate::{
    core::round_cents,
    entities::{DailyData, daily_data},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, warn};

/// Result of closing a business day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayClose {
    /// The stored record, now closed
    pub record: daily_data::Model,
    /// Cash that should be in the drawer
    pub expected: f64,
    /// Counted minus expected; negative when cash is missing
    pub discrepancy: f64,
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Finds the record for `date`.
pub async fn get_daily_data<C>(db: &C, date: NaiveDate) -> Result<Option<daily_data::Model>>
where
    C: ConnectionTrait,
{
    DailyData::find_by_id(date).one(db).await.map_err(Into::into)
}

/// Every daily record, most recent first.
pub async fn get_all_daily_data<C>(db: &C) -> Result<Vec<daily_data::Model>>
where
    C: ConnectionTrait,
{
    DailyData::find()
        .order_by_desc(daily_data::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the opening float for `date`, creating the record if needed.
///
/// Re-opening a day only replaces the float; a recorded count is kept.
pub async fn open_day<C>(
    db: &C,
    date: NaiveDate,
    opening_float: f64,
    created_by: &str,
) -> Result<daily_data::Model>
where
    C: ConnectionTrait,
{
    check_amount(opening_float)?;

    let record = if let Some(existing) = get_daily_data(db, date).await? {
        let mut active: daily_data::ActiveModel = existing.into();
        active.opening_float = Set(opening_float);
        active.update(db).await?
    } else {
        let record = daily_data::ActiveModel {
            date: Set(date),
            opening_float: Set(opening_float),
            counted_cash: Set(None),
            closed_at: Set(None),
            created_at: Set(Utc::now()),
            created_by: Set(created_by.to_string()),
        };
        record.insert(db).await?
    };
    info!("Business day {} opened with float {:.2}", date, opening_float);
    Ok(record)
}

/// Records the counted cash for `date` and compares it with `expected`.
///
/// # Errors
/// Returns `RecordNotFound` if the day was never opened.
pub async fn close_day<C>(
    db: &C,
    date: NaiveDate,
    counted_cash: f64,
    expected: f64,
) -> Result<DayClose>
where
    C: ConnectionTrait,
{
    check_amount(counted_cash)?;
    let existing = get_daily_data(db, date)
        .await?
        .ok_or_else(|| Error::RecordNotFound {
            kind: "Daily data",
            id: date.to_string(),
        })?;

    let mut active: daily_data::ActiveModel = existing.into();
    active.counted_cash = Set(Some(counted_cash));
    active.closed_at = Set(Some(Utc::now()));
    let record = active.update(db).await?;

    let discrepancy = round_cents(counted_cash - expected);
    if discrepancy.abs() > f64::EPSILON {
        warn!(
            "Business day {} closed with discrepancy {:.2} (expected {:.2}, counted {:.2})",
            date, discrepancy, expected, counted_cash
        );
    } else {
        info!("Business day {} closed, drawer balanced at {:.2}", date, counted_cash);
    }
    Ok(DayClose {
        record,
        expected,
        discrepancy,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_open_day_upserts_float() -> Result<()> {
        let db = setup_test_db().await?;
        let day = test_day();
        let first = open_day(&db, day, 50.0, "admin").await?;
        assert_eq!(first.opening_float, 50.0);
        assert!(first.counted_cash.is_none());

        let again = open_day(&db, day, 60.0, "admin").await?;
        assert_eq!(again.opening_float, 60.0);
        assert_eq!(get_all_daily_data(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_close_day_reports_discrepancy() -> Result<()> {
        let db = setup_test_db().await?;
        let day = test_day();
        open_day(&db, day, 50.0, "admin").await?;

        let close = close_day(&db, day, 63.0, 65.0).await?;
        assert_eq!(close.discrepancy, -2.0);
        assert_eq!(close.record.counted_cash, Some(63.0));
        assert!(close.record.closed_at.is_some());

        // Re-opening keeps the count
        let reopened = open_day(&db, day, 55.0, "admin").await?;
        assert_eq!(reopened.counted_cash, Some(63.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_close_unopened_day() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            close_day(&db, test_day(), 10.0, 10.0).await,
            Err(Error::RecordNotFound { .. })
        ));
        assert!(matches!(
            open_day(&db, test_day(), -1.0, "admin").await,
            Err(Error::InvalidAmount { .. })
        ));
        Ok(())
    }
}
