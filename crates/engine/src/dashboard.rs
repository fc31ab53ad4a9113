//! Dashboard figures and the calendar helpers behind them.
//!
//! "Current month" is always interpreted in a time zone: a timestamp stored
//! as 23:30 UTC on the 31st may already belong to the 1st of next month
//! locally.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::Serialize;

use crate::Expense;

/// Summary of a user's spending, computed at request time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub username: String,
    pub year: i32,
    pub month: u32,
    /// Sum of every expense amount the user has ever recorded.
    pub lifetime_total: f64,
    /// Sum of the current month's expenses (equals the sum of `daily`).
    pub month_total: f64,
    /// Spend per day of the current month; index 0 is day 1.
    pub daily: Vec<f64>,
    /// Sum of `split_with` over all expenses.
    pub total_people: i64,
    pub expense_count: u64,
}

/// Number of days in `month` of `year` (leap-year aware). 0 for an invalid
/// month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .filter(|_| (1..=12).contains(&month))
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(0, |last| last.day())
}

/// UTC bounds `[start, end)` of `month` as observed in `tz`.
///
/// A month whose first midnight is skipped by a DST jump starts at the first
/// local instant after the gap. `None` only for an invalid `month`.
pub fn month_window<Z: TimeZone>(
    tz: &Z,
    year: i32,
    month: u32,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let start = local_midnight(tz, NaiveDate::from_ymd_opt(year, month, 1)?)?;
    let end = local_midnight(tz, NaiveDate::from_ymd_opt(next_year, next_month, 1)?)?;
    Some((start, end))
}

/// Start of `date` in `tz`: midnight, or the end of the gap when midnight
/// does not exist locally.
fn local_midnight<Z: TimeZone>(tz: &Z, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=24 * 60)
        .step_by(15)
        .find_map(|minutes: i64| {
            tz.from_local_datetime(&(midnight + TimeDelta::minutes(minutes)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Per-day totals of `expenses` for `month` of `year`, bucketed by the
/// expense's local calendar day in `tz`.
///
/// Expenses outside the month are ignored.
pub fn daily_series<Z: TimeZone>(tz: &Z, year: i32, month: u32, expenses: &[Expense]) -> Vec<f64> {
    let mut daily = vec![0.0; days_in_month(year, month) as usize];
    for expense in expenses {
        let local = expense.spent_at.with_timezone(tz);
        if local.year() != year || local.month() != month {
            continue;
        }
        if let Some(slot) = daily.get_mut(local.day0() as usize) {
            *slot += expense.amount;
        }
    }
    daily
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use chrono_tz::Europe::Rome;

    use super::*;

    fn expense(amount: f64, spent_at: DateTime<Utc>) -> Expense {
        Expense {
            id: 0,
            user_id: 1,
            title: "x".to_string(),
            amount,
            spent_at,
            split_with: 1,
            per_person: amount,
            completed: false,
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2025, 1), 31);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2025, 13), 0);
        assert_eq!(days_in_month(2025, 0), 0);
    }

    #[test]
    fn window_in_utc() {
        let (start, end) = month_window(&Utc, 2025, 12).unwrap();
        assert_eq!(start, utc(2025, 12, 1, 0));
        assert_eq!(end, utc(2026, 1, 1, 0));
    }

    #[test]
    fn window_follows_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let (start, end) = month_window(&plus_two, 2025, 6).unwrap();
        assert_eq!(start, utc(2025, 5, 31, 22));
        assert_eq!(end, utc(2025, 6, 30, 22));
    }

    #[test]
    fn window_starts_after_skipped_midnight() {
        // Asuncion jumped from 00:00 to 01:00 on 2023-10-01.
        let asuncion = chrono_tz::America::Asuncion;
        let (sep_start, sep_end) = month_window(&asuncion, 2023, 9).unwrap();
        let (oct_start, _) = month_window(&asuncion, 2023, 10).unwrap();

        assert_eq!(sep_start, utc(2023, 9, 1, 4));
        assert_eq!(sep_end, utc(2023, 10, 1, 4));
        assert_eq!(oct_start, sep_end);
    }

    #[test]
    fn series_has_one_slot_per_day() {
        assert_eq!(daily_series(&Utc, 2024, 2, &[]).len(), 29);
        assert_eq!(daily_series(&Utc, 2023, 2, &[]).len(), 28);
        assert_eq!(daily_series(&Utc, 2023, 7, &[]).len(), 31);
    }

    #[test]
    fn series_buckets_by_day_and_skips_other_months() {
        let expenses = vec![
            expense(40.0, utc(2025, 3, 1, 12)),
            expense(10.0, utc(2025, 3, 1, 18)),
            expense(5.5, utc(2025, 3, 31, 9)),
            expense(99.0, utc(2025, 2, 28, 9)),
            expense(99.0, utc(2024, 3, 15, 9)),
        ];
        let daily = daily_series(&Utc, 2025, 3, &expenses);

        assert_eq!(daily[0], 50.0);
        assert_eq!(daily[30], 5.5);
        assert_eq!(daily.iter().sum::<f64>(), 55.5);
    }

    #[test]
    fn series_uses_local_day() {
        // 23:30 UTC on March 31st is already April 1st in Rome.
        let late = Utc.with_ymd_and_hms(2025, 3, 31, 23, 30, 0).unwrap();
        let expenses = vec![expense(12.0, late)];

        let march = daily_series(&Rome, 2025, 3, &expenses);
        let april = daily_series(&Rome, 2025, 4, &expenses);

        assert_eq!(march.iter().sum::<f64>(), 0.0);
        assert_eq!(april[0], 12.0);
    }
}
