//! Trailing monthly series for the dashboard chart.

use chrono::{Datelike, NaiveDate};

use super::types::{ChartData, MonthKey};

/// Months shown on the dashboard chart.
pub const CHART_MONTHS: usize = 12;

/// A cashbook balance at a point of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePoint {
    /// Entry date.
    pub date: NaiveDate,
    /// Entry id, breaking ties within a date.
    pub id: i32,
    /// Running balance after the entry.
    pub balance: i64,
}

/// The `count` months ending with the month of `today`, oldest first.
#[must_use]
pub fn trailing_months(today: NaiveDate, count: usize) -> Vec<MonthKey> {
    let mut months = Vec::with_capacity(count);
    let mut current = MonthKey::new(today.year(), today.month());
    for _ in 0..count {
        months.push(current);
        current = current.previous();
    }
    months.reverse();
    months
}

fn key_of(date: NaiveDate) -> MonthKey {
    MonthKey::new(date.year(), date.month())
}

/// Builds the chart over `months`.
///
/// The balance of a month is the balance of the latest entry dated in or
/// before it (by date, then id), 0 before the first entry.
#[must_use]
pub fn build_chart(
    months: &[MonthKey],
    joined: &[NaiveDate],
    paid_periods: &[MonthKey],
    balances: &[BalancePoint],
) -> ChartData {
    let mut points: Vec<&BalancePoint> = balances.iter().collect();
    points.sort_by_key(|p| (p.date, p.id));

    let mut chart = ChartData::default();
    for month in months {
        chart.labels.push(month.label());
        chart
            .new_members
            .push(joined.iter().filter(|d| key_of(**d) == *month).count() as u64);
        chart
            .dues_paid
            .push(paid_periods.iter().filter(|p| *p == month).count() as u64);
        chart.balance.push(
            points
                .iter()
                .take_while(|p| key_of(p.date) <= *month)
                .last()
                .map_or(0, |p| p.balance),
        );
    }
    chart
}
