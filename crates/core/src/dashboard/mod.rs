//! Dashboard figures.
//!
//! This module provides:
//! - Headline statistics for the dashboard cards
//! - Trailing monthly series for the dashboard chart

pub mod series;
pub mod types;

pub use series::{BalancePoint, CHART_MONTHS, build_chart, trailing_months};
pub use types::{ChartData, DashboardStats, MonthKey};
