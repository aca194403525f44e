//! Dashboard data types.

use serde::{Deserialize, Serialize};

/// Headline figures shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Number of members.
    pub total_members: u64,
    /// Number of paid dues rows.
    pub paid_dues: u64,
    /// Sum of all cashbook debits.
    pub total_debit: i64,
    /// Sum of all cashbook credits.
    pub total_credit: i64,
    /// Current cashbook balance.
    pub balance: i64,
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    /// Year.
    pub year: i32,
    /// Month, 1..=12.
    pub month: u32,
}

impl MonthKey {
    /// Creates a month key.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Label such as `2025-06`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// The month before this one.
    #[must_use]
    pub const fn previous(&self) -> Self {
        if self.month <= 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }
}

/// Chart series, one value per label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    /// Month labels, oldest first.
    pub labels: Vec<String>,
    /// Members who joined in each month.
    pub new_members: Vec<u64>,
    /// Paid dues rows for each month's period.
    pub dues_paid: Vec<u64>,
    /// Cashbook balance at the end of each month.
    pub balance: Vec<i64>,
}
