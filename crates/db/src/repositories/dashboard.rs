//! Dashboard repository for headline figures and chart series.

use chrono::NaiveDate;
use orgkas_core::dashboard::{
    BalancePoint, CHART_MONTHS, ChartData, DashboardStats, MonthKey, build_chart, trailing_months,
};
use orgkas_core::dues::DuesStatus;
use orgkas_core::ledger::LedgerTotals;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

use super::cashbook::chain_rows;
use crate::entities::{cashbook_entries, dues, members};

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Member count, paid dues count and cashbook totals.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn stats(&self) -> Result<DashboardStats, DbErr> {
        let total_members = members::Entity::find().count(&self.db).await?;
        let paid_dues = dues::Entity::find()
            .filter(dues::Column::Status.eq(DuesStatus::Lunas.as_str()))
            .count(&self.db)
            .await?;
        let totals = LedgerTotals::from_rows(&chain_rows(&self.db).await?);

        Ok(DashboardStats {
            total_members,
            paid_dues,
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            balance: totals.balance,
        })
    }

    /// Monthly series for the twelve months ending with the month of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn chart(&self, today: NaiveDate) -> Result<ChartData, DbErr> {
        let months = trailing_months(today, CHART_MONTHS);

        let joined: Vec<Option<NaiveDate>> = members::Entity::find()
            .select_only()
            .column(members::Column::JoinedOn)
            .into_tuple()
            .all(&self.db)
            .await?;
        let joined: Vec<NaiveDate> = joined.into_iter().flatten().collect();

        let periods: Vec<(i32, i32)> = dues::Entity::find()
            .select_only()
            .columns([dues::Column::Year, dues::Column::Month])
            .filter(dues::Column::Status.eq(DuesStatus::Lunas.as_str()))
            .into_tuple()
            .all(&self.db)
            .await?;
        let paid: Vec<MonthKey> = periods
            .into_iter()
            .filter_map(|(year, month)| u32::try_from(month).ok().map(|m| MonthKey::new(year, m)))
            .collect();

        let balances: Vec<(i32, NaiveDate, i64)> = cashbook_entries::Entity::find()
            .select_only()
            .columns([
                cashbook_entries::Column::Id,
                cashbook_entries::Column::EntryDate,
                cashbook_entries::Column::Balance,
            ])
            .into_tuple()
            .all(&self.db)
            .await?;
        let balances: Vec<BalancePoint> = balances
            .into_iter()
            .map(|(id, date, balance)| BalancePoint { date, id, balance })
            .collect();

        Ok(build_chart(&months, &joined, &paid, &balances))
    }
}
