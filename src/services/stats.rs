//! Circulation metrics

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::Loan, repository::Repository};

/// Aggregate circulation figures
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Metrics {
    /// Number of copies held
    pub total_books: i64,
    /// Members not blocked
    pub active_members: i64,
    /// Loans started since midnight UTC
    pub loans_today: i64,
    pub overdue_count: i64,
    /// Fines accrued on currently overdue loans
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub fine_revenue: Decimal,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    fine_rate: Decimal,
}

impl StatsService {
    pub fn new(repository: Repository, fine_rate: Decimal) -> Self {
        Self { repository, fine_rate }
    }

    pub async fn metrics(&self, now: DateTime<Utc>) -> AppResult<Metrics> {
        let today_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();

        let total_books = self.repository.copies.count().await?;
        let active_members = self.repository.members.count_unblocked().await?;
        let loans_today = self.repository.loans.count_since(today_start).await?;
        let overdue = self.repository.loans.list_overdue(now).await?;

        Ok(Metrics {
            total_books,
            active_members,
            loans_today,
            overdue_count: overdue.len() as i64,
            fine_revenue: fine_total(&overdue, self.fine_rate, now),
        })
    }
}

/// Whole days late times the daily rate, summed over `loans`
pub fn fine_total(loans: &[Loan], fine_rate: Decimal, now: DateTime<Utc>) -> Decimal {
    loans
        .iter()
        .map(|loan| Decimal::from(loan.days_late(now)) * fine_rate)
        .sum()
}
