//! Loans repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::LoanStore;
use crate::{error::AppResult, models::loan::Loan};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    async fn insert(&self, loan: &Loan) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (id, member_id, copy_barcode, loan_date, due_date, returned)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(loan.id)
        .bind(loan.member_id)
        .bind(&loan.copy_barcode)
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.returned)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_open(&self, member_id: Uuid, barcode: &str) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE member_id = $1 AND copy_barcode = $2 AND NOT returned
            ORDER BY loan_date
            LIMIT 1
            "#,
        )
        .bind(member_id)
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn close_open_for_copy(&self, barcode: &str) -> AppResult<Option<Loan>> {
        // Single-statement conditional update: a concurrent check-in of the
        // same copy either skips the locked row or finds it already returned.
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET returned = TRUE
            WHERE NOT returned
              AND id = (
                  SELECT id FROM loans
                  WHERE copy_barcode = $1 AND NOT returned
                  ORDER BY loan_date
                  LIMIT 1
                  FOR UPDATE SKIP LOCKED
              )
            RETURNING *
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn set_due_date(&self, id: Uuid, due_date: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query("UPDATE loans SET due_date = $2 WHERE id = $1 AND NOT returned")
            .bind(id)
            .bind(due_date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE NOT returned AND due_date < $1 ORDER BY due_date",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE loan_date >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
