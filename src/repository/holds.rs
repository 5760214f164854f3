//! Holds repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::HoldStore;
use crate::{error::AppResult, models::loan::Hold};

#[derive(Clone)]
pub struct HoldsRepository {
    pool: Pool<Postgres>,
}

impl HoldsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HoldStore for HoldsRepository {
    async fn insert(&self, hold: &Hold) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO holds (id, member_id, copy_barcode, timestamp, fulfilled, notified, pickup_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(hold.id)
        .bind(hold.member_id)
        .bind(&hold.copy_barcode)
        .bind(hold.timestamp)
        .bind(hold.fulfilled)
        .bind(hold.notified)
        .bind(hold.pickup_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_unfulfilled(&self, barcode: &str, member_id: Option<Uuid>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM holds
            WHERE copy_barcode = $1
              AND NOT fulfilled
              AND ($2::uuid IS NULL OR member_id = $2)
            "#,
        )
        .bind(barcode)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn pending_for_copy(&self, barcode: &str) -> AppResult<Vec<Hold>> {
        let holds = sqlx::query_as::<_, Hold>(
            r#"
            SELECT * FROM holds
            WHERE copy_barcode = $1 AND NOT fulfilled AND NOT notified
            ORDER BY timestamp
            "#,
        )
        .bind(barcode)
        .fetch_all(&self.pool)
        .await?;
        Ok(holds)
    }

    async fn mark_notified(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE holds SET notified = TRUE WHERE id = $1 AND NOT notified")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
