//! Copies repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use super::{map_unique_violation, CopyStore};
use crate::{
    error::AppResult,
    models::copy::{Copy, CopyStatus, UpdateCopy},
};

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CopyStore for CopiesRepository {
    async fn insert(&self, copy: &Copy) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO copies (id, isbn, barcode, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(copy.id)
        .bind(&copy.isbn)
        .bind(&copy.barcode)
        .bind(copy.status)
        .bind(copy.created_at)
        .bind(copy.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Copy with barcode {} already exists", copy.barcode)))?;

        Ok(())
    }

    async fn get(&self, barcode: &str) -> AppResult<Option<Copy>> {
        let copy = sqlx::query_as::<_, Copy>("SELECT * FROM copies WHERE barcode = $1")
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;
        Ok(copy)
    }

    async fn list<'a>(&self, isbn: Option<&'a str>) -> AppResult<Vec<Copy>> {
        let copies = sqlx::query_as::<_, Copy>(
            "SELECT * FROM copies WHERE ($1::text IS NULL OR isbn = $1) ORDER BY barcode",
        )
        .bind(isbn)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    async fn isbns_with_status(&self, status: CopyStatus) -> AppResult<Vec<String>> {
        let isbns: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT isbn FROM copies WHERE status = $1 ORDER BY isbn")
                .bind(status)
                .fetch_all(&self.pool)
                .await?;
        Ok(isbns)
    }

    async fn update(&self, barcode: &str, patch: &UpdateCopy, now: DateTime<Utc>) -> AppResult<Option<Copy>> {
        let copy = sqlx::query_as::<_, Copy>(
            r#"
            UPDATE copies SET
                isbn = COALESCE($2, isbn),
                status = COALESCE($3, status),
                updated_at = $4
            WHERE barcode = $1
            RETURNING *
            "#,
        )
        .bind(barcode)
        .bind(&patch.isbn)
        .bind(patch.status)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(copy)
    }

    async fn set_status(&self, barcode: &str, status: CopyStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE copies SET status = $2, updated_at = NOW() WHERE barcode = $1")
            .bind(barcode)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, barcode: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM copies WHERE barcode = $1")
            .bind(barcode)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM copies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
