//! Audit log repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::AuditStore;
use crate::{error::AppResult, models::audit::AuditLog};

#[derive(Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for AuditRepository {
    async fn append(&self, entry: &AuditLog) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, timestamp, entity, action, performed_by, data, exported)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.timestamp)
        .bind(&entry.entity)
        .bind(&entry.action)
        .bind(&entry.performed_by)
        .bind(&entry.data)
        .bind(entry.exported)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unexported(&self, limit: i64) -> AppResult<Vec<AuditLog>> {
        let entries = sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs WHERE NOT exported ORDER BY timestamp LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn mark_exported(&self, ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query("UPDATE audit_logs SET exported = TRUE WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
