//! Members repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::MemberStore;
use crate::{
    error::AppResult,
    models::member::{Member, UpdateMember},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStore for MembersRepository {
    async fn insert(&self, member: &Member) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO members (id, name, email, phone, tier, blocked, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(member.id)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member.tier)
        .bind(member.blocked)
        .bind(member.active)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn update(&self, id: Uuid, patch: &UpdateMember, now: DateTime<Utc>) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                tier = COALESCE($5, tier),
                blocked = COALESCE($6, blocked),
                active = COALESCE($7, active),
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(patch.tier)
        .bind(patch.blocked)
        .bind(patch.active)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn count_unblocked(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE NOT blocked")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
