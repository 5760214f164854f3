//! Member registration and administration

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::audit::AuditLogger;
use crate::{
    error::{AppError, AppResult},
    models::{
        member::{CreateMember, UpdateMember},
        AuditAction, AuditEntity, Member,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
    audit: AuditLogger,
}

impl MembersService {
    pub fn new(repository: Repository, audit: AuditLogger) -> Self {
        Self { repository, audit }
    }

    pub async fn register(&self, request: CreateMember, performed_by: &str) -> AppResult<Member> {
        request.validate()?;
        let member = request.into_member(Utc::now());
        self.repository.members.insert(&member).await?;

        tracing::info!(member_id = %member.id, tier = %member.tier, "Member registered");
        self.audit
            .record(AuditEntity::Member, AuditAction::Create, performed_by, &member)
            .await;
        Ok(member)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Member> {
        self.repository
            .members
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, patch: UpdateMember, performed_by: &str) -> AppResult<Member> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let member = self.apply(id, &patch).await?;
        self.audit
            .record(AuditEntity::Member, AuditAction::Update, performed_by, &member)
            .await;
        Ok(member)
    }

    /// Block the member and mark the membership inactive
    pub async fn deactivate(&self, id: Uuid, performed_by: &str) -> AppResult<Member> {
        let member = self.apply(id, &UpdateMember::deactivation()).await?;

        tracing::info!(member_id = %member.id, "Member deactivated");
        self.audit
            .record(AuditEntity::Member, AuditAction::Deactivate, performed_by, &member)
            .await;
        Ok(member)
    }

    async fn apply(&self, id: Uuid, patch: &UpdateMember) -> AppResult<Member> {
        self.repository
            .members
            .update(id, patch, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }
}
