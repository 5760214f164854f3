//! Audit trail records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Entity an audit record refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEntity {
    Book,
    Copy,
    Member,
    Loan,
    Hold,
}

impl AuditEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntity::Book => "book",
            AuditEntity::Copy => "copy",
            AuditEntity::Member => "member",
            AuditEntity::Loan => "loan",
            AuditEntity::Hold => "hold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Deactivate,
    CheckOut,
    CheckIn,
    RenewLoan,
    PlaceHold,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Deactivate => "DEACTIVATE",
            AuditAction::CheckOut => "CHECK_OUT",
            AuditAction::CheckIn => "CHECK_IN",
            AuditAction::RenewLoan => "RENEW_LOAN",
            AuditAction::PlaceHold => "PLACE_HOLD",
        }
    }
}

/// Append-only audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub entity: String,
    pub action: String,
    pub performed_by: String,
    /// Snapshot of the payload the action was applied with
    pub data: serde_json::Value,
    pub exported: bool,
}

impl AuditLog {
    pub fn new(
        entity: AuditEntity,
        action: AuditAction,
        performed_by: &str,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            entity: entity.as_str().to_string(),
            action: action.as_str().to_string(),
            performed_by: performed_by.to_string(),
            data,
            exported: false,
        }
    }
}
