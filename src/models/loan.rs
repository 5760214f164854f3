//! Loan and hold models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A loan of one copy to one member. Open while `returned` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: Uuid,
    pub member_id: Uuid,
    pub copy_barcode: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned: bool,
}

impl Loan {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.returned && self.due_date < now
    }

    /// Whole days elapsed past the due date
    pub fn days_late(&self, now: DateTime<Utc>) -> i64 {
        (now - self.due_date).num_days().max(0)
    }
}

/// A member's claim on the next availability of a specific copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Hold {
    pub id: Uuid,
    pub member_id: Uuid,
    pub copy_barcode: String,
    /// Placement time; earlier holds are served first
    pub timestamp: DateTime<Utc>,
    pub fulfilled: bool,
    pub notified: bool,
    pub pickup_by: Option<DateTime<Utc>>,
}

impl Hold {
    pub fn new(member_id: Uuid, copy_barcode: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            copy_barcode: copy_barcode.to_string(),
            timestamp: now,
            fulfilled: false,
            notified: false,
            pickup_by: None,
        }
    }

    /// Unfulfilled and not yet notified
    pub fn is_pending(&self) -> bool {
        !self.fulfilled && !self.notified
    }
}
