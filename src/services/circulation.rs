//! Loan lifecycle: checkout, check-in, renewal and hold placement.
//!
//! Each operation loads snapshots, asks the policy for a decision and then
//! applies the writes in a fixed order. The store gives no cross-document
//! atomicity, so two concurrent checkouts of one copy can both pass the
//! availability check; only double check-in is guarded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use super::{
    audit::AuditLogger,
    policy::{self, LoanPolicy, Rejection},
};
use crate::{
    error::{AppError, AppResult},
    models::{AuditAction, AuditEntity, Copy, CopyStatus, Hold, Loan, Member},
    repository::Repository,
};

/// Result of a successful check-in
#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    pub loan: Loan,
    pub status: CopyStatus,
    pub notified_hold: Option<Hold>,
}

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    policy: Arc<LoanPolicy>,
    audit: AuditLogger,
}

fn rejected(operation: &'static str, rejection: Rejection) -> AppError {
    tracing::debug!(operation, reason = %rejection, "Circulation request rejected");
    AppError::Rejected(rejection)
}

impl CirculationService {
    pub fn new(repository: Repository, policy: Arc<LoanPolicy>, audit: AuditLogger) -> Self {
        Self { repository, policy, audit }
    }

    async fn load_member(&self, operation: &'static str, id: Uuid) -> AppResult<Member> {
        self.repository
            .members
            .get(id)
            .await?
            .ok_or_else(|| rejected(operation, Rejection::MemberNotFound))
    }

    async fn load_copy(&self, operation: &'static str, barcode: &str) -> AppResult<Copy> {
        self.repository
            .copies
            .get(barcode)
            .await?
            .ok_or_else(|| rejected(operation, Rejection::CopyNotFound))
    }

    /// Lend an available copy to a member
    pub async fn checkout(&self, member_id: Uuid, barcode: &str, performed_by: &str) -> AppResult<Loan> {
        let member = self.load_member("checkout", member_id).await?;
        let copy = self.load_copy("checkout", barcode).await?;

        let now = Utc::now();
        let due_date = policy::decide_checkout(&self.policy, &member, &copy, now)
            .map_err(|r| rejected("checkout", r))?;

        let loan = Loan {
            id: Uuid::new_v4(),
            member_id: member.id,
            copy_barcode: copy.barcode.clone(),
            loan_date: now,
            due_date,
            returned: false,
        };
        self.repository.loans.insert(&loan).await?;

        // No compensation: the open loan stays recorded against a copy still AVAILABLE
        match self.repository.copies.set_status(&copy.barcode, CopyStatus::OnLoan).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(
                    loan_id = %loan.id,
                    copy_barcode = %copy.barcode,
                    "Loan recorded but copy disappeared before status update"
                );
                return Err(AppError::Internal("Failed to update copy status".to_string()));
            }
            Err(e) => {
                tracing::error!(
                    loan_id = %loan.id,
                    copy_barcode = %copy.barcode,
                    "Loan recorded but copy status update failed: {}",
                    e
                );
                return Err(AppError::Internal("Failed to update copy status".to_string()));
            }
        }

        tracing::info!(
            loan_id = %loan.id,
            member_id = %member.id,
            copy_barcode = %copy.barcode,
            due_date = %loan.due_date,
            "Copy checked out"
        );

        self.audit
            .record(AuditEntity::Loan, AuditAction::CheckOut, performed_by, &loan)
            .await;

        Ok(loan)
    }

    /// Close the open loan on a copy and route the copy to the next hold, if any
    pub async fn checkin(&self, barcode: &str, performed_by: &str) -> AppResult<CheckInOutcome> {
        let loan = self
            .repository
            .loans
            .close_open_for_copy(barcode)
            .await?
            .ok_or_else(|| rejected("checkin", Rejection::NoActiveLoan))?;

        let holds = self.repository.holds.pending_for_copy(barcode).await?;
        let decision = policy::decide_checkin(&holds);

        if let Some(ref hold) = decision.hold_to_notify {
            if self.repository.holds.mark_notified(hold.id).await? {
                notify_hold_ready(hold);
            } else {
                tracing::warn!(hold_id = %hold.id, "Hold was already notified");
            }
        }

        if !self.repository.copies.set_status(barcode, decision.new_status).await? {
            tracing::warn!(copy_barcode = %barcode, "Checked-in copy no longer exists");
        }

        tracing::info!(
            loan_id = %loan.id,
            member_id = %loan.member_id,
            copy_barcode = %barcode,
            status = %decision.new_status,
            "Copy checked in"
        );

        self.audit
            .record(
                AuditEntity::Loan,
                AuditAction::CheckIn,
                performed_by,
                &json!({
                    "loan_id": loan.id,
                    "copy_barcode": barcode,
                    "status": decision.new_status,
                }),
            )
            .await;

        Ok(CheckInOutcome {
            loan,
            status: decision.new_status,
            notified_hold: decision.hold_to_notify,
        })
    }

    /// Extend a member's open loan on a copy. Returns the updated loan.
    pub async fn renew(&self, member_id: Uuid, barcode: &str, performed_by: &str) -> AppResult<Loan> {
        let member = self.load_member("renew", member_id).await?;
        let loan = self.repository.loans.find_open(member.id, barcode).await?;
        let outstanding = self.repository.holds.count_unfulfilled(barcode, None).await?;

        let new_due = policy::decide_renewal(&self.policy, &member, loan.as_ref(), outstanding)
            .map_err(|r| rejected("renew", r))?;

        // decide_renewal only succeeds with an open loan
        let mut loan = loan.ok_or_else(|| rejected("renew", Rejection::NoActiveLoan))?;

        if !self.repository.loans.set_due_date(loan.id, new_due).await? {
            return Err(rejected("renew", Rejection::NoActiveLoan));
        }
        loan.due_date = new_due;

        tracing::info!(
            loan_id = %loan.id,
            member_id = %member.id,
            copy_barcode = %barcode,
            due_date = %new_due,
            "Loan renewed"
        );

        self.audit
            .record(
                AuditEntity::Loan,
                AuditAction::RenewLoan,
                performed_by,
                &json!({
                    "loan_id": loan.id,
                    "member_id": member.id,
                    "copy_barcode": barcode,
                    "new_due": new_due,
                }),
            )
            .await;

        Ok(loan)
    }

    /// Queue a member for the next availability of a copy
    pub async fn place_hold(&self, member_id: Uuid, barcode: &str, performed_by: &str) -> AppResult<Hold> {
        let member = self.load_member("place_hold", member_id).await?;
        let copy = self.load_copy("place_hold", barcode).await?;
        let existing = self
            .repository
            .holds
            .count_unfulfilled(&copy.barcode, Some(member.id))
            .await?;

        policy::decide_hold_placement(&member, &copy, existing)
            .map_err(|r| rejected("place_hold", r))?;

        let hold = Hold::new(member.id, &copy.barcode, Utc::now());
        self.repository.holds.insert(&hold).await?;

        tracing::info!(
            hold_id = %hold.id,
            member_id = %member.id,
            copy_barcode = %copy.barcode,
            "Hold placed"
        );

        self.audit
            .record(AuditEntity::Hold, AuditAction::PlaceHold, performed_by, &hold)
            .await;

        Ok(hold)
    }

    /// Open loans past their due date, oldest due date first
    pub async fn overdue_loans(&self, now: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        self.repository.loans.list_overdue(now).await
    }
}

fn notify_hold_ready(hold: &Hold) {
    tracing::info!(
        target: "notification",
        member_id = %hold.member_id,
        copy_barcode = %hold.copy_barcode,
        "Notified member {} about reserved copy {}",
        hold.member_id,
        hold.copy_barcode
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::member::CreateMember,
        repository::MockCopyStore,
    };
    use std::collections::HashMap;

    fn policy() -> Arc<LoanPolicy> {
        Arc::new(LoanPolicy::new(
            HashMap::from([(crate::models::MemberTier::Standard, 14)]),
            7,
        ))
    }

    #[tokio::test]
    async fn test_checkout_keeps_loan_when_copy_update_fails() {
        let mut repository = Repository::in_memory();
        let member = CreateMember {
            name: "Grace".to_string(),
            email: "grace@example.org".to_string(),
            phone: String::new(),
            tier: crate::models::MemberTier::Standard,
        }
        .into_member(Utc::now());
        repository.members.insert(&member).await.unwrap();

        let now = Utc::now();
        let copy = Copy {
            id: Uuid::new_v4(),
            isbn: "9780000000002".to_string(),
            barcode: "BC-9".to_string(),
            status: CopyStatus::Available,
            created_at: now,
            updated_at: now,
        };
        let mut copies = MockCopyStore::new();
        copies
            .expect_get()
            .returning(move |_| Ok(Some(copy.clone())));
        copies
            .expect_set_status()
            .returning(|_, _| Err(AppError::Internal("store unavailable".to_string())));
        repository.copies = Arc::new(copies);

        let audit = AuditLogger::new(repository.audit.clone());
        let service = CirculationService::new(repository.clone(), policy(), audit);

        let result = service.checkout(member.id, "BC-9", "operator").await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        // no compensation: the loan stays open and nothing is audited
        let open = repository.loans.find_open(member.id, "BC-9").await.unwrap();
        assert!(open.is_some());
        assert!(repository.audit.unexported(10).await.unwrap().is_empty());
    }
}
