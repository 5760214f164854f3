//! Lending rules.
//!
//! Every decision here is a pure function over entity snapshots. The
//! circulation service loads the snapshots, asks for a decision and performs
//! the writes.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{Copy, CopyStatus, Hold, Loan, Member, MemberTier},
};

/// Reason a circulation request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Member not found")]
    MemberNotFound,
    #[error("Copy not found")]
    CopyNotFound,
    #[error("Member is blocked")]
    MemberBlocked,
    #[error("Copy is not available")]
    CopyUnavailable,
    #[error("No active loan found")]
    NoActiveLoan,
    #[error("Cannot renew: copy has pending holds")]
    HoldsPending,
    #[error("No loan duration configured for member tier")]
    UnknownTier,
    #[error("Copy is available, no hold needed")]
    CopyAvailable,
    #[error("Member already has a hold on this copy")]
    DuplicateHold,
    #[error("Due date out of range")]
    DueDateOutOfRange,
}

/// Longest loan or renewal period the lending table may configure
pub const MAX_LOAN_DAYS: u32 = 3650;

/// Loan durations per membership tier
#[derive(Debug, Clone)]
pub struct LoanPolicy {
    tier_days: HashMap<MemberTier, u32>,
    default_days: u32,
}

impl LoanPolicy {
    pub fn new(tier_days: HashMap<MemberTier, u32>, default_days: u32) -> Self {
        Self { tier_days, default_days }
    }

    /// Build the policy from the `lending` configuration section.
    /// Tier names are matched case-insensitively; an unrecognised name is an error.
    /// Durations above `MAX_LOAN_DAYS` are rejected.
    pub fn from_config(config: &LendingConfig) -> AppResult<Self> {
        if config.default_loan_days > MAX_LOAN_DAYS {
            return Err(AppError::Internal(format!(
                "lending.default_loan_days: {} exceeds {}",
                config.default_loan_days, MAX_LOAN_DAYS
            )));
        }
        let mut tier_days = HashMap::with_capacity(config.loan_days.len());
        for (name, days) in &config.loan_days {
            let tier: MemberTier = name.parse().map_err(|e: String| {
                AppError::Internal(format!("lending.loan_days: {}", e))
            })?;
            if *days > MAX_LOAN_DAYS {
                return Err(AppError::Internal(format!(
                    "lending.loan_days.{}: {} exceeds {}",
                    name, days, MAX_LOAN_DAYS
                )));
            }
            tier_days.insert(tier, *days);
        }
        Ok(Self::new(tier_days, config.default_loan_days))
    }

    /// Configured duration for `tier`, if the table has an entry
    pub fn loan_days(&self, tier: MemberTier) -> Option<u32> {
        self.tier_days.get(&tier).copied()
    }

    /// Duration used at checkout; falls back to the default for a missing entry
    pub fn checkout_days(&self, tier: MemberTier) -> u32 {
        self.loan_days(tier).unwrap_or(self.default_days)
    }
}

/// Outcome of returning a copy
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInDecision {
    pub new_status: CopyStatus,
    /// Earliest pending hold, to be marked notified
    pub hold_to_notify: Option<Hold>,
}

fn extend(from: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>, Rejection> {
    from.checked_add_signed(Duration::days(i64::from(days)))
        .ok_or(Rejection::DueDateOutOfRange)
}

/// Due date for a new loan of `copy` to `member`
pub fn decide_checkout(
    policy: &LoanPolicy,
    member: &Member,
    copy: &Copy,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, Rejection> {
    if member.blocked {
        return Err(Rejection::MemberBlocked);
    }
    if copy.status != CopyStatus::Available {
        return Err(Rejection::CopyUnavailable);
    }
    extend(now, policy.checkout_days(member.tier))
}

/// Next status of a returned copy given the holds placed on it.
/// Holds already notified or fulfilled are ignored.
pub fn decide_checkin(holds: &[Hold]) -> CheckInDecision {
    let oldest = holds
        .iter()
        .filter(|h| h.is_pending())
        .min_by_key(|h| h.timestamp)
        .cloned();

    match oldest {
        Some(hold) => CheckInDecision {
            new_status: CopyStatus::Reserved,
            hold_to_notify: Some(hold),
        },
        None => CheckInDecision {
            new_status: CopyStatus::Available,
            hold_to_notify: None,
        },
    }
}

/// New due date for renewing `loan`, extended from its current due date.
///
/// Unlike checkout, renewal has no default duration: a tier missing from the
/// table is rejected with `UnknownTier`.
pub fn decide_renewal(
    policy: &LoanPolicy,
    member: &Member,
    loan: Option<&Loan>,
    outstanding_holds: i64,
) -> Result<DateTime<Utc>, Rejection> {
    if member.blocked {
        return Err(Rejection::MemberBlocked);
    }
    let loan = match loan {
        Some(loan) if !loan.returned => loan,
        _ => return Err(Rejection::NoActiveLoan),
    };
    if outstanding_holds > 0 {
        return Err(Rejection::HoldsPending);
    }
    let days = policy.loan_days(member.tier).ok_or(Rejection::UnknownTier)?;
    extend(loan.due_date, days)
}

/// Whether `member` may place a hold on `copy`
pub fn decide_hold_placement(
    member: &Member,
    copy: &Copy,
    existing_holds: i64,
) -> Result<(), Rejection> {
    if member.blocked {
        return Err(Rejection::MemberBlocked);
    }
    if copy.status == CopyStatus::Available {
        return Err(Rejection::CopyAvailable);
    }
    if existing_holds > 0 {
        return Err(Rejection::DuplicateHold);
    }
    Ok(())
}
