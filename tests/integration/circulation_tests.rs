//! Loan lifecycle scenarios

use chrono::{Duration, Utc};
use circulation_server::{
    error::AppError,
    models::{CopyStatus, Hold, MemberTier},
    services::policy::Rejection,
};
use uuid::Uuid;

use crate::common::{fixture, OPERATOR};

fn rejection<T: std::fmt::Debug>(result: Result<T, AppError>) -> Rejection {
    match result {
        Err(AppError::Rejected(r)) => r,
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_premium_checkout_due_in_thirty_days() {
    let f = fixture();
    let member = f.member(MemberTier::Premium).await;
    f.copy("C1", CopyStatus::Available).await;

    let before = Utc::now();
    let loan = f.services.circulation.checkout(member.id, "C1", OPERATOR).await.unwrap();
    let after = Utc::now();

    assert!(loan.due_date >= before + Duration::days(30));
    assert!(loan.due_date <= after + Duration::days(30));
    assert!(!loan.returned);
    assert_eq!(f.copy_status("C1").await, CopyStatus::OnLoan);
}

#[tokio::test]
async fn test_standard_checkout_uses_configured_days() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::Available).await;

    let loan = f.services.circulation.checkout(member.id, "C1", OPERATOR).await.unwrap();
    assert_eq!((loan.due_date - loan.loan_date).num_days(), 14);
}

#[tokio::test]
async fn test_checkout_rejects_every_unavailable_status() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;

    for (barcode, status) in [
        ("C-LOAN", CopyStatus::OnLoan),
        ("C-RES", CopyStatus::Reserved),
        ("C-LOST", CopyStatus::Lost),
    ] {
        f.copy(barcode, status).await;
        let result = f.services.circulation.checkout(member.id, barcode, OPERATOR).await;
        assert_eq!(rejection(result), Rejection::CopyUnavailable);
        assert_eq!(f.copy_status(barcode).await, status);
    }
}

#[tokio::test]
async fn test_checkout_unknown_member_or_copy() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::Available).await;

    let result = f.services.circulation.checkout(Uuid::new_v4(), "C1", OPERATOR).await;
    assert_eq!(rejection(result), Rejection::MemberNotFound);

    let result = f.services.circulation.checkout(member.id, "NOPE", OPERATOR).await;
    assert_eq!(rejection(result), Rejection::CopyNotFound);
}

#[tokio::test]
async fn test_deactivated_member_cannot_borrow_renew_or_hold() {
    let f = fixture();
    let member = f.member(MemberTier::Premium).await;
    f.copy("C1", CopyStatus::Available).await;
    f.copy("C2", CopyStatus::OnLoan).await;
    f.open_loan(member.id, "C2", Utc::now() + Duration::days(3)).await;

    let deactivated = f.services.members.deactivate(member.id, OPERATOR).await.unwrap();
    assert!(deactivated.blocked);
    assert!(!deactivated.active);

    let checkout = f.services.circulation.checkout(member.id, "C1", OPERATOR).await;
    assert_eq!(rejection(checkout), Rejection::MemberBlocked);

    let renew = f.services.circulation.renew(member.id, "C2", OPERATOR).await;
    assert_eq!(rejection(renew), Rejection::MemberBlocked);

    let hold = f.services.circulation.place_hold(member.id, "C2", OPERATOR).await;
    assert_eq!(rejection(hold), Rejection::MemberBlocked);

    assert_eq!(f.copy_status("C1").await, CopyStatus::Available);
}

#[tokio::test]
async fn test_checkin_notifies_oldest_hold_first() {
    let f = fixture();
    let borrower = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::OnLoan).await;
    f.open_loan(borrower.id, "C1", Utc::now() + Duration::days(2)).await;

    let t0 = Utc::now() - Duration::hours(2);
    let h1 = Hold::new(Uuid::new_v4(), "C1", t0);
    let h2 = Hold::new(Uuid::new_v4(), "C1", t0 + Duration::minutes(30));
    // inserted out of order on purpose
    f.repository.holds.insert(&h2).await.unwrap();
    f.repository.holds.insert(&h1).await.unwrap();

    let outcome = f.services.circulation.checkin("C1", OPERATOR).await.unwrap();

    assert_eq!(outcome.status, CopyStatus::Reserved);
    assert_eq!(outcome.notified_hold.map(|h| h.id), Some(h1.id));
    assert!(outcome.loan.returned);
    assert_eq!(f.copy_status("C1").await, CopyStatus::Reserved);

    let pending = f.repository.holds.pending_for_copy("C1").await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, h2.id);
}

#[tokio::test]
async fn test_checkin_without_holds_makes_copy_available() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::Available).await;
    f.services.circulation.checkout(member.id, "C1", OPERATOR).await.unwrap();

    let outcome = f.services.circulation.checkin("C1", OPERATOR).await.unwrap();
    assert_eq!(outcome.status, CopyStatus::Available);
    assert!(outcome.notified_hold.is_none());
    assert_eq!(f.copy_status("C1").await, CopyStatus::Available);
}

#[tokio::test]
async fn test_checkin_without_open_loan_changes_nothing() {
    let f = fixture();
    f.copy("C1", CopyStatus::Lost).await;

    let result = f.services.circulation.checkin("C1", OPERATOR).await;
    assert_eq!(rejection(result), Rejection::NoActiveLoan);
    assert_eq!(f.copy_status("C1").await, CopyStatus::Lost);
}

#[tokio::test]
async fn test_concurrent_checkins_close_the_loan_once() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::Available).await;
    f.services.circulation.checkout(member.id, "C1", OPERATOR).await.unwrap();

    let a = f.services.circulation.clone();
    let b = f.services.circulation.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.checkin("C1", OPERATOR).await }),
        tokio::spawn(async move { b.checkin("C1", OPERATOR).await }),
    );
    let results = [first.unwrap(), second.unwrap()];

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::Rejected(Rejection::NoActiveLoan)))));
}

#[tokio::test]
async fn test_renewal_rejected_while_hold_pending() {
    let f = fixture();
    let member = f.member(MemberTier::Premium).await;
    let other = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::Available).await;
    let loan = f.services.circulation.checkout(member.id, "C1", OPERATOR).await.unwrap();

    f.services.circulation.place_hold(other.id, "C1", OPERATOR).await.unwrap();

    let result = f.services.circulation.renew(member.id, "C1", OPERATOR).await;
    assert_eq!(rejection(result), Rejection::HoldsPending);

    let still_open = f.repository.loans.find_open(member.id, "C1").await.unwrap().unwrap();
    assert_eq!(still_open.due_date, loan.due_date);
}

#[tokio::test]
async fn test_renewing_twice_extends_from_due_date() {
    let f = fixture();
    let member = f.member(MemberTier::Premium).await;
    f.copy("C1", CopyStatus::Available).await;
    let loan = f.services.circulation.checkout(member.id, "C1", OPERATOR).await.unwrap();

    let first = f.services.circulation.renew(member.id, "C1", OPERATOR).await.unwrap();
    assert_eq!(first.due_date, loan.due_date + Duration::days(30));

    let second = f.services.circulation.renew(member.id, "C1", OPERATOR).await.unwrap();
    assert_eq!(second.due_date, first.due_date + Duration::days(30));
}

#[tokio::test]
async fn test_renewal_without_loan() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::Available).await;

    let result = f.services.circulation.renew(member.id, "C1", OPERATOR).await;
    assert_eq!(rejection(result), Rejection::NoActiveLoan);

    let result = f.services.circulation.renew(Uuid::new_v4(), "C1", OPERATOR).await;
    assert_eq!(rejection(result), Rejection::MemberNotFound);
}

#[tokio::test]
async fn test_hold_on_available_copy_rejected() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::Available).await;

    let result = f.services.circulation.place_hold(member.id, "C1", OPERATOR).await;
    assert_eq!(rejection(result), Rejection::CopyAvailable);
    assert_eq!(f.repository.holds.count_unfulfilled("C1", None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_hold_rejected() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::OnLoan).await;

    let hold = f.services.circulation.place_hold(member.id, "C1", OPERATOR).await.unwrap();
    assert!(!hold.fulfilled);
    assert!(!hold.notified);
    assert_eq!(hold.member_id, member.id);

    let again = f.services.circulation.place_hold(member.id, "C1", OPERATOR).await;
    assert_eq!(rejection(again), Rejection::DuplicateHold);
}

#[tokio::test]
async fn test_lifecycle_is_audited() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::Available).await;
    f.services.circulation.checkout(member.id, "C1", "desk-1").await.unwrap();
    f.services.circulation.renew(member.id, "C1", "desk-1").await.unwrap();
    f.services.circulation.checkin("C1", "desk-1").await.unwrap();

    let entries = f.repository.audit.unexported(100).await.unwrap();
    let lifecycle: Vec<&str> = entries
        .iter()
        .filter(|e| e.entity == "loan")
        .map(|e| e.action.as_str())
        .collect();
    assert_eq!(lifecycle, vec!["CHECK_OUT", "RENEW_LOAN", "CHECK_IN"]);
    assert!(entries
        .iter()
        .filter(|e| e.entity == "loan")
        .all(|e| e.performed_by == "desk-1"));
}

#[tokio::test]
async fn test_overdue_listing_and_metrics() {
    let f = fixture();
    let member = f.member(MemberTier::Standard).await;
    f.copy("C1", CopyStatus::OnLoan).await;
    f.copy("C2", CopyStatus::OnLoan).await;
    f.copy("C3", CopyStatus::Available).await;

    let now = Utc::now();
    let older = f.open_loan(member.id, "C1", now - Duration::days(3) - Duration::hours(1)).await;
    let newer = f.open_loan(member.id, "C2", now - Duration::days(1) - Duration::hours(1)).await;

    let overdue = f.services.circulation.overdue_loans(now).await.unwrap();
    let ids: Vec<Uuid> = overdue.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![older.id, newer.id]);

    let metrics = f.services.stats.metrics(now).await.unwrap();
    assert_eq!(metrics.total_books, 3);
    assert_eq!(metrics.active_members, 1);
    assert_eq!(metrics.overdue_count, 2);
    // default rate of 1 per day: 3 + 1
    assert_eq!(metrics.fine_revenue, rust_decimal::Decimal::from(4));
}
