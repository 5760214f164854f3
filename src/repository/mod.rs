//! Entity store: one collection per entity type.
//!
//! The core only relies on point lookups, filtered scans, single-document
//! updates and counts. No operation spans more than one document atomically.

pub mod audit;
pub mod books;
pub mod copies;
pub mod holds;
pub mod loans;
pub mod members;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::UpdateBook, copy::UpdateCopy, member::UpdateMember, AuditLog, Book, Copy,
        CopyStatus, Hold, Loan, Member,
    },
};

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a book; a duplicate ISBN is a conflict
    async fn insert(&self, book: &Book) -> AppResult<()>;
    async fn get(&self, isbn: &str) -> AppResult<Option<Book>>;
    async fn list(&self) -> AppResult<Vec<Book>>;
    /// Books matching `text`, restricted to `isbns` when given
    async fn search(&self, text: Option<&str>, isbns: Option<&[String]>) -> AppResult<Vec<Book>>;
    async fn update(&self, isbn: &str, patch: &UpdateBook) -> AppResult<Option<Book>>;
    async fn delete(&self, isbn: &str) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CopyStore: Send + Sync {
    /// Insert a copy; a duplicate barcode is a conflict
    async fn insert(&self, copy: &Copy) -> AppResult<()>;
    async fn get(&self, barcode: &str) -> AppResult<Option<Copy>>;
    async fn list<'a>(&self, isbn: Option<&'a str>) -> AppResult<Vec<Copy>>;
    /// Distinct ISBNs having at least one copy in `status`
    async fn isbns_with_status(&self, status: CopyStatus) -> AppResult<Vec<String>>;
    async fn update(&self, barcode: &str, patch: &UpdateCopy, now: DateTime<Utc>) -> AppResult<Option<Copy>>;
    /// Overwrite the status; false when no copy has this barcode
    async fn set_status(&self, barcode: &str, status: CopyStatus) -> AppResult<bool>;
    async fn delete(&self, barcode: &str) -> AppResult<bool>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn insert(&self, member: &Member) -> AppResult<()>;
    async fn get(&self, id: Uuid) -> AppResult<Option<Member>>;
    async fn update(&self, id: Uuid, patch: &UpdateMember, now: DateTime<Utc>) -> AppResult<Option<Member>>;
    async fn count_unblocked(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn insert(&self, loan: &Loan) -> AppResult<()>;
    /// The open loan of `member_id` on `barcode`, if any
    async fn find_open(&self, member_id: Uuid, barcode: &str) -> AppResult<Option<Loan>>;
    /// Atomically mark the open loan on `barcode` as returned and return it.
    /// Returns `None` when no loan is open, so a repeated check-in has no effect.
    async fn close_open_for_copy(&self, barcode: &str) -> AppResult<Option<Loan>>;
    async fn set_due_date(&self, id: Uuid, due_date: DateTime<Utc>) -> AppResult<bool>;
    /// Open loans due before `now`, oldest due date first
    async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Loan>>;
    async fn count_since(&self, since: DateTime<Utc>) -> AppResult<i64>;
}

#[async_trait]
pub trait HoldStore: Send + Sync {
    async fn insert(&self, hold: &Hold) -> AppResult<()>;
    /// Unfulfilled holds on `barcode`, optionally restricted to one member
    async fn count_unfulfilled(&self, barcode: &str, member_id: Option<Uuid>) -> AppResult<i64>;
    /// Unfulfilled, not yet notified holds on `barcode`
    async fn pending_for_copy(&self, barcode: &str) -> AppResult<Vec<Hold>>;
    async fn mark_notified(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: &AuditLog) -> AppResult<()>;
    /// Oldest entries not yet handed to the export sink
    async fn unexported(&self, limit: i64) -> AppResult<Vec<AuditLog>>;
    async fn mark_exported(&self, ids: &[Uuid]) -> AppResult<u64>;
}

/// Main repository struct holding one handle per collection
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub copies: Arc<dyn CopyStore>,
    pub members: Arc<dyn MemberStore>,
    pub loans: Arc<dyn LoanStore>,
    pub holds: Arc<dyn HoldStore>,
    pub audit: Arc<dyn AuditStore>,
}

impl Repository {
    /// Create a repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            copies: Arc::new(copies::CopiesRepository::new(pool.clone())),
            members: Arc::new(members::MembersRepository::new(pool.clone())),
            loans: Arc::new(loans::LoansRepository::new(pool.clone())),
            holds: Arc::new(holds::HoldsRepository::new(pool.clone())),
            audit: Arc::new(audit::AuditRepository::new(pool)),
        }
    }

    /// Create a repository kept entirely in process memory
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            books: store.clone(),
            copies: store.clone(),
            members: store.clone(),
            loans: store.clone(),
            holds: store.clone(),
            audit: store,
        }
    }
}

/// Map a unique-key violation to a conflict, anything else to a database error
pub(crate) fn map_unique_violation(err: sqlx::Error, message: impl Into<String>) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message.into()),
        _ => AppError::Database(err),
    }
}
