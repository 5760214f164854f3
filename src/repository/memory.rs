//! In-process entity store.
//!
//! Each collection sits behind its own lock, so single-document operations are
//! atomic while multi-document sequences interleave freely, like the database
//! backend.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuditStore, BookStore, CopyStore, HoldStore, LoanStore, MemberStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::UpdateBook, copy::UpdateCopy, member::UpdateMember, AuditLog, Book, Copy,
        CopyStatus, Hold, Loan, Member,
    },
};

#[derive(Default)]
pub struct MemoryStore {
    books: RwLock<BTreeMap<String, Book>>,
    copies: RwLock<BTreeMap<String, Copy>>,
    members: RwLock<HashMap<Uuid, Member>>,
    loans: RwLock<Vec<Loan>>,
    holds: RwLock<Vec<Hold>>,
    audit: RwLock<Vec<AuditLog>>,
}

fn sort_books(mut books: Vec<Book>) -> Vec<Book> {
    books.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.isbn.cmp(&b.isbn)));
    books
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn insert(&self, book: &Book) -> AppResult<()> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.isbn) {
            return Err(AppError::Conflict(format!("Book with ISBN {} already exists", book.isbn)));
        }
        books.insert(book.isbn.clone(), book.clone());
        Ok(())
    }

    async fn get(&self, isbn: &str) -> AppResult<Option<Book>> {
        Ok(self.books.read().await.get(isbn).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(sort_books(self.books.read().await.values().cloned().collect()))
    }

    async fn search(&self, text: Option<&str>, isbns: Option<&[String]>) -> AppResult<Vec<Book>> {
        let books = self.books.read().await;
        let found = books
            .values()
            .filter(|b| text.map_or(true, |t| b.matches_text(t)))
            .filter(|b| isbns.map_or(true, |set| set.contains(&b.isbn)))
            .cloned()
            .collect();
        Ok(sort_books(found))
    }

    async fn update(&self, isbn: &str, patch: &UpdateBook) -> AppResult<Option<Book>> {
        let mut books = self.books.write().await;
        Ok(books.get_mut(isbn).map(|book| {
            patch.apply(book);
            book.clone()
        }))
    }

    async fn delete(&self, isbn: &str) -> AppResult<bool> {
        Ok(self.books.write().await.remove(isbn).is_some())
    }
}

#[async_trait]
impl CopyStore for MemoryStore {
    async fn insert(&self, copy: &Copy) -> AppResult<()> {
        let mut copies = self.copies.write().await;
        if copies.contains_key(&copy.barcode) {
            return Err(AppError::Conflict(format!(
                "Copy with barcode {} already exists",
                copy.barcode
            )));
        }
        copies.insert(copy.barcode.clone(), copy.clone());
        Ok(())
    }

    async fn get(&self, barcode: &str) -> AppResult<Option<Copy>> {
        Ok(self.copies.read().await.get(barcode).cloned())
    }

    async fn list<'a>(&self, isbn: Option<&'a str>) -> AppResult<Vec<Copy>> {
        let copies = self.copies.read().await;
        Ok(copies
            .values()
            .filter(|c| isbn.map_or(true, |i| c.isbn == i))
            .cloned()
            .collect())
    }

    async fn isbns_with_status(&self, status: CopyStatus) -> AppResult<Vec<String>> {
        let copies = self.copies.read().await;
        let isbns: BTreeSet<String> = copies
            .values()
            .filter(|c| c.status == status)
            .map(|c| c.isbn.clone())
            .collect();
        Ok(isbns.into_iter().collect())
    }

    async fn update(&self, barcode: &str, patch: &UpdateCopy, now: DateTime<Utc>) -> AppResult<Option<Copy>> {
        let mut copies = self.copies.write().await;
        Ok(copies.get_mut(barcode).map(|copy| {
            patch.apply(copy, now);
            copy.clone()
        }))
    }

    async fn set_status(&self, barcode: &str, status: CopyStatus) -> AppResult<bool> {
        let mut copies = self.copies.write().await;
        Ok(match copies.get_mut(barcode) {
            Some(copy) => {
                copy.status = status;
                copy.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete(&self, barcode: &str) -> AppResult<bool> {
        Ok(self.copies.write().await.remove(barcode).is_some())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.copies.read().await.len() as i64)
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn insert(&self, member: &Member) -> AppResult<()> {
        self.members.write().await.insert(member.id, member.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Member>> {
        Ok(self.members.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: &UpdateMember, now: DateTime<Utc>) -> AppResult<Option<Member>> {
        let mut members = self.members.write().await;
        Ok(members.get_mut(&id).map(|member| {
            patch.apply(member, now);
            member.clone()
        }))
    }

    async fn count_unblocked(&self) -> AppResult<i64> {
        Ok(self.members.read().await.values().filter(|m| !m.blocked).count() as i64)
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn insert(&self, loan: &Loan) -> AppResult<()> {
        self.loans.write().await.push(loan.clone());
        Ok(())
    }

    async fn find_open(&self, member_id: Uuid, barcode: &str) -> AppResult<Option<Loan>> {
        let loans = self.loans.read().await;
        Ok(loans
            .iter()
            .filter(|l| !l.returned && l.member_id == member_id && l.copy_barcode == barcode)
            .min_by_key(|l| l.loan_date)
            .cloned())
    }

    async fn close_open_for_copy(&self, barcode: &str) -> AppResult<Option<Loan>> {
        let mut loans = self.loans.write().await;
        let open = loans
            .iter_mut()
            .filter(|l| !l.returned && l.copy_barcode == barcode)
            .min_by_key(|l| l.loan_date);
        Ok(open.map(|loan| {
            loan.returned = true;
            loan.clone()
        }))
    }

    async fn set_due_date(&self, id: Uuid, due_date: DateTime<Utc>) -> AppResult<bool> {
        let mut loans = self.loans.write().await;
        Ok(match loans.iter_mut().find(|l| l.id == id && !l.returned) {
            Some(loan) => {
                loan.due_date = due_date;
                true
            }
            None => false,
        })
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        let loans = self.loans.read().await;
        let mut overdue: Vec<Loan> = loans.iter().filter(|l| l.is_overdue(now)).cloned().collect();
        overdue.sort_by_key(|l| l.due_date);
        Ok(overdue)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        Ok(self.loans.read().await.iter().filter(|l| l.loan_date >= since).count() as i64)
    }
}

#[async_trait]
impl HoldStore for MemoryStore {
    async fn insert(&self, hold: &Hold) -> AppResult<()> {
        self.holds.write().await.push(hold.clone());
        Ok(())
    }

    async fn count_unfulfilled(&self, barcode: &str, member_id: Option<Uuid>) -> AppResult<i64> {
        let holds = self.holds.read().await;
        Ok(holds
            .iter()
            .filter(|h| !h.fulfilled && h.copy_barcode == barcode)
            .filter(|h| member_id.map_or(true, |m| h.member_id == m))
            .count() as i64)
    }

    async fn pending_for_copy(&self, barcode: &str) -> AppResult<Vec<Hold>> {
        let holds = self.holds.read().await;
        let mut pending: Vec<Hold> = holds
            .iter()
            .filter(|h| h.is_pending() && h.copy_barcode == barcode)
            .cloned()
            .collect();
        pending.sort_by_key(|h| h.timestamp);
        Ok(pending)
    }

    async fn mark_notified(&self, id: Uuid) -> AppResult<bool> {
        let mut holds = self.holds.write().await;
        Ok(match holds.iter_mut().find(|h| h.id == id && !h.notified) {
            Some(hold) => {
                hold.notified = true;
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, entry: &AuditLog) -> AppResult<()> {
        self.audit.write().await.push(entry.clone());
        Ok(())
    }

    async fn unexported(&self, limit: i64) -> AppResult<Vec<AuditLog>> {
        let audit = self.audit.read().await;
        Ok(audit
            .iter()
            .filter(|e| !e.exported)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn mark_exported(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut audit = self.audit.write().await;
        let mut marked = 0;
        for entry in audit.iter_mut().filter(|e| !e.exported && ids.contains(&e.id)) {
            entry.exported = true;
            marked += 1;
        }
        Ok(marked)
    }
}
