//! Catalog management service: books and their copies

use chrono::Utc;
use serde_json::json;
use validator::Validate;

use super::audit::AuditLogger;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, CreateBook, UpdateBook},
        copy::{CreateCopy, UpdateCopy},
        AuditAction, AuditEntity, Book, Copy,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    audit: AuditLogger,
}

impl CatalogService {
    pub fn new(repository: Repository, audit: AuditLogger) -> Self {
        Self { repository, audit }
    }

    // ---- Books ----

    pub async fn create_book(&self, request: CreateBook, performed_by: &str) -> AppResult<Book> {
        request.validate()?;
        let book = Book::from(request);
        self.repository.books.insert(&book).await?;

        tracing::info!(isbn = %book.isbn, "Book created");
        self.audit
            .record(AuditEntity::Book, AuditAction::Create, performed_by, &book)
            .await;
        Ok(book)
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, isbn: &str) -> AppResult<Book> {
        self.repository
            .books
            .get(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }

    /// Free text search, optionally restricted to books with a copy in a given status
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let status = query.copy_status().map_err(AppError::Validation)?;
        let text = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let isbns = match status {
            Some(status) => Some(self.repository.copies.isbns_with_status(status).await?),
            None => None,
        };
        if matches!(isbns, Some(ref v) if v.is_empty()) {
            return Ok(Vec::new());
        }

        self.repository.books.search(text, isbns.as_deref()).await
    }

    pub async fn update_book(&self, isbn: &str, patch: UpdateBook, performed_by: &str) -> AppResult<Book> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let book = self
            .repository
            .books
            .update(isbn, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))?;

        self.audit
            .record(AuditEntity::Book, AuditAction::Update, performed_by, &book)
            .await;
        Ok(book)
    }

    pub async fn delete_book(&self, isbn: &str, performed_by: &str) -> AppResult<()> {
        if !self.repository.books.delete(isbn).await? {
            return Err(AppError::NotFound(format!("Book with ISBN {} not found", isbn)));
        }

        tracing::info!(isbn = %isbn, "Book deleted");
        self.audit
            .record(AuditEntity::Book, AuditAction::Delete, performed_by, &json!({ "isbn": isbn }))
            .await;
        Ok(())
    }

    // ---- Copies ----

    pub async fn create_copy(&self, request: CreateCopy, performed_by: &str) -> AppResult<Copy> {
        request.validate()?;
        let copy = request.into_copy(Utc::now());
        self.repository.copies.insert(&copy).await?;

        tracing::info!(copy_barcode = %copy.barcode, isbn = %copy.isbn, "Copy created");
        self.audit
            .record(AuditEntity::Copy, AuditAction::Create, performed_by, &copy)
            .await;
        Ok(copy)
    }

    pub async fn list_copies(&self, isbn: Option<&str>) -> AppResult<Vec<Copy>> {
        self.repository.copies.list(isbn).await
    }

    pub async fn count_copies(&self) -> AppResult<i64> {
        self.repository.copies.count().await
    }

    pub async fn get_copy(&self, barcode: &str) -> AppResult<Copy> {
        self.repository
            .copies
            .get(barcode)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with barcode {} not found", barcode)))
    }

    pub async fn update_copy(&self, barcode: &str, patch: UpdateCopy, performed_by: &str) -> AppResult<Copy> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let copy = self
            .repository
            .copies
            .update(barcode, &patch, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with barcode {} not found", barcode)))?;

        self.audit
            .record(AuditEntity::Copy, AuditAction::Update, performed_by, &copy)
            .await;
        Ok(copy)
    }

    pub async fn delete_copy(&self, barcode: &str, performed_by: &str) -> AppResult<()> {
        if !self.repository.copies.delete(barcode).await? {
            return Err(AppError::NotFound(format!("Copy with barcode {} not found", barcode)));
        }

        tracing::info!(copy_barcode = %barcode, "Copy deleted");
        self.audit
            .record(
                AuditEntity::Copy,
                AuditAction::Delete,
                performed_by,
                &json!({ "barcode": barcode }),
            )
            .await;
        Ok(())
    }
}
