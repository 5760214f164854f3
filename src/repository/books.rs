//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{map_unique_violation, BookStore};
use crate::{
    error::AppResult,
    models::book::{Book, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn insert(&self, book: &Book) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (isbn, title, author, publisher, tags, subject, published_year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.tags)
        .bind(&book.subject)
        .bind(book.published_year)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Book with ISBN {} already exists", book.isbn)))?;

        Ok(())
    }

    async fn get(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, isbn")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn search(&self, text: Option<&str>, isbns: Option<&[String]>) -> AppResult<Vec<Book>> {
        let pattern = text.map(|t| format!("%{}%", t));
        let isbns: Option<Vec<String>> = isbns.map(|v| v.to_vec());

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE ($1::text IS NULL
                   OR title ILIKE $1
                   OR author ILIKE $1
                   OR subject ILIKE $1
                   OR array_to_string(tags, ' ') ILIKE $1)
              AND ($2::text[] IS NULL OR isbn = ANY($2))
            ORDER BY title, isbn
            "#,
        )
        .bind(pattern)
        .bind(isbns)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn update(&self, isbn: &str, patch: &UpdateBook) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                publisher = COALESCE($4, publisher),
                tags = COALESCE($5, tags),
                subject = COALESCE($6, subject),
                published_year = COALESCE($7, published_year)
            WHERE isbn = $1
            RETURNING *
            "#,
        )
        .bind(isbn)
        .bind(&patch.title)
        .bind(&patch.author)
        .bind(&patch.publisher)
        .bind(&patch.tags)
        .bind(&patch.subject)
        .bind(patch.published_year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn delete(&self, isbn: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
