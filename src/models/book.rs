//! Book (bibliographic record) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::copy::CopyStatus;

/// Bibliographic record, keyed by ISBN. Books carry no lending state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub tags: Vec<String>,
    pub subject: String,
    pub published_year: Option<i32>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subject: String,
    pub published_year: Option<i32>,
}

impl From<CreateBook> for Book {
    fn from(req: CreateBook) -> Self {
        Book {
            isbn: req.isbn.trim().to_string(),
            title: req.title,
            author: req.author,
            publisher: req.publisher,
            tags: req.tags,
            subject: req.subject,
            published_year: req.published_year,
        }
    }
}

/// Partial book update. The ISBN is the key and cannot be changed.
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub tags: Option<Vec<String>>,
    pub subject: Option<String>,
    pub published_year: Option<i32>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.tags.is_none()
            && self.subject.is_none()
            && self.published_year.is_none()
    }

    pub fn apply(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(ref publisher) = self.publisher {
            book.publisher = publisher.clone();
        }
        if let Some(ref tags) = self.tags {
            book.tags = tags.clone();
        }
        if let Some(ref subject) = self.subject {
            book.subject = subject.clone();
        }
        if self.published_year.is_some() {
            book.published_year = self.published_year;
        }
    }
}

/// Book search parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Free text matched against title, author, subject and tags
    pub q: Option<String>,
    /// Only books having at least one copy in this status
    pub status: Option<String>,
}

impl BookQuery {
    /// Parse the status filter, rejecting values outside the copy status set
    pub fn copy_status(&self) -> Result<Option<CopyStatus>, String> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .transpose()
    }
}

impl Book {
    /// Case-insensitive match of a free text term against the descriptive fields
    pub fn matches_text(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.author.to_lowercase().contains(&term)
            || self.subject.to_lowercase().contains(&term)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&term))
    }
}
