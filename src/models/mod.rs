//! Data models for the circulation server

pub mod audit;
pub mod auth;
pub mod book;
pub mod copy;
pub mod loan;
pub mod member;

// Re-export commonly used types
pub use audit::{AuditAction, AuditEntity, AuditLog};
pub use book::Book;
pub use copy::{Copy, CopyStatus};
pub use loan::{Hold, Loan};
pub use member::{Member, MemberTier};
