//! Copy (physical item) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lending state of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyStatus {
    Available,
    OnLoan,
    Reserved,
    Lost,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "AVAILABLE",
            CopyStatus::OnLoan => "ON_LOAN",
            CopyStatus::Reserved => "RESERVED",
            CopyStatus::Lost => "LOST",
        }
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(CopyStatus::Available),
            "ON_LOAN" => Ok(CopyStatus::OnLoan),
            "RESERVED" => Ok(CopyStatus::Reserved),
            "LOST" => Ok(CopyStatus::Lost),
            _ => Err(format!("Invalid copy status: {}", s)),
        }
    }
}

// Stored as TEXT
impl sqlx::Type<Postgres> for CopyStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for CopyStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CopyStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// A physical copy of a book, keyed by barcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Copy {
    pub id: Uuid,
    pub isbn: String,
    pub barcode: String,
    pub status: CopyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create copy request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCopy {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Barcode is required"))]
    pub barcode: String,
    /// Defaults to AVAILABLE
    pub status: Option<CopyStatus>,
}

impl CreateCopy {
    pub fn into_copy(self, now: DateTime<Utc>) -> Copy {
        Copy {
            id: Uuid::new_v4(),
            isbn: self.isbn.trim().to_string(),
            barcode: self.barcode.trim().to_string(),
            status: self.status.unwrap_or(CopyStatus::Available),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial copy update. The barcode is the key and cannot be changed.
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCopy {
    #[validate(length(min = 1, message = "ISBN cannot be empty"))]
    pub isbn: Option<String>,
    pub status: Option<CopyStatus>,
}

impl UpdateCopy {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none() && self.status.is_none()
    }

    pub fn apply(&self, copy: &mut Copy, now: DateTime<Utc>) {
        if let Some(ref isbn) = self.isbn {
            copy.isbn = isbn.clone();
        }
        if let Some(status) = self.status {
            copy.status = status;
        }
        copy.updated_at = now;
    }
}

/// Copy listing filter
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct CopyQuery {
    pub isbn: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&CopyStatus::OnLoan).unwrap(), "\"ON_LOAN\"");
        let parsed: CopyStatus = serde_json::from_str("\"RESERVED\"").unwrap();
        assert_eq!(parsed, CopyStatus::Reserved);
        assert!(serde_json::from_str::<CopyStatus>("\"BORROWED\"").is_err());
    }

    #[test]
    fn test_update_copy_rejects_invalid_status() {
        let result: Result<UpdateCopy, _> = serde_json::from_str(r#"{"status": "MISSING"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_copy_defaults_to_available() {
        let req = CreateCopy {
            isbn: "978".to_string(),
            barcode: " BC-1 ".to_string(),
            status: None,
        };
        let copy = req.into_copy(Utc::now());
        assert_eq!(copy.status, CopyStatus::Available);
        assert_eq!(copy.barcode, "BC-1");
        assert_eq!(copy.created_at, copy.updated_at);
    }
}
