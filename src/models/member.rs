//! Member model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Membership class; controls loan and renewal duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberTier {
    Standard,
    Premium,
}

impl MemberTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberTier::Standard => "STANDARD",
            MemberTier::Premium => "PREMIUM",
        }
    }
}

impl std::fmt::Display for MemberTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MemberTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STANDARD" => Ok(MemberTier::Standard),
            "PREMIUM" => Ok(MemberTier::Premium),
            _ => Err(format!("Invalid member tier: {}", s)),
        }
    }
}

// Stored as TEXT
impl sqlx::Type<Postgres> for MemberTier {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for MemberTier {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for MemberTier {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Registered library member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tier: MemberTier,
    /// Blocked members may not borrow, renew or place holds
    pub blocked: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Register member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub tier: MemberTier,
}

impl CreateMember {
    pub fn into_member(self, now: DateTime<Utc>) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            tier: self.tier,
            blocked: false,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial member update
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateMember {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tier: Option<MemberTier>,
    pub blocked: Option<bool>,
    pub active: Option<bool>,
}

impl UpdateMember {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.tier.is_none()
            && self.blocked.is_none()
            && self.active.is_none()
    }

    /// Patch applied by deactivation
    pub fn deactivation() -> Self {
        Self {
            blocked: Some(true),
            active: Some(false),
            ..Default::default()
        }
    }

    pub fn apply(&self, member: &mut Member, now: DateTime<Utc>) {
        if let Some(ref name) = self.name {
            member.name = name.clone();
        }
        if let Some(ref email) = self.email {
            member.email = email.clone();
        }
        if let Some(ref phone) = self.phone {
            member.phone = phone.clone();
        }
        if let Some(tier) = self.tier {
            member.tier = tier;
        }
        if let Some(blocked) = self.blocked {
            member.blocked = blocked;
        }
        if let Some(active) = self.active {
            member.active = active;
        }
        member.updated_at = now;
    }
}

/// Parse a member identifier supplied by a client
pub fn parse_member_id(raw: &str) -> Result<Uuid, crate::error::AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| crate::error::AppError::Validation("Invalid member ID".to_string()))
}
