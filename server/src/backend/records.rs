//! Record shapes for every table the action layer touches.
//!
//! `*Record` types mirror a stored row, `New*` types carry the columns of an
//! insert, and `*Changes` types carry the columns of an update.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// MEMBERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Editor,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// The authenticated member behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Member {
    #[must_use]
    pub fn as_caller(&self) -> Caller {
        Caller { id: self.id, name: self.name.clone(), role: self.role }
    }
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

/// Column updates for a member. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct MemberChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

// =============================================================================
// CASES
// =============================================================================

/// How a case presents its imagery: one picture, or a before/after pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseLayout {
    #[default]
    Single,
    BeforeAfter,
}

impl CaseLayout {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::BeforeAfter => "before_after",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" | "single" | "normal" => Some(Self::Single),
            "before_after" | "beforeAfter" => Some(Self::BeforeAfter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseRecord {
    pub id: i64,
    pub company_name: String,
    pub description: String,
    pub city: String,
    pub country: String,
    pub contact_person: String,
    pub layout: CaseLayout,
    pub image: Option<String>,
    pub image_before: Option<String>,
    pub image_after: Option<String>,
    pub creator_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCase {
    pub company_name: String,
    pub description: String,
    pub city: String,
    pub country: String,
    pub contact_person: String,
    pub layout: CaseLayout,
    pub image: Option<String>,
    pub image_before: Option<String>,
    pub image_after: Option<String>,
    pub creator_id: Uuid,
}

/// Full replacement of a case's editable columns. Image columns carry the
/// final URL to persist; `created_at` is only rewritten when `Some`.
#[derive(Debug, Clone)]
pub struct CaseChanges {
    pub company_name: String,
    pub description: String,
    pub city: String,
    pub country: String,
    pub contact_person: String,
    pub layout: CaseLayout,
    pub image: Option<String>,
    pub image_before: Option<String>,
    pub image_after: Option<String>,
    pub created_at: Option<OffsetDateTime>,
}

// =============================================================================
// REVIEWS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRecord {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub description: String,
    pub rating: i16,
    pub creator_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub name: String,
    pub city: String,
    pub description: String,
    pub rating: i16,
    pub creator_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct ReviewChanges {
    pub name: String,
    pub city: String,
    pub description: String,
    pub rating: i16,
}

// =============================================================================
// REQUESTS + NOTES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub category: String,
    pub consent: bool,
    pub message: String,
    pub address: Option<String>,
    pub city: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub category: String,
    pub consent: bool,
    pub message: String,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Partial update of a request. `None` leaves the column untouched;
/// `Some(None)` on a nullable column sets it to NULL.
#[derive(Debug, Clone, Default)]
pub struct RequestChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: Option<String>,
    pub message: Option<String>,
    pub address: Option<Option<String>>,
    pub city: Option<Option<String>>,
}

impl RequestChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.category.is_none()
            && self.message.is_none()
            && self.address.is_none()
            && self.city.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub body: String,
    pub request_id: Uuid,
    pub creator_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub body: String,
    pub request_id: Uuid,
    pub creator_id: Uuid,
}
