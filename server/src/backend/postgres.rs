//! PostgreSQL implementation of the table traits.
//!
//! Tables are created by the embedded migrations in `src/db/migrations`. All
//! paged listings order by `created_at DESC, id DESC` so page boundaries stay
//! stable when several rows share a timestamp.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::records::{
    Caller, CaseChanges, CaseLayout, CaseRecord, Member, MemberChanges, NewCase, NewMember, NewNote, NewRequest,
    NewReview, NoteRecord, RequestChanges, RequestRecord, ReviewChanges, ReviewRecord, Role,
};
use super::{
    BackendError, CaseStore, MemberStore, NoteStore, Page, RequestStore, ReviewStore, SessionStore, Window,
};

#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =============================================================================
// ROW MAPPING
// =============================================================================

const CASE_COLUMNS: &str = "id, company_name, description, city, country, contact_person, layout, \
                            image, image_before, image_after, creator_id, created_at";
const REVIEW_COLUMNS: &str = "id, name, city, description, rating, creator_id, created_at";
const REQUEST_COLUMNS: &str = "id, name, phone, email, category, consent, message, address, city, created_at";
const MEMBER_COLUMNS: &str = "m.id, m.email, m.name, m.created_at, COALESCE(p.role, 'editor') AS role";

fn case_from_row(row: &PgRow) -> Result<CaseRecord, sqlx::Error> {
    let layout: String = row.try_get("layout")?;
    Ok(CaseRecord {
        id: row.try_get("id")?,
        company_name: row.try_get("company_name")?,
        description: row.try_get("description")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        contact_person: row.try_get("contact_person")?,
        layout: CaseLayout::parse(&layout).unwrap_or_default(),
        image: row.try_get("image")?,
        image_before: row.try_get("image_before")?,
        image_after: row.try_get("image_after")?,
        creator_id: row.try_get("creator_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn review_from_row(row: &PgRow) -> Result<ReviewRecord, sqlx::Error> {
    Ok(ReviewRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        city: row.try_get("city")?,
        description: row.try_get("description")?,
        rating: row.try_get("rating")?,
        creator_id: row.try_get("creator_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn request_from_row(row: &PgRow) -> Result<RequestRecord, sqlx::Error> {
    Ok(RequestRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        category: row.try_get("category")?,
        consent: row.try_get("consent")?,
        message: row.try_get("message")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        created_at: row.try_get("created_at")?,
    })
}

fn note_from_row(row: &PgRow) -> Result<NoteRecord, sqlx::Error> {
    Ok(NoteRecord {
        id: row.try_get("id")?,
        body: row.try_get("body")?,
        request_id: row.try_get("request_id")?,
        creator_id: row.try_get("creator_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn member_from_row(row: &PgRow) -> Result<Member, sqlx::Error> {
    let role: String = row.try_get("role")?;
    Ok(Member {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: Role::parse(&role).unwrap_or(Role::Editor),
        created_at: row.try_get("created_at")?,
    })
}

// =============================================================================
// CASES
// =============================================================================

#[async_trait]
impl CaseStore for PgBackend {
    async fn insert_case(&self, case: NewCase) -> Result<CaseRecord, BackendError> {
        let row = sqlx::query(&format!(
            "INSERT INTO cases (company_name, description, city, country, contact_person, layout, \
                                image, image_before, image_after, creator_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {CASE_COLUMNS}"
        ))
        .bind(&case.company_name)
        .bind(&case.description)
        .bind(&case.city)
        .bind(&case.country)
        .bind(&case.contact_person)
        .bind(case.layout.as_str())
        .bind(&case.image)
        .bind(&case.image_before)
        .bind(&case.image_after)
        .bind(case.creator_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(case_from_row(&row)?)
    }

    async fn list_cases(&self, window: Window) -> Result<Page<CaseRecord>, BackendError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cases")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            "SELECT {CASE_COLUMNS} FROM cases ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(case_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total })
    }

    async fn find_case(&self, id: i64) -> Result<Option<CaseRecord>, BackendError> {
        let row = sqlx::query(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(case_from_row).transpose()?)
    }

    async fn update_case(&self, id: i64, changes: CaseChanges) -> Result<bool, BackendError> {
        let result = sqlx::query(
            "UPDATE cases SET company_name = $2, description = $3, city = $4, country = $5, \
                              contact_person = $6, layout = $7, image = $8, image_before = $9, \
                              image_after = $10, created_at = COALESCE($11, created_at) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.company_name)
        .bind(&changes.description)
        .bind(&changes.city)
        .bind(&changes.country)
        .bind(&changes.contact_person)
        .bind(changes.layout.as_str())
        .bind(&changes.image)
        .bind(&changes.image_before)
        .bind(&changes.image_after)
        .bind(changes.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_case(&self, id: i64) -> Result<bool, BackendError> {
        let result = sqlx::query("DELETE FROM cases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// REVIEWS
// =============================================================================

#[async_trait]
impl ReviewStore for PgBackend {
    async fn insert_review(&self, review: NewReview) -> Result<ReviewRecord, BackendError> {
        let row = sqlx::query(&format!(
            "INSERT INTO reviews (name, city, description, rating, creator_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(&review.name)
        .bind(&review.city)
        .bind(&review.description)
        .bind(review.rating)
        .bind(review.creator_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(review_from_row(&row)?)
    }

    async fn list_reviews(&self, window: Window) -> Result<Page<ReviewRecord>, BackendError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(review_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total })
    }

    async fn find_review(&self, id: i64) -> Result<Option<ReviewRecord>, BackendError> {
        let row = sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(review_from_row).transpose()?)
    }

    async fn update_review(&self, id: i64, changes: ReviewChanges) -> Result<bool, BackendError> {
        let result =
            sqlx::query("UPDATE reviews SET name = $2, city = $3, description = $4, rating = $5 WHERE id = $1")
                .bind(id)
                .bind(&changes.name)
                .bind(&changes.city)
                .bind(&changes.description)
                .bind(changes.rating)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_review(&self, id: i64) -> Result<bool, BackendError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[async_trait]
impl RequestStore for PgBackend {
    async fn insert_request(&self, request: NewRequest) -> Result<RequestRecord, BackendError> {
        let row = sqlx::query(&format!(
            "INSERT INTO requests (id, name, phone, email, category, consent, message, address, city) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.category)
        .bind(request.consent)
        .bind(&request.message)
        .bind(&request.address)
        .bind(&request.city)
        .fetch_one(&self.pool)
        .await?;
        Ok(request_from_row(&row)?)
    }

    async fn list_requests(&self, window: Window) -> Result<Page<RequestRecord>, BackendError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(request_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total })
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<RequestRecord>, BackendError> {
        let row = sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(request_from_row).transpose()?)
    }

    async fn update_request(&self, id: Uuid, changes: RequestChanges) -> Result<bool, BackendError> {
        let result = sqlx::query(
            "UPDATE requests SET name = COALESCE($2, name), phone = COALESCE($3, phone), \
                                 email = COALESCE($4, email), category = COALESCE($5, category), \
                                 message = COALESCE($6, message), \
                                 address = CASE WHEN $7 THEN $8 ELSE address END, \
                                 city = CASE WHEN $9 THEN $10 ELSE city END \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.email)
        .bind(&changes.category)
        .bind(&changes.message)
        .bind(changes.address.is_some())
        .bind(changes.address.flatten())
        .bind(changes.city.is_some())
        .bind(changes.city.flatten())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_request(&self, id: Uuid) -> Result<bool, BackendError> {
        // Notes go with the request via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// NOTES
// =============================================================================

#[async_trait]
impl NoteStore for PgBackend {
    async fn insert_note(&self, note: NewNote) -> Result<NoteRecord, BackendError> {
        let row = sqlx::query(
            "INSERT INTO notes (id, body, request_id, creator_id) VALUES ($1, $2, $3, $4) \
             RETURNING id, body, request_id, creator_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&note.body)
        .bind(note.request_id)
        .bind(note.creator_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(note_from_row(&row)?)
    }

    async fn notes_for_request(&self, request_id: Uuid) -> Result<Vec<NoteRecord>, BackendError> {
        let rows = sqlx::query(
            "SELECT id, body, request_id, creator_id, created_at FROM notes \
             WHERE request_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(note_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn delete_note(&self, id: Uuid) -> Result<bool, BackendError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// MEMBERS
// =============================================================================

#[async_trait]
impl MemberStore for PgBackend {
    async fn insert_member(&self, member: NewMember) -> Result<Member, BackendError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO members (id, email, name, password_hash) VALUES ($1, $2, $3, $4) RETURNING created_at",
        )
        .bind(id)
        .bind(&member.email)
        .bind(&member.name)
        .bind(&member.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO permissions (member_id, role) VALUES ($1, $2)")
            .bind(id)
            .bind(member.role.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Member {
            id,
            email: member.email,
            name: member.name,
            role: member.role,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn list_members(&self) -> Result<Vec<Member>, BackendError> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members m \
             LEFT JOIN permissions p ON p.member_id = m.id \
             ORDER BY m.created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(member_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn count_members(&self) -> Result<i64, BackendError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_login(&self, email: &str) -> Result<Option<(Member, String)>, BackendError> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS}, m.password_hash FROM members m \
             LEFT JOIN permissions p ON p.member_id = m.id \
             WHERE m.email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let hash: String = row.try_get("password_hash")?;
        Ok(Some((member_from_row(&row)?, hash)))
    }

    async fn update_member(&self, id: Uuid, changes: MemberChanges) -> Result<bool, BackendError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE members SET email = COALESCE($2, email), name = COALESCE($3, name), \
                                password_hash = COALESCE($4, password_hash) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.name)
        .bind(&changes.password_hash)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(role) = changes.role {
            sqlx::query(
                "INSERT INTO permissions (member_id, role) VALUES ($1, $2) \
                 ON CONFLICT (member_id) DO UPDATE SET role = EXCLUDED.role",
            )
            .bind(id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_member(&self, id: Uuid) -> Result<bool, BackendError> {
        // Permissions and sessions cascade; authored rows keep a NULL creator.
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// SESSIONS
// =============================================================================

#[async_trait]
impl SessionStore for PgBackend {
    async fn create_session(
        &self,
        token_hash: &str,
        member_id: Uuid,
        ttl: time::Duration,
    ) -> Result<(), BackendError> {
        sqlx::query(
            "INSERT INTO sessions (token_hash, member_id, expires_at) \
             VALUES ($1, $2, now() + ($3::bigint * interval '1 second'))",
        )
        .bind(token_hash)
        .bind(member_id)
        .bind(ttl.whole_seconds())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn resolve_session(&self, token_hash: &str) -> Result<Option<Caller>, BackendError> {
        let row = sqlx::query(
            "SELECT m.id, m.name, COALESCE(p.role, 'editor') AS role \
             FROM sessions s \
             JOIN members m ON m.id = s.member_id \
             LEFT JOIN permissions p ON p.member_id = m.id \
             WHERE s.token_hash = $1 AND s.expires_at > now()",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let role: String = row.try_get("role")?;
        Ok(Some(Caller {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            role: Role::parse(&role).unwrap_or(Role::Editor),
        }))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), BackendError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "postgres_test.rs"]
mod tests;
