//! Backend contract: tables, sessions, and object storage.
//!
//! DESIGN
//! ======
//! The action layer never talks to Postgres or the filesystem directly. Each
//! table family is a trait (`CaseStore`, `ReviewStore`, ...) and `Backend`
//! bundles one implementation of each behind `Arc<dyn _>`. Production wires
//! `postgres::PgBackend` and `storage::FsStorage`; tests wire
//! `memory::MemoryBackend`, which implements the same contract.
//!
//! Stores report "row missing" as `Ok(None)` / `Ok(false)` so the action layer
//! decides how absence surfaces to callers.

pub mod postgres;
pub mod records;
pub mod storage;

#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use records::{
    Caller, CaseChanges, CaseRecord, Member, MemberChanges, NewCase, NewMember, NewNote, NewRequest, NewReview,
    NoteRecord, RequestChanges, RequestRecord, ReviewChanges, ReviewRecord,
};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    /// Raised by the in-memory test backend.
    #[cfg(test)]
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Offset/limit slice of an ordered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

/// One page of rows plus the total row count of the table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

// =============================================================================
// STORE TRAITS
// =============================================================================

#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn insert_case(&self, case: NewCase) -> Result<CaseRecord, BackendError>;
    /// Newest first.
    async fn list_cases(&self, window: Window) -> Result<Page<CaseRecord>, BackendError>;
    async fn find_case(&self, id: i64) -> Result<Option<CaseRecord>, BackendError>;
    async fn update_case(&self, id: i64, changes: CaseChanges) -> Result<bool, BackendError>;
    async fn delete_case(&self, id: i64) -> Result<bool, BackendError>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert_review(&self, review: NewReview) -> Result<ReviewRecord, BackendError>;
    /// Newest first.
    async fn list_reviews(&self, window: Window) -> Result<Page<ReviewRecord>, BackendError>;
    async fn find_review(&self, id: i64) -> Result<Option<ReviewRecord>, BackendError>;
    async fn update_review(&self, id: i64, changes: ReviewChanges) -> Result<bool, BackendError>;
    async fn delete_review(&self, id: i64) -> Result<bool, BackendError>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert_request(&self, request: NewRequest) -> Result<RequestRecord, BackendError>;
    /// Newest first.
    async fn list_requests(&self, window: Window) -> Result<Page<RequestRecord>, BackendError>;
    async fn find_request(&self, id: Uuid) -> Result<Option<RequestRecord>, BackendError>;
    async fn update_request(&self, id: Uuid, changes: RequestChanges) -> Result<bool, BackendError>;
    /// Deleting a request also removes its notes.
    async fn delete_request(&self, id: Uuid) -> Result<bool, BackendError>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert_note(&self, note: NewNote) -> Result<NoteRecord, BackendError>;
    /// Oldest first.
    async fn notes_for_request(&self, request_id: Uuid) -> Result<Vec<NoteRecord>, BackendError>;
    async fn delete_note(&self, id: Uuid) -> Result<bool, BackendError>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn insert_member(&self, member: NewMember) -> Result<Member, BackendError>;
    async fn list_members(&self) -> Result<Vec<Member>, BackendError>;
    async fn count_members(&self) -> Result<i64, BackendError>;
    /// Member plus stored password hash, looked up by normalized email.
    async fn find_login(&self, email: &str) -> Result<Option<(Member, String)>, BackendError>;
    async fn update_member(&self, id: Uuid, changes: MemberChanges) -> Result<bool, BackendError>;
    async fn delete_member(&self, id: Uuid) -> Result<bool, BackendError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(
        &self,
        token_hash: &str,
        member_id: Uuid,
        ttl: time::Duration,
    ) -> Result<(), BackendError>;
    /// Resolve an unexpired session to its member.
    async fn resolve_session(&self, token_hash: &str) -> Result<Option<Caller>, BackendError>;
    async fn delete_session(&self, token_hash: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BackendError>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

// =============================================================================
// BUNDLE
// =============================================================================

/// One implementation of every store, shared by all handlers.
#[derive(Clone)]
pub struct Backend {
    pub cases: Arc<dyn CaseStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub requests: Arc<dyn RequestStore>,
    pub notes: Arc<dyn NoteStore>,
    pub members: Arc<dyn MemberStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Backend {
    /// Wire a single value that implements every table trait, plus storage.
    pub fn from_parts<T>(tables: Arc<T>, storage: Arc<dyn ObjectStorage>) -> Self
    where
        T: CaseStore + ReviewStore + RequestStore + NoteStore + MemberStore + SessionStore + 'static,
    {
        Self {
            cases: tables.clone(),
            reviews: tables.clone(),
            requests: tables.clone(),
            notes: tables.clone(),
            members: tables.clone(),
            sessions: tables,
            storage,
        }
    }
}
