//! In-memory backend used by the test suite.
//!
//! Implements every store trait plus object storage over `Mutex`-guarded
//! vectors. Timestamps come from a logical clock that advances one second per
//! insert, so "newest first" ordering is deterministic. Every trait call is
//! counted, and table or storage writes can be made to fail on demand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::records::{
    Caller, CaseChanges, CaseRecord, Member, MemberChanges, NewCase, NewMember, NewNote, NewRequest, NewReview,
    NoteRecord, RequestChanges, RequestRecord, ReviewChanges, ReviewRecord,
};
use super::{
    Backend, BackendError, CaseStore, MemberStore, NoteStore, ObjectStorage, Page, RequestStore, ReviewStore,
    SessionStore, Window,
};

const CLOCK_EPOCH: i64 = 1_700_000_000;

#[derive(Default)]
struct Tables {
    cases: Vec<CaseRecord>,
    reviews: Vec<ReviewRecord>,
    requests: Vec<RequestRecord>,
    notes: Vec<NoteRecord>,
    members: Vec<(Member, String)>,
    sessions: HashMap<String, (Uuid, OffsetDateTime)>,
    objects: HashMap<String, (Vec<u8>, String)>,
    next_id: i64,
    tick: i64,
    calls: usize,
    fail_tables: bool,
    fail_uploads: bool,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn now(&mut self) -> OffsetDateTime {
        self.tick += 1;
        OffsetDateTime::from_unix_timestamp(CLOCK_EPOCH + self.tick).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
}

impl MemoryBackend {
    /// Build a fake and a `Backend` bundle wired to it.
    #[must_use]
    pub fn bundle() -> (Arc<Self>, Backend) {
        let fake = Arc::new(Self::default());
        let backend = Backend::from_parts(fake.clone(), fake.clone());
        (fake, backend)
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Count the call and fail it if table failures are switched on.
    fn enter(&self) -> Result<MutexGuard<'_, Tables>, BackendError> {
        let mut tables = self.lock();
        tables.calls += 1;
        if tables.fail_tables {
            return Err(BackendError::Unavailable("injected table failure".into()));
        }
        Ok(tables)
    }

    pub fn fail_tables(&self, fail: bool) {
        self.lock().fail_tables = fail;
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.lock().fail_uploads = fail;
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    /// Bytes and content type of a stored object, addressed by its public URL.
    #[must_use]
    pub fn object_at(&self, url: &str) -> Option<(Vec<u8>, String)> {
        let key = url.strip_prefix("memory://")?;
        self.lock().objects.get(key).cloned()
    }

    /// Force a session's expiry into the past.
    pub fn expire_sessions(&self) {
        let mut tables = self.lock();
        for (_, expires_at) in tables.sessions.values_mut() {
            *expires_at = OffsetDateTime::UNIX_EPOCH;
        }
    }
}

fn page_of<T: Clone>(rows: &[T], window: Window, created_at: impl Fn(&T) -> (OffsetDateTime, String)) -> Page<T> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    let offset = usize::try_from(window.offset).unwrap_or(0);
    let limit = usize::try_from(window.limit).unwrap_or(0);
    let items = sorted.into_iter().skip(offset).take(limit).collect();
    Page { items, total: i64::try_from(rows.len()).unwrap_or(i64::MAX) }
}

// =============================================================================
// CASES
// =============================================================================

#[async_trait]
impl CaseStore for MemoryBackend {
    async fn insert_case(&self, case: NewCase) -> Result<CaseRecord, BackendError> {
        let mut t = self.enter()?;
        let record = CaseRecord {
            id: t.next_id(),
            company_name: case.company_name,
            description: case.description,
            city: case.city,
            country: case.country,
            contact_person: case.contact_person,
            layout: case.layout,
            image: case.image,
            image_before: case.image_before,
            image_after: case.image_after,
            creator_id: Some(case.creator_id),
            created_at: t.now(),
        };
        t.cases.push(record.clone());
        Ok(record)
    }

    async fn list_cases(&self, window: Window) -> Result<Page<CaseRecord>, BackendError> {
        let t = self.enter()?;
        Ok(page_of(&t.cases, window, |c| (c.created_at, format!("{:020}", c.id))))
    }

    async fn find_case(&self, id: i64) -> Result<Option<CaseRecord>, BackendError> {
        let t = self.enter()?;
        Ok(t.cases.iter().find(|c| c.id == id).cloned())
    }

    async fn update_case(&self, id: i64, changes: CaseChanges) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let Some(case) = t.cases.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        case.company_name = changes.company_name;
        case.description = changes.description;
        case.city = changes.city;
        case.country = changes.country;
        case.contact_person = changes.contact_person;
        case.layout = changes.layout;
        case.image = changes.image;
        case.image_before = changes.image_before;
        case.image_after = changes.image_after;
        if let Some(created_at) = changes.created_at {
            case.created_at = created_at;
        }
        Ok(true)
    }

    async fn delete_case(&self, id: i64) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let before = t.cases.len();
        t.cases.retain(|c| c.id != id);
        Ok(t.cases.len() != before)
    }
}

// =============================================================================
// REVIEWS
// =============================================================================

#[async_trait]
impl ReviewStore for MemoryBackend {
    async fn insert_review(&self, review: NewReview) -> Result<ReviewRecord, BackendError> {
        let mut t = self.enter()?;
        let record = ReviewRecord {
            id: t.next_id(),
            name: review.name,
            city: review.city,
            description: review.description,
            rating: review.rating,
            creator_id: Some(review.creator_id),
            created_at: t.now(),
        };
        t.reviews.push(record.clone());
        Ok(record)
    }

    async fn list_reviews(&self, window: Window) -> Result<Page<ReviewRecord>, BackendError> {
        let t = self.enter()?;
        Ok(page_of(&t.reviews, window, |r| (r.created_at, format!("{:020}", r.id))))
    }

    async fn find_review(&self, id: i64) -> Result<Option<ReviewRecord>, BackendError> {
        let t = self.enter()?;
        Ok(t.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn update_review(&self, id: i64, changes: ReviewChanges) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let Some(review) = t.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        review.name = changes.name;
        review.city = changes.city;
        review.description = changes.description;
        review.rating = changes.rating;
        Ok(true)
    }

    async fn delete_review(&self, id: i64) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let before = t.reviews.len();
        t.reviews.retain(|r| r.id != id);
        Ok(t.reviews.len() != before)
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[async_trait]
impl RequestStore for MemoryBackend {
    async fn insert_request(&self, request: NewRequest) -> Result<RequestRecord, BackendError> {
        let mut t = self.enter()?;
        let record = RequestRecord {
            id: Uuid::new_v4(),
            name: request.name,
            phone: request.phone,
            email: request.email,
            category: request.category,
            consent: request.consent,
            message: request.message,
            address: request.address,
            city: request.city,
            created_at: t.now(),
        };
        t.requests.push(record.clone());
        Ok(record)
    }

    async fn list_requests(&self, window: Window) -> Result<Page<RequestRecord>, BackendError> {
        let t = self.enter()?;
        Ok(page_of(&t.requests, window, |r| (r.created_at, r.id.to_string())))
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<RequestRecord>, BackendError> {
        let t = self.enter()?;
        Ok(t.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn update_request(&self, id: Uuid, changes: RequestChanges) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let Some(request) = t.requests.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        if let Some(name) = changes.name {
            request.name = name;
        }
        if let Some(phone) = changes.phone {
            request.phone = phone;
        }
        if let Some(email) = changes.email {
            request.email = email;
        }
        if let Some(category) = changes.category {
            request.category = category;
        }
        if let Some(message) = changes.message {
            request.message = message;
        }
        if let Some(address) = changes.address {
            request.address = address;
        }
        if let Some(city) = changes.city {
            request.city = city;
        }
        Ok(true)
    }

    async fn delete_request(&self, id: Uuid) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let before = t.requests.len();
        t.requests.retain(|r| r.id != id);
        t.notes.retain(|n| n.request_id != id);
        Ok(t.requests.len() != before)
    }
}

// =============================================================================
// NOTES
// =============================================================================

#[async_trait]
impl NoteStore for MemoryBackend {
    async fn insert_note(&self, note: NewNote) -> Result<NoteRecord, BackendError> {
        let mut t = self.enter()?;
        let record = NoteRecord {
            id: Uuid::new_v4(),
            body: note.body,
            request_id: note.request_id,
            creator_id: Some(note.creator_id),
            created_at: t.now(),
        };
        t.notes.push(record.clone());
        Ok(record)
    }

    async fn notes_for_request(&self, request_id: Uuid) -> Result<Vec<NoteRecord>, BackendError> {
        let t = self.enter()?;
        let mut notes: Vec<NoteRecord> = t.notes.iter().filter(|n| n.request_id == request_id).cloned().collect();
        notes.sort_by_key(|n| n.created_at);
        Ok(notes)
    }

    async fn delete_note(&self, id: Uuid) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let before = t.notes.len();
        t.notes.retain(|n| n.id != id);
        Ok(t.notes.len() != before)
    }
}

// =============================================================================
// MEMBERS + SESSIONS
// =============================================================================

#[async_trait]
impl MemberStore for MemoryBackend {
    async fn insert_member(&self, member: NewMember) -> Result<Member, BackendError> {
        let mut t = self.enter()?;
        if t.members.iter().any(|(m, _)| m.email == member.email) {
            return Err(BackendError::Unavailable(format!("duplicate email: {}", member.email)));
        }
        let record = Member {
            id: Uuid::new_v4(),
            email: member.email,
            name: member.name,
            role: member.role,
            created_at: t.now(),
        };
        t.members.push((record.clone(), member.password_hash));
        Ok(record)
    }

    async fn list_members(&self) -> Result<Vec<Member>, BackendError> {
        let t = self.enter()?;
        Ok(t.members.iter().map(|(m, _)| m.clone()).collect())
    }

    async fn count_members(&self) -> Result<i64, BackendError> {
        let t = self.enter()?;
        Ok(i64::try_from(t.members.len()).unwrap_or(i64::MAX))
    }

    async fn find_login(&self, email: &str) -> Result<Option<(Member, String)>, BackendError> {
        let t = self.enter()?;
        Ok(t.members.iter().find(|(m, _)| m.email == email).cloned())
    }

    async fn update_member(&self, id: Uuid, changes: MemberChanges) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let Some((member, hash)) = t.members.iter_mut().find(|(m, _)| m.id == id) else {
            return Ok(false);
        };
        if let Some(email) = changes.email {
            member.email = email;
        }
        if let Some(name) = changes.name {
            member.name = name;
        }
        if let Some(role) = changes.role {
            member.role = role;
        }
        if let Some(password_hash) = changes.password_hash {
            *hash = password_hash;
        }
        Ok(true)
    }

    async fn delete_member(&self, id: Uuid) -> Result<bool, BackendError> {
        let mut t = self.enter()?;
        let before = t.members.len();
        t.members.retain(|(m, _)| m.id != id);
        t.sessions.retain(|_, (member_id, _)| *member_id != id);
        Ok(t.members.len() != before)
    }
}

#[async_trait]
impl SessionStore for MemoryBackend {
    async fn create_session(
        &self,
        token_hash: &str,
        member_id: Uuid,
        ttl: time::Duration,
    ) -> Result<(), BackendError> {
        let mut t = self.enter()?;
        t.sessions
            .insert(token_hash.to_owned(), (member_id, OffsetDateTime::now_utc() + ttl));
        Ok(())
    }

    async fn resolve_session(&self, token_hash: &str) -> Result<Option<Caller>, BackendError> {
        let t = self.enter()?;
        let Some((member_id, expires_at)) = t.sessions.get(token_hash) else {
            return Ok(None);
        };
        if *expires_at <= OffsetDateTime::now_utc() {
            return Ok(None);
        }
        Ok(t.members
            .iter()
            .find(|(m, _)| m.id == *member_id)
            .map(|(m, _)| m.as_caller()))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), BackendError> {
        let mut t = self.enter()?;
        t.sessions.remove(token_hash);
        Ok(())
    }
}

// =============================================================================
// STORAGE
// =============================================================================

#[async_trait]
impl ObjectStorage for MemoryBackend {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BackendError> {
        let mut t = self.lock();
        t.calls += 1;
        if t.fail_uploads {
            return Err(BackendError::Unavailable("injected upload failure".into()));
        }
        t.objects
            .insert(format!("{bucket}/{path}"), (bytes, content_type.to_owned()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}
