//! Offer request actions.
//!
//! Requests are the one entity the public can create: the offer form posts
//! without a session, goes through the per-address rate limiter, and triggers
//! an email to the studio. Everything else on requests is back-office only.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use super::mailer::{Mailer, OfferEmail};
use super::pagination::PageQuery;
use super::validation::{FieldErrors, normalize_email, optional_text};
use super::{ActionError, require_caller, with_context};
use crate::backend::records::{Caller, NewRequest, RequestChanges, RequestRecord};
use crate::backend::{Backend, Page};
use crate::rate_limit::RateLimiter;

pub const MESSAGE_MAX_CHARS: usize = 200;

pub const CATEGORIES: &[&str] = &["Website", "Web App", "3D Visualization", "Branding", "Social Media Content", "Other"];

/// Danish numbers: eight digits, optionally prefixed with `+45`.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+45\d{8}|\d{8})$").expect("valid regex"));

/// The public offer form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferInput {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub category: String,
    #[serde(default)]
    pub consent: bool,
    #[serde(default)]
    pub message: String,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Back-office edit of a request. Absent fields are left untouched.
///
/// `address` and `city` are nullable: `Some(None)` (sent as `null` or a blank
/// string) clears the column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: Option<String>,
    pub message: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub city: Option<Option<String>>,
}

/// Tell an explicit `null` apart from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn check_phone(errors: &mut FieldErrors, phone: &str) {
    if !PHONE_RE.is_match(phone.trim()) {
        errors.add("phone", "Invalid phone number.");
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) -> Option<String> {
    let normalized = normalize_email(email);
    if normalized.is_none() {
        errors.add("email", "Invalid email address.");
    }
    normalized
}

fn check_category(errors: &mut FieldErrors, category: &str) {
    if !CATEGORIES.contains(&category.trim()) {
        errors.add("category", "Choose a category.");
    }
}

// =============================================================================
// PUBLIC
// =============================================================================

/// Validate, rate limit, store, and relay a public offer request.
///
/// The row is kept when the email relay fails afterwards; the caller still
/// gets `ActionError::Email`.
pub async fn submit_offer(
    backend: &Backend,
    mailer: Option<&dyn Mailer>,
    limiter: &RateLimiter,
    client_key: &str,
    input: OfferInput,
) -> Result<RequestRecord, ActionError> {
    let mut errors = FieldErrors::new();
    errors.required("name", &input.name, "Name is required");
    check_phone(&mut errors, &input.phone);
    let email = check_email(&mut errors, &input.email);
    check_category(&mut errors, &input.category);
    if !input.consent {
        errors.add("consent", "You must accept storage of your information.");
    }
    errors.max_chars("message", &input.message, MESSAGE_MAX_CHARS);
    errors.finish()?;

    limiter.check_and_record(client_key)?;

    let record = backend
        .requests
        .insert_request(NewRequest {
            name: input.name.trim().to_owned(),
            phone: input.phone.trim().to_owned(),
            email: email.unwrap_or_default(),
            category: input.category.trim().to_owned(),
            consent: input.consent,
            message: input.message.trim().to_owned(),
            address: optional_text(input.address.as_deref()),
            city: optional_text(input.city.as_deref()),
        })
        .await
        .map_err(with_context("failed to create request"))?;

    tracing::info!(request_id = %record.id, category = %record.category, "offer request received");

    if let Some(mailer) = mailer {
        let email = OfferEmail {
            from_name: record.name.clone(),
            from_email: record.email.clone(),
            phone: record.phone.clone(),
            category: record.category.clone(),
            message: record.message.clone(),
        };
        if let Err(e) = mailer.send_offer(&email).await {
            tracing::warn!(request_id = %record.id, error = %e, "offer email relay failed");
            return Err(ActionError::Email(e.to_string()));
        }
    } else {
        tracing::debug!(request_id = %record.id, "email relay not configured; skipping");
    }

    Ok(record)
}

// =============================================================================
// BACK OFFICE
// =============================================================================

pub async fn list(backend: &Backend, caller: Option<&Caller>, query: PageQuery) -> Result<Page<RequestRecord>, ActionError> {
    require_caller(caller)?;
    backend
        .requests
        .list_requests(query.window())
        .await
        .map_err(with_context("failed to fetch requests"))
}

pub async fn get(backend: &Backend, caller: Option<&Caller>, id: Uuid) -> Result<RequestRecord, ActionError> {
    require_caller(caller)?;
    backend
        .requests
        .find_request(id)
        .await
        .map_err(with_context("failed to fetch request by id"))?
        .ok_or_else(|| ActionError::not_found("request", id))
}

pub async fn update(backend: &Backend, caller: Option<&Caller>, id: Uuid, patch: RequestPatch) -> Result<(), ActionError> {
    let caller = require_caller(caller)?;

    let mut errors = FieldErrors::new();
    if let Some(name) = &patch.name {
        errors.required("name", name, "Name is required");
    }
    if let Some(phone) = &patch.phone {
        check_phone(&mut errors, phone);
    }
    let email = patch.email.as_deref().and_then(|e| check_email(&mut errors, e));
    if let Some(category) = &patch.category {
        check_category(&mut errors, category);
    }
    if let Some(message) = &patch.message {
        errors.max_chars("message", message, MESSAGE_MAX_CHARS);
    }
    errors.finish()?;

    let changes = RequestChanges {
        name: patch.name.map(|v| v.trim().to_owned()),
        phone: patch.phone.map(|v| v.trim().to_owned()),
        email,
        category: patch.category.map(|v| v.trim().to_owned()),
        message: patch.message.map(|v| v.trim().to_owned()),
        address: patch.address.map(|v| optional_text(v.as_deref())),
        city: patch.city.map(|v| optional_text(v.as_deref())),
    };

    if changes.is_empty() {
        get(backend, Some(caller), id).await?;
        return Ok(());
    }

    let changed = backend
        .requests
        .update_request(id, changes)
        .await
        .map_err(with_context("failed to update request"))?;
    if !changed {
        return Err(ActionError::not_found("request", id));
    }

    tracing::info!(request_id = %id, editor_id = %caller.id, "request updated");
    Ok(())
}

/// Delete a request together with its notes.
pub async fn delete(backend: &Backend, caller: Option<&Caller>, id: Uuid) -> Result<(), ActionError> {
    let caller = require_caller(caller)?;
    let deleted = backend
        .requests
        .delete_request(id)
        .await
        .map_err(with_context("failed to delete request"))?;
    if !deleted {
        return Err(ActionError::not_found("request", id));
    }
    tracing::info!(request_id = %id, editor_id = %caller.id, "request deleted");
    Ok(())
}

#[cfg(test)]
#[path = "requests_test.rs"]
mod tests;
