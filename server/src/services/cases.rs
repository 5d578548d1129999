//! Case (portfolio item) actions.
//!
//! Cases carry up to three images: `image` for the single layout, and
//! `image_before`/`image_after` for the comparison layout. Each slot is only
//! rewritten when a new file arrives for it.

use time::OffsetDateTime;

use super::images::store_image;
use super::pagination::PageQuery;
use super::validation::FieldErrors;
use super::{ActionError, require_caller, with_context};
use crate::backend::records::{Caller, CaseChanges, CaseLayout, CaseRecord, NewCase};
use crate::backend::{Backend, Page};

pub const DESCRIPTION_MAX_CHARS: usize = 250;

/// Text fields of the case form.
#[derive(Debug, Clone, Default)]
pub struct CaseInput {
    pub company_name: String,
    pub description: String,
    pub city: String,
    pub country: String,
    pub contact_person: String,
    pub layout: CaseLayout,
    /// Editor override of the creation date. Ignored on create.
    pub created_at: Option<OffsetDateTime>,
}

/// Raw upload bytes per image slot. `None` leaves the slot alone.
#[derive(Debug, Clone, Default)]
pub struct CaseUploads {
    pub image: Option<Vec<u8>>,
    pub image_before: Option<Vec<u8>>,
    pub image_after: Option<Vec<u8>>,
}

fn validate(input: &CaseInput) -> Result<(), ActionError> {
    let mut errors = FieldErrors::new();
    errors.required("company_name", &input.company_name, "Company name is required");
    errors.required("description", &input.description, "Description is required");
    errors.max_chars("description", input.description.trim(), DESCRIPTION_MAX_CHARS);
    errors.required("city", &input.city, "City is required");
    errors.required("country", &input.country, "Country is required");
    errors.required("contact_person", &input.contact_person, "Contact person is required");
    errors.finish()
}

async fn store_slot(backend: &Backend, caller: &Caller, upload: Option<Vec<u8>>) -> Result<Option<String>, ActionError> {
    match upload {
        Some(bytes) => Ok(Some(store_image(backend, caller, bytes).await?)),
        None => Ok(None),
    }
}

pub async fn create(
    backend: &Backend,
    caller: Option<&Caller>,
    input: CaseInput,
    uploads: CaseUploads,
) -> Result<CaseRecord, ActionError> {
    let caller = require_caller(caller)?;
    validate(&input)?;

    // Uploads land before the insert; a failed insert leaves them orphaned.
    let image = store_slot(backend, caller, uploads.image).await?;
    let image_before = store_slot(backend, caller, uploads.image_before).await?;
    let image_after = store_slot(backend, caller, uploads.image_after).await?;

    let record = backend
        .cases
        .insert_case(NewCase {
            company_name: input.company_name.trim().to_owned(),
            description: input.description.trim().to_owned(),
            city: input.city.trim().to_owned(),
            country: input.country.trim().to_owned(),
            contact_person: input.contact_person.trim().to_owned(),
            layout: input.layout,
            image,
            image_before,
            image_after,
            creator_id: caller.id,
        })
        .await
        .map_err(with_context("failed to create case"))?;

    tracing::info!(case_id = record.id, creator_id = %caller.id, "case created");
    Ok(record)
}

pub async fn list(backend: &Backend, caller: Option<&Caller>, query: PageQuery) -> Result<Page<CaseRecord>, ActionError> {
    require_caller(caller)?;
    list_published(backend, query).await
}

/// Public listing for the website's case page.
pub async fn list_published(backend: &Backend, query: PageQuery) -> Result<Page<CaseRecord>, ActionError> {
    backend
        .cases
        .list_cases(query.window())
        .await
        .map_err(with_context("failed to fetch cases"))
}

pub async fn get(backend: &Backend, caller: Option<&Caller>, id: i64) -> Result<CaseRecord, ActionError> {
    require_caller(caller)?;
    backend
        .cases
        .find_case(id)
        .await
        .map_err(with_context("failed to fetch case by id"))?
        .ok_or_else(|| ActionError::not_found("case", id))
}

pub async fn update(
    backend: &Backend,
    caller: Option<&Caller>,
    id: i64,
    input: CaseInput,
    uploads: CaseUploads,
) -> Result<(), ActionError> {
    let caller = require_caller(caller)?;
    validate(&input)?;

    let existing = backend
        .cases
        .find_case(id)
        .await
        .map_err(with_context("failed to fetch case by id"))?
        .ok_or_else(|| ActionError::not_found("case", id))?;

    let image = store_slot(backend, caller, uploads.image).await?.or(existing.image);
    let image_before = store_slot(backend, caller, uploads.image_before)
        .await?
        .or(existing.image_before);
    let image_after = store_slot(backend, caller, uploads.image_after)
        .await?
        .or(existing.image_after);

    let changed = backend
        .cases
        .update_case(
            id,
            CaseChanges {
                company_name: input.company_name.trim().to_owned(),
                description: input.description.trim().to_owned(),
                city: input.city.trim().to_owned(),
                country: input.country.trim().to_owned(),
                contact_person: input.contact_person.trim().to_owned(),
                layout: input.layout,
                image,
                image_before,
                image_after,
                created_at: input.created_at,
            },
        )
        .await
        .map_err(with_context("failed to update case"))?;
    if !changed {
        return Err(ActionError::not_found("case", id));
    }

    tracing::info!(case_id = id, editor_id = %caller.id, "case updated");
    Ok(())
}

pub async fn delete(backend: &Backend, caller: Option<&Caller>, id: i64) -> Result<(), ActionError> {
    let caller = require_caller(caller)?;
    let deleted = backend
        .cases
        .delete_case(id)
        .await
        .map_err(with_context("failed to delete case"))?;
    if !deleted {
        return Err(ActionError::not_found("case", id));
    }
    tracing::info!(case_id = id, editor_id = %caller.id, "case deleted");
    Ok(())
}

#[cfg(test)]
#[path = "cases_test.rs"]
mod tests;
