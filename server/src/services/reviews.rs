//! Client review actions.

use serde::Deserialize;

use super::pagination::PageQuery;
use super::validation::FieldErrors;
use super::{ActionError, require_caller, with_context};
use crate::backend::records::{Caller, NewReview, ReviewChanges, ReviewRecord};
use crate::backend::{Backend, Page, Window};

pub const DESCRIPTION_MAX_CHARS: usize = 100;
pub const DEFAULT_LATEST_LIMIT: i64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub name: String,
    pub city: String,
    pub description: String,
    pub rating: i16,
}

fn validate(input: &ReviewInput) -> Result<(), ActionError> {
    let mut errors = FieldErrors::new();
    errors.required("name", &input.name, "Name is required");
    errors.required("city", &input.city, "City is required");
    errors.required("description", &input.description, "Description is required");
    errors.max_chars("description", input.description.trim(), DESCRIPTION_MAX_CHARS);
    if !(1..=5).contains(&input.rating) {
        errors.add("rating", "Rating must be between 1 and 5");
    }
    errors.finish()
}

pub async fn create(backend: &Backend, caller: Option<&Caller>, input: ReviewInput) -> Result<ReviewRecord, ActionError> {
    let caller = require_caller(caller)?;
    validate(&input)?;

    let record = backend
        .reviews
        .insert_review(NewReview {
            name: input.name.trim().to_owned(),
            city: input.city.trim().to_owned(),
            description: input.description.trim().to_owned(),
            rating: input.rating,
            creator_id: caller.id,
        })
        .await
        .map_err(with_context("failed to create review"))?;

    tracing::info!(review_id = record.id, creator_id = %caller.id, "review created");
    Ok(record)
}

pub async fn list(backend: &Backend, caller: Option<&Caller>, query: PageQuery) -> Result<Page<ReviewRecord>, ActionError> {
    require_caller(caller)?;
    backend
        .reviews
        .list_reviews(query.window())
        .await
        .map_err(with_context("failed to fetch reviews"))
}

/// Newest reviews for the public site.
pub async fn latest(backend: &Backend, limit: Option<i64>) -> Result<Vec<ReviewRecord>, ActionError> {
    let limit = limit.unwrap_or(DEFAULT_LATEST_LIMIT).clamp(1, super::pagination::MAX_PAGE_LIMIT);
    let page = backend
        .reviews
        .list_reviews(Window { offset: 0, limit })
        .await
        .map_err(with_context("failed to fetch latest reviews"))?;
    Ok(page.items)
}

pub async fn get(backend: &Backend, caller: Option<&Caller>, id: i64) -> Result<ReviewRecord, ActionError> {
    require_caller(caller)?;
    backend
        .reviews
        .find_review(id)
        .await
        .map_err(with_context("failed to fetch review by id"))?
        .ok_or_else(|| ActionError::not_found("review", id))
}

pub async fn update(backend: &Backend, caller: Option<&Caller>, id: i64, input: ReviewInput) -> Result<(), ActionError> {
    let caller = require_caller(caller)?;
    validate(&input)?;

    let changed = backend
        .reviews
        .update_review(
            id,
            ReviewChanges {
                name: input.name.trim().to_owned(),
                city: input.city.trim().to_owned(),
                description: input.description.trim().to_owned(),
                rating: input.rating,
            },
        )
        .await
        .map_err(with_context("failed to update review"))?;
    if !changed {
        return Err(ActionError::not_found("review", id));
    }

    tracing::info!(review_id = id, editor_id = %caller.id, "review updated");
    Ok(())
}

pub async fn delete(backend: &Backend, caller: Option<&Caller>, id: i64) -> Result<(), ActionError> {
    let caller = require_caller(caller)?;
    let deleted = backend
        .reviews
        .delete_review(id)
        .await
        .map_err(with_context("failed to delete review"))?;
    if !deleted {
        return Err(ActionError::not_found("review", id));
    }
    tracing::info!(review_id = id, editor_id = %caller.id, "review deleted");
    Ok(())
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
