//! Internal notes on offer requests. Notes are append-only: they can be added
//! and removed, never edited.

use serde::Deserialize;
use uuid::Uuid;

use super::validation::FieldErrors;
use super::{ActionError, require_caller, with_context};
use crate::backend::Backend;
use crate::backend::records::{Caller, NewNote, NoteRecord};

pub const BODY_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    pub body: String,
}

pub async fn create(
    backend: &Backend,
    caller: Option<&Caller>,
    request_id: Uuid,
    input: NoteInput,
) -> Result<NoteRecord, ActionError> {
    let caller = require_caller(caller)?;

    let mut errors = FieldErrors::new();
    errors.required("body", &input.body, "Note is required");
    errors.max_chars("body", input.body.trim(), BODY_MAX_CHARS);
    errors.finish()?;

    backend
        .requests
        .find_request(request_id)
        .await
        .map_err(with_context("failed to fetch request by id"))?
        .ok_or_else(|| ActionError::not_found("request", request_id))?;

    let note = backend
        .notes
        .insert_note(NewNote { body: input.body.trim().to_owned(), request_id, creator_id: caller.id })
        .await
        .map_err(with_context("failed to create request note"))?;

    tracing::info!(note_id = %note.id, %request_id, creator_id = %caller.id, "request note added");
    Ok(note)
}

/// Notes of one request, oldest first.
pub async fn list_for_request(
    backend: &Backend,
    caller: Option<&Caller>,
    request_id: Uuid,
) -> Result<Vec<NoteRecord>, ActionError> {
    require_caller(caller)?;
    backend
        .notes
        .notes_for_request(request_id)
        .await
        .map_err(with_context("failed to fetch notes"))
}

pub async fn delete(backend: &Backend, caller: Option<&Caller>, id: Uuid) -> Result<(), ActionError> {
    let caller = require_caller(caller)?;
    let deleted = backend
        .notes
        .delete_note(id)
        .await
        .map_err(with_context("failed to delete request note"))?;
    if !deleted {
        return Err(ActionError::not_found("note", id));
    }
    tracing::info!(note_id = %id, editor_id = %caller.id, "request note deleted");
    Ok(())
}

#[cfg(test)]
#[path = "notes_test.rs"]
mod tests;
