//! Case routes. Create and update arrive as `multipart/form-data` so the
//! three image slots can travel with the text fields.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::auth::MaybeCaller;
use super::error::ApiError;
use crate::backend::Page;
use crate::backend::records::{CaseLayout, CaseRecord};
use crate::services::cases::{self, CaseInput, CaseUploads};
use crate::services::pagination::PageQuery;
use crate::services::validation::FieldErrors;
use crate::state::AppState;

/// Drain a case form into text input and upload bytes.
///
/// An empty file part counts as "no new file". Unknown parts are skipped.
pub(crate) async fn read_case_form(mut multipart: Multipart) -> Result<(CaseInput, CaseUploads), ApiError> {
    let mut input = CaseInput::default();
    let mut uploads = CaseUploads::default();
    let mut form_errors = FieldErrors::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "image" | "image_before" | "image_after" => {
                let data = field.bytes().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
                let slot = (!data.is_empty()).then(|| data.to_vec());
                match name.as_str() {
                    "image" => uploads.image = slot,
                    "image_before" => uploads.image_before = slot,
                    _ => uploads.image_after = slot,
                }
            }
            "company_name" | "description" | "city" | "country" | "contact_person" | "layout" | "created_at" => {
                let text = field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "company_name" => input.company_name = text,
                    "description" => input.description = text,
                    "city" => input.city = text,
                    "country" => input.country = text,
                    "contact_person" => input.contact_person = text,
                    "layout" => match CaseLayout::parse(&text) {
                        Some(layout) => input.layout = layout,
                        None => form_errors.add("layout", "Choose a layout."),
                    },
                    _ if text.trim().is_empty() => input.created_at = None,
                    _ => match OffsetDateTime::parse(text.trim(), &Rfc3339) {
                        Ok(at) => input.created_at = Some(at),
                        Err(_) => form_errors.add("created_at", "Invalid date."),
                    },
                }
            }
            other => tracing::debug!(field = other, "ignoring unknown case form field"),
        }
    }

    form_errors.finish()?;
    Ok((input, uploads))
}

/// `GET /api/cases`
pub async fn list_cases(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CaseRecord>>, ApiError> {
    Ok(Json(cases::list(&state.backend, maybe.caller(), query).await?))
}

/// `GET /api/public/cases`
pub async fn list_public_cases(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CaseRecord>>, ApiError> {
    Ok(Json(cases::list_published(&state.backend, query).await?))
}

/// `POST /api/cases`
pub async fn create_case(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    // Reject anonymous callers before reading the body.
    crate::services::require_caller(maybe.caller())?;
    let (input, uploads) = read_case_form(multipart).await?;
    let record = cases::create(&state.backend, maybe.caller(), input, uploads).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/cases/{id}`
pub async fn get_case(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<i64>,
) -> Result<Json<CaseRecord>, ApiError> {
    Ok(Json(cases::get(&state.backend, maybe.caller(), id).await?))
}

/// `PUT /api/cases/{id}`
pub async fn update_case(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    crate::services::require_caller(maybe.caller())?;
    let (input, uploads) = read_case_form(multipart).await?;
    cases::update(&state.backend, maybe.caller(), id, input, uploads).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/cases/{id}`
pub async fn delete_case(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    cases::delete(&state.backend, maybe.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
