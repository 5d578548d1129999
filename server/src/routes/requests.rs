//! Offer intake, the request inbox, and request notes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use uuid::Uuid;

use super::auth::{ClientAddr, MaybeCaller};
use super::error::ApiError;
use crate::backend::Page;
use crate::backend::records::{NoteRecord, RequestRecord};
use crate::services::notes::{self, NoteInput};
use crate::services::pagination::PageQuery;
use crate::services::requests::{self, OfferInput, RequestPatch};
use crate::state::AppState;

/// `POST /api/offers`: public form on the website.
pub async fn submit_offer(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    Json(input): Json<OfferInput>,
) -> Result<impl IntoResponse, ApiError> {
    let record = requests::submit_offer(
        &state.backend,
        state.mailer.as_deref(),
        &state.rate_limiter,
        &client,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_requests(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<RequestRecord>>, ApiError> {
    Ok(Json(requests::list(&state.backend, maybe.caller(), query).await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestRecord>, ApiError> {
    Ok(Json(requests::get(&state.backend, maybe.caller(), id).await?))
}

pub async fn patch_request(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<Uuid>,
    Json(patch): Json<RequestPatch>,
) -> Result<StatusCode, ApiError> {
    requests::update(&state.backend, maybe.caller(), id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_request(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    requests::delete(&state.backend, maybe.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// NOTES
// =============================================================================

pub async fn list_notes(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Vec<NoteRecord>>, ApiError> {
    Ok(Json(notes::list_for_request(&state.backend, maybe.caller(), request_id).await?))
}

pub async fn add_note(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(request_id): Path<Uuid>,
    Json(input): Json<NoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let note = notes::create(&state.backend, maybe.caller(), request_id, input).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    notes::delete(&state.backend, maybe.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
