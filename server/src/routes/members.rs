//! Member administration routes. Admin only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use uuid::Uuid;

use super::auth::MaybeCaller;
use super::error::ApiError;
use crate::backend::records::Member;
use crate::services::members::{self, MemberInput, MemberPatch};
use crate::state::AppState;

pub async fn list_members(State(state): State<AppState>, maybe: MaybeCaller) -> Result<Json<Vec<Member>>, ApiError> {
    Ok(Json(members::list(&state.backend, maybe.caller()).await?))
}

pub async fn create_member(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Json(input): Json<MemberInput>,
) -> Result<impl IntoResponse, ApiError> {
    let member = members::create(&state.backend, maybe.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update_member(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<Uuid>,
    Json(patch): Json<MemberPatch>,
) -> Result<StatusCode, ApiError> {
    members::update(&state.backend, maybe.caller(), id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_member(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    members::delete(&state.backend, maybe.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
