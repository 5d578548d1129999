//! Review routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use super::auth::MaybeCaller;
use super::error::ApiError;
use crate::backend::Page;
use crate::backend::records::ReviewRecord;
use crate::services::pagination::PageQuery;
use crate::services::reviews::{self, ReviewInput};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LatestQuery {
    limit: Option<i64>,
}

/// `GET /api/reviews`
pub async fn list_reviews(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ReviewRecord>>, ApiError> {
    Ok(Json(reviews::list(&state.backend, maybe.caller(), query).await?))
}

/// `GET /api/reviews/latest`, public.
pub async fn latest_reviews(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<Vec<ReviewRecord>>, ApiError> {
    Ok(Json(reviews::latest(&state.backend, query.limit).await?))
}

pub async fn create_review(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Json(input): Json<ReviewInput>,
) -> Result<impl IntoResponse, ApiError> {
    let record = reviews::create(&state.backend, maybe.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_review(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<i64>,
) -> Result<Json<ReviewRecord>, ApiError> {
    Ok(Json(reviews::get(&state.backend, maybe.caller(), id).await?))
}

pub async fn update_review(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<i64>,
    Json(input): Json<ReviewInput>,
) -> Result<StatusCode, ApiError> {
    reviews::update(&state.backend, maybe.caller(), id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_review(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    reviews::delete(&state.backend, maybe.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
