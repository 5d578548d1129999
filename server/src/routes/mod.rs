//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API under `/api`, uploaded images under `/storage`, and the static
//! website as the fallback service. Handlers translate HTTP into calls on
//! `crate::services` and map `ActionError` back through `error::ApiError`.

pub mod auth;
pub mod cases;
pub mod error;
pub mod members;
pub mod requests;
pub mod reviews;

use std::path::Path;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// JSON API routes.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/me", get(auth::me))
        .route("/api/members", get(members::list_members).post(members::create_member))
        .route(
            "/api/members/{id}",
            axum::routing::patch(members::update_member).delete(members::delete_member),
        )
        .route("/api/cases", get(cases::list_cases).post(cases::create_case))
        .route(
            "/api/cases/{id}",
            get(cases::get_case).put(cases::update_case).delete(cases::delete_case),
        )
        .route("/api/public/cases", get(cases::list_public_cases))
        .route("/api/reviews", get(reviews::list_reviews).post(reviews::create_review))
        .route("/api/reviews/latest", get(reviews::latest_reviews))
        .route(
            "/api/reviews/{id}",
            get(reviews::get_review).put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/api/offers", post(requests::submit_offer))
        .route("/api/requests", get(requests::list_requests))
        .route(
            "/api/requests/{id}",
            get(requests::get_request)
                .patch(requests::patch_request)
                .delete(requests::delete_request),
        )
        .route("/api/requests/{id}/notes", get(requests::list_notes).post(requests::add_note))
        .route("/api/notes/{id}", axum::routing::delete(requests::delete_note))
        .route("/healthz", get(healthz))
}

/// Full application: API, stored images, and the static website.
pub fn app(state: AppState, website_dir: &Path, storage_dir: &Path, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let website = ServeDir::new(website_dir).append_index_html_on_directories(true);

    api_routes()
        .nest_service("/storage", ServeDir::new(storage_dir))
        .fallback_service(website)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
