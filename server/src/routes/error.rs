//! HTTP mapping for action-layer errors.
//!
//! Every handler returns `Result<_, ApiError>`. The body is always
//! `{"error": "...", "code": "E_..."}`, plus `"fields"` for validation errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::ActionError;

#[derive(Debug)]
pub enum ApiError {
    Action(ActionError),
    /// Malformed request the extractors could not turn into action input.
    BadRequest(String),
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        Self::Action(err)
    }
}

impl ApiError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Action(err) => match err {
                ActionError::Unauthenticated | ActionError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ActionError::Forbidden(_) => StatusCode::FORBIDDEN,
                ActionError::Invalid(_) | ActionError::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ActionError::NotFound { .. } => StatusCode::NOT_FOUND,
                ActionError::Backend { .. } | ActionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ActionError::Email(_) => StatusCode::BAD_GATEWAY,
                ActionError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::BadRequest(message) => json!({ "error": message, "code": "E_BAD_REQUEST" }),
            Self::Action(err) => {
                if status.is_server_error() {
                    tracing::error!(error = %err, code = err.error_code(), "request failed");
                }
                match err {
                    ActionError::Invalid(fields) => {
                        json!({ "error": "validation failed", "code": err.error_code(), "fields": fields })
                    }
                    // Keep driver details in the log, not the response.
                    ActionError::Backend { context, .. } => json!({ "error": context, "code": err.error_code() }),
                    ActionError::Internal(_) => json!({ "error": "internal error", "code": err.error_code() }),
                    _ => json!({ "error": err.to_string(), "code": err.error_code() }),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
