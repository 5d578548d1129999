//! Action layer used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Each entity module exposes free async functions over `&Backend` that
//! authorize the caller, validate input, do any CPU work (image re-encoding),
//! and then call the store traits. Route handlers stay focused on protocol
//! translation and cookie plumbing.
//!
//! Validation always runs before the first backend call, so an invalid form
//! never touches storage or the database. Backend failures carry a context
//! string naming the action that failed; nothing is retried or compensated.

pub mod auth;
pub mod cases;
pub mod images;
pub mod mailer;
pub mod members;
pub mod notes;
pub mod pagination;
pub mod requests;
pub mod reviews;
pub mod validation;

use crate::backend::BackendError;
use crate::backend::records::Caller;
use crate::rate_limit::RateLimitError;
use validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("validation failed: {0}")]
    Invalid(FieldErrors),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{context}: {source}")]
    Backend {
        context: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("image processing failed: {0}")]
    Image(String),
    #[error("email relay failed: {0}")]
    Email(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
}

impl ActionError {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::Invalid(_) => "E_INVALID",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Backend { .. } => "E_BACKEND",
            Self::Image(_) => "E_IMAGE",
            Self::Email(_) => "E_EMAIL",
            Self::Internal(_) => "E_INTERNAL",
            Self::RateLimited(_) => "E_RATE_LIMITED",
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }
}

/// Wrap a store failure with the action that was attempted.
///
/// Used as `.map_err(with_context("failed to create case"))`.
pub(crate) fn with_context(context: &'static str) -> impl FnOnce(BackendError) -> ActionError {
    move |source| ActionError::Backend { context, source }
}

pub(crate) fn require_caller(caller: Option<&Caller>) -> Result<&Caller, ActionError> {
    caller.ok_or(ActionError::Unauthenticated)
}

pub(crate) fn require_admin(caller: Option<&Caller>) -> Result<&Caller, ActionError> {
    let caller = require_caller(caller)?;
    if !caller.is_admin() {
        return Err(ActionError::Forbidden("admin role required"));
    }
    Ok(caller)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
