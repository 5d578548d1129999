//! Session routes and the caller extractors.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use super::error::ApiError;
use crate::backend::records::Caller;
use crate::services::{ActionError, auth as auth_svc};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

fn session_cookie(value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Caller resolved from the session cookie, if any.
///
/// Never rejects for a missing or stale cookie; the action layer decides
/// whether anonymous access is allowed.
pub struct MaybeCaller {
    pub caller: Option<Caller>,
    pub token: Option<String>,
}

impl MaybeCaller {
    #[must_use]
    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeCaller
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(COOKIE_NAME).map(Cookie::value).filter(|t| !t.is_empty()) else {
            return Ok(Self { caller: None, token: None });
        };

        let app_state = AppState::from_ref(state);
        let caller = auth_svc::resolve(&app_state.backend, token).await?;
        Ok(Self { caller, token: Some(token.to_owned()) })
    }
}

/// Client identity for rate limiting.
///
/// The socket peer, else `"unknown"`. When the state trusts a proxy, the first
/// `x-forwarded-for` hop wins over both.
pub struct ClientAddr(pub String);

impl<S> FromRequestParts<S> for ClientAddr
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if AppState::from_ref(state).trust_proxy {
            if let Some(addr) = forwarded_for(parts) {
                return Ok(Self(addr.to_owned()));
            }
        }
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "unknown".to_owned(), |ConnectInfo(addr)| addr.ip().to_string());
        Ok(Self(peer))
    }
}

fn forwarded_for(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct SignInBody {
    email: String,
    password: String,
}

/// `POST /api/auth/sign-in`: check credentials, set the session cookie.
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignInBody>,
) -> Result<impl IntoResponse, ApiError> {
    let signed_in = auth_svc::sign_in(&state.backend, &body.email, &body.password, state.session_ttl).await?;
    let jar = jar.add(session_cookie(signed_in.token, state.cookie_secure, state.session_ttl));
    Ok((jar, Json(signed_in.caller)))
}

/// `POST /api/auth/sign-out`: drop the session row and clear the cookie.
pub async fn sign_out(
    State(state): State<AppState>,
    maybe: MaybeCaller,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = &maybe.token {
        auth_svc::sign_out(&state.backend, token).await?;
    }
    let jar = jar.add(session_cookie(String::new(), state.cookie_secure, Duration::ZERO));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// `GET /api/auth/me`: the signed-in member.
pub async fn me(maybe: MaybeCaller) -> Result<Json<Caller>, ApiError> {
    maybe.caller.map(Json).ok_or(ApiError::Action(ActionError::Unauthenticated))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
