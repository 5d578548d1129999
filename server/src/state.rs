//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the backend bundle, the optional email relay, the offer rate limiter,
//! the session cookie settings and the proxy trust flag. Clone is required by
//! Axum; every field is `Arc`-wrapped or `Copy`.

use std::sync::Arc;

use crate::backend::Backend;
use crate::rate_limit::RateLimiter;
use crate::services::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    /// Email relay for offer notifications. `None` if EmailJS is not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
    pub rate_limiter: RateLimiter,
    pub cookie_secure: bool,
    pub session_ttl: time::Duration,
    /// Honour `x-forwarded-for` when identifying clients. Off unless the
    /// server sits behind a proxy that overwrites the header.
    pub trust_proxy: bool,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Backend, mailer: Option<Arc<dyn Mailer>>, cookie_secure: bool, session_ttl: time::Duration) -> Self {
        Self { backend, mailer, rate_limiter: RateLimiter::new(), cookie_secure, session_ttl, trust_proxy: false }
    }

    #[must_use]
    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::records::{Caller, NewMember, Role};
    use crate::services::auth;

    pub const TEST_PASSWORD: &str = "correct-horse";

    /// Create a test `AppState` over a fresh in-memory backend.
    #[must_use]
    pub fn test_app_state() -> (Arc<MemoryBackend>, AppState) {
        let (fake, backend) = MemoryBackend::bundle();
        (fake, AppState::new(backend, None, false, time::Duration::hours(1)))
    }

    /// Create a test `AppState` with a mock mailer.
    #[must_use]
    pub fn test_app_state_with_mailer(mailer: Arc<dyn Mailer>) -> (Arc<MemoryBackend>, AppState) {
        let (fake, mut state) = test_app_state();
        state.mailer = Some(mailer);
        (fake, state)
    }

    /// Insert a member whose password is [`TEST_PASSWORD`] and return it as a caller.
    pub async fn seed_member(backend: &Backend, email: &str, role: Role) -> Caller {
        let member = backend
            .members
            .insert_member(NewMember {
                email: email.into(),
                name: format!("{} member", role.as_str()),
                role,
                password_hash: auth::hash_password(TEST_PASSWORD).unwrap(),
            })
            .await
            .unwrap();
        member.as_caller()
    }

    pub async fn seed_admin(backend: &Backend) -> Caller {
        seed_member(backend, "admin@example.dk", Role::Admin).await
    }

    pub async fn seed_editor(backend: &Backend) -> Caller {
        seed_member(backend, "editor@example.dk", Role::Editor).await
    }

    /// Encode a solid-colour PNG of the given size.
    #[must_use]
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    /// Sign a seeded member in and return a `Cookie` header value.
    pub async fn session_cookie(state: &AppState, email: &str) -> String {
        let signed_in = auth::sign_in(&state.backend, email, TEST_PASSWORD, state.session_ttl)
            .await
            .unwrap();
        format!("session_token={}", signed_in.token)
    }
}
