//! Member credentials and cookie sessions.
//!
//! ARCHITECTURE
//! ============
//! Passwords are stored as Argon2id PHC strings. A successful sign-in mints a
//! random 32-byte token that goes to the browser in the `session_token`
//! cookie; only its SHA-256 digest is stored, so a leaked sessions table
//! cannot be replayed.

use std::fmt::Write;
use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use sha2::{Digest, Sha256};

use super::validation::normalize_email;
use super::{ActionError, with_context};
use crate::backend::Backend;
use crate::backend::records::{Caller, NewMember, Role};
use crate::config::BootstrapAdmin;

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Random 16-byte hex name for stored objects.
#[must_use]
pub(crate) fn random_object_name() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

// =============================================================================
// PASSWORDS
// =============================================================================

#[cfg(not(test))]
fn password_hasher() -> Argon2<'static> {
    Argon2::default()
}

// Minimum-cost parameters keep the suite fast; verification reads the
// parameters back out of the PHC string either way.
#[cfg(test)]
fn password_hasher() -> Argon2<'static> {
    match argon2::Params::new(argon2::Params::MIN_M_COST, argon2::Params::MIN_T_COST, 1, None) {
        Ok(params) => Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        Err(_) => Argon2::default(),
    }
}

/// Hash a plaintext password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, ActionError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = password_hasher()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ActionError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Stand-in hash checked when the email has no member.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| match hash_password("no-such-member") {
    Ok(hash) => Some(hash),
    Err(e) => {
        tracing::error!(error = %e, "failed to build dummy password hash");
        None
    }
});

/// `false` on mismatch and on a malformed stored hash.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Minimum-length check, reported under the `password` field.
#[must_use]
pub fn validate_password_strength(password: &str) -> Option<String> {
    (password.chars().count() < MIN_PASSWORD_LEN)
        .then(|| format!("Password must be at least {MIN_PASSWORD_LEN} characters long"))
}

// =============================================================================
// SESSIONS
// =============================================================================

/// Session minted by a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Raw token for the cookie. Never stored.
    pub token: String,
    pub caller: Caller,
}

/// Check credentials and open a session.
pub async fn sign_in(
    backend: &Backend,
    email: &str,
    password: &str,
    ttl: time::Duration,
) -> Result<SignedIn, ActionError> {
    let email = normalize_email(email).ok_or(ActionError::InvalidCredentials)?;
    let login = backend
        .members
        .find_login(&email)
        .await
        .map_err(with_context("failed to look up member"))?;
    let Some((member, stored_hash)) = login else {
        // Unknown emails pay for one argon2 verification too, so timing stays flat.
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            std::hint::black_box(verify_password(password, dummy));
        }
        return Err(ActionError::InvalidCredentials);
    };

    if !verify_password(password, &stored_hash) {
        tracing::info!(member_id = %member.id, "sign-in rejected: wrong password");
        return Err(ActionError::InvalidCredentials);
    }

    let token = generate_token();
    backend
        .sessions
        .create_session(&hash_token(&token), member.id, ttl)
        .await
        .map_err(with_context("failed to create session"))?;

    tracing::info!(member_id = %member.id, role = member.role.as_str(), "member signed in");
    Ok(SignedIn { token, caller: member.as_caller() })
}

pub async fn sign_out(backend: &Backend, token: &str) -> Result<(), ActionError> {
    backend
        .sessions
        .delete_session(&hash_token(token))
        .await
        .map_err(with_context("failed to delete session"))
}

/// Resolve a cookie token to its member, if the session is live.
pub async fn resolve(backend: &Backend, token: &str) -> Result<Option<Caller>, ActionError> {
    backend
        .sessions
        .resolve_session(&hash_token(token))
        .await
        .map_err(with_context("failed to resolve session"))
}

/// Create the configured admin when no member exists yet.
///
/// Returns `true` when an account was created.
pub async fn bootstrap_admin(backend: &Backend, admin: &BootstrapAdmin) -> Result<bool, ActionError> {
    let existing = backend
        .members
        .count_members()
        .await
        .map_err(with_context("failed to count members"))?;
    if existing > 0 {
        return Ok(false);
    }

    let email = normalize_email(&admin.email)
        .ok_or_else(|| ActionError::Internal(format!("ADMIN_EMAIL is not an email address: {}", admin.email)))?;
    if let Some(message) = validate_password_strength(&admin.password) {
        return Err(ActionError::Internal(format!("ADMIN_PASSWORD rejected: {message}")));
    }

    let member = backend
        .members
        .insert_member(NewMember {
            email,
            name: admin.name.clone(),
            role: Role::Admin,
            password_hash: hash_password(&admin.password)?,
        })
        .await
        .map_err(with_context("failed to create bootstrap admin"))?;

    tracing::info!(member_id = %member.id, email = %member.email, "bootstrap admin created");
    Ok(true)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
