//! Server configuration parsed from environment variables.
//!
//! `main` loads `.env` with `dotenvy` first, so every value here may come from
//! the process environment or that file.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_STORAGE_DIR: &str = "storage";
pub const DEFAULT_WEBSITE_DIR: &str = "website";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_EMAILJS_BASE_URL: &str = "https://api.emailjs.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub storage_dir: PathBuf,
    pub public_base_url: String,
    pub website_dir: PathBuf,
    pub cookie_secure: bool,
    /// Take the client address from `x-forwarded-for` instead of the socket peer.
    pub trust_proxy: bool,
    pub session_ttl_hours: i64,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `STORAGE_DIR`: default `storage`
    /// - `PUBLIC_BASE_URL`: default `http://localhost:{PORT}`
    /// - `WEBSITE_DIR`: default `website`
    /// - `COOKIE_SECURE`: default true when `PUBLIC_BASE_URL` is https
    /// - `TRUST_PROXY`: default false; set only behind a proxy that rewrites
    ///   `x-forwarded-for`
    /// - `SESSION_TTL_HOURS`: default 168
    /// - `MAX_UPLOAD_BYTES`: default 10 MiB
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a numeric value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let port = env_parse_strict("PORT", DEFAULT_PORT)?;
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();
        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| public_base_url.starts_with("https://"));

        let session_ttl_hours = env_parse_strict("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid { var: "SESSION_TTL_HOURS", value: session_ttl_hours.to_string() });
        }

        Ok(Self {
            database_url,
            port,
            db_max_connections: env_parse_strict("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            storage_dir: std::env::var("STORAGE_DIR")
                .unwrap_or_else(|_| DEFAULT_STORAGE_DIR.into())
                .into(),
            public_base_url,
            website_dir: std::env::var("WEBSITE_DIR")
                .unwrap_or_else(|_| DEFAULT_WEBSITE_DIR.into())
                .into(),
            cookie_secure,
            trust_proxy: env_bool("TRUST_PROXY").unwrap_or(false),
            session_ttl_hours,
            max_upload_bytes: env_parse_strict("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    #[must_use]
    pub fn session_ttl(&self) -> time::Duration {
        time::Duration::hours(self.session_ttl_hours)
    }
}

/// EmailJS relay settings. All three ids must be present for the relay to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub base_url: String,
}

impl EmailJsConfig {
    /// `None` when any of `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`,
    /// `EMAILJS_PUBLIC_KEY` is missing or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Some(Self {
            service_id: env_non_empty("EMAILJS_SERVICE_ID")?,
            template_id: env_non_empty("EMAILJS_TEMPLATE_ID")?,
            public_key: env_non_empty("EMAILJS_PUBLIC_KEY")?,
            base_url: env_non_empty("EMAILJS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_EMAILJS_BASE_URL.into())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// First admin account, created at startup when the members table is empty.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl BootstrapAdmin {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Some(Self {
            email: env_non_empty("ADMIN_EMAIL")?,
            password: env_non_empty("ADMIN_PASSWORD")?,
            name: env_non_empty("ADMIN_NAME").unwrap_or_else(|| "Admin".into()),
        })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_parse_strict<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
