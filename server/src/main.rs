mod backend;
mod config;
mod db;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use backend::Backend;
use backend::postgres::PgBackend;
use backend::storage::FsStorage;
use config::{BootstrapAdmin, EmailJsConfig, ServerConfig};
use services::mailer::{EmailJsMailer, Mailer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal in production.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;

    let storage = FsStorage::new(config.storage_dir.clone(), &config.public_base_url);
    let backend = Backend::from_parts(Arc::new(PgBackend::new(pool)), Arc::new(storage));

    // Email relay is optional: offers are still stored without it.
    let mailer: Option<Arc<dyn Mailer>> = match EmailJsConfig::from_env().map(EmailJsMailer::new) {
        Some(Ok(mailer)) => {
            tracing::info!(endpoint = %mailer.endpoint(), "email relay configured");
            Some(Arc::new(mailer))
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "email relay client failed to build; offer emails disabled");
            None
        }
        None => {
            tracing::warn!("EMAILJS_* not set; offer emails disabled");
            None
        }
    };

    if let Some(admin) = BootstrapAdmin::from_env() {
        services::auth::bootstrap_admin(&backend, &admin).await?;
    }

    let state = state::AppState::new(backend, mailer, config.cookie_secure, config.session_ttl())
        .with_trust_proxy(config.trust_proxy);
    let app = routes::app(state, &config.website_dir, &config.storage_dir, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "studio server listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
