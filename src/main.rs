mod config;
mod db;
mod domain;
mod error;
mod i18n;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::services::mailer::{Mailer, ResendMailer};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let pool = match db::init_pool(&config.database_url, config.db_max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "database init failed");
            std::process::exit(1);
        }
    };

    let mailer: Option<Arc<dyn Mailer>> = config
        .mail
        .as_ref()
        .map(|mail| Arc::new(ResendMailer::new(mail)) as Arc<dyn Mailer>);
    if mailer.is_none() {
        tracing::warn!("RESEND_API_KEY / RESEND_FROM not set; login codes will not be emailed");
    }

    let port = config.port;
    let state = state::AppState::new(pool, config, mailer);

    // Spawn background session sweeper.
    let _sweeper = services::sweeper::spawn_sweeper_task(state.clone());

    let app = routes::app(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%port, "agritrace listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
