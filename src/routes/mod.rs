//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API under `/api` plus a `/healthz` probe into a
//! single Axum router. Every handler reads the request locale so errors and
//! notices come back in the caller's language.

pub mod auth;
pub mod batches;
pub mod dashboard;
pub mod error;
pub mod farms;
pub mod i18n;
pub mod products;
pub mod profile;
pub mod scan;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/email/request-code", post(auth::request_code))
        .route("/api/auth/email/verify-code", post(auth::verify_code))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/profile", get(profile::get_profile).post(profile::create_profile))
        .route("/api/profile/kyc", put(profile::submit_kyc))
        .route("/api/farms", get(farms::list_farms).post(farms::create_farm))
        .route("/api/farms/{id}", put(farms::update_farm))
        .route("/api/products", get(products::list_products).post(products::create_product))
        .route("/api/batches", get(batches::list_batches).post(batches::register_batch))
        .route("/api/batches/stats", get(batches::batch_stats))
        .route("/api/batches/{id}", get(batches::get_batch))
        .route("/api/batches/{id}/status", post(batches::update_status))
        .route("/api/batches/{id}/events", get(batches::list_events))
        .route("/api/batches/{id}/qr", post(batches::issue_qr))
        .route("/api/qr/{code}", get(scan::lookup_qr))
        .route("/api/scan", post(scan::scan))
        .route("/api/verifications", get(scan::list_verifications))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/i18n", get(i18n::list_locales))
        .route("/api/i18n/{locale}", get(i18n::get_table).put(i18n::set_locale))
        .route("/healthz", get(healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
