//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! All persistent data lives in Postgres; the only in-process mutable state
//! is the scan rate limiter.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;
use crate::services::mailer::Mailer;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    /// Outbound mail for login codes. `None` if Resend is not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
    /// In-memory rate limiter for QR scans.
    pub scan_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: AppConfig, mailer: Option<Arc<dyn Mailer>>) -> Self {
        let scan_limiter = RateLimiter::new(config.scan_limits);
        Self { pool, config: Arc::new(config), mailer, scan_limiter }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
