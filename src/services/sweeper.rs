//! Session sweeper: periodic purge of expired sessions and spent login codes.
//!
//! DESIGN
//! ======
//! A background task wakes on a fixed interval and deletes dead rows.
//! Validation already ignores expired rows, so the sweep only bounds table
//! growth and a failed run is logged and retried on the next tick.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Spawn the background sweep task. Returns a handle for shutdown.
pub fn spawn_sweeper_task(state: AppState) -> JoinHandle<()> {
    let period = clamp_interval(state.config.session_sweep_interval);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            sweep_once(&state).await;
        }
    })
}

async fn sweep_once(state: &AppState) {
    match crate::services::session::purge_expired(&state.pool).await {
        Ok(0) => debug!("session sweep: nothing to purge"),
        Ok(purged) => info!(purged, "session sweep purged expired rows"),
        Err(e) => error!(error = %e, "session sweep failed"),
    }
}

/// `tokio::time::interval` panics on a zero period.
#[must_use]
pub fn clamp_interval(requested: Duration) -> Duration {
    requested.max(Duration::from_secs(1))
}
