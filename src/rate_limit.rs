//! In-memory rate limiting for QR scans.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`.
//! Two limits are enforced on every scan:
//! - Per-client: keyed by profile id, or by a hashed forwarded address for
//!   anonymous scanners.
//! - Global: total scans across all clients.
//!
//! TRADE-OFFS
//! ==========
//! State is per-process. Running several replicas multiplies the effective
//! limit, which is acceptable for abuse dampening.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::ScanLimits;

/// Clients whose windows are all empty are dropped once the map grows past this.
const PRUNE_THRESHOLD: usize = 4096;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("per-client rate limit exceeded (max {limit} scans/{window_secs}s)")]
    PerClientExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} scans/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

impl crate::error::ErrorCode for RateLimitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PerClientExceeded { .. } => "E_RATE_LIMITED",
            Self::GlobalExceeded { .. } => "E_GLOBAL_RATE_LIMITED",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::TOO_MANY_REQUESTS
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    limits: ScanLimits,
}

struct RateLimiterInner {
    /// Per-client request timestamps.
    client_requests: HashMap<String, VecDeque<Instant>>,
    /// Global request timestamps.
    global_requests: VecDeque<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(limits: ScanLimits) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                client_requests: HashMap::new(),
                global_requests: VecDeque::new(),
            })),
            limits,
        }
    }

    /// Check both per-client and global limits, then record the scan.
    ///
    /// # Errors
    ///
    /// Returns which limit was hit; nothing is recorded in that case.
    pub fn check_and_record(&self, client: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(client, Instant::now())
    }

    fn check_and_record_at(&self, client: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.limits;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        if inner.client_requests.len() > PRUNE_THRESHOLD {
            inner.client_requests.retain(|_, deque| {
                prune_window(deque, now, cfg.per_client_window);
                !deque.is_empty()
            });
        }

        let client_deque = inner.client_requests.entry(client.to_owned()).or_default();
        prune_window(client_deque, now, cfg.per_client_window);
        if client_deque.len() >= cfg.per_client_limit {
            return Err(RateLimitError::PerClientExceeded {
                limit: cfg.per_client_limit,
                window_secs: cfg.per_client_window.as_secs(),
            });
        }

        client_deque.push_back(now);
        inner.global_requests.push_back(now);

        Ok(())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .client_requests
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(ScanLimits::default())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
