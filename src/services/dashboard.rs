//! Role dashboards.
//!
//! Each role sees a different stats block; all share the localized
//! navigation menu.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::batch::{self, BatchError, BatchStats};
use super::farm::{self, FarmError};
use super::verification::{self, ConsumerStats, VerificationError};
use crate::domain::UserRole;
use crate::error::ErrorCode;
use crate::i18n::{Locale, translate};

/// `(translation key, client path)` in menu order.
const NAV_ITEMS: [(&str, &str); 6] = [
    ("dashboard", "/dashboard"),
    ("scan_product", "/scan"),
    ("my_kyc", "/kyc"),
    ("supply_chain", "/supply-chain"),
    ("reports", "/reports"),
    ("settings", "/settings"),
];

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Farm(#[from] FarmError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl ErrorCode for DashboardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Batch(err) => err.error_code(),
            Self::Farm(err) => err.error_code(),
            Self::Verification(err) => err.error_code(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Batch(err) => err.status(),
            Self::Farm(err) => err.status(),
            Self::Verification(err) => err.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub key: &'static str,
    pub label: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleStats {
    Farmer {
        #[serde(flatten)]
        batches: BatchStats,
        farms: i64,
    },
    Distributor {
        by_status: BTreeMap<&'static str, i64>,
    },
    Consumer(ConsumerStats),
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub full_name: String,
    pub role: UserRole,
    pub role_label: &'static str,
    pub greeting: &'static str,
    pub stats: RoleStats,
    /// Stat field name to localized label.
    pub labels: BTreeMap<&'static str, &'static str>,
    pub menu: Vec<NavItem>,
}

#[must_use]
pub fn nav_menu(locale: Locale) -> Vec<NavItem> {
    NAV_ITEMS
        .iter()
        .map(|&(key, path)| NavItem { key, label: translate(locale, key), path })
        .collect()
}

fn stat_labels(role: UserRole, locale: Locale) -> BTreeMap<&'static str, &'static str> {
    let keys: &[&'static str] = match role {
        UserRole::Farmer => &["total_batches", "total_quantity", "active_batches", "avg_quality_score"],
        UserRole::Distributor => &[
            "status_harvested",
            "status_processed",
            "status_in_transit",
            "status_delivered",
            "status_verified",
        ],
        UserRole::Consumer => &["products_scanned", "verified_products", "recent_scans"],
    };
    keys.iter().map(|&key| (key, translate(locale, key))).collect()
}

pub async fn role_stats(pool: &PgPool, profile_id: Uuid, role: UserRole) -> Result<RoleStats, DashboardError> {
    Ok(match role {
        UserRole::Farmer => RoleStats::Farmer {
            batches: batch::farmer_stats(pool, profile_id).await?,
            farms: farm::count_farms(pool, profile_id).await?,
        },
        UserRole::Distributor => RoleStats::Distributor { by_status: batch::counts_by_status(pool).await? },
        UserRole::Consumer => RoleStats::Consumer(verification::consumer_stats(pool, profile_id).await?),
    })
}

pub async fn load_dashboard(
    pool: &PgPool,
    profile_id: Uuid,
    full_name: String,
    role: UserRole,
    locale: Locale,
) -> Result<Dashboard, DashboardError> {
    let stats = role_stats(pool, profile_id, role).await?;
    Ok(Dashboard {
        full_name,
        role,
        role_label: translate(locale, role.label_key()),
        greeting: translate(locale, "welcome_back"),
        stats,
        labels: stat_labels(role, locale),
        menu: nav_menu(locale),
    })
}
