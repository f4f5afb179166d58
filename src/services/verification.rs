//! Consumer verification scans.
//!
//! SYSTEM CONTEXT
//! ==============
//! `POST /api/scan` lands here. A scan is recorded whether or not the caller
//! is signed in. The first scan of a `delivered` batch closes the chain: the
//! batch becomes `verified` and a `consumer_verified` event is appended,
//! in the same transaction as the verification row.

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::event::{self, NewEvent};
use super::qr::{self, QrError, QrLookup};
use super::validate;
use crate::domain::{BatchStatus, EVENT_CONSUMER_VERIFIED};

const VERIFIED_NOTES: &str = "Authenticity confirmed by consumer scan";

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Qr(#[from] QrError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for VerificationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Qr(err) => err.error_code(),
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Qr(err) => err.status(),
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            Self::Qr(err) => err.message_key(),
            Self::Database(_) => "error_internal",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    /// A missing code is treated like a blank one.
    #[serde(default)]
    pub qr_code: String,
    pub scan_location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub verification_id: Uuid,
    pub verified_at: DateTime<Utc>,
    /// This scan moved the batch from `delivered` to `verified`.
    pub promoted: bool,
    pub batch: QrLookup,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VerificationRecord {
    pub id: Uuid,
    pub qr_code: String,
    pub scan_location: Option<String>,
    pub verified_at: DateTime<Utc>,
    pub batch_id: Uuid,
    pub batch_number: String,
    pub quality_score: Option<i32>,
    pub harvest_date: NaiveDate,
    pub status: BatchStatus,
    pub product_name: String,
    pub farm_name: String,
    pub farm_location: String,
    pub farmer_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerStats {
    pub products_scanned: i64,
    pub verified_products: i64,
}

/// Record a scan. `consumer_id` is `None` for anonymous callers.
pub async fn scan(
    pool: &PgPool,
    consumer_id: Option<Uuid>,
    request: &ScanRequest,
) -> Result<ScanOutcome, VerificationError> {
    let code = qr::normalize_input(&request.qr_code)?;
    let scan_location = validate::optional(request.scan_location.as_deref());

    let mut tx = pool.begin().await?;
    let (batch_id, status): (Uuid, BatchStatus) = sqlx::query_as(
        r"SELECT b.id, b.status
          FROM qr_codes q
          JOIN batches b ON b.id = q.batch_id
          WHERE q.qr_code = $1
          FOR UPDATE OF b",
    )
    .bind(code)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(QrError::UnknownCode)?;

    let (verification_id, verified_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
        r"INSERT INTO verifications (batch_id, consumer_id, qr_code, scan_location)
          VALUES ($1, $2, $3, $4)
          RETURNING id, verified_at",
    )
    .bind(batch_id)
    .bind(consumer_id)
    .bind(code)
    .bind(&scan_location)
    .fetch_one(&mut *tx)
    .await?;

    let promoted = status == BatchStatus::Delivered;
    if promoted {
        sqlx::query("UPDATE batches SET status = $2, updated_at = now() WHERE id = $1")
            .bind(batch_id)
            .bind(BatchStatus::Verified)
            .execute(&mut *tx)
            .await?;
        event::record_event(
            &mut tx,
            &NewEvent {
                batch_id,
                actor_id: consumer_id,
                event_type: EVENT_CONSUMER_VERIFIED,
                status: BatchStatus::Verified,
                location: scan_location.as_deref(),
                notes: Some(VERIFIED_NOTES),
                metadata: None,
            },
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(%batch_id, %verification_id, anonymous = consumer_id.is_none(), promoted, "qr code scanned");
    let batch = qr::lookup(pool, code).await?;
    Ok(ScanOutcome { verification_id, verified_at, promoted, batch })
}

/// A consumer's scans, newest first.
pub async fn list_verifications(pool: &PgPool, consumer_id: Uuid) -> Result<Vec<VerificationRecord>, VerificationError> {
    Ok(sqlx::query_as::<_, VerificationRecord>(
        r"SELECT v.id, v.qr_code, v.scan_location, v.verified_at,
                 b.id AS batch_id, b.batch_number, b.quality_score, b.harvest_date, b.status,
                 pr.name AS product_name, f.name AS farm_name, f.location AS farm_location,
                 p.full_name AS farmer_name
          FROM verifications v
          JOIN batches b ON b.id = v.batch_id
          JOIN products pr ON pr.id = b.product_id
          JOIN farms f ON f.id = b.farm_id
          JOIN profiles p ON p.id = b.farmer_id
          WHERE v.consumer_id = $1
          ORDER BY v.verified_at DESC",
    )
    .bind(consumer_id)
    .fetch_all(pool)
    .await?)
}

pub async fn consumer_stats(pool: &PgPool, consumer_id: Uuid) -> Result<ConsumerStats, VerificationError> {
    let (products_scanned, verified_products): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(DISTINCT batch_id) FROM verifications WHERE consumer_id = $1",
    )
    .bind(consumer_id)
    .fetch_one(pool)
    .await?;
    Ok(ConsumerStats { products_scanned, verified_products })
}
