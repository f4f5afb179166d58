//! QR code issuance and lookup.
//!
//! A batch carries at most one code, `AV-{unix_millis}-{9 base-36 chars}`.
//! Issuing is idempotent: asking again returns the code already on file.
//! Rendering the code as an image is left to the client.

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::BatchStatus;

const QR_PREFIX: &str = "AV";
const QR_SUFFIX_LEN: usize = 9;
const QR_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ISSUE_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("batch not found: {0}")]
    BatchNotFound(Uuid),
    #[error("qr code is required")]
    Required,
    #[error("unknown qr code")]
    UnknownCode,
    #[error("could not allocate a unique qr code")]
    Exhausted,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for QrError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BatchNotFound(_) => "E_BATCH_NOT_FOUND",
            Self::Required => "E_QR_REQUIRED",
            Self::UnknownCode => "E_QR_INVALID",
            Self::Exhausted => "E_QR_EXHAUSTED",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BatchNotFound(_) | Self::UnknownCode => StatusCode::NOT_FOUND,
            Self::Required => StatusCode::BAD_REQUEST,
            Self::Exhausted | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            Self::Required => "error_qr_required",
            Self::UnknownCode => "error_qr_invalid",
            _ => crate::error::default_message_key(self.status()),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QrCode {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub qr_code: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a batch reached through its code.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QrLookup {
    pub qr_code: String,
    pub batch_id: Uuid,
    pub batch_number: String,
    pub product_name: String,
    pub product_category: String,
    pub farm_name: String,
    pub farm_location: String,
    pub farmer_name: String,
    pub quantity_kg: f64,
    pub harvest_date: NaiveDate,
    pub quality_score: Option<i32>,
    pub organic_certified: bool,
    pub status: BatchStatus,
}

#[must_use]
pub fn generate_qr_code(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..QR_SUFFIX_LEN)
        .map(|_| QR_SUFFIX_ALPHABET[rng.random_range(0..QR_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{QR_PREFIX}-{}-{suffix}", now.timestamp_millis())
}

/// Trimmed scan input.
///
/// # Errors
///
/// [`QrError::Required`] if nothing but whitespace was entered.
pub fn normalize_input(raw: &str) -> Result<&str, QrError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { Err(QrError::Required) } else { Ok(trimmed) }
}

/// Issue the code for a batch owned by `farmer_id`. The flag is `true` when
/// a new code was created, `false` when the existing one is returned.
pub async fn issue_qr(pool: &PgPool, farmer_id: Uuid, batch_id: Uuid) -> Result<(QrCode, bool), QrError> {
    let owner: Option<Uuid> = sqlx::query_scalar("SELECT farmer_id FROM batches WHERE id = $1")
        .bind(batch_id)
        .fetch_optional(pool)
        .await?;
    if owner != Some(farmer_id) {
        return Err(QrError::BatchNotFound(batch_id));
    }

    for _ in 0..ISSUE_ATTEMPTS {
        if let Some(existing) = find_by_batch(pool, batch_id).await? {
            return Ok((existing, false));
        }
        let inserted = sqlx::query_as::<_, QrCode>(
            r"INSERT INTO qr_codes (batch_id, qr_code) VALUES ($1, $2)
              ON CONFLICT DO NOTHING
              RETURNING id, batch_id, qr_code, created_at",
        )
        .bind(batch_id)
        .bind(generate_qr_code(Utc::now()))
        .fetch_optional(pool)
        .await?;
        if let Some(qr) = inserted {
            tracing::info!(%batch_id, qr_code = %qr.qr_code, "qr code issued");
            return Ok((qr, true));
        }
    }
    Err(QrError::Exhausted)
}

pub async fn find_by_batch(pool: &PgPool, batch_id: Uuid) -> Result<Option<QrCode>, sqlx::Error> {
    sqlx::query_as::<_, QrCode>("SELECT id, batch_id, qr_code, created_at FROM qr_codes WHERE batch_id = $1")
        .bind(batch_id)
        .fetch_optional(pool)
        .await
}

pub async fn lookup(pool: &PgPool, code: &str) -> Result<QrLookup, QrError> {
    let code = normalize_input(code)?;
    sqlx::query_as::<_, QrLookup>(
        r"SELECT q.qr_code, b.id AS batch_id, b.batch_number,
                 pr.name AS product_name, pr.category AS product_category,
                 f.name AS farm_name, f.location AS farm_location, p.full_name AS farmer_name,
                 b.quantity_kg, b.harvest_date, b.quality_score, b.organic_certified, b.status
          FROM qr_codes q
          JOIN batches b ON b.id = q.batch_id
          JOIN products pr ON pr.id = b.product_id
          JOIN farms f ON f.id = b.farm_id
          JOIN profiles p ON p.id = b.farmer_id
          WHERE q.qr_code = $1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?
    .ok_or(QrError::UnknownCode)
}
