//! Batch service: registration, listing, statistics and lifecycle.
//!
//! DESIGN
//! ======
//! A batch and its timeline are written together. Registration inserts the
//! batch and its `harvest_registered` event in one transaction; a status
//! change locks the batch row, re-checks the transition against the locked
//! status, then updates the row and appends the event before committing.
//! Two distributors racing on the same batch therefore cannot both advance
//! it from the same status.
//!
//! BATCH NUMBERS
//! =============
//! `AV-YYYYMMDD-XXXX`: harvest date plus four uppercase base-36 characters.
//! The insert uses `ON CONFLICT (batch_number) DO NOTHING`, so a collision
//! yields no row and the loop draws a fresh suffix inside the same
//! transaction.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::event::{self, NewEvent};
use super::validate;
use crate::domain::{BatchStatus, EVENT_HARVEST_REGISTERED, UserRole};
use crate::error::FieldError;

const BATCH_PREFIX: &str = "AV";
const BATCH_SUFFIX_LEN: usize = 4;
const BATCH_SUFFIX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BATCH_NUMBER_ATTEMPTS: usize = 8;
const DEFAULT_QUALITY_SCORE: i32 = 8;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("batch not found: {0}")]
    NotFound(Uuid),
    #[error("{role} may not mark a batch {target}")]
    Forbidden { role: UserRole, target: BatchStatus },
    #[error("cannot move batch from {from} to {to}")]
    InvalidTransition { from: BatchStatus, to: BatchStatus },
    #[error("batch {0} changed while updating")]
    Stale(Uuid),
    #[error("could not allocate a unique batch number")]
    NumberExhausted,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for BatchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_VALIDATION",
            Self::NotFound(_) => "E_BATCH_NOT_FOUND",
            Self::Forbidden { .. } => "E_FORBIDDEN",
            Self::InvalidTransition { .. } => "E_INVALID_TRANSITION",
            Self::Stale(_) => "E_STALE_BATCH",
            Self::NumberExhausted => "E_BATCH_NUMBER",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::InvalidTransition { .. } | Self::Stale(_) => StatusCode::CONFLICT,
            Self::NumberExhausted | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } | Self::Stale(_) => "error_invalid_transition",
            _ => crate::error::default_message_key(self.status()),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Batch {
    pub id: Uuid,
    pub batch_number: String,
    pub product_id: Uuid,
    pub farm_id: Uuid,
    pub farmer_id: Uuid,
    pub quantity_kg: f64,
    pub harvest_date: NaiveDate,
    pub quality_score: Option<i32>,
    pub organic_certified: bool,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List row: the batch plus the names the tables show.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BatchSummary {
    pub id: Uuid,
    pub batch_number: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub farm_id: Uuid,
    pub farm_name: String,
    pub farm_location: String,
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub quantity_kg: f64,
    pub harvest_date: NaiveDate,
    pub quality_score: Option<i32>,
    pub organic_certified: bool,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductInfo {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmInfo {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub area_hectares: Option<f64>,
    pub certification_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmerInfo {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// Everything the product journey view needs about one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchDetail {
    #[serde(flatten)]
    pub batch: Batch,
    pub product: ProductInfo,
    pub farm: FarmInfo,
    pub farmer: FarmerInfo,
    pub qr_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBatch {
    pub product_id: Uuid,
    pub farm_id: Uuid,
    pub quantity_kg: f64,
    pub harvest_date: Option<NaiveDate>,
    pub quality_score: Option<i32>,
    #[serde(default)]
    pub organic_certified: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidBatch {
    pub product_id: Uuid,
    pub farm_id: Uuid,
    pub quantity_kg: f64,
    pub harvest_date: NaiveDate,
    pub quality_score: i32,
    pub organic_certified: bool,
}

impl NewBatch {
    /// Validate against `today` (the server's UTC date).
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidBatch, FieldError> {
        if !self.quantity_kg.is_finite() || self.quantity_kg <= 0.0 {
            return Err(FieldError::new("quantity_kg", "must be greater than zero"));
        }
        let quality_score = self.quality_score.unwrap_or(DEFAULT_QUALITY_SCORE);
        if !(1..=10).contains(&quality_score) {
            return Err(FieldError::new("quality_score", "must be between 1 and 10"));
        }
        let harvest_date = self.harvest_date.unwrap_or(today);
        if harvest_date > today {
            return Err(FieldError::new("harvest_date", "cannot be in the future"));
        }
        Ok(ValidBatch {
            product_id: self.product_id,
            farm_id: self.farm_id,
            quantity_kg: self.quantity_kg,
            harvest_date,
            quality_score,
            organic_certified: self.organic_certified,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Caller attempting a status change.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub profile_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStats {
    pub total_batches: i64,
    pub total_quantity_kg: f64,
    pub active_batches: i64,
    pub avg_quality_score: f64,
}

impl BatchStats {
    /// Aggregate `(quantity_kg, quality_score, status)` rows. A missing score
    /// counts as zero towards the average.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_rows(rows: &[(f64, Option<i32>, BatchStatus)]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let total_batches = i64::try_from(rows.len()).unwrap_or(i64::MAX);
        let total_quantity_kg = rows.iter().map(|(qty, _, _)| qty).sum();
        let active_batches =
            i64::try_from(rows.iter().filter(|(_, _, status)| status.is_active()).count()).unwrap_or(i64::MAX);
        let quality_sum: i64 = rows.iter().map(|(_, score, _)| i64::from(score.unwrap_or(0))).sum();
        Self {
            total_batches,
            total_quantity_kg,
            active_batches,
            avg_quality_score: round_one_decimal(quality_sum as f64 / total_batches as f64),
        }
    }
}

#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// =============================================================================
// BATCH NUMBERS
// =============================================================================

#[must_use]
pub fn generate_batch_number(harvest_date: NaiveDate) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..BATCH_SUFFIX_LEN)
        .map(|_| BATCH_SUFFIX_ALPHABET[rng.random_range(0..BATCH_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{BATCH_PREFIX}-{}-{suffix}", harvest_date.format("%Y%m%d"))
}

// =============================================================================
// REGISTRATION
// =============================================================================

const BATCH_COLUMNS: &str = "id, batch_number, product_id, farm_id, farmer_id, quantity_kg, harvest_date, \
     quality_score, organic_certified, status, created_at, updated_at";

/// Register a harvest lot for `farmer_id` and open its timeline.
pub async fn register_batch(pool: &PgPool, farmer_id: Uuid, input: &NewBatch) -> Result<Batch, BatchError> {
    let valid = input.validate(Utc::now().date_naive())?;

    let owns_farm: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM farms WHERE id = $1 AND farmer_id = $2)")
        .bind(valid.farm_id)
        .bind(farmer_id)
        .fetch_one(pool)
        .await?;
    if !owns_farm {
        return Err(FieldError::new("farm_id", "unknown farm").into());
    }
    if !super::product::product_exists(pool, valid.product_id).await? {
        return Err(FieldError::new("product_id", "unknown product").into());
    }

    let mut tx = pool.begin().await?;
    let insert = format!(
        "INSERT INTO batches (batch_number, product_id, farm_id, farmer_id, quantity_kg, harvest_date,
                              quality_score, organic_certified)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (batch_number) DO NOTHING
         RETURNING {BATCH_COLUMNS}"
    );

    let mut inserted = None;
    for _ in 0..BATCH_NUMBER_ATTEMPTS {
        let batch_number = generate_batch_number(valid.harvest_date);
        inserted = sqlx::query_as::<_, Batch>(&insert)
            .bind(&batch_number)
            .bind(valid.product_id)
            .bind(valid.farm_id)
            .bind(farmer_id)
            .bind(valid.quantity_kg)
            .bind(valid.harvest_date)
            .bind(valid.quality_score)
            .bind(valid.organic_certified)
            .fetch_optional(&mut *tx)
            .await?;
        if inserted.is_some() {
            break;
        }
        tracing::debug!(%batch_number, "batch number collision; retrying");
    }
    let batch = inserted.ok_or(BatchError::NumberExhausted)?;

    let notes = event::registration_notes(batch.quantity_kg);
    event::record_event(
        &mut tx,
        &NewEvent {
            batch_id: batch.id,
            actor_id: Some(farmer_id),
            event_type: EVENT_HARVEST_REGISTERED,
            status: BatchStatus::Harvested,
            location: None,
            notes: Some(&notes),
            metadata: Some(serde_json::json!({
                "quality_score": valid.quality_score,
                "organic_certified": valid.organic_certified,
            })),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(batch_id = %batch.id, batch_number = %batch.batch_number, %farmer_id, "batch registered");
    Ok(batch)
}

// =============================================================================
// QUERIES
// =============================================================================

const SUMMARY_SELECT: &str = "SELECT b.id, b.batch_number, b.product_id, pr.name AS product_name,
            b.farm_id, f.name AS farm_name, f.location AS farm_location,
            b.farmer_id, p.full_name AS farmer_name, b.quantity_kg, b.harvest_date,
            b.quality_score, b.organic_certified, b.status, b.created_at, b.updated_at
     FROM batches b
     JOIN products pr ON pr.id = b.product_id
     JOIN farms f ON f.id = b.farm_id
     JOIN profiles p ON p.id = b.farmer_id";

/// A farmer's own batches, newest first.
pub async fn list_farmer_batches(pool: &PgPool, farmer_id: Uuid) -> Result<Vec<BatchSummary>, BatchError> {
    let sql = format!("{SUMMARY_SELECT} WHERE b.farmer_id = $1 ORDER BY b.created_at DESC");
    Ok(sqlx::query_as::<_, BatchSummary>(&sql)
        .bind(farmer_id)
        .fetch_all(pool)
        .await?)
}

/// Every batch in the system, newest first, optionally narrowed to one status.
pub async fn list_all_batches(pool: &PgPool, status: Option<BatchStatus>) -> Result<Vec<BatchSummary>, BatchError> {
    let sql = format!("{SUMMARY_SELECT} WHERE ($1::product_status IS NULL OR b.status = $1) ORDER BY b.created_at DESC");
    Ok(sqlx::query_as::<_, BatchSummary>(&sql)
        .bind(status)
        .fetch_all(pool)
        .await?)
}

pub async fn farmer_stats(pool: &PgPool, farmer_id: Uuid) -> Result<BatchStats, BatchError> {
    let rows: Vec<(f64, Option<i32>, BatchStatus)> =
        sqlx::query_as("SELECT quantity_kg, quality_score, status FROM batches WHERE farmer_id = $1")
            .bind(farmer_id)
            .fetch_all(pool)
            .await?;
    Ok(BatchStats::from_rows(&rows))
}

/// Batch counts per status, zero-filled, keyed by status name.
pub async fn counts_by_status(pool: &PgPool) -> Result<BTreeMap<&'static str, i64>, BatchError> {
    let rows: Vec<(BatchStatus, i64)> = sqlx::query_as("SELECT status, COUNT(*) FROM batches GROUP BY status")
        .fetch_all(pool)
        .await?;
    let mut counts: BTreeMap<&'static str, i64> = BatchStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for (status, count) in rows {
        counts.insert(status.as_str(), count);
    }
    Ok(counts)
}

pub async fn get_batch(pool: &PgPool, batch_id: Uuid) -> Result<Batch, BatchError> {
    let sql = format!("SELECT {BATCH_COLUMNS} FROM batches WHERE id = $1");
    sqlx::query_as::<_, Batch>(&sql)
        .bind(batch_id)
        .fetch_optional(pool)
        .await?
        .ok_or(BatchError::NotFound(batch_id))
}

pub async fn get_batch_detail(pool: &PgPool, batch_id: Uuid) -> Result<BatchDetail, BatchError> {
    let row = sqlx::query(
        r"SELECT b.id, b.batch_number, b.product_id, b.farm_id, b.farmer_id, b.quantity_kg,
                 b.harvest_date, b.quality_score, b.organic_certified, b.status,
                 b.created_at, b.updated_at,
                 pr.name AS product_name, pr.category, pr.description,
                 f.name AS farm_name, f.location, f.area_hectares, f.certification_type,
                 p.full_name, p.email,
                 q.qr_code
          FROM batches b
          JOIN products pr ON pr.id = b.product_id
          JOIN farms f ON f.id = b.farm_id
          JOIN profiles p ON p.id = b.farmer_id
          LEFT JOIN qr_codes q ON q.batch_id = b.id
          WHERE b.id = $1",
    )
    .bind(batch_id)
    .fetch_optional(pool)
    .await?
    .ok_or(BatchError::NotFound(batch_id))?;

    let batch = Batch {
        id: row.get("id"),
        batch_number: row.get("batch_number"),
        product_id: row.get("product_id"),
        farm_id: row.get("farm_id"),
        farmer_id: row.get("farmer_id"),
        quantity_kg: row.get("quantity_kg"),
        harvest_date: row.get("harvest_date"),
        quality_score: row.get("quality_score"),
        organic_certified: row.get("organic_certified"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    };
    Ok(BatchDetail {
        product: ProductInfo {
            id: batch.product_id,
            name: row.get("product_name"),
            category: row.get("category"),
            description: row.get("description"),
        },
        farm: FarmInfo {
            id: batch.farm_id,
            name: row.get("farm_name"),
            location: row.get("location"),
            area_hectares: row.get("area_hectares"),
            certification_type: row.get("certification_type"),
        },
        farmer: FarmerInfo { id: batch.farmer_id, full_name: row.get("full_name"), email: row.get("email") },
        qr_code: row.get("qr_code"),
        batch,
    })
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Decide whether `actor` may move a batch owned by `owner` from `current`
/// to `target`. Farmers only see their own batches.
pub fn check_transition(
    actor: Actor,
    batch_id: Uuid,
    owner: Uuid,
    current: BatchStatus,
    target: BatchStatus,
) -> Result<(), BatchError> {
    if actor.role == UserRole::Farmer && actor.profile_id != owner {
        return Err(BatchError::NotFound(batch_id));
    }
    if !actor.role.can_advance_to(target) {
        return Err(BatchError::Forbidden { role: actor.role, target });
    }
    if !current.can_transition_to(target) {
        return Err(BatchError::InvalidTransition { from: current, to: target });
    }
    Ok(())
}

/// Advance a batch one lifecycle step and append the matching timeline event.
pub async fn advance_status(
    pool: &PgPool,
    actor: Actor,
    batch_id: Uuid,
    update: &StatusUpdate,
) -> Result<Batch, BatchError> {
    let target = BatchStatus::parse(&update.status).ok_or(FieldError::new("status", "unknown status"))?;
    // Farmer role checks run after the ownership check in `check_transition`.
    if actor.role != UserRole::Farmer && !actor.role.can_advance_to(target) {
        return Err(BatchError::Forbidden { role: actor.role, target });
    }
    let location = validate::optional(update.location.as_deref());
    let notes = validate::optional(update.notes.as_deref());

    let mut tx = pool.begin().await?;
    let (current, owner): (BatchStatus, Uuid) =
        sqlx::query_as("SELECT status, farmer_id FROM batches WHERE id = $1 FOR UPDATE")
            .bind(batch_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BatchError::NotFound(batch_id))?;
    check_transition(actor, batch_id, owner, current, target)?;

    let sql = format!(
        "UPDATE batches SET status = $2, updated_at = now()
         WHERE id = $1 AND status = $3
         RETURNING {BATCH_COLUMNS}"
    );
    let batch = sqlx::query_as::<_, Batch>(&sql)
        .bind(batch_id)
        .bind(target)
        .bind(current)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BatchError::Stale(batch_id))?;

    event::record_event(
        &mut tx,
        &NewEvent {
            batch_id,
            actor_id: Some(actor.profile_id),
            event_type: target.event_type(),
            status: target,
            location: location.as_deref(),
            notes: notes.as_deref(),
            metadata: None,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(%batch_id, from = %current, to = %target, actor = %actor.profile_id, "batch status updated");
    Ok(batch)
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
