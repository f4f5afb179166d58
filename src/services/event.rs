//! Supply-chain timeline.
//!
//! Events are append-only. They are written inside the caller's transaction
//! so a batch row and its timeline never disagree.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::BatchStatus;

/// A row to append to a batch timeline.
#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub batch_id: Uuid,
    /// `None` for anonymous consumer scans.
    pub actor_id: Option<Uuid>,
    pub event_type: &'a str,
    pub status: BatchStatus,
    pub location: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub event_type: String,
    pub status: BatchStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

pub async fn record_event(conn: &mut PgConnection, event: &NewEvent<'_>) -> Result<Uuid, sqlx::Error> {
    let id = sqlx::query_scalar(
        r#"INSERT INTO supply_chain_events (batch_id, actor_id, event_type, status, location, notes, metadata)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING id"#,
    )
    .bind(event.batch_id)
    .bind(event.actor_id)
    .bind(event.event_type)
    .bind(event.status)
    .bind(event.location)
    .bind(event.notes)
    .bind(&event.metadata)
    .fetch_one(conn)
    .await?;

    tracing::debug!(batch_id = %event.batch_id, event_type = event.event_type, "timeline event recorded");
    Ok(id)
}

/// Timeline of a batch, oldest first.
pub async fn timeline(pool: &PgPool, batch_id: Uuid) -> Result<Vec<TimelineEvent>, sqlx::Error> {
    sqlx::query_as::<_, TimelineEvent>(
        r#"SELECT e.id, e.batch_id, e.actor_id, p.full_name AS actor_name, e.event_type,
                  e.status, e.location, e.notes, e.metadata, e."timestamp" AS timestamp
           FROM supply_chain_events e
           LEFT JOIN profiles p ON p.id = e.actor_id
           WHERE e.batch_id = $1
           ORDER BY e."timestamp" ASC, e.id ASC"#,
    )
    .bind(batch_id)
    .fetch_all(pool)
    .await
}

/// Notes written on the registration event.
#[must_use]
pub fn registration_notes(quantity_kg: f64) -> String {
    format!("Batch registered with {quantity_kg}kg of produce")
}
