//! Batch routes: registration, role-scoped listing, lifecycle, timeline, QR.
//!
//! Visibility by role: farmers list their own batches, distributors list
//! every batch (optionally by status), consumers reach batches only through
//! a QR scan. Detail and timeline are open to any signed-in user.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::{AuthUser, ProfileUser};
use super::error::{ApiError, JsonBody, Localize, notice};
use crate::domain::{BatchStatus, UserRole};
use crate::error::FieldError;
use crate::i18n::RequestLocale;
use crate::services::batch::{self, BatchDetail, BatchStats, BatchSummary, NewBatch, StatusUpdate};
use crate::services::event::{self, TimelineEvent};
use crate::services::qr;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// `POST /api/batches` (farmer)
pub async fn register_batch(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
    JsonBody(body): JsonBody<NewBatch>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if !user.role.can_register_batches() {
        return Err(ApiError::forbidden(locale));
    }
    let created = batch::register_batch(&state.pool, user.profile_id, &body)
        .await
        .localized(locale)?;
    Ok((StatusCode::CREATED, notice(locale, "notice_batch_registered", created)))
}

/// `GET /api/batches`
pub async fn list_batches(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<BatchSummary>>, ApiError> {
    let batches = match user.role {
        UserRole::Farmer => batch::list_farmer_batches(&state.pool, user.profile_id).await,
        UserRole::Distributor => {
            let status = parse_status_filter(query.status.as_deref()).localized(locale)?;
            batch::list_all_batches(&state.pool, status).await
        }
        UserRole::Consumer => return Err(ApiError::forbidden(locale)),
    };
    Ok(Json(batches.localized(locale)?))
}

/// Blank filter means all statuses.
pub(crate) fn parse_status_filter(raw: Option<&str>) -> Result<Option<BatchStatus>, FieldError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => BatchStatus::parse(value)
            .map(Some)
            .ok_or(FieldError::new("status", "unknown status")),
    }
}

/// `GET /api/batches/stats` (farmer)
pub async fn batch_stats(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
) -> Result<Json<BatchStats>, ApiError> {
    user.require(UserRole::Farmer, locale)?;
    let stats = batch::farmer_stats(&state.pool, user.profile_id).await.localized(locale)?;
    Ok(Json(stats))
}

/// `GET /api/batches/{id}`
pub async fn get_batch(
    State(state): State<AppState>,
    locale: RequestLocale,
    _auth: AuthUser,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<BatchDetail>, ApiError> {
    let detail = batch::get_batch_detail(&state.pool, batch_id).await.localized(locale)?;
    Ok(Json(detail))
}

/// `POST /api/batches/{id}/status`
pub async fn update_status(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
    Path(batch_id): Path<Uuid>,
    JsonBody(body): JsonBody<StatusUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = batch::advance_status(&state.pool, user.actor(), batch_id, &body)
        .await
        .localized(locale)?;
    Ok(notice(locale, "notice_status_updated", updated))
}

/// `GET /api/batches/{id}/events`
pub async fn list_events(
    State(state): State<AppState>,
    locale: RequestLocale,
    _auth: AuthUser,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEvent>>, ApiError> {
    batch::get_batch(&state.pool, batch_id).await.localized(locale)?;
    let events = event::timeline(&state.pool, batch_id).await.localized(locale)?;
    Ok(Json(events))
}

/// `POST /api/batches/{id}/qr` (owning farmer). 201 on first issue, 200 after.
pub async fn issue_qr(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
    Path(batch_id): Path<Uuid>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    user.require(UserRole::Farmer, locale)?;
    let (code, created) = qr::issue_qr(&state.pool, user.profile_id, batch_id)
        .await
        .localized(locale)?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, notice(locale, "notice_qr_generated", code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_accepts_blank_and_known_values() {
        assert_eq!(parse_status_filter(None), Ok(None));
        assert_eq!(parse_status_filter(Some("  ")), Ok(None));
        assert_eq!(parse_status_filter(Some("in_transit")), Ok(Some(BatchStatus::InTransit)));
    }

    #[test]
    fn status_filter_rejects_unknown_values() {
        assert_eq!(parse_status_filter(Some("lost")).unwrap_err().field, "status");
    }
}
