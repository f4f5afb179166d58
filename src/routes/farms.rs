//! Farm routes (farmers only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::auth::ProfileUser;
use super::error::{ApiError, JsonBody, Localize, notice};
use crate::i18n::RequestLocale;
use crate::services::farm::{self, Farm, FarmInput};
use crate::state::AppState;

fn ensure_farm_manager(user: &ProfileUser, locale: RequestLocale) -> Result<(), ApiError> {
    if user.role.can_manage_farms() { Ok(()) } else { Err(ApiError::forbidden(locale)) }
}

/// `GET /api/farms`
pub async fn list_farms(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
) -> Result<Json<Vec<Farm>>, ApiError> {
    ensure_farm_manager(&user, locale)?;
    let farms = farm::list_farms(&state.pool, user.profile_id).await.localized(locale)?;
    Ok(Json(farms))
}

/// `POST /api/farms`
pub async fn create_farm(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
    JsonBody(body): JsonBody<FarmInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    ensure_farm_manager(&user, locale)?;
    let created = farm::create_farm(&state.pool, user.profile_id, &body)
        .await
        .localized(locale)?;
    Ok((StatusCode::CREATED, notice(locale, "notice_farm_added", created)))
}

/// `PUT /api/farms/{id}`
pub async fn update_farm(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
    Path(farm_id): Path<Uuid>,
    JsonBody(body): JsonBody<FarmInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_farm_manager(&user, locale)?;
    let updated = farm::update_farm(&state.pool, user.profile_id, farm_id, &body)
        .await
        .localized(locale)?;
    Ok(notice(locale, "notice_farm_updated", updated))
}
