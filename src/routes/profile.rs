//! Profile routes: onboarding and KYC.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use super::auth::AuthUser;
use super::error::{ApiError, JsonBody, Localize, notice};
use crate::i18n::RequestLocale;
use crate::services::profile::{self, KycSubmission, NewProfile, Profile};
use crate::state::AppState;

/// `POST /api/profile`: pick a role and create the caller's profile.
pub async fn create_profile(
    State(state): State<AppState>,
    locale: RequestLocale,
    auth: AuthUser,
    JsonBody(body): JsonBody<NewProfile>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let created = profile::create_profile(&state.pool, auth.user.user_id, &auth.user.email, &body)
        .await
        .localized(locale)?;
    tracing::info!(profile_id = %created.id, role = %created.role, "profile created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    locale: RequestLocale,
    auth: AuthUser,
) -> Result<Json<Profile>, ApiError> {
    let found = profile::get_profile(&state.pool, auth.user.user_id)
        .await
        .localized(locale)?;
    Ok(Json(found))
}

/// `PUT /api/profile/kyc`
pub async fn submit_kyc(
    State(state): State<AppState>,
    locale: RequestLocale,
    auth: AuthUser,
    JsonBody(body): JsonBody<KycSubmission>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = profile::submit_kyc(&state.pool, auth.user.user_id, &body)
        .await
        .localized(locale)?;
    Ok(notice(locale, "notice_kyc_submitted", updated))
}
