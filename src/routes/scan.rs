//! Scan and verification routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! `POST /api/scan` is public. Every scan passes the in-memory rate limiter
//! first, keyed by profile id for signed-in callers and by a hash of the
//! forwarded client address otherwise. Raw addresses are not stored.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use sha2::{Digest, Sha256};

use super::auth::{MaybeAuthUser, ProfileUser};
use super::error::{ApiError, JsonBody, Localize};
use crate::domain::UserRole;
use crate::i18n::RequestLocale;
use crate::services::qr::{self, QrLookup};
use crate::services::session::bytes_to_hex;
use crate::services::verification::{self, ScanRequest, VerificationRecord};
use crate::state::AppState;

/// Rate-limit key for a scan request.
pub(crate) fn client_key(profile_id: Option<uuid::Uuid>, headers: &HeaderMap) -> String {
    if let Some(id) = profile_id {
        return format!("profile:{id}");
    }
    let address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown");
    let digest = Sha256::digest(address.as_bytes());
    format!("addr:{}", bytes_to_hex(&digest[..16]))
}

/// `POST /api/scan`
pub async fn scan(
    State(state): State<AppState>,
    locale: RequestLocale,
    MaybeAuthUser(auth): MaybeAuthUser,
    headers: HeaderMap,
    JsonBody(body): JsonBody<ScanRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile_id = auth.as_ref().and_then(|a| a.user.profile_id);
    state
        .scan_limiter
        .check_and_record(&client_key(profile_id, &headers))
        .localized(locale)?;

    let outcome = verification::scan(&state.pool, profile_id, &body).await.localized(locale)?;
    Ok(Json(serde_json::json!({
        "message": locale.t("product_verified"),
        "status_label": locale.t(outcome.batch.status.label_key()),
        "data": outcome,
    })))
}

/// `GET /api/qr/{code}`: public lookup of the batch behind a code.
pub async fn lookup_qr(
    State(state): State<AppState>,
    locale: RequestLocale,
    Path(code): Path<String>,
) -> Result<Json<QrLookup>, ApiError> {
    let found = qr::lookup(&state.pool, &code).await.localized(locale)?;
    Ok(Json(found))
}

/// `GET /api/verifications` (consumer)
pub async fn list_verifications(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
) -> Result<Json<Vec<VerificationRecord>>, ApiError> {
    user.require(UserRole::Consumer, locale)?;
    let records = verification::list_verifications(&state.pool, user.profile_id)
        .await
        .localized(locale)?;
    Ok(Json(records))
}
