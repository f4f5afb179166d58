//! Dashboard route.

use axum::extract::State;
use axum::response::Json;

use super::auth::ProfileUser;
use super::error::{ApiError, Localize};
use crate::i18n::RequestLocale;
use crate::services::dashboard::{self, Dashboard};
use crate::state::AppState;

/// `GET /api/dashboard`: role stats and the localized navigation menu.
pub async fn get_dashboard(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
) -> Result<Json<Dashboard>, ApiError> {
    let view = dashboard::load_dashboard(&state.pool, user.profile_id, user.full_name, user.role, locale.0)
        .await
        .localized(locale)?;
    Ok(Json(view))
}
