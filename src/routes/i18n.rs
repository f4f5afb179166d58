//! Translation routes.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use time::Duration;

use super::error::ApiError;
use crate::i18n::{LANG_COOKIE, Locale, RequestLocale, table};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LocaleInfo {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LocalesResponse {
    pub current: &'static str,
    pub locales: Vec<LocaleInfo>,
}

/// `GET /api/i18n`: supported locales and the one negotiated for this request.
pub async fn list_locales(locale: RequestLocale) -> Json<LocalesResponse> {
    Json(LocalesResponse {
        current: locale.0.code(),
        locales: Locale::ALL
            .iter()
            .map(|l| LocaleInfo { code: l.code(), name: l.native_name() })
            .collect(),
    })
}

/// `GET /api/i18n/{locale}`: full translation table.
pub async fn get_table(
    locale: RequestLocale,
    Path(code): Path<String>,
) -> Result<Json<BTreeMap<&'static str, &'static str>>, ApiError> {
    let requested = Locale::parse(&code)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "E_UNSUPPORTED_LOCALE", locale))?;
    Ok(Json(table(requested)))
}

/// `PUT /api/i18n/{locale}`: remember the language choice in a cookie.
pub async fn set_locale(
    State(state): State<AppState>,
    locale: RequestLocale,
    jar: CookieJar,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let chosen = Locale::parse(&code)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "E_UNSUPPORTED_LOCALE", locale))?;
    let cookie = Cookie::build((LANG_COOKIE, chosen.code()))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(Duration::days(365))
        .build();
    Ok((jar.add(cookie), StatusCode::NO_CONTENT))
}
