//! Auth routes: email access-code login, session cookie, role extractors.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use super::error::{ApiError, JsonBody, Localize};
use crate::domain::UserRole;
use crate::i18n::RequestLocale;
use crate::services::{email_auth, session};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";
const SESSION_DAYS: i64 = 30;

pub(crate) fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(SESSION_DAYS))
        .build()
}

pub(crate) fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

async fn resolve_session<S>(parts: &Parts, state: &S) -> Result<Option<AuthUser>, sqlx::Error>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
    if token.is_empty() {
        return Ok(None);
    }
    let app_state = AppState::from_ref(state);
    let user = session::validate_session(&app_state.pool, token).await?;
    Ok(user.map(|user| AuthUser { user, token: token.to_owned() }))
}

// =============================================================================
// AUTH EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(locale) = RequestLocale::from_request_parts(parts, state).await;
        match resolve_session(parts, state).await {
            Ok(Some(auth)) => Ok(auth),
            Ok(None) => Err(ApiError::unauthorized(locale)),
            Err(e) => {
                tracing::error!(error = %e, "session lookup failed");
                Err(ApiError::internal(locale))
            }
        }
    }
}

/// Session if one is presented and valid. Never rejects for a missing or
/// stale cookie; used by the public scan endpoint.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state).await {
            Ok(auth) => Ok(Self(auth)),
            Err(e) => {
                tracing::error!(error = %e, "session lookup failed");
                let Ok(locale) = RequestLocale::from_request_parts(parts, state).await;
                Err(ApiError::internal(locale))
            }
        }
    }
}

/// Authenticated user who has completed onboarding.
#[derive(Debug, Clone)]
pub struct ProfileUser {
    pub profile_id: Uuid,
    pub role: UserRole,
    pub full_name: String,
}

impl ProfileUser {
    /// Reject with 403 unless the caller has `role`.
    ///
    /// # Errors
    ///
    /// Returns a localized forbidden error.
    pub fn require(&self, role: UserRole, locale: RequestLocale) -> Result<(), ApiError> {
        self.require_any(&[role], locale)
    }

    /// # Errors
    ///
    /// Returns a localized forbidden error.
    pub fn require_any(&self, roles: &[UserRole], locale: RequestLocale) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            tracing::debug!(profile_id = %self.profile_id, role = %self.role, "role check failed");
            Err(ApiError::forbidden(locale))
        }
    }

    #[must_use]
    pub fn actor(&self) -> crate::services::batch::Actor {
        crate::services::batch::Actor { profile_id: self.profile_id, role: self.role }
    }
}

impl<S> FromRequestParts<S> for ProfileUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let Some((profile_id, role)) = auth.user.profile() else {
            let Ok(locale) = RequestLocale::from_request_parts(parts, state).await;
            return Err(ApiError::profile_required(locale));
        };
        Ok(Self { profile_id, role, full_name: auth.user.full_name.unwrap_or_default() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct RequestCodeBody {
    pub email: String,
}

#[derive(Serialize)]
pub struct RequestCodeResponse {
    pub ok: bool,
    pub message: String,
    /// Present only when `EMAIL_AUTH_DEV_ECHO` is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// `POST /api/auth/email/request-code`: issue and deliver a login code.
pub async fn request_code(
    State(state): State<AppState>,
    locale: RequestLocale,
    JsonBody(body): JsonBody<RequestCodeBody>,
) -> Result<Json<RequestCodeResponse>, ApiError> {
    let (email, code) = email_auth::request_access_code(&state.pool, &body.email)
        .await
        .localized(locale)?;

    match &state.mailer {
        Some(mailer) => mailer
            .send_login_code(&email, &code, locale.0)
            .await
            .localized(locale)?,
        None if state.config.email_dev_echo => {}
        None => tracing::warn!(%email, "mail not configured; login code was not delivered"),
    }
    tracing::info!(%email, "login code issued");

    Ok(Json(RequestCodeResponse {
        ok: true,
        message: locale.t("notice_code_sent").to_owned(),
        code: state.config.email_dev_echo.then_some(code),
    }))
}

#[derive(Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    pub code: String,
}

/// `POST /api/auth/email/verify-code`: exchange a code for a session cookie.
pub async fn verify_code(
    State(state): State<AppState>,
    locale: RequestLocale,
    jar: CookieJar,
    JsonBody(body): JsonBody<VerifyCodeBody>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = email_auth::verify_access_code(&state.pool, &body.email, &body.code)
        .await
        .localized(locale)?;
    let token = session::create_session(&state.pool, user_id)
        .await
        .localized(locale)?;
    let user = session::validate_session(&state.pool, &token)
        .await
        .localized(locale)?
        .ok_or_else(|| ApiError::internal(locale))?;

    tracing::info!(%user_id, "session created");
    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((jar, Json(user)))
}

/// `GET /api/auth/me`: return current user and profile summary.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout`: delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "session delete failed on logout");
    }
    let jar = CookieJar::new().add(cleared_session_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
