use super::*;
use crate::state::test_helpers;
use axum::body::Body;
use axum::http::{Request, header};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// =============================================================================
// COOKIES
// =============================================================================

#[test]
fn session_cookie_is_http_only_and_long_lived() {
    let cookie = session_cookie("abc".into(), true);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "abc");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.max_age(), Some(Duration::days(30)));
}

#[test]
fn cleared_cookie_expires_immediately() {
    let cookie = cleared_session_cookie(false);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    assert_eq!(cookie.secure(), Some(false));
}

// =============================================================================
// ROLE CHECKS
// =============================================================================

fn profile_user(role: UserRole) -> ProfileUser {
    ProfileUser { profile_id: Uuid::new_v4(), role, full_name: "Asha".into() }
}

#[test]
fn require_accepts_matching_role() {
    let locale = RequestLocale(crate::i18n::Locale::En);
    assert!(profile_user(UserRole::Farmer).require(UserRole::Farmer, locale).is_ok());
    assert!(
        profile_user(UserRole::Distributor)
            .require_any(&[UserRole::Farmer, UserRole::Distributor], locale)
            .is_ok()
    );
}

#[test]
fn require_rejects_other_roles_with_403() {
    let locale = RequestLocale(crate::i18n::Locale::En);
    let err = profile_user(UserRole::Consumer).require(UserRole::Farmer, locale).unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
    assert_eq!(err.code, "E_FORBIDDEN");
}

#[test]
fn actor_carries_profile_and_role() {
    let user = profile_user(UserRole::Distributor);
    let actor = user.actor();
    assert_eq!(actor.profile_id, user.profile_id);
    assert_eq!(actor.role, UserRole::Distributor);
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl crate::services::mailer::Mailer for RecordingMailer {
    async fn send_login_code(
        &self,
        to_email: &str,
        code: &str,
        _locale: crate::i18n::Locale,
    ) -> Result<(), crate::services::mailer::MailError> {
        self.sent.lock().unwrap().push((to_email.to_owned(), code.to_owned()));
        Ok(())
    }
}

#[tokio::test]
async fn request_code_rejects_invalid_email_before_mailing() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = crate::routes::app(test_helpers::test_app_state_with_mailer(mailer.clone()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/email/request-code")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"not-an-email"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn logout_without_session_is_unauthorized() {
    let app = crate::routes::app(test_helpers::test_app_state());
    let response = app
        .oneshot(Request::builder().method("POST").uri("/api/auth/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn maybe_auth_without_cookie_is_anonymous() {
    let state = test_helpers::test_app_state();
    let (mut parts, ()) = Request::builder().uri("/api/scan").body(()).unwrap().into_parts();
    let MaybeAuthUser(auth) = MaybeAuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert!(auth.is_none());
}
