//! JSON error responses.
//!
//! ERROR HANDLING
//! ==============
//! Handlers return `Result<_, ApiError>`. Any service error implementing
//! [`ErrorCode`] converts through [`Localize::localized`], which picks the
//! HTTP status and grepable code from the error and renders the message in
//! the request locale. Server-side failures are logged here, once, and the
//! client only sees the generic localized message.
//!
//! Body shape: `{"error": {"code", "message", "detail"?, "retryable"}, "status"}`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{ErrorCode, default_message_key};
use crate::i18n::RequestLocale;
use crate::state::AppState;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    /// Technical detail for client-side errors; never set for 5xx.
    pub detail: Option<String>,
    pub retryable: bool,
}

impl ApiError {
    /// Build from a service error, localizing its message.
    pub fn from_error<E: ErrorCode>(err: &E, locale: RequestLocale) -> Self {
        let status = err.status();
        let detail = if status.is_server_error() {
            tracing::error!(code = err.error_code(), error = %err, "request failed");
            None
        } else {
            tracing::debug!(code = err.error_code(), error = %err, "request rejected");
            Some(err.to_string())
        };
        Self {
            status,
            code: err.error_code(),
            message: locale.t(err.message_key()).to_owned(),
            detail,
            retryable: err.retryable(),
        }
    }

    pub fn new(status: StatusCode, code: &'static str, locale: RequestLocale) -> Self {
        Self {
            status,
            code,
            message: locale.t(default_message_key(status)).to_owned(),
            detail: None,
            retryable: false,
        }
    }

    pub fn unauthorized(locale: RequestLocale) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "E_UNAUTHORIZED", locale)
    }

    pub fn forbidden(locale: RequestLocale) -> Self {
        Self::new(StatusCode::FORBIDDEN, "E_FORBIDDEN", locale)
    }

    pub fn profile_required(locale: RequestLocale) -> Self {
        Self { message: locale.t("error_profile_required").to_owned(), ..Self::forbidden(locale) }
            .with_code("E_PROFILE_REQUIRED")
    }

    pub fn internal(locale: RequestLocale) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "E_INTERNAL", locale)
    }

    #[must_use]
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "code": self.code,
            "message": self.message,
            "retryable": self.retryable,
        });
        if let Some(detail) = self.detail {
            error["detail"] = json!(detail);
        }
        let body = json!({ "error": error, "status": self.status.as_u16() });
        (self.status, Json(body)).into_response()
    }
}

/// Attach the request locale to a service result.
pub trait Localize<T> {
    /// # Errors
    ///
    /// Converts the service error into a localized [`ApiError`].
    fn localized(self, locale: RequestLocale) -> Result<T, ApiError>;
}

impl<T, E: ErrorCode> Localize<T> for Result<T, E> {
    fn localized(self, locale: RequestLocale) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::from_error(&err, locale))
    }
}

/// JSON request body whose rejections use the localized error envelope.
///
/// Missing fields, malformed JSON and a wrong content type all become
/// 400 `E_VALIDATION`, with the parser's message as `detail`.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Ok(locale) = RequestLocale::from_request_parts(&mut parts, state).await;
        match Json::<T>::from_request(Request::from_parts(parts, body), state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(body_rejected(&rejection, locale)),
        }
    }
}

fn body_rejected(rejection: &JsonRejection, locale: RequestLocale) -> ApiError {
    tracing::debug!(error = %rejection.body_text(), "request body rejected");
    ApiError {
        detail: Some(rejection.body_text()),
        ..ApiError::new(StatusCode::BAD_REQUEST, "E_VALIDATION", locale)
    }
}

/// Successful mutation with a localized confirmation for the client's toast.
pub fn notice<T: serde::Serialize>(locale: RequestLocale, key: &str, data: T) -> Json<serde_json::Value> {
    Json(json!({ "message": locale.t(key), "data": data }))
}
