//! Outbound e-mail for login codes.
//!
//! The [`Mailer`] trait keeps the Resend client out of the auth flow so tests
//! can substitute a recording mailer.

use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

use crate::config::MailConfig;
use crate::i18n::{Locale, translate};

const LOGIN_CODE_TEMPLATE: &str = include_str!("../../templates/login_code.html");

#[derive(Debug, thiserror::Error)]
#[error("email delivery failed: {0}")]
pub struct MailError(pub String);

impl crate::error::ErrorCode for MailError {
    fn error_code(&self) -> &'static str {
        "E_MAIL_FAILED"
    }

    fn status(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::BAD_GATEWAY
    }

    fn retryable(&self) -> bool {
        true
    }
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a one-time login code.
    ///
    /// # Errors
    ///
    /// Returns a [`MailError`] if the provider rejects the message.
    async fn send_login_code(&self, to_email: &str, code: &str, locale: Locale) -> Result<(), MailError>;
}

/// [`Mailer`] backed by the Resend HTTP API.
pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    #[must_use]
    pub fn new(config: &MailConfig) -> Self {
        Self { client: Resend::new(&config.api_key), from: config.from.clone() }
    }
}

#[async_trait::async_trait]
impl Mailer for ResendMailer {
    async fn send_login_code(&self, to_email: &str, code: &str, locale: Locale) -> Result<(), MailError> {
        let subject = translate(locale, "email_code_title");
        let html = render_login_code(to_email, code, locale);
        let email = CreateEmailBaseOptions::new(&self.from, [to_email], subject).with_html(&html);
        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| MailError(e.to_string()))?;
        Ok(())
    }
}

#[must_use]
pub fn render_login_code(email: &str, code: &str, locale: Locale) -> String {
    LOGIN_CODE_TEMPLATE
        .replace("{{LANG}}", locale.code())
        .replace("{{TITLE}}", translate(locale, "email_code_title"))
        .replace("{{FOOTER}}", translate(locale, "email_code_footer"))
        .replace("{{EMAIL}}", email)
        .replace("{{CODE}}", code)
}
