//! Email access-code auth service.
//!
//! Creates and verifies short-lived six-character codes linked to an email.
//! Only a SHA-256 hash of each code is stored.

use axum::http::StatusCode;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::session::bytes_to_hex;

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MAX_FAILED_ATTEMPTS: i32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum EmailAuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid code")]
    InvalidCode,
    #[error("expired or incorrect code")]
    VerificationFailed,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for EmailAuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "E_INVALID_EMAIL",
            Self::InvalidCode => "E_INVALID_CODE",
            Self::VerificationFailed => "E_LOGIN_FAILED",
            Self::Db(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEmail | Self::InvalidCode => StatusCode::BAD_REQUEST,
            Self::VerificationFailed => StatusCode::UNAUTHORIZED,
            Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            Self::VerificationFailed => "error_login_failed",
            _ => crate::error::default_message_key(self.status()),
        }
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn normalize_code(code: &str) -> Option<String> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.len() != CODE_LEN || !normalized.bytes().all(|c| CODE_ALPHABET.contains(&c)) {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn generate_access_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[must_use]
pub fn hash_access_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Issue a fresh code for `email`, invalidating any outstanding one.
/// Returns the normalized address and the plaintext code for delivery.
pub async fn request_access_code(pool: &PgPool, email: &str) -> Result<(String, String), EmailAuthError> {
    let normalized = normalize_email(email).ok_or(EmailAuthError::InvalidEmail)?;

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO users (email) VALUES ($1) ON CONFLICT (email) DO NOTHING")
        .bind(&normalized)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM email_login_codes WHERE email = $1 AND consumed_at IS NULL")
        .bind(&normalized)
        .execute(&mut *tx)
        .await?;

    let code = generate_access_code();
    sqlx::query("INSERT INTO email_login_codes (email, code_hash) VALUES ($1, $2)")
        .bind(&normalized)
        .bind(hash_access_code(&code))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((normalized, code))
}

/// Consume the latest live code for `email`. Returns the user id on success.
///
/// A wrong guess increments the attempt counter; the code is burned after
/// [`MAX_FAILED_ATTEMPTS`] failures.
pub async fn verify_access_code(pool: &PgPool, email: &str, code: &str) -> Result<Uuid, EmailAuthError> {
    let normalized_email = normalize_email(email).ok_or(EmailAuthError::InvalidEmail)?;
    let normalized_code = normalize_code(code).ok_or(EmailAuthError::InvalidCode)?;
    let code_hash = hash_access_code(&normalized_code);

    let update = sqlx::query(
        r"UPDATE email_login_codes
          SET consumed_at = now()
          WHERE id = (
              SELECT id
              FROM email_login_codes
              WHERE email = $1
                AND consumed_at IS NULL
                AND expires_at > now()
              ORDER BY created_at DESC
              LIMIT 1
          )
          AND code_hash = $2
          RETURNING id",
    )
    .bind(&normalized_email)
    .bind(&code_hash)
    .fetch_optional(pool)
    .await?;

    if update.is_none() {
        sqlx::query(
            r"UPDATE email_login_codes
              SET attempts = attempts + 1,
                  consumed_at = CASE WHEN attempts + 1 >= $2 THEN now() ELSE consumed_at END
              WHERE id = (
                  SELECT id
                  FROM email_login_codes
                  WHERE email = $1
                    AND consumed_at IS NULL
                    AND expires_at > now()
                  ORDER BY created_at DESC
                  LIMIT 1
              )",
        )
        .bind(&normalized_email)
        .bind(MAX_FAILED_ATTEMPTS)
        .execute(pool)
        .await?;
        return Err(EmailAuthError::VerificationFailed);
    }

    let user_row = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&normalized_email)
        .fetch_optional(pool)
        .await?
        .ok_or(EmailAuthError::VerificationFailed)?;

    Ok(user_row.get("id"))
}

#[cfg(test)]
#[path = "email_auth_test.rs"]
mod tests;
