//! Session management.
//!
//! ARCHITECTURE
//! ============
//! HTTP auth uses long-lived opaque session tokens stored in an HttpOnly
//! cookie. Validation joins the caller's profile so role checks need no
//! second round trip.

use std::fmt::Write;

use rand::Rng;
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::UserRole;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Caller identity resolved from a session token.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    /// Auth identity (`users.id`).
    pub user_id: Uuid,
    pub email: String,
    /// `profiles.id`, absent until onboarding is completed.
    pub profile_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
}

impl SessionUser {
    /// Profile id and role, if the caller has completed onboarding.
    #[must_use]
    pub fn profile(&self) -> Option<(Uuid, UserRole)> {
        self.profile_id.zip(self.role)
    }
}

/// Create a session for the given user, returning the token.
pub async fn create_session(pool: &PgPool, user_id: Uuid) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Validate a session token and return the associated user.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT u.id AS user_id, u.email, p.id AS profile_id, p.full_name, p.role
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          LEFT JOIN profiles p ON p.user_id = u.id
          WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| SessionUser {
        user_id: r.get("user_id"),
        email: r.get("email"),
        profile_id: r.get("profile_id"),
        full_name: r.get("full_name"),
        role: r.get("role"),
    }))
}

/// Delete a session by token.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove expired sessions and spent login codes. Returns rows deleted.
pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let sessions = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
        .execute(pool)
        .await?
        .rows_affected();
    let codes = sqlx::query("DELETE FROM email_login_codes WHERE expires_at <= now() OR consumed_at IS NOT NULL")
        .execute(pool)
        .await?
        .rows_affected();
    Ok(sessions + codes)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
