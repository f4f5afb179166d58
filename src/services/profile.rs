//! Profile service: onboarding and KYC details.
//!
//! A signed-in user has no profile until they pick a role. The profile is
//! what every other table references (`farmer_id`, `actor_id`,
//! `consumer_id`), never the auth identity directly.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::validate;
use crate::domain::UserRole;
use crate::error::{FieldError, is_unique_violation};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("profile not found")]
    NotFound,
    #[error("profile already exists")]
    AlreadyExists,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for ProfileError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_VALIDATION",
            Self::NotFound => "E_PROFILE_NOT_FOUND",
            Self::AlreadyExists => "E_PROFILE_EXISTS",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            Self::NotFound => "error_profile_required",
            _ => crate::error::default_message_key(self.status()),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Validated onboarding input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfile {
    pub full_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl NewProfile {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<ValidProfile, FieldError> {
        let full_name = validate::required("full_name", &self.full_name)?;
        let role = UserRole::parse(&self.role).ok_or(FieldError::new("role", "unknown role"))?;
        let phone = match validate::optional(self.phone.as_deref()) {
            Some(raw) => Some(validate::phone("phone", &raw)?),
            None => None,
        };
        Ok(ValidProfile { full_name, role, phone, address: validate::optional(self.address.as_deref()) })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KycSubmission {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidKyc {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl KycSubmission {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<ValidKyc, FieldError> {
        let full_name = validate::required("full_name", &self.full_name)?;
        let phone = validate::phone("phone", &self.phone)?;
        let email = match validate::optional(self.email.as_deref()) {
            Some(raw) => Some(
                super::email_auth::normalize_email(&raw).ok_or(FieldError::new("email", "invalid email"))?,
            ),
            None => None,
        };
        Ok(ValidKyc { full_name, phone, email, address: validate::optional(self.address.as_deref()) })
    }
}

const PROFILE_COLUMNS: &str = "id, user_id, full_name, email, phone, address, role, created_at, updated_at";

/// Create the caller's profile. One per user.
pub async fn create_profile(
    pool: &PgPool,
    user_id: Uuid,
    email: &str,
    input: &NewProfile,
) -> Result<Profile, ProfileError> {
    let valid = input.validate()?;
    let sql = format!(
        "INSERT INTO profiles (user_id, full_name, email, phone, address, role)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {PROFILE_COLUMNS}"
    );
    sqlx::query_as::<_, Profile>(&sql)
        .bind(user_id)
        .bind(&valid.full_name)
        .bind(email)
        .bind(&valid.phone)
        .bind(&valid.address)
        .bind(valid.role)
        .fetch_one(pool)
        .await
        .map_err(|e| if is_unique_violation(&e) { ProfileError::AlreadyExists } else { e.into() })
}

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<Profile, ProfileError> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1");
    sqlx::query_as::<_, Profile>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ProfileError::NotFound)
}

/// Apply the KYC form to the caller's profile.
pub async fn submit_kyc(pool: &PgPool, user_id: Uuid, input: &KycSubmission) -> Result<Profile, ProfileError> {
    let valid = input.validate()?;
    let sql = format!(
        "UPDATE profiles
         SET full_name = $2,
             phone = $3,
             email = COALESCE($4, email),
             address = COALESCE($5, address),
             updated_at = now()
         WHERE user_id = $1
         RETURNING {PROFILE_COLUMNS}"
    );
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(user_id)
        .bind(&valid.full_name)
        .bind(&valid.phone)
        .bind(&valid.email)
        .bind(&valid.address)
        .fetch_optional(pool)
        .await?
        .ok_or(ProfileError::NotFound)?;

    tracing::info!(profile_id = %profile.id, "kyc details submitted");
    Ok(profile)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
