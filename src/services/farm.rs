//! Farm service. A farmer's registered plots.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::validate;
use crate::error::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum FarmError {
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("farm not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for FarmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_VALIDATION",
            Self::NotFound(_) => "E_FARM_NOT_FOUND",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Farm {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    pub location: String,
    pub area_hectares: Option<f64>,
    pub certification_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of the add / edit farm form.
#[derive(Debug, Clone, Deserialize)]
pub struct FarmInput {
    pub name: String,
    pub location: String,
    pub area_hectares: Option<f64>,
    pub certification_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidFarm {
    pub name: String,
    pub location: String,
    pub area_hectares: Option<f64>,
    pub certification_type: Option<String>,
}

impl FarmInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<ValidFarm, FieldError> {
        let name = validate::required("name", &self.name)?;
        let location = validate::required("location", &self.location)?;
        if let Some(area) = self.area_hectares {
            if !area.is_finite() || area < 0.0 {
                return Err(FieldError::new("area_hectares", "must be zero or more"));
            }
        }
        Ok(ValidFarm {
            name,
            location,
            area_hectares: self.area_hectares,
            certification_type: validate::optional(self.certification_type.as_deref()),
        })
    }
}

const FARM_COLUMNS: &str = "id, farmer_id, name, location, area_hectares, certification_type, created_at";

pub async fn list_farms(pool: &PgPool, farmer_id: Uuid) -> Result<Vec<Farm>, FarmError> {
    let sql = format!("SELECT {FARM_COLUMNS} FROM farms WHERE farmer_id = $1 ORDER BY created_at DESC");
    Ok(sqlx::query_as::<_, Farm>(&sql)
        .bind(farmer_id)
        .fetch_all(pool)
        .await?)
}

pub async fn create_farm(pool: &PgPool, farmer_id: Uuid, input: &FarmInput) -> Result<Farm, FarmError> {
    let valid = input.validate()?;
    let sql = format!(
        "INSERT INTO farms (farmer_id, name, location, area_hectares, certification_type)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {FARM_COLUMNS}"
    );
    let farm = sqlx::query_as::<_, Farm>(&sql)
        .bind(farmer_id)
        .bind(&valid.name)
        .bind(&valid.location)
        .bind(valid.area_hectares)
        .bind(&valid.certification_type)
        .fetch_one(pool)
        .await?;

    tracing::info!(farm_id = %farm.id, %farmer_id, "farm added");
    Ok(farm)
}

/// Update a farm owned by `farmer_id`. Farms of other farmers read as missing.
pub async fn update_farm(pool: &PgPool, farmer_id: Uuid, farm_id: Uuid, input: &FarmInput) -> Result<Farm, FarmError> {
    let valid = input.validate()?;
    let sql = format!(
        "UPDATE farms
         SET name = $3, location = $4, area_hectares = $5, certification_type = $6
         WHERE id = $1 AND farmer_id = $2
         RETURNING {FARM_COLUMNS}"
    );
    sqlx::query_as::<_, Farm>(&sql)
        .bind(farm_id)
        .bind(farmer_id)
        .bind(&valid.name)
        .bind(&valid.location)
        .bind(valid.area_hectares)
        .bind(&valid.certification_type)
        .fetch_optional(pool)
        .await?
        .ok_or(FarmError::NotFound(farm_id))
}

pub async fn count_farms(pool: &PgPool, farmer_id: Uuid) -> Result<i64, FarmError> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM farms WHERE farmer_id = $1")
        .bind(farmer_id)
        .fetch_one(pool)
        .await?)
}

#[cfg(test)]
#[path = "farm_test.rs"]
mod tests;
