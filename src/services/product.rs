//! Product catalogue service.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::validate;
use crate::error::{FieldError, is_unique_violation};

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("product already exists: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for ProductError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_VALIDATION",
            Self::Duplicate(_) => "E_PRODUCT_EXISTS",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl ProductInput {
    fn validate(&self) -> Result<ProductInput, FieldError> {
        let image_url = validate::optional(self.image_url.as_deref());
        if let Some(url) = image_url.as_deref() {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(FieldError::new("image_url", "must be an http(s) URL"));
            }
        }
        Ok(ProductInput {
            name: validate::required("name", &self.name)?,
            category: validate::required("category", &self.category)?,
            description: validate::optional(self.description.as_deref()),
            image_url,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, category, description, image_url, created_at";

/// All products, alphabetically.
pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, ProductError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");
    Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?)
}

pub async fn product_exists(pool: &PgPool, product_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
        .bind(product_id)
        .fetch_one(pool)
        .await
}

pub async fn create_product(pool: &PgPool, input: &ProductInput) -> Result<Product, ProductError> {
    let valid = input.validate()?;
    let sql = format!(
        "INSERT INTO products (name, category, description, image_url)
         VALUES ($1, $2, $3, $4)
         RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(&valid.name)
        .bind(&valid.category)
        .bind(&valid.description)
        .bind(&valid.image_url)
        .fetch_one(pool)
        .await
        .map_err(|e| if is_unique_violation(&e) { ProductError::Duplicate(valid.name.clone()) } else { e.into() })?;

    tracing::info!(product_id = %product.id, name = %product.name, "product added to catalogue");
    Ok(product)
}
