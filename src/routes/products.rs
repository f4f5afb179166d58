//! Product catalogue routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use super::auth::ProfileUser;
use super::error::{ApiError, JsonBody, Localize};
use crate::i18n::RequestLocale;
use crate::services::product::{self, Product, ProductInput};
use crate::state::AppState;

/// `GET /api/products`: public catalogue, alphabetical.
pub async fn list_products(
    State(state): State<AppState>,
    locale: RequestLocale,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = product::list_products(&state.pool).await.localized(locale)?;
    Ok(Json(products))
}

/// `POST /api/products`: farmers and distributors extend the catalogue.
pub async fn create_product(
    State(state): State<AppState>,
    locale: RequestLocale,
    user: ProfileUser,
    JsonBody(body): JsonBody<ProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    if !user.role.can_edit_catalogue() {
        return Err(ApiError::forbidden(locale));
    }
    let created = product::create_product(&state.pool, &body).await.localized(locale)?;
    Ok((StatusCode::CREATED, Json(created)))
}
