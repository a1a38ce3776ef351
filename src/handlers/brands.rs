// src/handlers/brands.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct BrandPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
}

// POST /api/brands
pub async fn create_brand(
    State(app_state): State<AppState>,
    Json(payload): Json<BrandPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let data = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let brand = app_state.brand_repo.create(data).await?;

    Ok((StatusCode::CREATED, Json(brand)))
}

// GET /api/brands
pub async fn list_brands(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let brands = app_state.brand_repo.list().await?;
    Ok((StatusCode::OK, Json(brands)))
}

// PUT /api/brands/{id}
pub async fn update_brand(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<BrandPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let brand = app_state.brand_repo.update(&id, patch).await?;

    Ok((StatusCode::OK, Json(brand)))
}

// DELETE /api/brands/{id}
pub async fn delete_brand(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.brand_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
