// src/handlers/service_centres.rs

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
#[serde(rename_all = "camelCase")]
pub struct CreateServiceCentrePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceCentrePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
}

// POST /api/service-centres
pub async fn create_service_centre(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateServiceCentrePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let data = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let centre = app_state.service_centre_repo.create(data).await?;

    Ok((StatusCode::CREATED, Json(centre)))
}

// GET /api/service-centres
pub async fn list_service_centres(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let centres = app_state.service_centre_repo.list().await?;
    Ok((StatusCode::OK, Json(centres)))
}

// PUT /api/service-centres/{id}
pub async fn update_service_centre(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateServiceCentrePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let centre = app_state.service_centre_repo.update(&id, patch).await?;

    Ok((StatusCode::OK, Json(centre)))
}

// DELETE /api/service-centres/{id}
pub async fn delete_service_centre(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.service_centre_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
