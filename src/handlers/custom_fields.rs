// src/handlers/custom_fields.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, models::custom_field::CustomFieldType,
};

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomFieldPayload {
    /// Chave estável referenciada pelos produtos dos RMAs
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    pub label: String,

    #[serde(rename = "type")]
    pub field_type: CustomFieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// O patch não aceita `name`: renomear a chave deixaria órfãos os
// valores já gravados nos produtos.
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomFieldPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "required"))]
    pub label: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<CustomFieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// POST /api/custom-fields
pub async fn create_custom_field(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCustomFieldPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let data = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let field = app_state.custom_field_repo.create(data).await?;

    Ok((StatusCode::CREATED, Json(field)))
}

// GET /api/custom-fields
pub async fn list_custom_fields(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let fields = app_state.custom_field_repo.list().await?;
    Ok((StatusCode::OK, Json(fields)))
}

// PUT /api/custom-fields/{id}
pub async fn update_custom_field(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCustomFieldPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let field = app_state.custom_field_repo.update(&id, patch).await?;

    Ok((StatusCode::OK, Json(field)))
}

// DELETE /api/custom-fields/{id}
pub async fn delete_custom_field(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Valores já gravados nos produtos permanecem; só a definição some.
    app_state.custom_field_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
