// src/handlers/contacts.rs

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
pub struct CreateContactPayload {
    #[validate(length(min = 1, message = "required"))]
    pub company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// Patch parcial: só os campos presentes são aplicados
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "required"))]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "required"))]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// POST /api/contacts
pub async fn create_contact(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let data = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let contact = app_state.contact_repo.create(data).await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

// GET /api/contacts
pub async fn list_contacts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let contacts = app_state.contact_repo.list().await?;
    Ok((StatusCode::OK, Json(contacts)))
}

// PUT /api/contacts/{id}
pub async fn update_contact(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let contact = app_state.contact_repo.update(&id, patch).await?;

    Ok((StatusCode::OK, Json(contact)))
}

// DELETE /api/contacts/{id}
pub async fn delete_contact(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Sem enforcement de cascata: RMAs existentes guardam snapshot do
    // contato e continuam íntegros.
    app_state.contact_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
