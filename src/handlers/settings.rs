// src/handlers/settings.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::{
    common::error::AppError, config::AppState, models::settings::CompanyInfo,
};

// Patch parcial: flags ausentes mantêm o valor gravado
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_info: Option<CompanyInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_otp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_assign: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
}

// GET /api/settings
pub async fn get_settings(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_repo.get_or_default().await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let patch = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    let settings = app_state.settings_repo.update(patch).await?;
    Ok((StatusCode::OK, Json(settings)))
}
