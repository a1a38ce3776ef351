// src/handlers/rmas.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::rma::{ProductStatus, RmaCase},
    services::rma_service::{
        DeliverRequest, MarkReadyRequest, NewRmaRequest, SendToServiceCentreRequest, WorkflowResult,
    },
};

/// Envelope das ações de fluxo: o case gravado mais o aviso de
/// notificação, quando o e-mail não saiu.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    #[serde(flatten)]
    pub case: RmaCase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_warning: Option<String>,
}

impl From<WorkflowResult> for WorkflowResponse {
    fn from(result: WorkflowResult) -> Self {
        Self {
            notification_warning: result.notification.warning(),
            case: result.case,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkPayload {
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsPayload {
    #[serde(default)]
    pub comments: String,
}

// POST /api/rmas
pub async fn create_rma(
    State(app_state): State<AppState>,
    Json(payload): Json<NewRmaRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let result = app_state.rma_service.create_case(payload).await?;
    Ok((StatusCode::CREATED, Json(WorkflowResponse::from(result))))
}

// GET /api/rmas
pub async fn list_rmas(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cases = app_state.rma_service.list_cases().await?;
    Ok((StatusCode::OK, Json(cases)))
}

// GET /api/rmas/search?q=
pub async fn search_rmas(
    State(app_state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.rma_service.search(&params.q).await?;
    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/rmas/stage/{status}
pub async fn list_rmas_by_stage(
    State(app_state): State<AppState>,
    Path(stage): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stage: ProductStatus = stage
        .parse()
        .map_err(|_| AppError::workflow(format!("'{stage}' is not a valid status.")))?;

    let cases = app_state.rma_service.list_by_stage(stage).await?;
    Ok((StatusCode::OK, Json(cases)))
}

// GET /api/rmas/{id}
pub async fn get_rma(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.rma_service.get_case(&id).await?;
    Ok((StatusCode::OK, Json(case)))
}

// DELETE /api/rmas/{id}
pub async fn delete_rma(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.rma_service.delete_case(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/rmas/{id}/pdf
pub async fn download_rma_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.rma_service.get_case(&id).await?;
    let settings = app_state.settings_repo.get_or_default().await?;

    let bytes = app_state.pdf_service.render_case(&case, &settings.company_info)?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"RMA-{}.pdf\"", case.id),
        ),
    ];
    Ok((StatusCode::OK, headers, bytes))
}

// POST /api/rmas/{id}/send-to-service-centre
pub async fn send_to_service_centre(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SendToServiceCentreRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let result = app_state.rma_service.send_to_service_centre(&id, payload).await?;
    Ok((StatusCode::OK, Json(WorkflowResponse::from(result))))
}

// POST /api/rmas/{id}/mark-ready
pub async fn mark_ready(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MarkReadyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state.rma_service.mark_ready(&id, payload).await?;
    Ok((StatusCode::OK, Json(WorkflowResponse::from(result))))
}

// POST /api/rmas/{id}/deliver
pub async fn deliver(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<DeliverRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state.rma_service.deliver(&id, payload).await?;
    Ok((StatusCode::OK, Json(WorkflowResponse::from(result))))
}

// POST /api/rmas/{id}/products/{productId}/resend-otp
pub async fn resend_otp(
    State(app_state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state.rma_service.resend_otp(&id, &product_id).await?;
    Ok((StatusCode::OK, Json(WorkflowResponse::from(result))))
}

// PUT /api/rmas/{id}/products/{productId}/remark
pub async fn update_remark(
    State(app_state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
    Json(payload): Json<RemarkPayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.rma_service.update_remark(&id, &product_id, payload.remark).await?;
    Ok((StatusCode::OK, Json(case)))
}

// PUT /api/rmas/{id}/comments
pub async fn update_comments(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CommentsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.rma_service.update_comments(&id, payload.comments).await?;
    Ok((StatusCode::OK, Json(case)))
}
