// src/common/error.rs

use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// A taxonomia tem três famílias: validação, store e notificação.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erros de validação do fluxo de RMA (seleção vazia, OTP errado, centro
    // de serviço ausente...). A mensagem é exatamente o que o operador vê.
    #[error("{0}")]
    WorkflowValidation(String),

    // Erros de campos personalizados: chave do campo -> código do erro
    #[error("Campos personalizados inválidos")]
    CustomFieldValidation(HashMap<String, String>),

    #[error("{0}")]
    NotFound(String),

    // O document store é um colaborador externo: qualquer falha vira um
    // "store unavailable" genérico e a ação é abortada sem mutação parcial.
    #[error("Store indisponível: {0}")]
    StoreUnavailable(String),

    // Falha de e-mail depois de esgotar o provedor de fallback. Quase nunca
    // é fatal: nos fluxos de status vira só um aviso na resposta.
    #[error("Email sending failed with both providers: {0}")]
    EmailError(String),

    #[error("Erro ao gerar o PDF: {0}")]
    PdfError(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn workflow(msg: impl Into<String>) -> Self {
        AppError::WorkflowValidation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(collection, id) => {
                AppError::NotFound(format!("Record '{id}' not found in '{collection}'."))
            }
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação do payload.
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::CustomFieldValidation(details) => {
                let body = Json(json!({
                    "error": "One or more custom fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::WorkflowValidation(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::NotFound(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::StoreUnavailable(ref e) => {
                tracing::error!("Document store indisponível: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable. Please try again.")
            }
            AppError::EmailError(ref e) => {
                tracing::error!("Falha no envio de e-mail: {}", e);
                (StatusCode::BAD_GATEWAY, "Email sending failed with both providers.")
            }
            // Todos os outros erros viram 500. O `tracing` loga a mensagem
            // detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
