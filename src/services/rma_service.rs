// src/services/rma_service.rs
//
// Orquestração do ciclo de vida do RMA: cada ação é um read-modify-write
// lógico sobre o documento do case (lê, recalcula produtos + status
// agregado em memória, grava o documento inteiro) seguido da notificação.
// A escrita fica durável ANTES de qualquer tentativa de e-mail; falha de
// envio vira aviso, nunca rollback.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{
        ContactRepository, CustomFieldRepository, RmaRepository, ServiceCentreRepository,
        SettingsRepository,
    },
    models::{
        custom_field::{CustomFieldDefinition, CustomFieldValue},
        rma::{ProductLineItem, ProductStatus, RmaCase, StatusHistoryEntry},
    },
    services::{
        notification_service::{NotificationOutcome, NotificationService, RmaTransition},
        status_engine::{
            self, ServiceCentreRef, TransitionContext, advance_product, aggregate_status,
            select_products, validate_delivery_code,
        },
    },
};

// --- ENTRADAS ---

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProductRequest {
    #[validate(length(min = 1, message = "required"))]
    pub brand: String,
    #[validate(length(min = 1, message = "required"))]
    pub model_number: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub problems_reported: String,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRmaRequest {
    #[validate(length(min = 1, message = "required"))]
    pub contact_id: String,
    #[serde(default)]
    pub comments: String,
    // O formulário só submete produtos explicitamente salvos; aqui a regra
    // vira "pelo menos um produto".
    #[validate(length(min = 1, message = "at_least_one_product"))]
    #[validate(nested)]
    pub products: Vec<NewProductRequest>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendToServiceCentreRequest {
    pub product_ids: Vec<String>,
    #[validate(length(min = 1, message = "required"))]
    pub service_centre_id: String,
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadyRequest {
    pub product_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryConfirmation {
    pub product_id: String,
    #[serde(default)]
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverRequest {
    pub products: Vec<DeliveryConfirmation>,
}

// --- SAÍDAS ---

/// Resultado de uma ação de fluxo: o case já gravado + o desfecho da
/// notificação (que pode ter falhado sem afetar a gravação).
#[derive(Debug)]
pub struct WorkflowResult {
    pub case: RmaCase,
    pub notification: NotificationOutcome,
}

/// Uma linha de resultado de busca: um produto de um case, não o case
/// inteiro. Um case multi-produto pode render várias linhas.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RmaSearchRow {
    pub rma_id: String,
    pub product_id: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub brand: String,
    pub model_number: String,
    pub serial_number: String,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_centre_name: Option<String>,
}

// --- SERVIÇO ---

#[derive(Clone)]
pub struct RmaService {
    rma_repo: RmaRepository,
    contact_repo: ContactRepository,
    service_centre_repo: ServiceCentreRepository,
    custom_field_repo: CustomFieldRepository,
    settings_repo: SettingsRepository,
    notifications: NotificationService,
}

impl RmaService {
    pub fn new(
        rma_repo: RmaRepository,
        contact_repo: ContactRepository,
        service_centre_repo: ServiceCentreRepository,
        custom_field_repo: CustomFieldRepository,
        settings_repo: SettingsRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            rma_repo,
            contact_repo,
            service_centre_repo,
            custom_field_repo,
            settings_repo,
            notifications,
        }
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    pub async fn create_case(&self, req: NewRmaRequest) -> Result<WorkflowResult, AppError> {
        let definitions = self.custom_field_repo.list().await?;
        self.validate_custom_fields(&definitions, &req.products)?;

        // Snapshot do contato no momento da criação
        let contact = self.contact_repo.get(&req.contact_id).await?;

        let now = Utc::now();
        let products: Vec<ProductLineItem> = req
            .products
            .into_iter()
            .enumerate()
            .map(|(index, p)| ProductLineItem {
                id: (index + 1).to_string(),
                brand: p.brand,
                model_number: p.model_number,
                serial_number: p.serial_number,
                problems_reported: p.problems_reported,
                status: ProductStatus::Processing,
                service_centre_id: None,
                service_centre_name: None,
                remark: None,
                otp: None,
                is_ready: false,
                is_delivered: false,
                delivered_at: None,
                custom_fields: p.custom_fields,
            })
            .collect();

        let history = vec![StatusHistoryEntry {
            status: ProductStatus::Processing,
            timestamp: now,
            remark: Some("RMA created".to_string()),
            product_id: None,
        }];

        let draft = json!({
            "contactId": contact.id,
            "contactName": contact.name.clone().unwrap_or_default(),
            "contactEmail": contact.email,
            "contactPhone": contact.phone,
            "contactCompany": contact.company,
            "comments": req.comments,
            "products": products,
            "status": ProductStatus::Processing,
            "statusHistory": history,
        });

        let case = self.rma_repo.create(draft).await?;
        tracing::info!(rma_id = %case.id, products = case.products.len(), "RMA criado");

        let settings = self.settings_repo.get_or_default().await?;
        let notification = self
            .notifications
            .notify(&settings, &RmaTransition::Confirmation, &case, &case.products)
            .await;

        Ok(WorkflowResult { case, notification })
    }

    fn validate_custom_fields(
        &self,
        definitions: &[CustomFieldDefinition],
        products: &[NewProductRequest],
    ) -> Result<(), AppError> {
        // Mapa de erros: "products[i].<chave>" -> código do erro
        let mut errors: HashMap<String, String> = HashMap::new();

        for (index, product) in products.iter().enumerate() {
            for def in definitions {
                let value = product.custom_fields.get(&def.name);

                if def.required && value.is_none_or(|v| v.is_empty()) {
                    errors.insert(format!("products[{index}].{}", def.name), "required".to_string());
                    continue;
                }

                if let Some(value) = value {
                    if let Err(code) = def.validate_value(value) {
                        errors.insert(format!("products[{index}].{}", def.name), code.to_string());
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(AppError::CustomFieldValidation(errors));
        }
        Ok(())
    }

    // =========================================================================
    //  TRANSIÇÕES EM LOTE
    // =========================================================================

    pub async fn send_to_service_centre(
        &self,
        case_id: &str,
        req: SendToServiceCentreRequest,
    ) -> Result<WorkflowResult, AppError> {
        let case = self.rma_repo.get(case_id).await?;
        let selected = select_products(&case, &req.product_ids)?;

        let centre = self.service_centre_repo.get(&req.service_centre_id).await?;
        let ctx = TransitionContext {
            service_centre: Some(ServiceCentreRef { id: centre.id, name: centre.name }),
            remark: req.remark.clone(),
            batch_otp: None,
        };

        let now = Utc::now();
        let mut moved = Vec::with_capacity(selected.len());
        for product in selected {
            moved.push(advance_product(product, ProductStatus::InServiceCentre, &ctx, now)?);
        }

        let (case, changed) = self
            .commit_batch(case, moved, ProductStatus::InServiceCentre, req.remark)
            .await?;

        let settings = self.settings_repo.get_or_default().await?;
        let notification = self
            .notifications
            .notify(&settings, &RmaTransition::SentToServiceCentre, &case, &changed)
            .await;

        Ok(WorkflowResult { case, notification })
    }

    pub async fn mark_ready(
        &self,
        case_id: &str,
        req: MarkReadyRequest,
    ) -> Result<WorkflowResult, AppError> {
        let case = self.rma_repo.get(case_id).await?;
        let selected = select_products(&case, &req.product_ids)?;

        // OTP compartilhado: o mesmo código para todos os produtos do lote
        let otp = status_engine::generate_otp();
        let ctx = TransitionContext {
            service_centre: None,
            remark: None,
            batch_otp: Some(otp.clone()),
        };

        let now = Utc::now();
        let mut moved = Vec::with_capacity(selected.len());
        for product in selected {
            moved.push(advance_product(product, ProductStatus::Ready, &ctx, now)?);
        }

        let (case, changed) = self.commit_batch(case, moved, ProductStatus::Ready, None).await?;

        let settings = self.settings_repo.get_or_default().await?;
        let notification = self
            .notifications
            .notify(&settings, &RmaTransition::ReadyForDispatch { otp }, &case, &changed)
            .await;

        Ok(WorkflowResult { case, notification })
    }

    pub async fn deliver(
        &self,
        case_id: &str,
        req: DeliverRequest,
    ) -> Result<WorkflowResult, AppError> {
        if req.products.is_empty() {
            return Err(AppError::workflow("No products selected"));
        }

        let case = self.rma_repo.get(case_id).await?;
        let settings = self.settings_repo.get_or_default().await?;

        let now = Utc::now();
        let ctx = TransitionContext::default();
        let mut moved = Vec::with_capacity(req.products.len());
        for confirmation in &req.products {
            let product = case.product(&confirmation.product_id).ok_or_else(|| {
                AppError::not_found(format!(
                    "Product '{}' not found in RMA '{case_id}'.",
                    confirmation.product_id
                ))
            })?;

            // Nenhum produto é entregue se qualquer código do lote falhar
            validate_delivery_code(product, confirmation.otp.as_deref(), settings.require_otp)?;
            moved.push(advance_product(product, ProductStatus::Delivered, &ctx, now)?);
        }

        let (case, changed) = self.commit_batch(case, moved, ProductStatus::Delivered, None).await?;

        let notification = self
            .notifications
            .notify(&settings, &RmaTransition::Delivered, &case, &changed)
            .await;

        Ok(WorkflowResult { case, notification })
    }

    /// Aplica um lote de produtos atualizados: recalcula o status agregado,
    /// estende o histórico e grava o documento inteiro numa escrita só.
    ///
    /// Não há verificação de concorrência otimista: dois operadores no mesmo
    /// case podem se atropelar e a última escrita vence (lacuna herdada do
    /// sistema original, registrada no DESIGN.md).
    async fn commit_batch(
        &self,
        case: RmaCase,
        moved: Vec<ProductLineItem>,
        new_status: ProductStatus,
        remark: Option<String>,
    ) -> Result<(RmaCase, Vec<ProductLineItem>), AppError> {
        let now = Utc::now();
        let moved_by_id: HashMap<String, ProductLineItem> =
            moved.into_iter().map(|p| (p.id.clone(), p)).collect();

        let products: Vec<ProductLineItem> = case
            .products
            .iter()
            .map(|p| moved_by_id.get(&p.id).cloned().unwrap_or_else(|| p.clone()))
            .collect();

        let aggregate = aggregate_status(&products.iter().map(|p| p.status).collect::<Vec<_>>());

        let mut history = case.status_history.clone();
        for product_id in moved_by_id.keys() {
            history.push(StatusHistoryEntry {
                status: new_status,
                timestamp: now,
                remark: remark.clone(),
                product_id: Some(product_id.clone()),
            });
        }

        let patch = json!({
            "products": products,
            "status": aggregate,
            "statusHistory": history,
        });
        let case = self.rma_repo.update(&case.id, patch).await?;
        tracing::info!(
            rma_id = %case.id,
            moved = moved_by_id.len(),
            aggregate = %case.status,
            "status de RMA atualizado"
        );

        let changed: Vec<ProductLineItem> = case
            .products
            .iter()
            .filter(|p| moved_by_id.contains_key(&p.id))
            .cloned()
            .collect();
        Ok((case, changed))
    }

    // =========================================================================
    //  AÇÕES PONTUAIS
    // =========================================================================

    /// Troca o OTP de um produto `ready` e reenvia o e-mail com o código
    /// novo. O código antigo deixa de valer no momento da gravação.
    pub async fn resend_otp(
        &self,
        case_id: &str,
        product_id: &str,
    ) -> Result<WorkflowResult, AppError> {
        let case = self.rma_repo.get(case_id).await?;
        let product = case.product(product_id).ok_or_else(|| {
            AppError::not_found(format!("Product '{product_id}' not found in RMA '{case_id}'."))
        })?;

        let updated = status_engine::resend_otp(product)?;
        let otp = updated.otp.clone().unwrap_or_default();

        let products: Vec<ProductLineItem> = case
            .products
            .iter()
            .map(|p| if p.id == product_id { updated.clone() } else { p.clone() })
            .collect();

        let case = self.rma_repo.update(&case.id, json!({ "products": products })).await?;

        let settings = self.settings_repo.get_or_default().await?;
        let changed: Vec<ProductLineItem> =
            case.products.iter().filter(|p| p.id == product_id).cloned().collect();
        let notification = self
            .notifications
            .notify(&settings, &RmaTransition::ReadyForDispatch { otp }, &case, &changed)
            .await;

        Ok(WorkflowResult { case, notification })
    }

    pub async fn update_remark(
        &self,
        case_id: &str,
        product_id: &str,
        remark: String,
    ) -> Result<RmaCase, AppError> {
        let case = self.rma_repo.get(case_id).await?;
        if case.product(product_id).is_none() {
            return Err(AppError::not_found(format!(
                "Product '{product_id}' not found in RMA '{case_id}'."
            )));
        }

        let products: Vec<ProductLineItem> = case
            .products
            .iter()
            .map(|p| {
                let mut p = p.clone();
                if p.id == product_id {
                    p.remark = Some(remark.clone());
                }
                p
            })
            .collect();

        self.rma_repo.update(&case.id, json!({ "products": products })).await
    }

    pub async fn update_comments(&self, case_id: &str, comments: String) -> Result<RmaCase, AppError> {
        // Garante 404 para case inexistente antes do patch
        let case = self.rma_repo.get(case_id).await?;
        self.rma_repo.update(&case.id, json!({ "comments": comments })).await
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn get_case(&self, case_id: &str) -> Result<RmaCase, AppError> {
        self.rma_repo.get(case_id).await
    }

    pub async fn list_cases(&self) -> Result<Vec<RmaCase>, AppError> {
        self.rma_repo.list().await
    }

    /// Cases da aba de um estágio: qualquer produto naquele status.
    pub async fn list_by_stage(&self, stage: ProductStatus) -> Result<Vec<RmaCase>, AppError> {
        let cases = self.rma_repo.list().await?;
        Ok(cases
            .into_iter()
            .filter(|case| case.products.iter().any(|p| p.status == stage))
            .collect())
    }

    pub async fn delete_case(&self, case_id: &str) -> Result<(), AppError> {
        self.rma_repo.delete(case_id).await
    }

    /// Busca global: varredura linear, substring case-insensitive sobre os
    /// campos do contato, o id do case e os campos de cada produto. Cada
    /// produto que casa vira UMA linha (não uma linha por case). O telefone
    /// casa como digitado, sem normalização. Busca vazia não retorna nada.
    pub async fn search(&self, query: &str) -> Result<Vec<RmaSearchRow>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();

        let cases = self.rma_repo.list().await?;
        let mut rows = Vec::new();

        for case in cases {
            let contact_matches = case.contact_name.to_lowercase().contains(&needle)
                || case.contact_phone.contains(query)
                || case.contact_email.to_lowercase().contains(&needle)
                || case.id.to_lowercase().contains(&needle);

            for product in &case.products {
                let product_matches = product.brand.to_lowercase().contains(&needle)
                    || product.model_number.to_lowercase().contains(&needle)
                    || product.serial_number.to_lowercase().contains(&needle);

                if contact_matches || product_matches {
                    rows.push(RmaSearchRow {
                        rma_id: case.id.clone(),
                        product_id: product.id.clone(),
                        contact_name: case.contact_name.clone(),
                        contact_phone: case.contact_phone.clone(),
                        brand: product.brand.clone(),
                        model_number: product.model_number.clone(),
                        serial_number: product.serial_number.clone(),
                        status: product.status,
                        service_centre_name: product.service_centre_name.clone(),
                    });
                }
            }
        }

        Ok(rows)
    }
}
