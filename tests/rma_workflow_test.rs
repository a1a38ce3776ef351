// tests/rma_workflow_test.rs
//
// Fluxo completo de RMA de ponta a ponta, com provedores de e-mail
// falsos: recebimento -> assistência -> pronto -> entregue.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use rma_backend::{
    config::AppState,
    email::{EmailDispatcher, EmailMessage, EmailProvider, EmailProviderError, ProviderReceipt},
    models::rma::ProductStatus,
    services::{
        notification_service::NotificationOutcome,
        rma_service::{
            DeliverRequest, DeliveryConfirmation, MarkReadyRequest, NewProductRequest,
            NewRmaRequest, SendToServiceCentreRequest,
        },
    },
    store::memory::MemoryStore,
};

/// Provedor de mentira: grava as mensagens em memória; pode ser
/// configurado para falhar sempre.
#[derive(Clone)]
struct RecordingProvider {
    name: &'static str,
    fail: bool,
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingProvider {
    fn new(name: &'static str, fail: bool) -> Self {
        Self { name, fail, sent: Arc::new(Mutex::new(Vec::new())) }
    }

    fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, message: &EmailMessage) -> Result<ProviderReceipt, EmailProviderError> {
        if self.fail {
            return Err(EmailProviderError::Rejected("simulated outage".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(ProviderReceipt { provider: self.name, message_id: None })
    }
}

struct Harness {
    state: AppState,
    primary: RecordingProvider,
    fallback: RecordingProvider,
}

fn harness(primary_fails: bool, fallback_fails: bool) -> Harness {
    let primary = RecordingProvider::new("primary", primary_fails);
    let fallback = RecordingProvider::new("fallback", fallback_fails);
    let dispatcher =
        EmailDispatcher::new(Arc::new(primary.clone()), Arc::new(fallback.clone()));
    let state =
        AppState::with_store(Arc::new(MemoryStore::new()), dispatcher, "./fonts".to_string());
    Harness { state, primary, fallback }
}

async fn seed_contact(state: &AppState) -> String {
    let contact = state
        .contact_repo
        .create(json!({
            "company": "Acme Retail",
            "name": "Dana Cruz",
            "email": "dana@acme.example",
            "phone": "9876543210",
        }))
        .await
        .unwrap();
    contact.id
}

async fn seed_centre(state: &AppState) -> String {
    let centre = state
        .service_centre_repo
        .create(json!({ "name": "Central Repairs", "phone": "111222333" }))
        .await
        .unwrap();
    centre.id
}

fn two_product_request(contact_id: String) -> NewRmaRequest {
    NewRmaRequest {
        contact_id,
        comments: "customer dropped both units".to_string(),
        products: vec![
            NewProductRequest {
                brand: "Acme".to_string(),
                model_number: "X1".to_string(),
                serial_number: "SER-A".to_string(),
                problems_reported: "no power".to_string(),
                custom_fields: Default::default(),
            },
            NewProductRequest {
                brand: "Zeta".to_string(),
                model_number: "Y2".to_string(),
                serial_number: "SER-B".to_string(),
                problems_reported: "cracked screen".to_string(),
                custom_fields: Default::default(),
            },
        ],
    }
}

#[tokio::test]
async fn full_pipeline_with_staggered_products() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;
    let centre_id = seed_centre(&h.state).await;

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    let case_id = created.case.id.clone();
    assert_eq!(created.case.status, ProductStatus::Processing);
    assert_eq!(created.case.products.len(), 2);
    assert_eq!(created.case.products[0].id, "1");
    assert!(matches!(created.notification, NotificationOutcome::Sent { .. }));

    // Produto 1 vai para a assistência; o 2 continua em processing
    let result = h
        .state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: vec!["1".to_string()],
                service_centre_id: centre_id.clone(),
                remark: Some("board swap".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(result.case.status, ProductStatus::InServiceCentre);
    let p1 = result.case.product("1").unwrap();
    assert_eq!(p1.service_centre_name.as_deref(), Some("Central Repairs"));
    assert_eq!(p1.remark.as_deref(), Some("board swap"));

    // Produto 1 fica pronto: ganha OTP de 6 dígitos, agregado continua
    // preso no produto 2
    let result = h
        .state
        .rma_service
        .mark_ready(&case_id, MarkReadyRequest { product_ids: vec!["1".to_string()] })
        .await
        .unwrap();
    assert_eq!(result.case.status, ProductStatus::InServiceCentre);
    let otp1 = result.case.product("1").unwrap().otp.clone().unwrap();
    assert_eq!(otp1.len(), 6);
    assert!(otp1.chars().all(|c| c.is_ascii_digit()));

    // Produto 2 percorre o mesmo caminho
    h.state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: vec!["2".to_string()],
                service_centre_id: centre_id,
                remark: None,
            },
        )
        .await
        .unwrap();
    let result = h
        .state
        .rma_service
        .mark_ready(&case_id, MarkReadyRequest { product_ids: vec!["2".to_string()] })
        .await
        .unwrap();
    // Todos ready -> agregado ready
    assert_eq!(result.case.status, ProductStatus::Ready);
    let otp2 = result.case.product("2").unwrap().otp.clone().unwrap();

    // Entrega do produto 1 com o código certo; o case segue ready
    let result = h
        .state
        .rma_service
        .deliver(
            &case_id,
            DeliverRequest {
                products: vec![DeliveryConfirmation {
                    product_id: "1".to_string(),
                    otp: Some(otp1),
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(result.case.status, ProductStatus::Ready);
    assert!(result.case.product("1").unwrap().is_delivered);
    assert!(result.case.product("1").unwrap().delivered_at.is_some());

    // Entrega do último produto fecha o case
    let result = h
        .state
        .rma_service
        .deliver(
            &case_id,
            DeliverRequest {
                products: vec![DeliveryConfirmation {
                    product_id: "2".to_string(),
                    otp: Some(otp2),
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(result.case.status, ProductStatus::Delivered);

    // Uma mensagem por transição: criação, 2x assistência, 2x pronto,
    // 2x entrega
    assert_eq!(h.primary.messages().len(), 7);
    assert!(h.fallback.messages().is_empty());

    // O histórico guarda a trilha por produto
    let case = h.state.rma_service.get_case(&case_id).await.unwrap();
    assert!(case.status_history.len() >= 7);
}

#[tokio::test]
async fn delivery_rejects_wrong_or_missing_otp() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;
    let centre_id = seed_centre(&h.state).await;

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    let case_id = created.case.id.clone();

    h.state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: vec!["1".to_string(), "2".to_string()],
                service_centre_id: centre_id,
                remark: None,
            },
        )
        .await
        .unwrap();
    h.state
        .rma_service
        .mark_ready(
            &case_id,
            MarkReadyRequest { product_ids: vec!["1".to_string(), "2".to_string()] },
        )
        .await
        .unwrap();

    let err = h
        .state
        .rma_service
        .deliver(
            &case_id,
            DeliverRequest {
                products: vec![DeliveryConfirmation {
                    product_id: "1".to_string(),
                    otp: Some("000000".to_string()),
                }],
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Incorrect OTP"));

    let err = h
        .state
        .rma_service
        .deliver(
            &case_id,
            DeliverRequest {
                products: vec![DeliveryConfirmation { product_id: "1".to_string(), otp: None }],
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("OTP is required"));

    // Nada foi entregue
    let case = h.state.rma_service.get_case(&case_id).await.unwrap();
    assert!(case.products.iter().all(|p| !p.is_delivered));
}

#[tokio::test]
async fn delivery_without_otp_when_requirement_disabled() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;
    let centre_id = seed_centre(&h.state).await;
    h.state.settings_repo.update(json!({ "requireOtp": false })).await.unwrap();

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    let case_id = created.case.id.clone();

    h.state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: vec!["1".to_string()],
                service_centre_id: centre_id,
                remark: None,
            },
        )
        .await
        .unwrap();
    let result = h
        .state
        .rma_service
        .mark_ready(&case_id, MarkReadyRequest { product_ids: vec!["1".to_string()] })
        .await
        .unwrap();
    // O OTP é gerado mesmo com a exigência desligada
    assert!(result.case.product("1").unwrap().otp.is_some());

    let result = h
        .state
        .rma_service
        .deliver(
            &case_id,
            DeliverRequest {
                products: vec![DeliveryConfirmation { product_id: "1".to_string(), otp: None }],
            },
        )
        .await
        .unwrap();
    assert!(result.case.product("1").unwrap().is_delivered);
}

#[tokio::test]
async fn email_failure_does_not_roll_back_the_transition() {
    let h = harness(true, true);
    let contact_id = seed_contact(&h.state).await;
    let centre_id = seed_centre(&h.state).await;

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    let case_id = created.case.id.clone();
    assert!(matches!(created.notification, NotificationOutcome::Failed(_)));

    let result = h
        .state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: vec!["1".to_string()],
                service_centre_id: centre_id,
                remark: None,
            },
        )
        .await
        .unwrap();

    // A transição persistiu; só o aviso registra a falha de envio
    assert_eq!(result.case.product("1").unwrap().status, ProductStatus::InServiceCentre);
    let warning = result.notification.warning().unwrap();
    assert!(warning.contains("notification email failed"));

    let reread = h.state.rma_service.get_case(&case_id).await.unwrap();
    assert_eq!(reread.product("1").unwrap().status, ProductStatus::InServiceCentre);
}

#[tokio::test]
async fn primary_outage_falls_back_to_secondary_provider() {
    let h = harness(true, false);
    let contact_id = seed_contact(&h.state).await;

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    assert!(matches!(created.notification, NotificationOutcome::Sent { provider: "fallback" }));
    assert_eq!(h.fallback.messages().len(), 1);
}

#[tokio::test]
async fn batch_ready_shares_one_otp_and_one_email() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;
    let centre_id = seed_centre(&h.state).await;

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    let case_id = created.case.id.clone();

    h.state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: vec!["1".to_string(), "2".to_string()],
                service_centre_id: centre_id,
                remark: None,
            },
        )
        .await
        .unwrap();
    let result = h
        .state
        .rma_service
        .mark_ready(
            &case_id,
            MarkReadyRequest { product_ids: vec!["1".to_string(), "2".to_string()] },
        )
        .await
        .unwrap();

    let otp1 = result.case.product("1").unwrap().otp.clone().unwrap();
    let otp2 = result.case.product("2").unwrap().otp.clone().unwrap();
    assert_eq!(otp1, otp2);

    // Criação + envio para assistência + um único e-mail para o lote
    let messages = h.primary.messages();
    assert_eq!(messages.len(), 3);
    let ready_mail = &messages[2];
    assert_eq!(ready_mail.subject, "RMA Products Ready for Dispatch");
    assert!(ready_mail.text_body.contains(&otp1));
    assert!(ready_mail.html_body.contains("SER-A"));
    assert!(ready_mail.html_body.contains("SER-B"));
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;
    let centre_id = seed_centre(&h.state).await;

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    let case_id = created.case.id.clone();

    let err = h
        .state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: Vec::new(),
                service_centre_id: centre_id,
                remark: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No products selected"));

    let err = h
        .state
        .rma_service
        .deliver(&case_id, DeliverRequest { products: Vec::new() })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No products selected"));
}

#[tokio::test]
async fn resend_otp_rotates_the_code_and_resends_the_email() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;
    let centre_id = seed_centre(&h.state).await;

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    let case_id = created.case.id.clone();

    h.state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: vec!["1".to_string()],
                service_centre_id: centre_id,
                remark: None,
            },
        )
        .await
        .unwrap();
    let result = h
        .state
        .rma_service
        .mark_ready(&case_id, MarkReadyRequest { product_ids: vec!["1".to_string()] })
        .await
        .unwrap();
    let old_otp = result.case.product("1").unwrap().otp.clone().unwrap();

    let result = h.state.rma_service.resend_otp(&case_id, "1").await.unwrap();
    let new_otp = result.case.product("1").unwrap().otp.clone().unwrap();
    assert_eq!(new_otp.len(), 6);

    // O código antigo deixa de valer
    let err = h
        .state
        .rma_service
        .deliver(
            &case_id,
            DeliverRequest {
                products: vec![DeliveryConfirmation {
                    product_id: "1".to_string(),
                    otp: Some(old_otp.clone()),
                }],
            },
        )
        .await;
    if old_otp != new_otp {
        assert!(err.unwrap_err().to_string().contains("Incorrect OTP"));
    }

    // Criação + assistência + pronto + reenvio
    let messages = h.primary.messages();
    assert_eq!(messages.len(), 4);
    assert!(messages[3].text_body.contains(&new_otp));

    // Reenviar para um produto ainda em processing é recusado
    let err = h.state.rma_service.resend_otp(&case_id, "2").await.unwrap_err();
    assert!(err.to_string().to_lowercase().contains("ready"));
}

#[tokio::test]
async fn search_returns_one_row_per_matching_product() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;

    h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();

    // Casa pelo contato: ambos os produtos viram linhas
    let rows = h.state.rma_service.search("dana").await.unwrap();
    assert_eq!(rows.len(), 2);

    // Casa por serial: só o produto correspondente
    let rows = h.state.rma_service.search("ser-b").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].serial_number, "SER-B");
    assert_eq!(rows[0].contact_name, "Dana Cruz");

    // Telefone casa como digitado
    let rows = h.state.rma_service.search("98765").await.unwrap();
    assert_eq!(rows.len(), 2);

    // Busca vazia não retorna nada
    let rows = h.state.rma_service.search("   ").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn stage_listing_includes_cases_with_any_product_in_stage() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;
    let centre_id = seed_centre(&h.state).await;

    let created = h.state.rma_service.create_case(two_product_request(contact_id)).await.unwrap();
    let case_id = created.case.id.clone();

    h.state
        .rma_service
        .send_to_service_centre(
            &case_id,
            SendToServiceCentreRequest {
                product_ids: vec!["1".to_string()],
                service_centre_id: centre_id,
                remark: None,
            },
        )
        .await
        .unwrap();

    // O case aparece nas duas abas: um produto em cada estágio
    let processing = h.state.rma_service.list_by_stage(ProductStatus::Processing).await.unwrap();
    assert_eq!(processing.len(), 1);
    let in_centre =
        h.state.rma_service.list_by_stage(ProductStatus::InServiceCentre).await.unwrap();
    assert_eq!(in_centre.len(), 1);
    let ready = h.state.rma_service.list_by_stage(ProductStatus::Ready).await.unwrap();
    assert!(ready.is_empty());
}

#[tokio::test]
async fn required_custom_field_blocks_creation() {
    let h = harness(false, false);
    let contact_id = seed_contact(&h.state).await;

    h.state
        .custom_field_repo
        .create(json!({
            "name": "purchaseDate",
            "label": "Purchase Date",
            "type": "date",
            "required": true,
        }))
        .await
        .unwrap();

    let err = h
        .state
        .rma_service
        .create_case(two_product_request(contact_id))
        .await
        .unwrap_err();
    let rendered = format!("{err:?}");
    assert!(rendered.contains("products[0].purchaseDate"));

    // Nenhum case foi criado
    assert!(h.state.rma_service.list_cases().await.unwrap().is_empty());
}
