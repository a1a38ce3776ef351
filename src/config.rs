// src/config.rs

use std::{env, sync::Arc};

use crate::{
    db::{
        BrandRepository, ContactRepository, CustomFieldRepository, RmaRepository,
        ServiceCentreRepository, SettingsRepository,
    },
    email::{EmailDispatcher, brevo::BrevoProvider, web3forms::Web3FormsProvider},
    services::{
        notification_service::NotificationService, pdf_service::PdfService, rma_service::RmaService,
    },
    store::{DocumentStore, memory::MemoryStore},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub contact_repo: ContactRepository,
    pub brand_repo: BrandRepository,
    pub service_centre_repo: ServiceCentreRepository,
    pub custom_field_repo: CustomFieldRepository,
    pub settings_repo: SettingsRepository,
    pub rma_service: RmaService,
    pub pdf_service: PdfService,
}

impl AppState {
    // Função para carregar as configurações e criar o AppState
    pub async fn new() -> anyhow::Result<Self> {
        // .env é opcional em produção; as variáveis podem vir do ambiente
        dotenvy::dotenv().ok();

        let brevo_api_key = env::var("BREVO_API_KEY").unwrap_or_default();
        let web3forms_access_key = env::var("WEB3FORMS_ACCESS_KEY").unwrap_or_default();
        if brevo_api_key.is_empty() {
            tracing::warn!("BREVO_API_KEY ausente: envio primário de e-mail vai falhar");
        }
        if web3forms_access_key.is_empty() {
            tracing::warn!("WEB3FORMS_ACCESS_KEY ausente: sem fallback de e-mail");
        }

        let sender_email = env::var("EMAIL_SENDER_ADDRESS")
            .unwrap_or_else(|_| "noreply@rma.example.com".to_string());
        let sender_name =
            env::var("EMAIL_SENDER_NAME").unwrap_or_else(|_| "RMA Management".to_string());
        let font_dir = env::var("PDF_FONT_DIR").unwrap_or_else(|_| "./fonts".to_string());

        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        tracing::info!("✅ Armazenamento de documentos em memória inicializado!");

        let dispatcher = EmailDispatcher::new(
            Arc::new(BrevoProvider::new(brevo_api_key, sender_email, sender_name.clone())),
            Arc::new(Web3FormsProvider::new(web3forms_access_key, sender_name)),
        );

        Ok(Self::with_store(store, dispatcher, font_dir))
    }

    /// Monta o grafo de serviços sobre um store e um dispatcher já prontos.
    /// Os testes de integração usam este construtor com providers falsos.
    pub fn with_store(
        store: Arc<dyn DocumentStore>,
        dispatcher: EmailDispatcher,
        font_dir: String,
    ) -> Self {
        let contact_repo = ContactRepository::new(store.clone());
        let brand_repo = BrandRepository::new(store.clone());
        let service_centre_repo = ServiceCentreRepository::new(store.clone());
        let custom_field_repo = CustomFieldRepository::new(store.clone());
        let settings_repo = SettingsRepository::new(store.clone());
        let rma_repo = RmaRepository::new(store);

        let rma_service = RmaService::new(
            rma_repo,
            contact_repo.clone(),
            service_centre_repo.clone(),
            custom_field_repo.clone(),
            settings_repo.clone(),
            NotificationService::new(dispatcher),
        );

        Self {
            contact_repo,
            brand_repo,
            service_centre_repo,
            custom_field_repo,
            settings_repo,
            rma_service,
            pdf_service: PdfService::new(font_dir),
        }
    }
}
