// src/email/mod.rs
//
// Capability "enviar e-mail": um trait por provedor e um dispatcher que
// tenta o provedor primário (Brevo) e, em qualquer resposta de falha,
// faz UMA tentativa no secundário (Web3Forms) antes de propagar o erro.

pub mod brevo;
pub mod web3forms;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use brevo::BrevoProvider;
pub use web3forms::Web3FormsProvider;

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Resposta de sucesso de um provedor.
#[derive(Debug, Clone)]
pub struct ProviderReceipt {
    pub provider: &'static str,
    pub message_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum EmailProviderError {
    #[error("falha de transporte: {0}")]
    Transport(String),

    #[error("provedor recusou o envio: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for EmailProviderError {
    fn from(err: reqwest::Error) -> Self {
        EmailProviderError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &EmailMessage) -> Result<ProviderReceipt, EmailProviderError>;
}

/// Primário + fallback. O chamador nunca fala com um provedor direto.
#[derive(Clone)]
pub struct EmailDispatcher {
    primary: Arc<dyn EmailProvider>,
    fallback: Arc<dyn EmailProvider>,
}

impl EmailDispatcher {
    pub fn new(primary: Arc<dyn EmailProvider>, fallback: Arc<dyn EmailProvider>) -> Self {
        Self { primary, fallback }
    }

    /// Tenta o primário; em falha, uma tentativa no fallback com o mesmo
    /// conteúdo. Só retorna `Err` com os dois provedores esgotados.
    pub async fn send(&self, message: &EmailMessage) -> Result<ProviderReceipt, EmailProviderError> {
        match self.primary.send(message).await {
            Ok(receipt) => Ok(receipt),
            Err(primary_err) => {
                tracing::warn!(
                    provider = self.primary.name(),
                    error = %primary_err,
                    "provedor primário falhou, tentando fallback"
                );
                self.fallback.send(message).await.map_err(|fallback_err| {
                    EmailProviderError::Rejected(format!(
                        "{}: {primary_err}; {}: {fallback_err}",
                        self.primary.name(),
                        self.fallback.name()
                    ))
                })
            }
        }
    }
}
