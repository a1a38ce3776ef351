// src/email/web3forms.rs

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{EmailMessage, EmailProvider, EmailProviderError, ProviderReceipt};

const WEB3FORMS_ENDPOINT: &str = "https://api.web3forms.com/submit";

/// Provedor de fallback. Só é acionado pelo dispatcher quando a Brevo
/// devolve qualquer resposta de falha.
pub struct Web3FormsProvider {
    client: reqwest::Client,
    access_key: String,
    from_name: String,
}

impl Web3FormsProvider {
    pub fn new(access_key: String, from_name: String) -> Self {
        Self { client: reqwest::Client::new(), access_key, from_name }
    }
}

#[async_trait]
impl EmailProvider for Web3FormsProvider {
    fn name(&self) -> &'static str {
        "web3forms"
    }

    async fn send(&self, message: &EmailMessage) -> Result<ProviderReceipt, EmailProviderError> {
        let body = json!({
            "access_key": self.access_key,
            "subject": message.subject,
            "from_name": self.from_name,
            "to_email": message.to_email,
            "message": message.text_body,
            "html": message.html_body,
        });

        let response = self
            .client
            .post(WEB3FORMS_ENDPOINT)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let data: Value = response.json().await?;
        if data.get("success").and_then(Value::as_bool).unwrap_or(false) {
            Ok(ProviderReceipt { provider: self.name(), message_id: None })
        } else {
            Err(EmailProviderError::Rejected(data.to_string()))
        }
    }
}
