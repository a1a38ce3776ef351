// src/email/brevo.rs

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{EmailMessage, EmailProvider, EmailProviderError, ProviderReceipt};

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

/// Provedor transacional primário (API HTTP da Brevo).
pub struct BrevoProvider {
    client: reqwest::Client,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoProvider {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        Self { client: reqwest::Client::new(), api_key, sender_email, sender_name }
    }
}

#[async_trait]
impl EmailProvider for BrevoProvider {
    fn name(&self) -> &'static str {
        "brevo"
    }

    async fn send(&self, message: &EmailMessage) -> Result<ProviderReceipt, EmailProviderError> {
        // Sem nome de destinatário, a Brevo aceita o prefixo do e-mail.
        let to_name = if message.to_name.trim().is_empty() {
            message.to_email.split('@').next().unwrap_or_default().to_string()
        } else {
            message.to_name.clone()
        };

        let body = json!({
            "sender": { "email": self.sender_email, "name": self.sender_name },
            "to": [ { "email": message.to_email, "name": to_name } ],
            "subject": message.subject,
            "htmlContent": message.html_body,
            "textContent": message.text_body,
        });

        let response = self
            .client
            .post(BREVO_ENDPOINT)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(EmailProviderError::Rejected(format!("HTTP {status}: {detail}")));
        }

        let data: Value = response.json().await?;
        let message_id = data
            .get("messageId")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ProviderReceipt { provider: self.name(), message_id })
    }
}
