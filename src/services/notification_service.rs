// src/services/notification_service.rs
//
// Compositor de notificações: um template por transição do pipeline, em
// texto puro e HTML, escopado EXATAMENTE ao subconjunto de produtos que
// acabou de mudar de estado. O envio em si fica com o EmailDispatcher
// (Brevo + fallback); falha de envio nunca desfaz a mutação de status.

use crate::{
    email::{EmailDispatcher, EmailMessage},
    models::{
        rma::{ProductLineItem, ProductStatus, RmaCase},
        settings::Settings,
    },
};

// --- TRANSIÇÕES ---

#[derive(Debug, Clone)]
pub enum RmaTransition {
    /// Case recém-criado (lista todos os produtos).
    Confirmation,
    SentToServiceCentre,
    /// OTP compartilhado do lote, renderizado em destaque.
    ReadyForDispatch { otp: String },
    Delivered,
}

impl RmaTransition {
    pub fn subject(&self) -> &'static str {
        match self {
            RmaTransition::Confirmation => "RMA Material Received",
            RmaTransition::SentToServiceCentre => "RMA Products Sent to Service Centre",
            RmaTransition::ReadyForDispatch { .. } => "RMA Products Ready for Dispatch",
            RmaTransition::Delivered => "RMA Products Delivered",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            RmaTransition::Confirmation => {
                "We have received your return request. We will process your request and update you soon."
            }
            RmaTransition::SentToServiceCentre => {
                "Your return products have been sent to our service centre for processing. \
                 We will notify you once your items are ready for dispatch."
            }
            RmaTransition::ReadyForDispatch { .. } => {
                "Your return products are now ready for dispatch. \
                 Please provide the OTP when receiving your items."
            }
            RmaTransition::Delivered => {
                "Your return products have been successfully delivered. Thank you for your business."
            }
        }
    }

    fn otp(&self) -> Option<&str> {
        match self {
            RmaTransition::ReadyForDispatch { otp } => Some(otp),
            _ => None,
        }
    }
}

// --- COMPOSIÇÃO (pura) ---

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn products_html(products: &[ProductLineItem]) -> String {
    let mut out = String::new();
    for (index, product) in products.iter().enumerate() {
        // Cores alternadas para distinguir os blocos
        let (bg, border) = if index % 2 == 0 {
            ("#f0f7ff", "#cce5ff")
        } else {
            ("#f5f5ff", "#d8d8ff")
        };

        let mut rows = format!(
            "<tr><td style=\"padding: 5px 10px 5px 0; font-weight: bold; width: 150px;\">Brand:</td>\
             <td style=\"padding: 5px 0;\">{}</td></tr>\
             <tr><td style=\"padding: 5px 10px 5px 0; font-weight: bold;\">Model Number:</td>\
             <td style=\"padding: 5px 0;\">{}</td></tr>\
             <tr><td style=\"padding: 5px 10px 5px 0; font-weight: bold;\">Serial Number:</td>\
             <td style=\"padding: 5px 0;\">{}</td></tr>",
            escape_html(&product.brand),
            escape_html(&product.model_number),
            escape_html(&product.serial_number),
        );

        if !product.problems_reported.is_empty() {
            rows.push_str(&format!(
                "<tr><td style=\"padding: 5px 10px 5px 0; font-weight: bold;\">Problems Reported:</td>\
                 <td style=\"padding: 5px 0;\">{}</td></tr>",
                escape_html(&product.problems_reported)
            ));
        }
        if product.status == ProductStatus::Ready {
            if let Some(otp) = &product.otp {
                rows.push_str(&format!(
                    "<tr><td style=\"padding: 5px 10px 5px 0; font-weight: bold;\">OTP:</td>\
                     <td style=\"padding: 5px 0; font-weight: bold; color: #0066cc; font-size: 16px;\">{}</td></tr>",
                    escape_html(otp)
                ));
            }
        }
        if let Some(remark) = &product.remark {
            rows.push_str(&format!(
                "<tr><td style=\"padding: 5px 10px 5px 0; font-weight: bold;\">Service Remarks:</td>\
                 <td style=\"padding: 5px 0;\">{}</td></tr>",
                escape_html(remark)
            ));
        }

        out.push_str(&format!(
            "<div style=\"margin-bottom: 15px; padding: 15px; border-radius: 8px; \
             background-color: {bg}; border: 1px solid {border};\">\
             <h3 style=\"margin-top: 0; margin-bottom: 10px; color: #333;\">Product {}</h3>\
             <table style=\"width: 100%; border-collapse: collapse;\">{rows}</table></div>",
            index + 1
        ));
    }
    out
}

fn otp_block_html(otp: &str) -> String {
    format!(
        "<div style=\"background-color: #e6f7ff; padding: 15px; border-radius: 5px; \
         margin: 15px 0; border-left: 4px solid #1890ff;\">\
         <h3 style=\"margin-top: 0; margin-bottom: 10px; color: #333;\">Delivery OTP</h3>\
         <p style=\"margin: 0; font-size: 18px; font-weight: bold; color: #1890ff;\">{}</p>\
         <p style=\"margin-top: 5px; font-size: 14px;\">Please provide this OTP when receiving your items.</p>\
         </div>",
        escape_html(otp)
    )
}

/// Monta o e-mail de uma transição. `products` é o subconjunto exato que
/// mudou de estado nessa ação: o compositor renderiza só o que recebe e o
/// chamador é quem garante o recorte (produtos em outros status nunca
/// entram no e-mail).
pub fn compose(transition: &RmaTransition, case: &RmaCase, products: &[ProductLineItem]) -> EmailMessage {
    let name = if case.contact_name.trim().is_empty() {
        "Customer".to_string()
    } else {
        case.contact_name.clone()
    };

    let otp_html = transition.otp().map(otp_block_html).unwrap_or_default();

    let html_body = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
         <title>RMA Update</title></head>\
         <body style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333; \
         max-width: 600px; margin: 0 auto; padding: 20px;\">\
         <div style=\"border-radius: 8px; border: 1px solid #e0e0e0; overflow: hidden;\">\
         <div style=\"background-color: #f8f9fa; padding: 20px; border-bottom: 1px solid #e0e0e0;\">\
         <h2 style=\"margin: 0; color: #333;\">RMA Update</h2></div>\
         <div style=\"padding: 20px;\">\
         <p>Dear {name},</p><p>{message}</p>\
         <div style=\"background-color: #f0f0f0; padding: 10px; border-radius: 5px; margin: 15px 0;\">\
         <strong>RMA ID:</strong> {rma_id}</div>\
         {otp_html}\
         <div style=\"margin-top: 20px; margin-bottom: 20px;\">{products_html}</div>\
         <p>Thank you for your patience.</p>\
         <p>Best regards,<br>Support Team</p></div>\
         <div style=\"background-color: #f8f9fa; padding: 15px; border-top: 1px solid #e0e0e0; \
         font-size: 12px; color: #666; text-align: center;\">\
         This is an automated message. Please do not reply to this email.</div>\
         </div></body></html>",
        name = escape_html(&name),
        message = transition.message(),
        rma_id = escape_html(&case.id),
        products_html = products_html(products),
    );

    let mut text_body = format!("Dear {name},\n\n{}\n\nYour RMA ID is: {}\n", transition.message(), case.id);
    if let Some(otp) = transition.otp() {
        text_body.push_str(&format!("\nYour OTP for delivery confirmation is: {otp}\n"));
    }
    for (index, product) in products.iter().enumerate() {
        text_body.push_str(&format!(
            "\nProduct {}: {} {} (serial: {})\n",
            index + 1,
            product.brand,
            product.model_number,
            product.serial_number
        ));
    }
    text_body.push_str("\nThank you for your patience.\n\nBest regards,\nSupport Team");

    EmailMessage {
        to_email: case.contact_email.clone(),
        to_name: case.contact_name.clone(),
        subject: transition.subject().to_string(),
        text_body,
        html_body,
    }
}

// --- ENVIO ---

/// Resultado do envio, já rebaixado: a transição de status é considerada
/// cometida antes de qualquer tentativa de e-mail.
#[derive(Debug, Clone)]
pub enum NotificationOutcome {
    Sent { provider: &'static str },
    Skipped(String),
    Failed(String),
}

impl NotificationOutcome {
    /// Aviso não-bloqueante para a resposta HTTP; `None` quando enviado.
    pub fn warning(&self) -> Option<String> {
        match self {
            NotificationOutcome::Sent { .. } => None,
            NotificationOutcome::Skipped(reason) => Some(reason.clone()),
            NotificationOutcome::Failed(reason) => {
                Some(format!("Status updated, but the notification email failed: {reason}"))
            }
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    dispatcher: EmailDispatcher,
}

impl NotificationService {
    pub fn new(dispatcher: EmailDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Envia a notificação de uma transição. Nunca retorna `Err`: a escrita
    /// do case já está durável e falha aqui é só visibilidade.
    pub async fn notify(
        &self,
        settings: &Settings,
        transition: &RmaTransition,
        case: &RmaCase,
        products: &[ProductLineItem],
    ) -> NotificationOutcome {
        if !settings.email_notifications {
            tracing::info!(rma_id = %case.id, "notificações por e-mail desligadas, envio pulado");
            return NotificationOutcome::Skipped(
                "Email notifications are disabled; no email was sent.".to_string(),
            );
        }
        if case.contact_email.trim().is_empty() {
            return NotificationOutcome::Skipped(
                "The RMA contact has no email address; no email was sent.".to_string(),
            );
        }

        let message = compose(transition, case, products);
        match self.dispatcher.send(&message).await {
            Ok(receipt) => {
                tracing::info!(
                    rma_id = %case.id,
                    provider = receipt.provider,
                    subject = %message.subject,
                    "e-mail de RMA enviado"
                );
                NotificationOutcome::Sent { provider: receipt.provider }
            }
            Err(err) => {
                tracing::warn!(rma_id = %case.id, error = %err, "envio de e-mail falhou nos dois provedores");
                NotificationOutcome::Failed(err.to_string())
            }
        }
    }
}
