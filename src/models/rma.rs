// src/models/rma.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::custom_field::CustomFieldValue;

// --- STATUS ---

// Os quatro estágios do pipeline, estritamente lineares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Processing,
    InServiceCentre,
    Ready,
    Delivered,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Processing => "processing",
            ProductStatus::InServiceCentre => "in_service_centre",
            ProductStatus::Ready => "ready",
            ProductStatus::Delivered => "delivered",
        }
    }

    /// Rótulo exibido ao operador (mesmos textos das abas do dashboard).
    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Processing => "Material Received",
            ProductStatus::InServiceCentre => "In Service Centre",
            ProductStatus::Ready => "Ready to Dispatch",
            ProductStatus::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(ProductStatus::Processing),
            "in_service_centre" => Ok(ProductStatus::InServiceCentre),
            "ready" => Ok(ProductStatus::Ready),
            "delivered" => Ok(ProductStatus::Delivered),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

// --- PRODUTO ---

// Um produto físico dentro de um RMA, com status e histórico próprios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLineItem {
    pub id: String,

    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model_number: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub problems_reported: String,

    #[serde(default)]
    pub status: ProductStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_centre_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_centre_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,

    // Atribuído exatamente uma vez na transição para `ready`; só muda via
    // "resend OTP" explícito (que invalida o anterior na hora).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,

    #[serde(default)]
    pub is_ready: bool,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,

    // Valores de campos personalizados, chaveados pelo `name` da definição.
    // BTreeMap para ordem estável na renderização.
    #[serde(default)]
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
}

// --- HISTÓRICO ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: ProductStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

// --- CASE ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RmaCase {
    pub id: String,

    // Snapshot do contato no momento da criação (desnormalizado de
    // propósito: edições posteriores do contato não alteram o histórico).
    #[serde(default)]
    pub contact_id: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_company: String,

    #[serde(default)]
    pub comments: String,

    pub products: Vec<ProductLineItem>,

    // Status agregado: função pura dos status dos produtos, recalculado e
    // persistido a cada mudança, nunca definido de forma independente.
    #[serde(default)]
    pub status: ProductStatus,

    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RmaCase {
    pub fn product(&self, product_id: &str) -> Option<&ProductLineItem> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn product_statuses(&self) -> Vec<ProductStatus> {
        self.products.iter().map(|p| p.status).collect()
    }
}

// --- FORMA LEGADA ---

// Registros antigos carregam UM produto achatado direto no case, sem o
// array `products`. Forma legada de um case com um produto só.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFlatCase {
    pub id: String,

    #[serde(default)]
    pub contact_id: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_company: String,

    #[serde(default)]
    pub comments: String,

    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model_number: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub problems_reported: String,

    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub service_centre_id: Option<String>,
    #[serde(default)]
    pub service_centre_name: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub is_ready: bool,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub custom_fields: BTreeMap<String, CustomFieldValue>,

    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// União sem tag na fronteira de acesso a dados: todo caminho de leitura
// normaliza para `RmaCase` com `products` uniforme, e o motor de transição
// nunca vê a forma achatada.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RmaDocument {
    MultiProduct(RmaCase),
    LegacyFlatSingle(LegacyFlatCase),
}

impl RmaDocument {
    pub fn normalize(self) -> RmaCase {
        match self {
            RmaDocument::MultiProduct(case) => case,
            RmaDocument::LegacyFlatSingle(legacy) => {
                let product = ProductLineItem {
                    id: "1".to_string(),
                    brand: legacy.brand,
                    model_number: legacy.model_number,
                    serial_number: legacy.serial_number,
                    problems_reported: legacy.problems_reported,
                    status: legacy.status,
                    service_centre_id: legacy.service_centre_id,
                    service_centre_name: legacy.service_centre_name,
                    remark: legacy.remark,
                    otp: legacy.otp,
                    is_ready: legacy.is_ready,
                    is_delivered: legacy.is_delivered,
                    delivered_at: legacy.delivered_at,
                    custom_fields: legacy.custom_fields,
                };

                RmaCase {
                    id: legacy.id,
                    contact_id: legacy.contact_id,
                    contact_name: legacy.contact_name,
                    contact_email: legacy.contact_email,
                    contact_phone: legacy.contact_phone,
                    contact_company: legacy.contact_company,
                    comments: legacy.comments,
                    status: legacy.status,
                    products: vec![product],
                    status_history: legacy.status_history,
                    created_at: legacy.created_at,
                    updated_at: legacy.updated_at,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn multi_product_document_is_kept_as_is() {
        let doc: RmaDocument = serde_json::from_value(json!({
            "id": "rma1",
            "contactName": "John",
            "contactEmail": "john@example.com",
            "contactPhone": "555",
            "contactCompany": "Acme",
            "status": "processing",
            "products": [
                { "id": "1", "brand": "Acme", "modelNumber": "X1", "serialNumber": "S1", "status": "processing" },
                { "id": "2", "brand": "Zeta", "modelNumber": "Y2", "serialNumber": "S2", "status": "ready", "otp": "123456" }
            ]
        }))
        .unwrap();

        let case = doc.normalize();
        assert_eq!(case.products.len(), 2);
        assert_eq!(case.products[1].status, ProductStatus::Ready);
        assert_eq!(case.products[1].otp.as_deref(), Some("123456"));
    }

    #[test]
    fn legacy_flat_document_becomes_a_single_product_case() {
        let doc: RmaDocument = serde_json::from_value(json!({
            "id": "rma-old",
            "contactName": "Jane",
            "contactPhone": "987",
            "brand": "Acme",
            "modelNumber": "M9",
            "serialNumber": "SER-9",
            "problemsReported": "No power",
            "status": "in_service_centre",
            "serviceCentreName": "Centre1"
        }))
        .unwrap();

        let case = doc.normalize();
        assert_eq!(case.products.len(), 1);
        let product = &case.products[0];
        assert_eq!(product.brand, "Acme");
        assert_eq!(product.serial_number, "SER-9");
        assert_eq!(product.status, ProductStatus::InServiceCentre);
        assert_eq!(product.service_centre_name.as_deref(), Some("Centre1"));
        assert_eq!(case.status, ProductStatus::InServiceCentre);
    }

    #[test]
    fn status_round_trips_through_snake_case() {
        let s: ProductStatus = serde_json::from_value(json!("in_service_centre")).unwrap();
        assert_eq!(s, ProductStatus::InServiceCentre);
        assert_eq!(serde_json::to_value(ProductStatus::Ready).unwrap(), json!("ready"));
        assert_eq!("delivered".parse::<ProductStatus>().unwrap(), ProductStatus::Delivered);
        assert!("shipped".parse::<ProductStatus>().is_err());
    }
}
