// src/models/custom_field.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// --- ENUMS ---

// Os nove tipos de campo que o formulário de RMA sabe renderizar.
// Variante fechada: adicionar um tipo novo obriga a tratar exaustivamente
// a renderização e a validação.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
    Text,
    Textarea,
    Number,
    Email,
    Tel,
    Date,
    Select,
    Checkbox,
    Switch,
}

// --- DEFINIÇÕES (O Molde) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldDefinition {
    pub id: String,

    // Chave de máquina. Precisa ser única e estável: os RMAs referenciam
    // valores por esta chave, renomear quebra dados históricos.
    pub name: String,
    pub label: String,

    #[serde(rename = "type")]
    pub field_type: CustomFieldType,

    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<String>,

    // Opções apenas para o tipo Select
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// --- VALOR (O Dado) ---

// Valor tipado de um campo personalizado dentro de um produto.
// Nos documentos o valor é JSON solto; `untagged` mapeia bool/número/string
// direto para a variante certa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomFieldValue {
    Toggle(bool),
    Number(f64),
    Text(String),
}

impl CustomFieldValue {
    /// Valor vazio do ponto de vista de "campo obrigatório preenchido".
    pub fn is_empty(&self) -> bool {
        matches!(self, CustomFieldValue::Text(s) if s.trim().is_empty())
    }

    /// Renderização de exibição (PDF, e-mail).
    pub fn display(&self) -> String {
        match self {
            CustomFieldValue::Toggle(true) => "Yes".to_string(),
            CustomFieldValue::Toggle(false) => "No".to_string(),
            CustomFieldValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CustomFieldValue::Text(s) => s.clone(),
        }
    }
}

impl CustomFieldDefinition {
    /// Valida um valor submetido contra esta definição.
    /// Retorna um código de erro estável (o frontend traduz para mensagem).
    pub fn validate_value(&self, value: &CustomFieldValue) -> Result<(), &'static str> {
        match (self.field_type, value) {
            (CustomFieldType::Number, CustomFieldValue::Number(_)) => Ok(()),
            (CustomFieldType::Number, _) => Err("invalid_number"),

            (CustomFieldType::Checkbox | CustomFieldType::Switch, CustomFieldValue::Toggle(_)) => {
                Ok(())
            }
            (CustomFieldType::Checkbox | CustomFieldType::Switch, _) => Err("invalid_boolean"),

            // Espera YYYY-MM-DD
            (CustomFieldType::Date, CustomFieldValue::Text(s)) => {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(|_| ())
                    .map_err(|_| "invalid_date_format")
            }
            (CustomFieldType::Date, _) => Err("invalid_date_format"),

            (CustomFieldType::Email, CustomFieldValue::Text(s)) => {
                if s.contains('@') { Ok(()) } else { Err("invalid_email") }
            }
            (CustomFieldType::Email, _) => Err("invalid_email"),

            (CustomFieldType::Select, CustomFieldValue::Text(s)) => {
                if self.options.iter().any(|opt| opt == s) {
                    Ok(())
                } else {
                    Err("invalid_option")
                }
            }
            (CustomFieldType::Select, _) => Err("invalid_option"),

            (
                CustomFieldType::Text | CustomFieldType::Textarea | CustomFieldType::Tel,
                CustomFieldValue::Text(_),
            ) => Ok(()),
            (CustomFieldType::Text | CustomFieldType::Textarea | CustomFieldType::Tel, _) => {
                Err("invalid_text")
            }
        }
    }
}
