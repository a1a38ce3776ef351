// src/models/settings.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub logo: String,
}

// Documento singular de configuração (um por instalação). Lido sob demanda
// com default injetado, nunca vira estado global ambiente.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub company_info: CompanyInfo,

    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default)]
    pub sms_notifications: bool,

    // Controla apenas a VERIFICAÇÃO do OTP na entrega. A geração do código
    // ao marcar "ready" acontece sempre.
    #[serde(default = "default_true")]
    pub require_otp: bool,

    #[serde(default)]
    pub auto_assign: bool,
    #[serde(default)]
    pub dark_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_info: CompanyInfo::default(),
            email_notifications: true,
            sms_notifications: false,
            require_otp: true,
            auto_assign: false,
            dark_mode: false,
        }
    }
}
