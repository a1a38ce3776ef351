// src/models/contact.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Contato de cliente. Os RMAs guardam um snapshot destes campos na criação,
// então editar o contato depois não altera registros históricos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,

    pub company: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
