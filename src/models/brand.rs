// src/models/brand.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Lista plana usada para popular o seletor de marca dos produtos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
