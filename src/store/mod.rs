// src/store/mod.rs
//
// Capability do document store. O dashboard original guardava tudo em
// coleções de documentos sem schema; aqui isso vira um trait com as cinco
// operações por coleção e timestamps atribuídos pelo servidor. O backend
// padrão é o `MemoryStore`, mas nada acima desta camada sabe disso.

pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;

// Nomes das coleções usadas pelo dashboard
pub mod collections {
    pub const CONTACTS: &str = "contacts";
    pub const BRANDS: &str = "brands";
    pub const SERVICE_CENTRES: &str = "serviceCentres";
    pub const CUSTOM_FIELDS: &str = "customFields";
    pub const SETTINGS: &str = "settings";
    pub const RMAS: &str = "rmas";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("documento '{1}' não encontrado na coleção '{0}'")]
    NotFound(String, String),

    #[error("documento com formato inválido: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("documento não é um objeto JSON")]
    InvalidDocument,

    #[error("store indisponível: {0}")]
    Unavailable(String),
}

/// Um documento como sai do store: chave + corpo JSON livre.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Desserializa o corpo para um tipo do domínio, injetando a chave do
    /// documento como campo `id` (o corpo armazenado não carrega a chave).
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut data = self.data;
        let obj = data.as_object_mut().ok_or(StoreError::InvalidDocument)?;
        obj.insert("id".to_string(), Value::String(self.id));
        Ok(serde_json::from_value(data)?)
    }
}

/// Interface genérica de persistência por coleção/chave.
///
/// Sem enforcement de schema: quem chama é responsável pelo formato.
/// `create` e `update` carimbam `createdAt`/`updatedAt` no servidor.
/// `update` é um merge raso do patch sobre o documento existente; a
/// escrita é sempre do documento inteiro (aplicada por completo ou não).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn create(&self, collection: &str, data: Value) -> Result<Document, StoreError>;

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Document, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
