// src/db/custom_field_repo.rs

use std::sync::Arc;

use serde_json::Value;

use crate::{
    common::error::AppError,
    models::custom_field::CustomFieldDefinition,
    store::{DocumentStore, collections},
};

#[derive(Clone)]
pub struct CustomFieldRepository {
    store: Arc<dyn DocumentStore>,
}

impl CustomFieldRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<CustomFieldDefinition>, AppError> {
        let docs = self.store.list(collections::CUSTOM_FIELDS).await?;
        let mut fields = Vec::with_capacity(docs.len());
        for doc in docs {
            fields.push(doc.decode::<CustomFieldDefinition>()?);
        }
        Ok(fields)
    }

    /// A chave `name` precisa ser única: os produtos dos RMAs referenciam
    /// valores por ela. Varredura linear: a lista de definições é pequena.
    pub async fn create(&self, data: Value) -> Result<CustomFieldDefinition, AppError> {
        let name = data.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        let existing = self.list().await?;
        if existing.iter().any(|f| f.name == name) {
            return Err(AppError::workflow(format!(
                "A custom field with the key '{name}' already exists."
            )));
        }

        let doc = self.store.create(collections::CUSTOM_FIELDS, data).await?;
        Ok(doc.decode()?)
    }

    pub async fn update(&self, id: &str, patch: Value) -> Result<CustomFieldDefinition, AppError> {
        let doc = self.store.update(collections::CUSTOM_FIELDS, id, patch).await?;
        Ok(doc.decode()?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        Ok(self.store.delete(collections::CUSTOM_FIELDS, id).await?)
    }
}
