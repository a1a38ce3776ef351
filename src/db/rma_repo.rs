// src/db/rma_repo.rs

use std::sync::Arc;

use serde_json::Value;

use crate::{
    common::error::AppError,
    models::rma::{RmaCase, RmaDocument},
    store::{DocumentStore, collections},
};

#[derive(Clone)]
pub struct RmaRepository {
    store: Arc<dyn DocumentStore>,
}

impl RmaRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Todos os caminhos de leitura passam por aqui: o documento pode estar
    /// na forma atual (array `products`) ou na legada (um produto achatado
    /// no case); os dois normalizam para `RmaCase` antes de subir.
    pub async fn list(&self) -> Result<Vec<RmaCase>, AppError> {
        let docs = self.store.list(collections::RMAS).await?;
        let mut cases = Vec::with_capacity(docs.len());
        for doc in docs {
            cases.push(doc.decode::<RmaDocument>()?.normalize());
        }
        Ok(cases)
    }

    pub async fn get(&self, id: &str) -> Result<RmaCase, AppError> {
        let doc = self
            .store
            .get(collections::RMAS, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("RMA '{id}' not found.")))?;
        Ok(doc.decode::<RmaDocument>()?.normalize())
    }

    pub async fn create(&self, data: Value) -> Result<RmaCase, AppError> {
        let doc = self.store.create(collections::RMAS, data).await?;
        Ok(doc.decode::<RmaDocument>()?.normalize())
    }

    /// Escrita do read-modify-write: o chamador já recalculou produtos,
    /// status agregado e histórico; aqui só aplica o patch no documento.
    pub async fn update(&self, id: &str, patch: Value) -> Result<RmaCase, AppError> {
        let doc = self.store.update(collections::RMAS, id, patch).await?;
        Ok(doc.decode::<RmaDocument>()?.normalize())
    }

    /// Delete definitivo, sem arquivamento.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        Ok(self.store.delete(collections::RMAS, id).await?)
    }
}
