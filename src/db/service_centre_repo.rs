// src/db/service_centre_repo.rs

use std::sync::Arc;

use serde_json::Value;

use crate::{
    common::error::AppError,
    models::service_centre::ServiceCentre,
    store::{DocumentStore, collections},
};

#[derive(Clone)]
pub struct ServiceCentreRepository {
    store: Arc<dyn DocumentStore>,
}

impl ServiceCentreRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<ServiceCentre>, AppError> {
        let docs = self.store.list(collections::SERVICE_CENTRES).await?;
        let mut centres = Vec::with_capacity(docs.len());
        for doc in docs {
            centres.push(doc.decode::<ServiceCentre>()?);
        }
        Ok(centres)
    }

    pub async fn get(&self, id: &str) -> Result<ServiceCentre, AppError> {
        let doc = self
            .store
            .get(collections::SERVICE_CENTRES, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service centre '{id}' not found.")))?;
        Ok(doc.decode()?)
    }

    pub async fn create(&self, data: Value) -> Result<ServiceCentre, AppError> {
        let doc = self.store.create(collections::SERVICE_CENTRES, data).await?;
        Ok(doc.decode()?)
    }

    pub async fn update(&self, id: &str, patch: Value) -> Result<ServiceCentre, AppError> {
        let doc = self.store.update(collections::SERVICE_CENTRES, id, patch).await?;
        Ok(doc.decode()?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        Ok(self.store.delete(collections::SERVICE_CENTRES, id).await?)
    }
}
