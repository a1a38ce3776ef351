// src/db/brand_repo.rs

use std::sync::Arc;

use serde_json::Value;

use crate::{
    common::error::AppError,
    models::brand::Brand,
    store::{DocumentStore, collections},
};

#[derive(Clone)]
pub struct BrandRepository {
    store: Arc<dyn DocumentStore>,
}

impl BrandRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Brand>, AppError> {
        let docs = self.store.list(collections::BRANDS).await?;
        let mut brands = Vec::with_capacity(docs.len());
        for doc in docs {
            brands.push(doc.decode::<Brand>()?);
        }
        Ok(brands)
    }

    pub async fn create(&self, data: Value) -> Result<Brand, AppError> {
        let doc = self.store.create(collections::BRANDS, data).await?;
        Ok(doc.decode()?)
    }

    pub async fn update(&self, id: &str, patch: Value) -> Result<Brand, AppError> {
        let doc = self.store.update(collections::BRANDS, id, patch).await?;
        Ok(doc.decode()?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        Ok(self.store.delete(collections::BRANDS, id).await?)
    }
}
