// src/db/contact_repo.rs

use std::sync::Arc;

use serde_json::Value;

use crate::{
    common::error::AppError,
    models::contact::Contact,
    store::{DocumentStore, collections},
};

#[derive(Clone)]
pub struct ContactRepository {
    store: Arc<dyn DocumentStore>,
}

impl ContactRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Contact>, AppError> {
        let docs = self.store.list(collections::CONTACTS).await?;
        let mut contacts = Vec::with_capacity(docs.len());
        for doc in docs {
            contacts.push(doc.decode::<Contact>()?);
        }
        Ok(contacts)
    }

    pub async fn get(&self, id: &str) -> Result<Contact, AppError> {
        let doc = self
            .store
            .get(collections::CONTACTS, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contact '{id}' not found.")))?;
        Ok(doc.decode()?)
    }

    pub async fn create(&self, data: Value) -> Result<Contact, AppError> {
        let doc = self.store.create(collections::CONTACTS, data).await?;
        Ok(doc.decode()?)
    }

    pub async fn update(&self, id: &str, patch: Value) -> Result<Contact, AppError> {
        let doc = self.store.update(collections::CONTACTS, id, patch).await?;
        Ok(doc.decode()?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        Ok(self.store.delete(collections::CONTACTS, id).await?)
    }
}
