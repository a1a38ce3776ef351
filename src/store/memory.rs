// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};

/// Backend em memória do document store.
///
/// Coleção -> (chave -> corpo). BTreeMap para que `list` saia em ordem
/// estável de chave, como os testes esperam.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn stamp(obj: &mut serde_json::Map<String, Value>, field: &str) {
        obj.insert(field.to_string(), Value::String(Utc::now().to_rfc3339()));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let docs = guard
            .get(collection)
            .map(|col| {
                col.iter()
                    .map(|(id, data)| Document { id: id.clone(), data: data.clone() })
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|col| col.get(id))
            .map(|data| Document { id: id.to_string(), data: data.clone() }))
    }

    async fn create(&self, collection: &str, data: Value) -> Result<Document, StoreError> {
        let mut data = data;
        let obj = data.as_object_mut().ok_or(StoreError::InvalidDocument)?;

        // A chave é do servidor; um `id` vindo no corpo é descartado.
        obj.remove("id");
        Self::stamp(obj, "createdAt");
        Self::stamp(obj, "updatedAt");

        let id = Uuid::new_v4().to_string();
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data.clone());

        Ok(Document { id, data })
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Document, StoreError> {
        let patch_obj = match patch {
            Value::Object(map) => map,
            _ => return Err(StoreError::InvalidDocument),
        };

        let mut guard = self.collections.write().await;
        let col = guard
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(collection.to_string(), id.to_string()))?;
        let data = col
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(collection.to_string(), id.to_string()))?;

        let obj = data.as_object_mut().ok_or(StoreError::InvalidDocument)?;
        for (key, value) in patch_obj {
            if key == "id" {
                continue;
            }
            obj.insert(key, value);
        }
        Self::stamp(obj, "updatedAt");

        Ok(Document { id: id.to_string(), data: data.clone() })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let col = guard
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(collection.to_string(), id.to_string()))?;
        col.remove(id)
            .ok_or_else(|| StoreError::NotFound(collection.to_string(), id.to_string()))?;
        Ok(())
    }
}
