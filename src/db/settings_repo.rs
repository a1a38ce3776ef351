// src/db/settings_repo.rs

use std::sync::Arc;

use serde_json::Value;

use crate::{
    common::error::AppError,
    models::settings::Settings,
    store::{DocumentStore, collections},
};

#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn DocumentStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Busca explícita com default injetado: um documento por instalação;
    /// sem documento, valem os defaults (e-mail ligado, requireOtp ligado).
    pub async fn get_or_default(&self) -> Result<Settings, AppError> {
        let docs = self.store.list(collections::SETTINGS).await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(doc.decode()?),
            None => Ok(Settings::default()),
        }
    }

    /// Aplica o patch no documento singular, criando-o na primeira escrita.
    pub async fn update(&self, patch: Value) -> Result<Settings, AppError> {
        let docs = self.store.list(collections::SETTINGS).await?;
        let doc = match docs.into_iter().next() {
            Some(existing) => self.store.update(collections::SETTINGS, &existing.id, patch).await?,
            None => {
                // Primeira escrita: parte dos defaults e aplica o patch
                let mut base = serde_json::to_value(Settings::default())
                    .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
                if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object())
                {
                    for (key, value) in patch_obj {
                        base_obj.insert(key.clone(), value.clone());
                    }
                }
                self.store.create(collections::SETTINGS, base).await?
            }
        };
        Ok(doc.decode()?)
    }
}
