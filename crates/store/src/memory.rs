//! In-process stores with the same contracts as the file-backed ones.

use crate::error::{StoreError, StoreResult};
use crate::ports::{CredentialStore, FlagStore, ModelResolver};
use crate::types::{FlagValue, Model, ProviderCatalog, ProviderCredential};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::RwLock;

pub struct MemoryCredentialStore {
    catalog: RwLock<ProviderCatalog>,
    fail_updates: AtomicBool,
    update_count: AtomicUsize,
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new(ProviderCatalog::default())
    }
}

impl MemoryCredentialStore {
    pub fn new(catalog: ProviderCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            fail_updates: AtomicBool::new(false),
            update_count: AtomicUsize::new(0),
        }
    }

    /// Makes every following `update` fail with `StoreError::Unavailable`.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `update` calls so far.
    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    pub async fn set_default_model(&self, model: Model) {
        self.catalog.write().await.default_model = model;
    }

    /// Writes behind the gate's back, as another screen would.
    pub async fn overwrite(&self, credential: &ProviderCredential) {
        self.catalog.write().await.apply(credential);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, provider_id: &str) -> StoreResult<Option<ProviderCredential>> {
        Ok(self
            .catalog
            .read()
            .await
            .get(provider_id)
            .map(|p| p.credential.clone()))
    }

    async fn update(&self, credential: &ProviderCredential) -> StoreResult<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("updates disabled".to_string()));
        }
        if !self.catalog.write().await.apply(credential) {
            return Err(StoreError::NotFound(credential.provider_id.clone()));
        }
        self.update_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ModelResolver for MemoryCredentialStore {
    async fn default_model(&self) -> StoreResult<Model> {
        Ok(self.catalog.read().await.default_model.clone())
    }
}

#[derive(Default)]
pub struct MemoryFlagStore {
    values: Mutex<HashMap<String, FlagValue>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, FlagValue>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Option<FlagValue> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: FlagValue) -> StoreResult<()> {
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.values().remove(key);
        Ok(())
    }
}
