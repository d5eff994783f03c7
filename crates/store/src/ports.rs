//! Contracts for the collaborators the gate talks to.
//!
//! The gate only ever holds these as `Arc<dyn ...>`, so tests and embedders can
//! swap in the in-memory implementations from [`crate::memory`].

use crate::error::StoreResult;
use crate::types::{FlagValue, Model, ProviderCredential};
use async_trait::async_trait;

/// Per-provider key/host records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current record for `provider_id`, or `None` if the provider is unknown.
    async fn get(&self, provider_id: &str) -> StoreResult<Option<ProviderCredential>>;

    /// Persist key and host for an existing provider.
    async fn update(&self, credential: &ProviderCredential) -> StoreResult<()>;
}

/// Resolves which model, and therefore which provider, actions run against by default.
#[async_trait]
pub trait ModelResolver: Send + Sync {
    async fn default_model(&self) -> StoreResult<Model>;
}

/// Durable named values that survive a restart. Calls are synchronous.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Option<FlagValue>;

    fn set(&self, key: &str, value: FlagValue) -> StoreResult<()>;

    fn delete(&self, key: &str) -> StoreResult<()>;

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }
}

#[async_trait]
pub trait ClipboardReader: Send + Sync {
    /// Current clipboard text. `Ok(None)` when the clipboard holds no text.
    async fn read_text(&self) -> StoreResult<Option<String>>;
}
