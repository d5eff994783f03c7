use crate::error::{StoreError, StoreResult};
use crate::ports::{CredentialStore, ModelResolver};
use crate::types::{Model, ProviderCatalog, ProviderCredential};
use async_trait::async_trait;
use directories::ProjectDirs;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

const CATALOG_FILE: &str = "providers.json";

/// Data directory shared by the file-backed stores.
pub fn data_dir() -> StoreResult<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "keygate", "keygate").ok_or_else(|| {
        StoreError::Unavailable("Could not determine project directories".to_string())
    })?;
    let data_dir = proj_dirs.data_dir();
    fs::create_dir_all(data_dir)?;
    Ok(data_dir.to_path_buf())
}

/// Owner-only write of a whole file.
pub(crate) fn write_secure_file(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&tmp, perms)?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Provider catalog kept as a JSON document on disk.
///
/// Every read goes back to the file so that callers always observe the latest
/// persisted state. Writes are serialized through an async mutex.
pub struct FileProviderStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileProviderStore {
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let store = Self {
            path: dir.join(CATALOG_FILE),
            write_lock: Mutex::new(()),
        };
        if !store.path.exists() {
            info!("Seeding provider catalog at {}", store.path.display());
            store.save(&ProviderCatalog::default())?;
        }
        Ok(store)
    }

    pub fn open_default() -> StoreResult<Self> {
        Self::open(data_dir()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StoreResult<ProviderCatalog> {
        let bytes = fs::read(&self.path)?;
        let catalog: ProviderCatalog = serde_json::from_slice(&bytes)?;
        Ok(catalog)
    }

    pub fn save(&self, catalog: &ProviderCatalog) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(catalog)?;
        write_secure_file(&self.path, &json)
    }

    pub async fn set_default_model(&self, model: Model) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load()?;
        if catalog.get(&model.provider).is_none() {
            return Err(StoreError::NotFound(model.provider));
        }
        catalog.default_model = model;
        self.save(&catalog)
    }
}

#[async_trait]
impl CredentialStore for FileProviderStore {
    async fn get(&self, provider_id: &str) -> StoreResult<Option<ProviderCredential>> {
        let catalog = self.load()?;
        Ok(catalog.get(provider_id).map(|p| p.credential.clone()))
    }

    async fn update(&self, credential: &ProviderCredential) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load()?;
        if !catalog.apply(credential) {
            return Err(StoreError::NotFound(credential.provider_id.clone()));
        }
        self.save(&catalog)?;
        debug!(
            provider = %credential.provider_id,
            api_key = credential.redacted_key(),
            "Provider credential updated"
        );
        Ok(())
    }
}

#[async_trait]
impl ModelResolver for FileProviderStore {
    async fn default_model(&self) -> StoreResult<Model> {
        Ok(self.load()?.default_model)
    }
}
