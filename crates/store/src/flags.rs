use crate::catalog::{data_dir, write_secure_file};
use crate::error::StoreResult;
use crate::ports::FlagStore;
use crate::types::FlagValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

const FLAGS_FILE: &str = "flags.json";

/// Flag map mirrored to `flags.json`. Each mutation is written through before returning.
pub struct FileFlagStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, FlagValue>>,
}

impl FileFlagStore {
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(FLAGS_FILE);

        let values = if path.exists() {
            let bytes = fs::read(&path)?;
            match serde_json::from_slice(&bytes) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Discarding unreadable flag file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn open_default() -> StoreResult<Self> {
        Self::open(data_dir()?)
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, FlagValue>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, values: &BTreeMap<String, FlagValue>) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(values)?;
        write_secure_file(&self.path, &json)
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Option<FlagValue> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: FlagValue) -> StoreResult<()> {
        let mut values = self.values();
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let mut values = self.values();
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}
