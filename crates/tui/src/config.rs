use directories::ProjectDirs;
use keygate_gate::GateTiming;
use keygate_store::StoreResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gate: GateConfig,
    pub storage: StorageConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub allow_skip: bool,
    pub clipboard_debounce_ms: u64,
    pub clipboard_notice_ms: u64,
    pub startup_check_delay_ms: u64,
    pub startup_present_delay_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            storage: StorageConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        let timing = GateTiming::default();
        Self {
            allow_skip: true,
            clipboard_debounce_ms: timing.clipboard_debounce.as_millis() as u64,
            clipboard_notice_ms: timing.clipboard_notice.as_millis() as u64,
            startup_check_delay_ms: timing.startup_check_delay.as_millis() as u64,
            startup_present_delay_ms: timing.startup_present_delay.as_millis() as u64,
        }
    }
}

impl GateConfig {
    pub fn timing(&self) -> GateTiming {
        GateTiming {
            clipboard_debounce: Duration::from_millis(self.clipboard_debounce_ms),
            clipboard_notice: Duration::from_millis(self.clipboard_notice_ms),
            startup_check_delay: Duration::from_millis(self.startup_check_delay_ms),
            startup_present_delay: Duration::from_millis(self.startup_present_delay_ms),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "keygate", "keygate") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("config/default.toml")
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Where provider and flag files live.
    pub fn data_dir(&self) -> StoreResult<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(dir.clone())
            }
            None => keygate_store::catalog::data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config: Config = toml::from_str(
            r#"
            log_level = "debug"

            [gate]
            allow_skip = false
            startup_check_delay_ms = 250
            "#,
        )
        .expect("parse config");

        assert_eq!(config.log_level, "debug");
        assert!(!config.gate.allow_skip);
        let timing = config.gate.timing();
        assert_eq!(timing.startup_check_delay, Duration::from_millis(250));
        assert_eq!(timing.clipboard_debounce, Duration::from_millis(300));
        assert_eq!(timing.clipboard_notice, Duration::from_millis(3000));
        assert_eq!(timing.startup_present_delay, Duration::from_millis(800));
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_or_default(&dir.path().join("absent.toml"));
        assert!(config.gate.allow_skip);
        assert_eq!(config.gate.timing(), GateTiming::default());
    }

    #[test]
    fn storage_override_is_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("nested").join("data");
        let config = Config {
            storage: StorageConfig {
                data_dir: Some(target.clone()),
            },
            ..Config::default()
        };

        assert_eq!(config.data_dir().expect("data dir"), target);
        assert!(target.is_dir());
    }
}
