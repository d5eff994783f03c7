use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Welcome,
    Chat,
    ProviderSettings(ProviderSettingsView),
}

/// Read-only snapshot shown on the provider settings screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettingsView {
    pub provider_id: Option<String>,
    pub api_key_masked: String,
    pub api_host: String,
    pub found: bool,
}

impl ProviderSettingsView {
    pub fn missing(provider_id: Option<String>) -> Self {
        Self {
            provider_id,
            api_key_masked: String::new(),
            api_host: String::new(),
            found: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetField {
    ApiKey,
    ApiHost,
}

impl SheetField {
    pub fn toggle(self) -> Self {
        match self {
            SheetField::ApiKey => SheetField::ApiHost,
            SheetField::ApiHost => SheetField::ApiKey,
        }
    }
}

/// Which call site owns the sheet that is on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetOrigin {
    Startup,
    Action,
}

#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

pub fn mask_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let tail: String = trimmed
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("********{tail}")
}
