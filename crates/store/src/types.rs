use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The credential half of a provider record: one opaque key and one opaque host override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredential {
    #[serde(rename = "id")]
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_host: String,
}

impl ProviderCredential {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            api_key: String::new(),
            api_host: String::new(),
        }
    }

    pub fn with_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    /// Key shape safe for log lines.
    pub fn redacted_key(&self) -> &'static str {
        if self.api_key.is_empty() {
            "(empty)"
        } else {
            "***"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    #[serde(flatten)]
    pub credential: ProviderCredential,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProviderEntry {
    pub fn new(id: &str, name: &str, api_host: &str) -> Self {
        Self {
            credential: ProviderCredential::new(id).with_host(api_host),
            name: name.to_string(),
            updated_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.credential.provider_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCatalog {
    pub default_model: Model,
    pub providers: Vec<ProviderEntry>,
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self {
            default_model: Model {
                id: "gpt-4o-mini".to_string(),
                provider: "openai".to_string(),
            },
            providers: vec![
                ProviderEntry::new("openai", "OpenAI", "https://api.openai.com"),
                ProviderEntry::new("anthropic", "Anthropic", "https://api.anthropic.com"),
                ProviderEntry::new("deepseek", "DeepSeek", "https://api.deepseek.com"),
                ProviderEntry::new("openrouter", "OpenRouter", "https://openrouter.ai/api/v1"),
                ProviderEntry::new("ollama", "Ollama", "http://localhost:11434"),
            ],
        }
    }
}

impl ProviderCatalog {
    pub fn get(&self, provider_id: &str) -> Option<&ProviderEntry> {
        self.providers.iter().find(|p| p.id() == provider_id)
    }

    /// Replaces key and host of an existing entry. Returns false if the provider is unknown.
    pub fn apply(&mut self, credential: &ProviderCredential) -> bool {
        match self
            .providers
            .iter_mut()
            .find(|p| p.id() == credential.provider_id)
        {
            Some(entry) => {
                entry.credential.api_key = credential.api_key.clone();
                entry.credential.api_host = credential.api_host.clone();
                entry.updated_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            FlagValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Bool(_) => None,
            FlagValue::Text(s) => Some(s),
        }
    }
}
