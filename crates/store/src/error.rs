use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed store data: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Provider not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "Could not access local storage.",
            StoreError::Serde(_) => "Stored settings are corrupted.",
            StoreError::NotFound(_) => "Provider is not configured in this app.",
            StoreError::Unavailable(_) => "Storage is unavailable. Please try again.",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Io(_) | StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
