use async_trait::async_trait;
use keygate_store::{ClipboardReader, StoreError, StoreResult};

/// System clipboard through `arboard`. Each read opens a fresh handle on the blocking pool.
pub struct SystemClipboard;

#[async_trait]
impl ClipboardReader for SystemClipboard {
    async fn read_text(&self) -> StoreResult<Option<String>> {
        let result = tokio::task::spawn_blocking(|| -> Result<String, arboard::Error> {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.get_text()
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match result {
            Ok(text) if text.is_empty() => Ok(None),
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }
}
