//! App-entry variant of the gate: one delayed check per screen mount.

use crate::controller::SetupFlowController;
use crate::credential::has_api_key;
use crate::task::ScopedTask;
use crate::timing::GateTiming;
use keygate_store::{ClipboardReader, CredentialStore, FlagStore, ModelResolver};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupEvent {
    PromptDue { generation: u64 },
}

pub struct StartupGate {
    credentials: Arc<dyn CredentialStore>,
    models: Arc<dyn ModelResolver>,
    sheet: SetupFlowController,
    check_delay: Duration,
    present_delay: Duration,
    event_tx: mpsc::UnboundedSender<StartupEvent>,
    event_rx: mpsc::UnboundedReceiver<StartupEvent>,
    generation: u64,
    check_task: Option<ScopedTask>,
}

impl StartupGate {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        models: Arc<dyn ModelResolver>,
        flags: Arc<dyn FlagStore>,
        clipboard: Arc<dyn ClipboardReader>,
        timing: &GateTiming,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let sheet = SetupFlowController::new(
            credentials.clone(),
            models.clone(),
            flags,
            clipboard,
            timing,
        );
        Self {
            credentials,
            models,
            sheet,
            check_delay: timing.startup_check_delay,
            present_delay: timing.startup_present_delay,
            event_tx,
            event_rx,
            generation: 0,
            check_task: None,
        }
    }

    pub fn with_skip(mut self, allow_skip: bool) -> Self {
        self.sheet = self.sheet.with_skip(allow_skip);
        self
    }

    pub fn sheet(&self) -> &SetupFlowController {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut SetupFlowController {
        &mut self.sheet
    }

    pub fn is_mounted(&self) -> bool {
        self.check_task.is_some()
    }

    /// Start the delayed check for this mount. A second mount restarts it.
    pub fn mount(&mut self) {
        self.unmount();
        let generation = self.generation;
        let credentials = self.credentials.clone();
        let models = self.models.clone();
        let check_delay = self.check_delay;
        let present_delay = self.present_delay;
        let tx = self.event_tx.clone();

        self.check_task = Some(ScopedTask::spawn(async move {
            tokio::time::sleep(check_delay).await;

            let model = match models.default_model().await {
                Ok(model) => model,
                Err(e) => {
                    error!("[API Key Setup] Failed to check API key: {}", e);
                    return;
                }
            };
            let provider = match credentials.get(&model.provider).await {
                Ok(Some(provider)) => provider,
                Ok(None) => {
                    error!("[API Key Setup] Provider not found: {}", model.provider);
                    return;
                }
                Err(e) => {
                    error!("[API Key Setup] Failed to check API key: {}", e);
                    return;
                }
            };

            let has_key = has_api_key(&provider);
            info!(
                has_key,
                provider = %provider.provider_id,
                api_key = provider.redacted_key(),
                "[API Key Setup] Check result"
            );
            if has_key {
                return;
            }

            tokio::time::sleep(present_delay).await;
            let _ = tx.send(StartupEvent::PromptDue { generation });
        }));
    }

    /// Leave the screen: cancel any pending check and close the sheet.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.check_task = None;
        self.sheet.dismiss();
    }

    /// Apply queued events. Returns true if the sheet changed.
    pub async fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                StartupEvent::PromptDue { generation } if generation == self.generation => {
                    info!("[API Key Setup] Showing setup sheet");
                    self.sheet.present().await;
                    changed = true;
                }
                StartupEvent::PromptDue { .. } => {}
            }
        }
        changed | self.sheet.pump()
    }
}
