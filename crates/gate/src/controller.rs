//! The setup-sheet state machine.
//!
//! Every operation returns a [`SetupEvent`] describing what happened, and the
//! presentation layer reacts to those values. The controller never calls back
//! into UI code.

use crate::credential::has_api_key;
use crate::detector::{ClipboardCandidate, ClipboardKeyDetector};
use crate::flags::{self, SETUP_SKIPPED_KEY};
use crate::providers::api_key_website;
use crate::timing::GateTiming;
use keygate_store::{
    ClipboardReader, CredentialStore, FlagStore, ModelResolver, ProviderCredential,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Idle,
    Prompting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ProviderSettings { provider_id: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupEvent {
    /// Nothing happened: wrong state, guard not met, or affordance not offered.
    Ignored,
    Presented,
    Configured { provider_id: String },
    Skipped,
    Dismissed,
    Navigate(Route),
    /// The sheet stays open; nothing was reported as saved.
    SaveFailed { reason: String },
}

/// Editable copy of the target provider's credential while the sheet is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupDraft {
    pub api_key: String,
    pub api_host: String,
    pub key_visible: bool,
}

pub struct SetupFlowController {
    credentials: Arc<dyn CredentialStore>,
    models: Arc<dyn ModelResolver>,
    flags: Arc<dyn FlagStore>,
    detector: ClipboardKeyDetector,
    provider_id: Option<String>,
    allow_skip: bool,
    state: SetupState,
    target: Option<String>,
    draft: SetupDraft,
}

impl SetupFlowController {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        models: Arc<dyn ModelResolver>,
        flags: Arc<dyn FlagStore>,
        clipboard: Arc<dyn ClipboardReader>,
        timing: &GateTiming,
    ) -> Self {
        Self {
            credentials,
            models,
            flags,
            detector: ClipboardKeyDetector::new(clipboard, timing),
            provider_id: None,
            allow_skip: true,
            state: SetupState::Idle,
            target: None,
            draft: SetupDraft::default(),
        }
    }

    /// Pin the sheet to one provider instead of the default model's provider.
    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    pub fn with_skip(mut self, allow_skip: bool) -> Self {
        self.allow_skip = allow_skip;
        self
    }

    pub fn state(&self) -> SetupState {
        self.state
    }

    pub fn is_prompting(&self) -> bool {
        self.state == SetupState::Prompting
    }

    pub fn allows_skip(&self) -> bool {
        self.allow_skip
    }

    pub fn draft(&self) -> &SetupDraft {
        &self.draft
    }

    pub fn target_provider(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn clipboard_notice(&self) -> Option<&ClipboardCandidate> {
        self.detector.signal()
    }

    pub fn api_key_website(&self) -> Option<&'static str> {
        self.target.as_deref().and_then(api_key_website)
    }

    pub fn can_save(&self) -> bool {
        self.is_prompting() && !self.draft.api_key.trim().is_empty()
    }

    async fn resolve_target(&self) -> Option<String> {
        if let Some(id) = &self.provider_id {
            return Some(id.clone());
        }
        match self.models.default_model().await {
            Ok(model) => Some(model.provider),
            Err(e) => {
                warn!("Failed to resolve default model: {}", e);
                None
            }
        }
    }

    /// Open the sheet with a buffer loaded from the store as it is right now.
    pub async fn present(&mut self) -> SetupEvent {
        let target = self.resolve_target().await;
        let record = match &target {
            Some(id) => match self.credentials.get(id).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to load provider {}: {}", id, e);
                    None
                }
            },
            None => None,
        };

        self.draft = match &record {
            Some(cred) => SetupDraft {
                api_key: cred.api_key.clone(),
                api_host: cred.api_host.clone(),
                key_visible: false,
            },
            None => SetupDraft::default(),
        };
        self.target = target;
        self.state = SetupState::Prompting;

        debug!(provider = ?self.target, "Setup sheet presented");
        self.detector.close();
        self.rearm_detector();
        SetupEvent::Presented
    }

    pub async fn save(&mut self) -> SetupEvent {
        if !self.can_save() {
            return SetupEvent::Ignored;
        }
        let Some(provider_id) = self.target.clone() else {
            warn!("Save requested without a resolved provider");
            return SetupEvent::SaveFailed {
                reason: "No provider to save to".to_string(),
            };
        };

        let updated = ProviderCredential {
            provider_id: provider_id.clone(),
            api_key: self.draft.api_key.clone(),
            api_host: self.draft.api_host.clone(),
        };
        if let Err(e) = self.credentials.update(&updated).await {
            warn!("Failed to save credential for {}: {}", provider_id, e);
            return SetupEvent::SaveFailed {
                reason: e.user_message().to_string(),
            };
        }

        let persisted = match self.credentials.get(&provider_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to re-read {} after save: {}", provider_id, e);
                None
            }
        };
        if !persisted.as_ref().is_some_and(has_api_key) {
            warn!("Provider {} still has no API key after save", provider_id);
            return SetupEvent::SaveFailed {
                reason: "The key was not stored".to_string(),
            };
        }

        flags::clear_setup_flags(self.flags.as_ref());
        info!("API key configured for {}", provider_id);
        self.close();
        SetupEvent::Configured { provider_id }
    }

    pub fn skip(&mut self) -> SetupEvent {
        if !self.is_prompting() || !self.allow_skip {
            return SetupEvent::Ignored;
        }
        flags::mark(self.flags.as_ref(), SETUP_SKIPPED_KEY);
        info!("API key setup skipped");
        self.close();
        SetupEvent::Skipped
    }

    /// Close button or backdrop.
    pub fn dismiss(&mut self) -> SetupEvent {
        if !self.is_prompting() {
            return SetupEvent::Ignored;
        }
        self.close();
        SetupEvent::Dismissed
    }

    /// Hardware back. Returns true when the sheet consumed the gesture.
    pub fn handle_back(&mut self) -> bool {
        if !self.is_prompting() {
            return false;
        }
        self.dismiss();
        true
    }

    /// Non-negative index means visible, -1 means hidden. The sheet is already
    /// shown by `present`, so only hiding has an effect.
    pub fn change_visibility(&mut self, index: i32) -> SetupEvent {
        if index >= 0 {
            return SetupEvent::Ignored;
        }
        self.dismiss()
    }

    pub fn navigate_to_settings(&mut self) -> SetupEvent {
        if !self.is_prompting() {
            return SetupEvent::Ignored;
        }
        let provider_id = self.target.clone();
        self.close();
        SetupEvent::Navigate(Route::ProviderSettings { provider_id })
    }

    /// Manual edit of the key field.
    pub fn edit_api_key(&mut self, text: impl Into<String>) {
        if !self.is_prompting() {
            return;
        }
        self.draft.api_key = text.into();
        self.detector.clear_signal();
        self.rearm_detector();
    }

    pub fn edit_api_host(&mut self, text: impl Into<String>) {
        if self.is_prompting() {
            self.draft.api_host = text.into();
        }
    }

    pub fn toggle_key_visibility(&mut self) {
        self.draft.key_visible = !self.draft.key_visible;
    }

    /// Apply whatever the detector has delivered. Returns true if the sheet changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Some(event) = self.detector.try_next() {
            let was_signalled = self.detector.is_signalled();
            if let Some(key) = self.detector.accept(event) {
                if self.detector_active() {
                    self.draft.api_key = key;
                    changed = true;
                } else {
                    self.detector.clear_signal();
                }
            }
            changed |= was_signalled != self.detector.is_signalled();
        }
        changed
    }

    fn detector_active(&self) -> bool {
        self.is_prompting() && self.draft.api_key.trim().is_empty()
    }

    fn rearm_detector(&mut self) {
        if self.detector_active() {
            if !self.detector.is_armed() {
                self.detector.arm();
            }
        } else {
            self.detector.disarm();
        }
    }

    fn close(&mut self) {
        self.detector.close();
        self.state = SetupState::Idle;
    }
}
