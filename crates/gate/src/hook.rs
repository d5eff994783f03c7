use crate::controller::{SetupEvent, SetupFlowController};
use crate::credential::is_configured;
use crate::flags::{self, FIRST_USE_PROMPTED_KEY};
use crate::timing::GateTiming;
use keygate_store::{ClipboardReader, CredentialStore, FlagStore, ModelResolver};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Gate for actions that need a working key.
///
/// Owns its own sheet controller; other call sites build their own.
pub struct SetupGateHook {
    credentials: Arc<dyn CredentialStore>,
    models: Arc<dyn ModelResolver>,
    flags: Arc<dyn FlagStore>,
    sheet: SetupFlowController,
}

impl SetupGateHook {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        models: Arc<dyn ModelResolver>,
        flags: Arc<dyn FlagStore>,
        clipboard: Arc<dyn ClipboardReader>,
        timing: &GateTiming,
    ) -> Self {
        let sheet = SetupFlowController::new(
            credentials.clone(),
            models.clone(),
            flags.clone(),
            clipboard,
            timing,
        );
        Self {
            credentials,
            models,
            flags,
            sheet,
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

    /// True when the default provider has a key. Otherwise opens the sheet and
    /// returns false; the caller should treat that as "blocked", not retry.
    pub async fn ensure_configured(&mut self) -> bool {
        let model = match self.models.default_model().await {
            Ok(model) => model,
            Err(e) => {
                error!("Failed to check API key: {}", e);
                return false;
            }
        };
        let provider = match self.credentials.get(&model.provider).await {
            Ok(provider) => provider,
            Err(e) => {
                error!("Failed to check API key: {}", e);
                return false;
            }
        };

        if is_configured(provider.as_ref()) {
            debug!(provider = %model.provider, "API key present");
            return true;
        }

        info!(provider = %model.provider, "API key missing, prompting");
        if self.sheet.present().await == SetupEvent::Presented {
            flags::mark(self.flags.as_ref(), FIRST_USE_PROMPTED_KEY);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::Fixture;
    use crate::controller::SetupState;
    use crate::flags::{first_use_prompted, setup_skipped};
    use async_trait::async_trait;
    use keygate_store::{Model, ProviderCredential, StoreError, StoreResult};

    fn hook(fx: &Fixture) -> SetupGateHook {
        SetupGateHook::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.flags.clone(),
            fx.clipboard.clone(),
            &GateTiming::default(),
        )
    }

    struct BrokenResolver;

    #[async_trait]
    impl ModelResolver for BrokenResolver {
        async fn default_model(&self) -> StoreResult<Model> {
            Err(StoreError::Unavailable("provider service not ready".to_string()))
        }
    }

    #[tokio::test]
    async fn configured_provider_passes_without_side_effects() {
        let fx = Fixture::new();
        fx.store
            .overwrite(&ProviderCredential::new("openai").with_key("sk-live"))
            .await;
        let mut gate = hook(&fx);

        assert!(gate.ensure_configured().await);
        assert_eq!(gate.sheet().state(), SetupState::Idle);
        assert!(fx.flags.is_empty());
    }

    #[tokio::test]
    async fn missing_key_blocks_and_prompts() {
        let fx = Fixture::new();
        let mut gate = hook(&fx);

        assert!(!gate.ensure_configured().await);
        assert!(gate.sheet().is_prompting());
        assert!(first_use_prompted(fx.flags.as_ref()));
    }

    #[tokio::test]
    async fn skip_does_not_suppress_later_prompts() {
        let fx = Fixture::new();
        let mut gate = hook(&fx);

        assert!(!gate.ensure_configured().await);
        assert_eq!(gate.sheet_mut().skip(), SetupEvent::Skipped);
        assert!(setup_skipped(fx.flags.as_ref()));
        assert!(!gate.sheet().is_prompting());

        assert!(!gate.ensure_configured().await);
        assert!(gate.sheet().is_prompting());
    }

    #[tokio::test]
    async fn each_call_rereads_the_store() {
        let fx = Fixture::new();
        let mut gate = hook(&fx);

        assert!(!gate.ensure_configured().await);
        gate.sheet_mut().dismiss();

        fx.store
            .overwrite(&ProviderCredential::new("openai").with_key("sk-from-settings"))
            .await;
        assert!(gate.ensure_configured().await);
        assert!(!gate.sheet().is_prompting());
    }

    #[tokio::test]
    async fn save_through_the_hook_unblocks_the_next_action() {
        let fx = Fixture::new();
        let mut gate = hook(&fx);

        assert!(!gate.ensure_configured().await);
        gate.sheet_mut().edit_api_key("sk-typed-in-sheet");
        assert!(matches!(
            gate.sheet_mut().save().await,
            SetupEvent::Configured { .. }
        ));
        assert!(fx.flags.is_empty());
        assert!(gate.ensure_configured().await);
    }

    #[tokio::test]
    async fn resolution_failure_blocks_without_prompting() {
        let fx = Fixture::new();
        let mut gate = SetupGateHook::new(
            fx.store.clone(),
            Arc::new(BrokenResolver),
            fx.flags.clone(),
            fx.clipboard.clone(),
            &GateTiming::default(),
        );

        assert!(!gate.ensure_configured().await);
        assert!(!gate.sheet().is_prompting());
        assert!(fx.flags.is_empty());
    }

    #[tokio::test]
    async fn unknown_default_provider_counts_as_unconfigured() {
        let fx = Fixture::new();
        fx.store
            .set_default_model(Model {
                id: "mystery".to_string(),
                provider: "ghost".to_string(),
            })
            .await;
        let mut gate = hook(&fx);

        assert!(!gate.ensure_configured().await);
        assert!(gate.sheet().is_prompting());
        assert_eq!(gate.sheet().target_provider(), Some("ghost"));
    }
}
