use super::*;

impl App {
    /// Mount the welcome screen's startup check.
    pub fn init(&mut self) {
        self.screen = Screen::Welcome;
        self.startup_gate.mount();
    }

    /// Drain timer and clipboard results from both gates.
    pub async fn pump(&mut self) -> bool {
        let was_prompting = self.startup_gate.sheet().is_prompting();
        let startup_changed = self.startup_gate.pump().await;
        if !was_prompting && self.startup_gate.sheet().is_prompting() {
            self.apply_setup_event(SheetOrigin::Startup, SetupEvent::Presented)
                .await;
        }
        let action_changed = self.action_gate.sheet_mut().pump();
        startup_changed || action_changed
    }

    pub fn shutdown(&mut self) {
        self.startup_gate.unmount();
        self.action_gate.sheet_mut().dismiss();
    }

    pub(super) fn enter_chat(&mut self) {
        self.startup_gate.unmount();
        self.screen = Screen::Chat;
    }

    pub(super) fn enter_welcome(&mut self) {
        self.screen = Screen::Welcome;
        self.startup_gate.mount();
    }

    pub(super) async fn submit_input(&mut self) {
        if self.input.buffer.trim().is_empty() {
            return;
        }

        if self.input.mode == InputMode::Command {
            let text = self.input.take();
            match Command::parse(&text) {
                Some(Command::Settings) => self.open_provider_settings(None).await,
                Some(Command::Setup) => {
                    let event = self.action_gate.sheet_mut().present().await;
                    self.apply_setup_event(SheetOrigin::Action, event).await;
                }
                Some(Command::Unknown(name)) => {
                    self.status = Some(format!("Unknown command: /{name}"));
                }
                None => {}
            }
            return;
        }

        if !self.action_gate.ensure_configured().await {
            self.sheet_field = SheetField::ApiKey;
            self.status = Some("Add an API key to send messages.".to_string());
            return;
        }

        let text = self.input.take();
        tracing::debug!("Message queued for the default model");
        self.push_transcript(text);
        self.status = None;
        self.clear_error();
    }

    /// React to what a sheet reported.
    pub(super) async fn apply_setup_event(&mut self, origin: SheetOrigin, event: SetupEvent) {
        match event {
            SetupEvent::Configured { provider_id } => {
                self.sheet_field = SheetField::ApiKey;
                self.clear_error();
                self.status = Some(match origin {
                    SheetOrigin::Action => {
                        format!("API key saved for {provider_id}. Press Enter to send.")
                    }
                    SheetOrigin::Startup => format!("API key saved for {provider_id}."),
                });
            }
            SetupEvent::Skipped => {
                self.sheet_field = SheetField::ApiKey;
                self.status =
                    Some("You can add an API key later with /setup or /settings.".to_string());
            }
            SetupEvent::Dismissed => {
                self.sheet_field = SheetField::ApiKey;
            }
            SetupEvent::Navigate(Route::ProviderSettings { provider_id }) => {
                self.sheet_field = SheetField::ApiKey;
                self.open_provider_settings(provider_id).await;
            }
            SetupEvent::SaveFailed { reason } => {
                self.report_error("Could not save API key", reason);
            }
            SetupEvent::Presented => {
                self.sheet_field = SheetField::ApiKey;
            }
            SetupEvent::Ignored => {}
        }
    }

    async fn open_provider_settings(&mut self, provider_id: Option<String>) {
        let view = match self.load_provider_settings(provider_id.clone()).await {
            Ok(view) => view,
            Err(e) => {
                self.report_error("Failed to load provider settings", format!("{e:#}"));
                ProviderSettingsView::missing(provider_id)
            }
        };
        if self.screen == Screen::Welcome {
            self.startup_gate.unmount();
        }
        self.screen = Screen::ProviderSettings(view);
    }

    async fn load_provider_settings(
        &self,
        provider_id: Option<String>,
    ) -> Result<ProviderSettingsView> {
        let provider_id = match provider_id {
            Some(id) => id,
            None => {
                self.services
                    .models
                    .default_model()
                    .await
                    .context("resolving default model")?
                    .provider
            }
        };
        let record = self
            .services
            .credentials
            .get(&provider_id)
            .await
            .with_context(|| format!("loading provider {provider_id}"))?;

        Ok(match record {
            Some(cred) => ProviderSettingsView {
                provider_id: Some(provider_id),
                api_key_masked: mask_key(&cred.api_key),
                api_host: cred.api_host,
                found: true,
            },
            None => ProviderSettingsView::missing(Some(provider_id)),
        })
    }
}
