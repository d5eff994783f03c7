use crate::input::{Command, InputMode, InputState};
use crate::keybinds::Keybinds;
use crate::ui::layout::LayoutState;
use crate::ui::panel::PanelType;
use crate::Config;
use anyhow::{Context, Result};
use chrono::Utc;
use keygate_gate::{Route, SetupEvent, SetupFlowController, SetupGateHook, StartupGate};
use keygate_store::{ClipboardReader, CredentialStore, FlagStore, ModelResolver};
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::Frame;
use std::collections::VecDeque;
use std::sync::Arc;

mod effects;
mod input;
mod render;
mod state;
mod types;

pub use state::{App, AppServices};
pub use types::{
    mask_key, ProviderSettingsView, Screen, SheetField, SheetOrigin, TranscriptEntry,
};

const MAX_TRANSCRIPT: usize = 200;

impl App {
    pub(super) fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        let message = format!("{context}: {error}");
        self.last_error = Some(message.clone());
        tracing::warn!("{message}");
    }

    pub(super) fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// The sheet currently on screen. The startup sheet sits on top if both are open.
    pub fn active_sheet(&self) -> Option<(SheetOrigin, &SetupFlowController)> {
        if self.startup_gate.sheet().is_prompting() {
            Some((SheetOrigin::Startup, self.startup_gate.sheet()))
        } else if self.action_gate.sheet().is_prompting() {
            Some((SheetOrigin::Action, self.action_gate.sheet()))
        } else {
            None
        }
    }

    pub fn active_origin(&self) -> Option<SheetOrigin> {
        self.active_sheet().map(|(origin, _)| origin)
    }

    pub(super) fn sheet_mut(&mut self, origin: SheetOrigin) -> &mut SetupFlowController {
        match origin {
            SheetOrigin::Startup => self.startup_gate.sheet_mut(),
            SheetOrigin::Action => self.action_gate.sheet_mut(),
        }
    }

    pub(super) fn push_transcript(&mut self, text: String) {
        self.transcript.push_back(TranscriptEntry {
            text,
            timestamp: Utc::now(),
        });
        while self.transcript.len() > MAX_TRANSCRIPT {
            self.transcript.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use async_trait::async_trait;
    use keygate_store::{
        MemoryCredentialStore, MemoryFlagStore, ProviderCredential, StoreResult,
    };
    use std::time::Duration;

    struct QuietClipboard;

    #[async_trait]
    impl ClipboardReader for QuietClipboard {
        async fn read_text(&self) -> StoreResult<Option<String>> {
            Ok(None)
        }
    }

    fn test_app(allow_skip: bool) -> (App, Arc<MemoryCredentialStore>, Arc<MemoryFlagStore>) {
        let store = Arc::new(MemoryCredentialStore::default());
        let flags = Arc::new(MemoryFlagStore::new());
        let services = AppServices {
            credentials: store.clone(),
            models: store.clone(),
            flags: flags.clone(),
            clipboard: Arc::new(QuietClipboard),
        };
        let config = Config {
            gate: GateConfig {
                allow_skip,
                ..GateConfig::default()
            },
            ..Config::default()
        };
        (App::new(config, services), store, flags)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(key(KeyCode::Char(c))).await;
        }
    }

    async fn settle(app: &mut App, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        app.pump().await;
    }

    #[tokio::test]
    async fn send_without_key_opens_sheet_and_keeps_draft() {
        let (mut app, _, _) = test_app(true);
        app.screen = Screen::Chat;

        type_text(&mut app, "hello").await;
        app.handle_event(key(KeyCode::Enter)).await;

        assert!(app.transcript.is_empty());
        assert_eq!(app.input.buffer, "hello");
        assert!(matches!(app.active_sheet(), Some((SheetOrigin::Action, _))));
    }

    #[tokio::test]
    async fn saving_in_sheet_unblocks_sending() {
        let (mut app, store, flags) = test_app(true);
        app.screen = Screen::Chat;
        type_text(&mut app, "hello").await;
        app.handle_event(key(KeyCode::Enter)).await;

        type_text(&mut app, "sk-typed").await;
        app.handle_event(ctrl('s')).await;

        assert!(app.active_sheet().is_none());
        assert!(flags.is_empty());
        let cred = store.get("openai").await.expect("get").expect("openai");
        assert_eq!(cred.api_key, "sk-typed");

        app.handle_event(key(KeyCode::Enter)).await;
        assert_eq!(app.transcript.len(), 1);
        assert_eq!(app.transcript[0].text, "hello");
        assert!(app.input.buffer.is_empty());
    }

    #[tokio::test]
    async fn escape_closes_sheet_without_leaving_chat() {
        let (mut app, store, flags) = test_app(true);
        app.screen = Screen::Chat;
        type_text(&mut app, "hi").await;
        app.handle_event(key(KeyCode::Enter)).await;

        app.handle_event(key(KeyCode::Esc)).await;

        assert!(app.active_sheet().is_none());
        assert_eq!(app.screen, Screen::Chat);
        assert!(flags.is_empty());
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn skip_is_only_available_when_configured() {
        let (mut app, _, flags) = test_app(false);
        app.screen = Screen::Chat;
        type_text(&mut app, "hi").await;
        app.handle_event(key(KeyCode::Enter)).await;

        app.handle_event(ctrl('k')).await;
        assert!(app.active_sheet().is_some());
        assert!(flags.is_empty());
    }

    #[tokio::test]
    async fn go_to_settings_routes_to_provider_screen() {
        let (mut app, store, _) = test_app(true);
        store
            .overwrite(&ProviderCredential::new("openai").with_host("https://relay.example"))
            .await;
        app.screen = Screen::Chat;
        type_text(&mut app, "hi").await;
        app.handle_event(key(KeyCode::Enter)).await;

        app.handle_event(ctrl('o')).await;

        assert!(app.active_sheet().is_none());
        match &app.screen {
            Screen::ProviderSettings(view) => {
                assert_eq!(view.provider_id.as_deref(), Some("openai"));
                assert_eq!(view.api_host, "https://relay.example");
                assert!(view.found);
            }
            other => panic!("expected provider settings, got {other:?}"),
        }

        app.handle_event(key(KeyCode::Esc)).await;
        assert_eq!(app.screen, Screen::Chat);
    }

    #[tokio::test(start_paused = true)]
    async fn welcome_prompts_after_startup_delay() {
        let (mut app, _, _) = test_app(true);
        app.init();

        settle(&mut app, 1000).await;
        assert!(app.active_sheet().is_none());

        settle(&mut app, 1000).await;
        assert!(matches!(app.active_sheet(), Some((SheetOrigin::Startup, _))));
    }

    #[tokio::test(start_paused = true)]
    async fn startup_sheet_opens_on_the_key_field() {
        let (mut app, _, _) = test_app(true);
        app.init();
        app.sheet_field = SheetField::ApiHost;

        settle(&mut app, 2000).await;

        assert!(matches!(app.active_sheet(), Some((SheetOrigin::Startup, _))));
        assert_eq!(app.sheet_field, SheetField::ApiKey);
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_welcome_cancels_startup_check() {
        let (mut app, _, _) = test_app(true);
        app.init();

        settle(&mut app, 500).await;
        app.handle_event(key(KeyCode::Enter)).await;
        assert_eq!(app.screen, Screen::Chat);

        settle(&mut app, 3000).await;
        assert!(app.active_sheet().is_none());
    }

    #[tokio::test]
    async fn pasted_key_with_newline_fills_field_without_saving() {
        let (mut app, store, _) = test_app(true);
        app.screen = Screen::Chat;
        type_text(&mut app, "hi").await;
        app.handle_event(key(KeyCode::Enter)).await;

        app.handle_event(Event::Paste("sk-pasted\n".to_string()))
            .await;

        let (_, sheet) = app.active_sheet().expect("sheet stays open");
        assert_eq!(sheet.draft().api_key, "sk-pasted");
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn settings_command_opens_default_provider() {
        let (mut app, _, _) = test_app(true);
        app.screen = Screen::Chat;
        type_text(&mut app, "/settings").await;
        app.handle_event(key(KeyCode::Enter)).await;

        assert!(matches!(
            &app.screen,
            Screen::ProviderSettings(view) if view.provider_id.as_deref() == Some("openai")
        ));
    }

    #[test]
    fn mask_key_keeps_only_the_tail() {
        assert_eq!(mask_key(""), "");
        assert_eq!(mask_key("sk-abcdef1234"), "********1234");
        assert_eq!(mask_key("ab"), "********ab");
    }
}
