use super::*;

/// External collaborators the app is wired to.
#[derive(Clone)]
pub struct AppServices {
    pub credentials: Arc<dyn CredentialStore>,
    pub models: Arc<dyn ModelResolver>,
    pub flags: Arc<dyn FlagStore>,
    pub clipboard: Arc<dyn ClipboardReader>,
}

pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub services: AppServices,
    pub screen: Screen,
    pub startup_gate: StartupGate,
    pub action_gate: SetupGateHook,
    pub sheet_field: SheetField,
    pub input: InputState,
    pub transcript: VecDeque<TranscriptEntry>,
    pub layout: LayoutState,
    pub keybinds: Keybinds,
    pub show_help: bool,
    pub status: Option<String>,
    pub last_error: Option<String>,
}

impl App {
    pub fn new(config: Config, services: AppServices) -> Self {
        let timing = config.gate.timing();
        let startup_gate = StartupGate::new(
            services.credentials.clone(),
            services.models.clone(),
            services.flags.clone(),
            services.clipboard.clone(),
            &timing,
        )
        .with_skip(config.gate.allow_skip);
        let action_gate = SetupGateHook::new(
            services.credentials.clone(),
            services.models.clone(),
            services.flags.clone(),
            services.clipboard.clone(),
            &timing,
        )
        .with_skip(config.gate.allow_skip);

        Self {
            should_quit: false,
            config,
            services,
            screen: Screen::Welcome,
            startup_gate,
            action_gate,
            sheet_field: SheetField::ApiKey,
            input: InputState::new(),
            transcript: VecDeque::new(),
            layout: LayoutState::default(),
            keybinds: Keybinds,
            show_help: false,
            status: None,
            last_error: None,
        }
    }
}
