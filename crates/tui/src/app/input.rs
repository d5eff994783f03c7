use super::*;

impl App {
    /// Returns true when the app should quit.
    pub async fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key_event(key).await;
            }
            Event::Paste(text) => self.handle_paste(&text),
            _ => {}
        }
        self.should_quit
    }

    async fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if let Some(origin) = self.active_origin() {
            self.handle_sheet_key(origin, key).await;
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        if key.code == KeyCode::Char('?') && self.screen != Screen::Chat {
            self.show_help = true;
            return;
        }

        match self.screen {
            Screen::Welcome => match key.code {
                KeyCode::Enter => self.enter_chat(),
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            Screen::Chat => match key.code {
                KeyCode::Enter => self.submit_input().await,
                KeyCode::Esc => {
                    if self.input.buffer.is_empty() {
                        self.enter_welcome();
                    } else {
                        self.input.clear();
                    }
                }
                KeyCode::Backspace => self.input.handle_backspace(),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.input.handle_char(c);
                }
                _ => {}
            },
            Screen::ProviderSettings(_) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                    self.screen = Screen::Chat;
                }
            }
        }
    }

    async fn handle_sheet_key(&mut self, origin: SheetOrigin, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let field = self.sheet_field;

        let event = match key.code {
            KeyCode::Esc => {
                if self.sheet_mut(origin).handle_back() {
                    SetupEvent::Dismissed
                } else {
                    SetupEvent::Ignored
                }
            }
            KeyCode::Enter => self.sheet_mut(origin).save().await,
            KeyCode::Char('s') if ctrl => self.sheet_mut(origin).save().await,
            KeyCode::Char('k') if ctrl => self.sheet_mut(origin).skip(),
            KeyCode::Char('o') if ctrl => self.sheet_mut(origin).navigate_to_settings(),
            KeyCode::Char('t') if ctrl => {
                self.sheet_mut(origin).toggle_key_visibility();
                SetupEvent::Ignored
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.sheet_field = field.toggle();
                SetupEvent::Ignored
            }
            KeyCode::Backspace => {
                self.edit_sheet_field(origin, |text| {
                    text.pop();
                });
                SetupEvent::Ignored
            }
            KeyCode::Char(c) if !ctrl => {
                self.edit_sheet_field(origin, |text| text.push(c));
                SetupEvent::Ignored
            }
            _ => SetupEvent::Ignored,
        };

        self.apply_setup_event(origin, event).await;
    }

    fn handle_paste(&mut self, text: &str) {
        if let Some(origin) = self.active_origin() {
            let pasted: String = text.trim().chars().filter(|c| !c.is_control()).collect();
            self.edit_sheet_field(origin, |field| field.push_str(&pasted));
        } else if self.screen == Screen::Chat {
            text.chars()
                .filter(|c| !c.is_control())
                .for_each(|c| self.input.handle_char(c));
        }
    }

    fn edit_sheet_field(&mut self, origin: SheetOrigin, edit: impl FnOnce(&mut String)) {
        let field = self.sheet_field;
        let sheet = self.sheet_mut(origin);
        match field {
            SheetField::ApiKey => {
                let mut text = sheet.draft().api_key.clone();
                edit(&mut text);
                sheet.edit_api_key(text);
            }
            SheetField::ApiHost => {
                let mut text = sheet.draft().api_host.clone();
                edit(&mut text);
                sheet.edit_api_host(text);
            }
        }
    }
}
