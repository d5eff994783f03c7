use super::*;
use crate::ui::{bottom_sheet_rect, centered_rect};

impl App {
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        match &self.screen {
            Screen::Welcome => self.render_welcome(frame, area),
            Screen::Chat => {
                self.layout.calculate_layout(area);
                let panels = self.layout.get_panels().to_vec();
                for panel in panels {
                    match panel.panel_type {
                        PanelType::Topbar => self.render_topbar(frame, panel.rect),
                        PanelType::Transcript => self.render_transcript(frame, panel.rect),
                        PanelType::InputBar => self.render_input_bar(frame, panel.rect),
                    }
                }
            }
            Screen::ProviderSettings(view) => self.render_provider_settings(frame, area, view),
        }

        if let Some((origin, sheet)) = self.active_sheet() {
            self.render_setup_sheet(frame, area, origin, sheet);
        } else if self.show_help {
            self.render_help(frame, area);
        }
    }

    fn render_welcome(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Paragraph};

        let content = "\n\n  Welcome to keygate!\n\n  Chat with your configured model provider from the terminal.\n\n  Press [Enter] to start, [?] for help, [Esc] to quit\n";
        let paragraph = Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title(" Welcome "))
            .centered();
        frame.render_widget(paragraph, area);
    }

    fn render_topbar(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Paragraph};

        let text = format!(
            " ● keygate{}   [Esc] back   [Ctrl+Q] quit",
            if self.last_error.is_some() {
                "   ⚠ error"
            } else {
                ""
            },
        );

        frame.render_widget(Paragraph::new(text).block(Block::default()), area);
    }

    fn render_transcript(&self, frame: &mut Frame, area: Rect) {
        use ratatui::style::{Color, Style};
        use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

        let mut lines: Vec<String> = self
            .transcript
            .iter()
            .map(|entry| format!("{} you: {}", entry.timestamp.format("%H:%M"), entry.text))
            .collect();

        if lines.is_empty() {
            lines.push(
                "Type a message and press [Enter]. /setup or /settings manage your key."
                    .to_string(),
            );
        }

        let visible = area.height.saturating_sub(2) as usize;
        let skip = lines.len().saturating_sub(visible);
        let content = lines[skip..].join("\n");

        let footer = self
            .last_error
            .as_ref()
            .map(|e| (format!("⚠ {e}"), Color::Red))
            .or_else(|| self.status.clone().map(|s| (s, Color::DarkGray)));

        let block = Block::default().borders(Borders::ALL).title(" Chat ");
        let block = match footer {
            Some((text, color)) => block.title_bottom(
                ratatui::text::Line::from(format!(" {text} ")).style(Style::default().fg(color)),
            ),
            None => block,
        };

        frame.render_widget(
            Paragraph::new(content)
                .block(block)
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    fn render_input_bar(&self, frame: &mut Frame, area: Rect) {
        use ratatui::style::{Color, Style};
        use ratatui::widgets::{Block, Borders, Paragraph};

        let mode_indicator = match self.input.mode {
            InputMode::Normal => "[💬]",
            InputMode::Command => "[/]",
        };

        let text = if self.active_sheet().is_some() {
            format!("{} > {}", mode_indicator, self.input.buffer)
        } else {
            format!("{} > {}█", mode_indicator, self.input.buffer)
        };

        frame.render_widget(
            Paragraph::new(text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            ),
            area,
        );
    }

    fn render_provider_settings(&self, frame: &mut Frame, area: Rect, view: &ProviderSettingsView) {
        use ratatui::widgets::{Block, Borders, Paragraph};

        let provider = view.provider_id.as_deref().unwrap_or("[unknown]");
        let content = if view.found {
            format!(
                "\n\n  Provider:  {}\n\n  API key:   {}\n  API host:  {}\n\n  Press [Enter] or [Esc] to return\n",
                provider,
                if view.api_key_masked.is_empty() {
                    "[not set]"
                } else {
                    &view.api_key_masked
                },
                if view.api_host.is_empty() {
                    "[default]"
                } else {
                    &view.api_host
                },
            )
        } else {
            format!(
                "\n\n  Provider {} is not in the catalog.\n\n  Press [Enter] or [Esc] to return\n",
                provider
            )
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(" Provider Settings ");
        if let Some(ref error) = self.last_error {
            block = block.title_bottom(format!(" ⚠ {error} "));
        }

        frame.render_widget(Paragraph::new(content).block(block), area);
    }

    fn render_setup_sheet(
        &self,
        frame: &mut Frame,
        area: Rect,
        origin: SheetOrigin,
        sheet: &SetupFlowController,
    ) {
        use ratatui::style::{Color, Modifier, Style};
        use ratatui::text::{Line, Span};
        use ratatui::widgets::{Block, Borders, Clear, Paragraph};

        let sheet_area = bottom_sheet_rect(60, area);
        frame.render_widget(Clear, sheet_area);

        let draft = sheet.draft();
        let key_display = if draft.api_key.is_empty() {
            "[not set]".to_string()
        } else if draft.key_visible {
            draft.api_key.clone()
        } else {
            "*".repeat(draft.api_key.chars().count().min(32))
        };
        let host_display = if draft.api_host.is_empty() {
            "[default]".to_string()
        } else {
            draft.api_host.clone()
        };

        let field_line = |label: &str, value: String, field: SheetField| {
            let focused = self.sheet_field == field;
            let marker = if focused { "▸ " } else { "  " };
            let cursor = if focused { "█" } else { "" };
            let style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw(format!("  {marker}{label:<10}")),
                Span::styled(format!("{value}{cursor}"), style),
            ])
        };

        let dim = Style::default().fg(Color::DarkGray);
        let mut lines = vec![
            Line::from(""),
            Line::from(format!(
                "  Provider: {}",
                sheet.target_provider().unwrap_or("[default]")
            )),
            Line::from(""),
            field_line("API key", key_display, SheetField::ApiKey),
            field_line("API host", host_display, SheetField::ApiHost),
            Line::from(""),
        ];

        if sheet.clipboard_notice().is_some() {
            lines.push(Line::styled(
                "  ✓ API key detected in clipboard and filled in",
                Style::default().fg(Color::Green),
            ));
        }
        if let Some(url) = sheet.api_key_website() {
            lines.push(Line::styled(format!("  Get a key: {url}"), dim));
        }
        lines.push(Line::from(""));

        let save_style = if sheet.can_save() {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            dim
        };
        let mut actions = vec![Span::styled("  [Enter] Save", save_style)];
        if sheet.allows_skip() {
            actions.push(Span::raw("   [Ctrl+K] Set up later"));
        }
        actions.push(Span::raw("   [Ctrl+O] All settings"));
        actions.push(Span::raw("   [Ctrl+T] Show/hide"));
        actions.push(Span::raw("   [Esc] Close"));
        lines.push(Line::from(actions));

        if let Some(ref error) = self.last_error {
            lines.push(Line::from(""));
            lines.push(Line::styled(
                format!("  ⚠ {error}"),
                Style::default().fg(Color::Red),
            ));
        }

        let title = match origin {
            SheetOrigin::Startup => " Set up your API key ",
            SheetOrigin::Action => " An API key is needed ",
        };

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(title),
            ),
            sheet_area,
        );
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Clear, Paragraph};
        let help_text = self.keybinds.help_text();
        let popup_area = centered_rect(60, 70, area);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(help_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help - Press ? to close "),
            ),
            popup_area,
        );
    }
}
