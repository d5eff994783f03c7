#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Command,
}

pub struct InputState {
    pub buffer: String,
    pub mode: InputMode,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            mode: InputMode::Normal,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        self.buffer.push(c);
        self.update_mode();
    }

    pub fn handle_backspace(&mut self) {
        if self.buffer.pop().is_some() {
            self.update_mode();
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.mode = InputMode::Normal;
    }

    pub fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.buffer);
        self.mode = InputMode::Normal;
        text
    }

    fn update_mode(&mut self) {
        self.mode = if self.buffer.starts_with('/') {
            InputMode::Command
        } else {
            InputMode::Normal
        };
    }
}

/// Slash commands typed into the chat input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Settings,
    Setup,
    Unknown(String),
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        let name = text.trim().strip_prefix('/')?;
        Some(match name.split_whitespace().next().unwrap_or("") {
            "settings" => Command::Settings,
            "setup" | "key" => Command::Setup,
            other => Command::Unknown(other.to_string()),
        })
    }
}
