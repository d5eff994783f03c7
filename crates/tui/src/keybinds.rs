pub struct Keybinds;

impl Default for Keybinds {
    fn default() -> Self {
        Self
    }
}

impl Keybinds {
    pub fn help_text(&self) -> String {
        r#"Keyboard Shortcuts:

Screens:
  Enter         Start (welcome) / send message (chat)
  Esc           Back
  /settings     Open provider settings
  /setup        Open the API key sheet

API key sheet:
  Tab           Switch between key and host
  Enter/Ctrl+S  Save
  Ctrl+K        Set up later (when offered)
  Ctrl+O        Open full provider settings
  Ctrl+T        Show / hide key
  Esc           Close

General:
  ?             Toggle this help
  Ctrl + Q      Quit
"#
        .to_string()
    }
}
