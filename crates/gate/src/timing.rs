use std::time::Duration;

/// Delays used by the gate's scoped timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateTiming {
    /// Wait after the sheet opens before peeking at the clipboard.
    pub clipboard_debounce: Duration,
    /// How long the "filled from clipboard" notice stays up.
    pub clipboard_notice: Duration,
    /// Wait after mount before the startup check resolves the provider.
    pub startup_check_delay: Duration,
    /// Extra wait between a failed startup check and presenting the sheet.
    pub startup_present_delay: Duration,
}

impl Default for GateTiming {
    fn default() -> Self {
        Self {
            clipboard_debounce: Duration::from_millis(300),
            clipboard_notice: Duration::from_millis(3000),
            startup_check_delay: Duration::from_millis(1000),
            startup_present_delay: Duration::from_millis(800),
        }
    }
}
