//! Console session state: visibility, enablement and output history.

/// Style of a line in the console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsoleOutputLevel {
    /// Debug information (gray).
    Debug,
    /// General information (white).
    #[default]
    Info,
    /// Warning (yellow).
    Warn,
    /// Error (red).
    Error,
    /// Command echo (shows the command that was executed).
    Command,
    /// Value produced by an evaluated expression.
    Result,
    /// Unstyled text from `print_line`.
    Plain,
    /// Framed text from `print_boxed`.
    Boxed,
}

/// One styled entry of the output history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub level: ConsoleOutputLevel,
    pub text: String,
}

impl OutputLine {
    pub fn new(level: ConsoleOutputLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Open/closed and enabled/disabled state plus the scrollback.
///
/// Visibility and enablement are independent: a closed console still runs
/// commands sent to it, a disabled one runs nothing, open or not.
///
/// The scrollback only grows until [`erase_history`](Self::erase_history).
/// [`clear_visible`](Self::clear_visible) moves the start of the visible
/// window forward without dropping entries.
#[derive(Debug, Clone)]
pub struct ConsoleSession {
    enabled: bool,
    open: bool,
    record_history: bool,
    history: Vec<OutputLine>,
    visible_from: usize,
    input_history: Vec<String>,
}

impl Default for ConsoleSession {
    fn default() -> Self {
        Self::new(true, false, true)
    }
}

impl ConsoleSession {
    pub fn new(enabled: bool, open: bool, record_history: bool) -> Self {
        Self {
            enabled,
            open,
            record_history,
            history: Vec::new(),
            visible_from: 0,
            input_history: Vec::new(),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Closed -> Open. Returns whether the state changed.
    pub fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    /// Open -> Closed. Returns whether the state changed.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Flip visibility, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    #[inline]
    pub fn is_recording_history(&self) -> bool {
        self.record_history
    }

    /// Flip history recording, returning the new state.
    pub fn toggle_history(&mut self) -> bool {
        self.record_history = !self.record_history;
        self.record_history
    }

    /// Append a line. Returns `false` if recording is off and the line was
    /// not stored.
    pub fn push(&mut self, line: OutputLine) -> bool {
        if !self.record_history {
            return false;
        }
        self.history.push(line);
        true
    }

    /// The full scrollback.
    pub fn history(&self) -> &[OutputLine] {
        &self.history
    }

    /// Entries since the last [`clear_visible`](Self::clear_visible).
    pub fn visible(&self) -> &[OutputLine] {
        &self.history[self.visible_from.min(self.history.len())..]
    }

    pub fn clear_visible(&mut self) {
        self.visible_from = self.history.len();
    }

    /// Drop the scrollback and the submitted-input history.
    pub fn erase_history(&mut self) {
        self.history.clear();
        self.input_history.clear();
        self.visible_from = 0;
    }

    /// Remember a submitted line, skipping immediate repeats.
    pub fn record_input(&mut self, line: &str) {
        if !self.record_history || line.is_empty() {
            return;
        }
        if self.input_history.last().map(String::as_str) != Some(line) {
            self.input_history.push(line.to_string());
        }
    }

    /// Submitted lines, oldest first.
    pub fn input_history(&self) -> &[String] {
        &self.input_history
    }
}

/// Draw `text` inside a box frame.
///
/// ```
/// use bevy_console_engine::core::boxed;
///
/// assert_eq!(boxed("hi"), "┌────┐\n│ hi │\n└────┘");
/// ```
pub fn boxed(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let bar = "─".repeat(width + 2);

    let mut out = format!("┌{bar}┐");
    for line in &lines {
        let pad = width - line.chars().count();
        out.push_str(&format!("\n│ {line}{} │", " ".repeat(pad)));
    }
    if lines.is_empty() {
        out.push_str(&format!("\n│ {} │", " ".repeat(width)));
    }
    out.push_str(&format!("\n└{bar}┘"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> OutputLine {
        OutputLine::new(ConsoleOutputLevel::Plain, text)
    }

    #[test]
    fn test_open_close_toggle() {
        let mut session = ConsoleSession::default();
        assert!(!session.is_open());
        assert!(session.open());
        assert!(!session.open());
        assert!(session.close());
        assert!(!session.close());
        assert!(session.toggle());
        assert!(!session.toggle());
    }

    #[test]
    fn test_visibility_is_orthogonal_to_enabled() {
        let mut session = ConsoleSession::default();
        session.set_enabled(false);
        session.open();
        assert!(session.is_open());
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_erase_then_push() {
        let mut session = ConsoleSession::default();
        session.push(line("a"));
        session.push(line("b"));
        session.erase_history();
        assert!(session.history().is_empty());

        session.push(line("c"));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_clear_keeps_history() {
        let mut session = ConsoleSession::default();
        session.push(line("a"));
        session.push(line("b"));
        session.clear_visible();

        assert_eq!(session.history().len(), 2);
        assert!(session.visible().is_empty());

        session.push(line("c"));
        assert_eq!(session.visible(), &[line("c")]);
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_toggle_history_stops_recording() {
        let mut session = ConsoleSession::default();
        session.push(line("kept"));
        assert!(!session.toggle_history());
        assert!(!session.push(line("dropped")));
        session.record_input("dropped");

        assert_eq!(session.history(), &[line("kept")]);
        assert!(session.input_history().is_empty());

        assert!(session.toggle_history());
        assert!(session.push(line("again")));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_input_history_skips_repeats() {
        let mut session = ConsoleSession::default();
        session.record_input("god");
        session.record_input("god");
        session.record_input("noclip");
        session.record_input("god");
        assert_eq!(session.input_history(), &["god", "noclip", "god"]);
    }

    #[test]
    fn test_boxed_multiline() {
        assert_eq!(boxed("ab\nc"), "┌────┐\n│ ab │\n│ c  │\n└────┘");
        assert_eq!(boxed(""), "┌──┐\n│  │\n└──┘");
    }
}
