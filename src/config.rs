//! Console configuration.

/// Settings for a [`DevConsole`](crate::core::DevConsole).
///
/// Under the `persist` feature this is the `settings` section of the RON
/// config file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "persist",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ConsoleConfig {
    /// Whether input is processed at all.
    pub enabled: bool,
    /// Open the console as soon as the plugin starts.
    pub open_on_start: bool,
    /// Record output and submitted lines.
    pub record_history: bool,
    /// Treat lines that name no command as expressions.
    pub evaluate_unknown_commands: bool,
    /// Stop a script at its first failing line.
    pub script_stop_on_error: bool,
    /// Maximum nesting of `exec` inside scripts.
    pub max_script_depth: usize,
    /// Keep `debug` lines instead of dropping them.
    pub show_debug: bool,
    /// Printed boxed when the console is created.
    pub greeting: Option<String>,
    /// Register `help`, `alias`, `exec` and the other built-ins.
    pub register_builtins: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            open_on_start: false,
            record_history: true,
            evaluate_unknown_commands: true,
            script_stop_on_error: true,
            max_script_depth: 8,
            show_debug: cfg!(debug_assertions),
            greeting: None,
            register_builtins: true,
        }
    }
}

impl ConsoleConfig {
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn open_on_start(mut self, open: bool) -> Self {
        self.open_on_start = open;
        self
    }
}
