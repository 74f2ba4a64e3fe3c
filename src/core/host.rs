//! Collaborators supplied by the embedding application.
//!
//! The console never draws, reads files or writes logs itself. It talks to a
//! [`ConsoleRenderer`], a [`ScriptSource`] and a [`LogSink`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use super::{ConsoleOutputLevel, OutputLine};

/// Log target used when mirroring console lines to the global log.
///
/// The capture layer skips this target so mirrored lines are not captured
/// back into the console.
pub const MIRROR_TARGET: &str = "console_mirror";

/// What a clear notification covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    /// Only the visible buffer, history is kept.
    Visible,
    /// The whole scrollback.
    History,
}

/// Receives everything a UI needs to draw the console.
pub trait ConsoleRenderer: Send + Sync {
    fn line_appended(&self, line: &OutputLine);

    fn visibility_changed(&self, _open: bool) {}

    fn cleared(&self, _scope: ClearScope) {}
}

/// Renderer that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl ConsoleRenderer for NullRenderer {
    fn line_appended(&self, _line: &OutputLine) {}
}

/// Lazy lines of a script.
pub type ScriptLines<'a> = Box<dyn Iterator<Item = io::Result<String>> + 'a>;

/// Produces the lines of a script from an identifier.
pub trait ScriptSource: Send + Sync {
    fn open(&self, id: &str) -> io::Result<ScriptLines<'_>>;
}

/// Reads scripts from files, relative ids resolve under `root`.
#[derive(Debug, Clone, Default)]
pub struct FsScriptSource {
    pub root: PathBuf,
}

impl FsScriptSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ScriptSource for FsScriptSource {
    fn open(&self, id: &str) -> io::Result<ScriptLines<'_>> {
        let file = File::open(self.root.join(id))?;
        Ok(Box::new(BufReader::new(file).lines()))
    }
}

/// Scripts held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryScriptSource {
    scripts: HashMap<String, String>,
}

impl MemoryScriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(id, text);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.scripts.insert(id.into(), text.into());
    }
}

impl ScriptSource for MemoryScriptSource {
    fn open(&self, id: &str) -> io::Result<ScriptLines<'_>> {
        let text = self.scripts.get(id).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no script named '{id}'"))
        })?;
        Ok(Box::new(text.lines().map(|line| Ok(line.to_string()))))
    }
}

/// Optional mirror for `print_line(.., to_stdout = true)`.
pub trait LogSink: Send + Sync {
    fn write_line(&self, level: ConsoleOutputLevel, text: &str);
}

/// Mirrors lines into the global `tracing` log under [`MIRROR_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn write_line(&self, level: ConsoleOutputLevel, text: &str) {
        match level {
            ConsoleOutputLevel::Debug => bevy::log::debug!(target: MIRROR_TARGET, "{}", text),
            ConsoleOutputLevel::Warn => bevy::log::warn!(target: MIRROR_TARGET, "{}", text),
            ConsoleOutputLevel::Error => bevy::log::error!(target: MIRROR_TARGET, "{}", text),
            _ => bevy::log::info!(target: MIRROR_TARGET, "{}", text),
        }
    }
}
