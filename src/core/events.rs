//! Console messages for communication between layers.
//!
//! - UI -> Core: command input
//! - Core -> UI: output lines, visibility changes, clears

use bevy::prelude::*;

use super::{ClearScope, ConsoleOutputLevel, OutputLine};

/// Message sent when a command line is submitted to the console.
///
/// # Examples
///
/// ```ignore
/// fn submit_command(mut input: MessageWriter<ConsoleInputEvent>) {
///     input.write(ConsoleInputEvent::new("give sword 2"));
/// }
/// ```
#[derive(Message, Debug, Clone)]
pub struct ConsoleInputEvent {
    /// The raw command line.
    pub command: String,
    /// Skip the echo and expression results, and keep the line out of the
    /// input history.
    pub silent: bool,
}

impl ConsoleInputEvent {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            silent: false,
        }
    }

    pub fn silent(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            silent: true,
        }
    }
}

/// Message carrying one line appended to the console output.
#[derive(Message, Debug, Clone)]
pub struct ConsoleOutputEvent {
    pub message: String,
    pub level: ConsoleOutputLevel,
}

impl ConsoleOutputEvent {
    pub fn new(level: ConsoleOutputLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Error, message)
    }
}

impl From<&OutputLine> for ConsoleOutputEvent {
    fn from(line: &OutputLine) -> Self {
        Self::new(line.level, line.text.clone())
    }
}

/// Message sent when the console is opened or closed.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleToggleEvent {
    /// Whether the console is now open.
    pub open: bool,
}

impl ConsoleToggleEvent {
    pub fn opened() -> Self {
        Self { open: true }
    }

    pub fn closed() -> Self {
        Self { open: false }
    }
}

/// Message sent when output was cleared from view or erased.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleClearEvent {
    pub scope: ClearScope,
}

/// Plugin that registers all console messages.
pub struct ConsoleEventsPlugin;

impl Plugin for ConsoleEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConsoleInputEvent>()
            .add_message::<ConsoleOutputEvent>()
            .add_message::<ConsoleToggleEvent>()
            .add_message::<ConsoleClearEvent>();
    }
}
