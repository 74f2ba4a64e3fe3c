//! Terminal backend for headless/dedicated servers.
//!
//! Lines read from stdin become [`ConsoleInputEvent`]s and every
//! [`ConsoleOutputEvent`] is written to stdout.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use bevy::prelude::*;

use crate::core::{ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel};

/// Plugin that adds terminal (stdin/stdout) console support.
///
/// Add after [`ConsolePlugin`](crate::ConsolePlugin).
#[derive(Default)]
pub struct TerminalPlugin {
    pub config: TerminalConfig,
}

impl Plugin for TerminalPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::channel();
        let _handle = spawn_stdin_reader(sender);

        app.insert_resource(StdinReceiver(Mutex::new(receiver)))
            .insert_resource(self.config.clone())
            .add_systems(Update, (read_stdin, write_stdout));
    }
}

/// Configuration for terminal behavior.
#[derive(Resource, Debug, Clone, Default)]
pub struct TerminalConfig {
    /// Whether to use colored output (ANSI escape codes). Off by default,
    /// some terminals render the codes literally.
    pub colored: bool,
}

#[derive(Resource)]
struct StdinReceiver(Mutex<Receiver<String>>);

fn spawn_stdin_reader(sender: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            let text = line.trim();
            if !text.is_empty() && sender.send(text.to_string()).is_err() {
                break;
            }
        }
    })
}

fn read_stdin(receiver: Res<StdinReceiver>, mut events: MessageWriter<ConsoleInputEvent>) {
    let Ok(rx) = receiver.0.lock() else {
        return;
    };
    while let Ok(line) = rx.try_recv() {
        events.write(ConsoleInputEvent::new(line));
    }
}

fn write_stdout(mut events: MessageReader<ConsoleOutputEvent>, config: Res<TerminalConfig>) {
    let mut stdout = io::stdout().lock();
    for event in events.read() {
        let _ = writeln!(stdout, "{}", format_line(&event.message, event.level, config.colored));
    }
    let _ = stdout.flush();
}

fn format_line(message: &str, level: ConsoleOutputLevel, colored: bool) -> String {
    if !colored {
        return message.to_string();
    }
    let color = match level {
        ConsoleOutputLevel::Debug => "\x1b[90m",
        ConsoleOutputLevel::Info | ConsoleOutputLevel::Plain | ConsoleOutputLevel::Boxed => {
            "\x1b[0m"
        }
        ConsoleOutputLevel::Warn => "\x1b[33m",
        ConsoleOutputLevel::Error => "\x1b[31m",
        ConsoleOutputLevel::Command => "\x1b[36m",
        ConsoleOutputLevel::Result => "\x1b[32m",
    };
    format!("{color}{message}\x1b[0m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        assert_eq!(format_line("oops", ConsoleOutputLevel::Error, false), "oops");
        assert_eq!(
            format_line("oops", ConsoleOutputLevel::Error, true),
            "\x1b[31moops\x1b[0m"
        );
    }
}
