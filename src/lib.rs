//! An embeddable developer console engine for Bevy.
//!
//! bevy_console_engine provides:
//!
//! - **Commands**: Named handlers with argument specs and usage text
//! - **Aliases**: Names for command lines, expanded with a cycle guard
//! - **Evaluator**: Lines that name no command are evaluated as expressions
//! - **Autocomplete**: Command, alias and per-argument completion with fuzzy fallback
//! - **Scripts**: `exec` runs files line by line
//!
//! # Features
//!
//! - `capture` (default): copy application `tracing` logs into the console
//! - `terminal`: stdin/stdout backend for dedicated servers
//! - `persist`: RON configuration persistence (settings, aliases, `write_config`)
//! - `full`: Enable capture + persist
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_console_engine::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ConsolePlugin::default())
//!         .add_systems(Startup, setup_console)
//!         .run();
//! }
//!
//! fn setup_console(mut console: ResMut<DevConsole>) {
//!     console
//!         .register_command(
//!             Command::new("give", |args, ctx| {
//!                 let count: u32 = args.parse_or(1, 1);
//!                 ctx.info(&format!("gave {} x{}", &args[0], count));
//!                 Ok(())
//!             })
//!             .description("Give an item")
//!             .arg("item")
//!             .optional_arg("count"),
//!         )
//!         .unwrap();
//!
//!     console.add_alias("kit", "give sword; give shield").unwrap();
//!     console.add_eval_input("gravity", 9.81);
//! }
//! ```

use std::any::Any;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use bevy::prelude::*;

pub mod config;
pub mod core;

// Log capture (feature-gated)
#[cfg(feature = "capture")]
pub mod logging;

// Terminal backend (feature-gated)
#[cfg(feature = "terminal")]
pub mod terminal;

// Persistence module (feature-gated)
#[cfg(feature = "persist")]
pub mod persist;

pub use config::ConsoleConfig;
pub use crate::core::{
    ClearScope, Command, CommandArgs, CommandContext, CompletionSource, Completion,
    ConsoleClearEvent, ConsoleEngine, ConsoleError, ConsoleEventsPlugin, ConsoleInputEvent,
    ConsoleOutputEvent, ConsoleOutputLevel, ConsoleRenderer, ConsoleToggleEvent, DevConsole,
    EvalTarget, ExitStatus, ObjectRef, OutputLine, Value,
};

#[cfg(feature = "capture")]
pub use logging::custom_log_layer;

#[cfg(feature = "persist")]
pub use persist::{ConfigError, ConfigPath, ConsoleConfigFile};

#[cfg(feature = "terminal")]
pub use terminal::{TerminalConfig, TerminalPlugin};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::ConsoleConfig;
    pub use crate::core::{
        Command, CommandArgs, CommandContext, CompletionSource, ConsoleEngine, ConsoleError,
        ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel, ConsoleToggleEvent,
        DevConsole, EvalTarget, ExitStatus, Value,
    };
    pub use crate::ConsolePlugin;
}

/// Main console plugin.
///
/// Inserts a [`DevConsole`] resource and runs submitted
/// [`ConsoleInputEvent`]s with exclusive `World` access, so handlers reach
/// the world through [`CommandContext::host_mut`]. Console output is
/// forwarded as [`ConsoleOutputEvent`], [`ConsoleToggleEvent`] and
/// [`ConsoleClearEvent`] messages.
///
/// With `persist`, a config file at [`ConfigPath`] (inserted before the
/// plugin, or `console.ron`) replaces `config` and contributes aliases.
///
/// # Configuration
///
/// ```ignore
/// ConsolePlugin::new(ConsoleConfig::default().with_greeting("dev build"))
/// ```
#[derive(Default)]
pub struct ConsolePlugin {
    pub config: ConsoleConfig,
}

impl ConsolePlugin {
    pub fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingInput>()
            .add_plugins(core::ConsoleEventsPlugin);

        #[allow(unused_mut)]
        let mut config = self.config.clone();

        #[cfg(feature = "persist")]
        let config_file = {
            let path = app
                .world()
                .get_resource::<persist::ConfigPath>()
                .cloned()
                .unwrap_or_default();
            let file = persist::read_startup_config(&path.0);
            if let Some(file) = &file {
                config = file.settings.clone();
            }
            app.insert_resource(path);
            file
        };

        let (sender, receiver) = mpsc::channel();
        let register_builtins = config.register_builtins;
        let mut console = DevConsole::new_with_renderer(config, MessageRenderer { sender });

        if register_builtins {
            if let Err(e) = core::register_builtins(&mut console) {
                error!("Failed to register built-in commands: {}", e);
            }
        }

        #[cfg(feature = "persist")]
        {
            if let Some(file) = config_file {
                file.apply_aliases(&mut console);
            }
        }

        app.insert_resource(console)
            .insert_resource(RenderReceiver(Mutex::new(receiver)));

        // Input pipeline
        // 1. queue_console_input: Read input messages into the pending queue
        // 2. execute_pending_input: Run queued lines with exclusive World access
        // 3. forward_render_events: Turn renderer notifications into messages
        app.add_systems(
            Update,
            (
                queue_console_input,
                execute_pending_input,
                forward_render_events,
            )
                .chain(),
        );
    }
}

/// Input lines waiting for the exclusive execution system.
#[derive(Resource, Default)]
struct PendingInput {
    queue: Vec<ConsoleInputEvent>,
}

/// What the console told its renderer.
#[derive(Debug, Clone)]
enum RenderEvent {
    Line(OutputLine),
    Visibility(bool),
    Cleared(ClearScope),
}

/// Renderer that queues notifications for [`forward_render_events`].
struct MessageRenderer {
    sender: Sender<RenderEvent>,
}

impl ConsoleRenderer for MessageRenderer {
    fn line_appended(&self, line: &OutputLine) {
        let _ = self.sender.send(RenderEvent::Line(line.clone()));
    }

    fn visibility_changed(&self, open: bool) {
        let _ = self.sender.send(RenderEvent::Visibility(open));
    }

    fn cleared(&self, scope: ClearScope) {
        let _ = self.sender.send(RenderEvent::Cleared(scope));
    }
}

#[derive(Resource)]
struct RenderReceiver(Mutex<Receiver<RenderEvent>>);

fn queue_console_input(
    mut input_events: MessageReader<ConsoleInputEvent>,
    mut pending: ResMut<PendingInput>,
) {
    pending.queue.extend(input_events.read().cloned());
}

/// Runs queued lines. The console is taken out of the world for the
/// duration, handlers reach it through their context.
fn execute_pending_input(world: &mut World) {
    let queue = std::mem::take(&mut world.resource_mut::<PendingInput>().queue);
    if queue.is_empty() {
        return;
    }

    world.resource_scope(|world, mut console: Mut<DevConsole>| {
        for input in queue {
            let host: &mut dyn Any = &mut *world;
            let status = if input.silent {
                console.execute_command_with_host(&input.command, true, Some(host))
            } else {
                console.submit(&input.command, Some(host))
            };
            if !status.is_success() {
                debug!("Console: '{}' exited with status {}", input.command, status.code());
            }
        }
    });
}

fn forward_render_events(
    receiver: Res<RenderReceiver>,
    mut output_events: MessageWriter<ConsoleOutputEvent>,
    mut toggle_events: MessageWriter<ConsoleToggleEvent>,
    mut clear_events: MessageWriter<ConsoleClearEvent>,
) {
    let Ok(rx) = receiver.0.lock() else {
        return;
    };
    for event in rx.try_iter() {
        match event {
            RenderEvent::Line(line) => {
                output_events.write(ConsoleOutputEvent::from(&line));
            }
            RenderEvent::Visibility(open) => {
                toggle_events.write(ConsoleToggleEvent { open });
            }
            RenderEvent::Cleared(scope) => {
                clear_events.write(ConsoleClearEvent { scope });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test resource to track command execution.
    #[derive(Resource, Default)]
    struct TestCommandExecuted {
        count: usize,
        last_args: Vec<String>,
    }

    /// Messages seen by a reader running after the pipeline.
    #[derive(Resource, Default)]
    struct Seen {
        outputs: Vec<ConsoleOutputEvent>,
        toggles: Vec<ConsoleToggleEvent>,
        clears: Vec<ConsoleClearEvent>,
    }

    fn collect(
        mut seen: ResMut<Seen>,
        mut outputs: MessageReader<ConsoleOutputEvent>,
        mut toggles: MessageReader<ConsoleToggleEvent>,
        mut clears: MessageReader<ConsoleClearEvent>,
    ) {
        seen.outputs.extend(outputs.read().cloned());
        seen.toggles.extend(toggles.read().copied());
        seen.clears.extend(clears.read().copied());
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ConsolePlugin::default());
        app.init_resource::<TestCommandExecuted>();
        app.init_resource::<Seen>();
        app.add_systems(Update, collect.after(forward_render_events));
        app
    }

    /// Helper to queue a line directly for testing.
    fn queue_command(app: &mut App, line: &str) {
        app.world_mut()
            .resource_mut::<PendingInput>()
            .queue
            .push(ConsoleInputEvent::new(line));
    }

    fn register_counter(app: &mut App) {
        app.add_systems(Startup, |mut console: ResMut<DevConsole>| {
            console
                .register_command(
                    Command::new("test_cmd", |args, ctx| {
                        let world = ctx
                            .host_mut::<World>()
                            .ok_or_else(|| ConsoleError::failed("no world"))?;
                        let mut tracker = world.resource_mut::<TestCommandExecuted>();
                        tracker.count += 1;
                        tracker.last_args = args.iter().map(str::to_string).collect();
                        Ok(())
                    })
                    .description("Test command"),
                )
                .unwrap();
        });
    }

    #[test]
    fn test_command_execution() {
        let mut app = app();
        register_counter(&mut app);
        app.update();

        queue_command(&mut app, "test_cmd arg1 arg2");
        app.update();

        let tracker = app.world().resource::<TestCommandExecuted>();
        assert_eq!(tracker.count, 1, "Command should have been executed once");
        assert_eq!(tracker.last_args, vec!["arg1", "arg2"]);
    }

    #[test]
    fn test_input_messages_reach_console() {
        let mut app = app();
        register_counter(&mut app);
        app.update();

        app.world_mut()
            .resource_mut::<Messages<ConsoleInputEvent>>()
            .write(ConsoleInputEvent::new("test_cmd; test_cmd; test_cmd"));
        app.update();

        assert_eq!(app.world().resource::<TestCommandExecuted>().count, 3);
        let console = app.world().resource::<DevConsole>();
        assert_eq!(console.session().input_history(), &["test_cmd; test_cmd; test_cmd"]);
    }

    #[test]
    fn test_output_forwarded_as_messages() {
        let mut app = app();
        app.update();

        queue_command(&mut app, "echo hello world");
        app.update();

        let seen = app.world().resource::<Seen>();
        let texts: Vec<_> = seen.outputs.iter().map(|o| o.message.as_str()).collect();
        assert_eq!(texts, vec!["$ echo hello world", "hello world"]);
        assert_eq!(seen.outputs[0].level, ConsoleOutputLevel::Command);
    }

    #[test]
    fn test_silent_input_skips_echo_and_history() {
        let mut app = app();
        app.update();

        app.world_mut()
            .resource_mut::<PendingInput>()
            .queue
            .push(ConsoleInputEvent::silent("1 + 2"));
        app.update();

        let seen = app.world().resource::<Seen>();
        assert!(seen.outputs.is_empty());
        let console = app.world().resource::<DevConsole>();
        assert!(console.session().input_history().is_empty());
    }

    #[test]
    fn test_toggle_and_clear_messages() {
        let mut app = app();
        app.update();

        app.world_mut().resource_mut::<DevConsole>().toggle_console();
        queue_command(&mut app, "clear");
        app.update();

        let seen = app.world().resource::<Seen>();
        assert_eq!(seen.toggles, vec![ConsoleToggleEvent::opened()]);
        assert_eq!(seen.clears, vec![ConsoleClearEvent { scope: ClearScope::Visible }]);
    }

    #[test]
    fn test_unknown_command_reports_error() {
        let mut app = app();
        app.update();

        queue_command(&mut app, "no_such_command");
        app.update();

        let seen = app.world().resource::<Seen>();
        assert!(seen.outputs.iter().any(|o| {
            o.level == ConsoleOutputLevel::Error && o.message.contains("no_such_command")
        }));
    }

    #[test]
    fn test_handler_panic_is_contained() {
        let mut app = app();
        app.add_systems(Startup, |mut console: ResMut<DevConsole>| {
            console
                .register_command(Command::new("boom", |_, _| panic!("kaboom")))
                .unwrap();
        });
        app.update();

        queue_command(&mut app, "boom");
        app.update();

        // Console is back in the world and still usable.
        queue_command(&mut app, "echo after");
        app.update();

        let seen = app.world().resource::<Seen>();
        assert!(seen.outputs.iter().any(|o| o.message.contains("panicked: kaboom")));
        assert!(seen.outputs.iter().any(|o| o.message == "after"));
    }

    #[test]
    fn test_greeting_and_builtins_from_config() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let mut config = ConsoleConfig::default().with_greeting("hi");
        config.register_builtins = false;
        app.add_plugins(ConsolePlugin::new(config));
        app.init_resource::<Seen>();
        app.add_systems(Update, collect.after(forward_render_events));
        app.update();

        let console = app.world().resource::<DevConsole>();
        assert!(!console.has_command("help"));
        let seen = app.world().resource::<Seen>();
        assert_eq!(seen.outputs[0].level, ConsoleOutputLevel::Boxed);
    }

    #[cfg(feature = "persist")]
    #[test]
    fn test_config_file_loaded_at_build() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let mut file = ConsoleConfigFile::new();
        file.settings.open_on_start = true;
        file.aliases.insert("hi".to_string(), "echo hi".to_string());
        file.save(temp.path()).unwrap();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ConfigPath(temp.path().display().to_string()));
        app.add_plugins(ConsolePlugin::default());
        app.update();

        let console = app.world().resource::<DevConsole>();
        assert!(console.is_open());
        assert!(console.has_alias("hi"));
        assert!(console.has_command("write_config"));
    }
}
