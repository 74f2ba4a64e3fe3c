//! Minimal headless console example.
//!
//! Demonstrates using bevy_console_engine programmatically without any UI.
//! Useful for testing or custom UI implementations.
//!
//! Run with: `cargo run --example minimal --no-default-features`

use bevy::prelude::*;
use bevy_console_engine::prelude::*;
use bevy_console_engine::prelude::Command;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ConsolePlugin::new(
            ConsoleConfig::default().with_greeting("bevy_console_engine"),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, process_outputs)
        .add_systems(Update, send_test_commands.run_if(run_once))
        .run();
}

fn setup(mut console: ResMut<DevConsole>) {
    let greet = Command::new("greet", |args, ctx| {
        let name = args.get_or(0, "World");
        ctx.info(&format!("Hello, {name}!"));
        Ok(())
    })
    .description("Greet someone")
    .optional_arg("name");

    if let Err(e) = console.register_command(greet) {
        error!("{e}");
    }
    if let Err(e) = console.add_alias("hi", "greet Developer; echo done") {
        error!("{e}");
    }
    console.add_eval_input("gravity", 9.81);

    println!("Console initialized. Registered: greet, alias hi, input gravity");
}

/// Send some test commands programmatically.
fn send_test_commands(mut events: MessageWriter<ConsoleInputEvent>) {
    println!("\n--- Sending test commands ---");

    // Run a command
    events.write(ConsoleInputEvent::new("greet Developer"));

    // Through an alias
    events.write(ConsoleInputEvent::new("hi"));

    // Not a command, so evaluated
    events.write(ConsoleInputEvent::new("gravity * 2"));

    // Multiple commands with semicolons
    events.write(ConsoleInputEvent::new("echo First; echo Second; echo Third"));

    // Unknown command with a suggestion
    events.write(ConsoleInputEvent::new("gret"));
}

/// Process and print console output events.
fn process_outputs(mut events: MessageReader<ConsoleOutputEvent>) {
    for event in events.read() {
        let prefix = match event.level {
            ConsoleOutputLevel::Debug => "[DEBUG]",
            ConsoleOutputLevel::Info => "[INFO]",
            ConsoleOutputLevel::Warn => "[WARN]",
            ConsoleOutputLevel::Error => "[ERROR]",
            ConsoleOutputLevel::Command => "[$]",
            ConsoleOutputLevel::Result => "[>]",
            ConsoleOutputLevel::Plain | ConsoleOutputLevel::Boxed => "",
        };
        println!("{} {}", prefix, event.message);
    }
}
