//! Terminal console example.
//!
//! Demonstrates using bevy_console_engine with stdin/stdout for headless
//! applications like dedicated servers.
//!
//! Run with: `cargo run --example terminal --no-default-features --features terminal`
//!
//! Commands:
//! - `help` - List available commands
//! - `status` - Show server status
//! - `hostname <name>` - Rename the server
//! - `say <message...>` - Broadcast a message
//! - `quit` - Exit the application

use bevy::prelude::*;
use bevy_console_engine::prelude::*;
use bevy_console_engine::prelude::Command;
use bevy_console_engine::TerminalPlugin;

#[derive(Resource)]
struct ServerInfo {
    hostname: String,
    max_players: u32,
}

fn main() {
    println!("=== Terminal Console Example ===");
    println!("Type commands and press Enter. Type 'quit' to exit.");
    println!();

    // Ensure output is flushed before starting the app
    use std::io::Write;
    let _ = std::io::stdout().flush();

    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ConsolePlugin::default())
        .add_plugins(TerminalPlugin::default())
        .insert_resource(ServerInfo {
            hostname: "My Server".to_string(),
            max_players: 32,
        })
        .add_systems(Startup, setup)
        .run();
}

fn world<'a>(ctx: &'a mut CommandContext) -> Result<&'a mut World, ConsoleError> {
    ctx.host_mut::<World>()
        .ok_or_else(|| ConsoleError::failed("not running inside the app"))
}

fn setup(mut console: ResMut<DevConsole>) {
    let commands = [
        Command::new("status", |_, ctx| {
            let info = world(ctx)?.resource::<ServerInfo>();
            let lines = [
                "=== Status ===".to_string(),
                format!("Hostname: {}", info.hostname),
                format!("Max Players: {}", info.max_players),
            ];
            for line in &lines {
                ctx.info(line);
            }
            Ok(())
        })
        .description("Show server status"),
        Command::new("hostname", |args, ctx| {
            let name = args.join(" ");
            world(ctx)?.resource_mut::<ServerInfo>().hostname = name.clone();
            ctx.info(&format!("hostname = \"{name}\""));
            Ok(())
        })
        .description("Rename the server")
        .rest_arg("name"),
        Command::new("say", |args, ctx| {
            ctx.print_line(&format!("[SERVER] {}", args.join(" ")), true);
            Ok(())
        })
        .description("Broadcast a message")
        .rest_arg("message"),
        Command::new("quit", |_, ctx| {
            world(ctx)?
                .resource_mut::<Messages<AppExit>>()
                .write(AppExit::Success);
            Ok(())
        })
        .description("Exit the application"),
    ];

    for command in commands {
        if let Err(e) = console.register_command(command) {
            error!("{e}");
        }
    }
}
