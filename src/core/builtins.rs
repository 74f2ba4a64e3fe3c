//! Built-in commands.

use super::{
    quote_token, ArgKind, ArgSpec, Command, CommandArgs, CommandContext, CompletionSource,
    ConsoleError, ConsoleOutputLevel, DevConsole,
};

/// Register `help`, `commands`, `alias`, `unalias`, `echo`, `eval`, `exec`,
/// `clear`, `erase_history` and, with `persist`, `write_config`.
///
/// Fails with [`ConsoleError::DuplicateName`] if one of the names is taken.
pub fn register_builtins(console: &mut DevConsole) -> Result<(), ConsoleError> {
    for command in builtins() {
        console.register_command(command)?;
    }
    Ok(())
}

fn builtins() -> Vec<Command> {
    #[allow(unused_mut)]
    let mut commands = vec![
        Command::new("help", help)
            .description("Show usage of a command, or list all commands")
            .spec(
                ArgSpec::new("command", ArgKind::Optional)
                    .with_completion(CompletionSource::CommandNames),
            ),
        Command::new("commands", list_commands).description("List commands with their usage"),
        Command::new("alias", alias)
            .description("List aliases, show one, or define one")
            .optional_arg("name")
            .rest_arg("command"),
        Command::new("unalias", |args, ctx| {
            let name = &args[0];
            if ctx.remove_alias(name) {
                Ok(())
            } else {
                Err(ConsoleError::AliasNotFound(name.to_string()))
            }
        })
        .description("Remove an alias")
        .arg_with("name", CompletionSource::AliasNames),
        Command::new("echo", |args, ctx| {
            ctx.info(&args.join(" "));
            Ok(())
        })
        .description("Print text")
        .rest_arg("text"),
        Command::new("eval", |args, ctx| {
            if args.is_empty() {
                return Err(ConsoleError::InvalidArguments {
                    command: "eval".into(),
                    message: "missing expression".into(),
                });
            }
            let value = ctx.evaluate(args.raw_args())?;
            ctx.push_line(ConsoleOutputLevel::Result, value.to_string());
            Ok(())
        })
        .description("Evaluate an expression")
        .spec(ArgSpec::new("expression", ArgKind::Rest).with_completion(CompletionSource::EvalInputs)),
        Command::new("exec", |args, ctx| {
            let script = &args[0];
            let silent = ctx.is_silent();
            let status = ctx.execute_script(script, silent);
            if status.is_success() {
                return Ok(());
            }
            Err(ConsoleError::Script {
                script: script.to_string(),
                message: format!("exited with status {}", status.code()),
            })
        })
        .description("Run a script line by line, as silently as the calling line")
        .arg("script"),
        Command::new("clear", |_, ctx| {
            ctx.clear_console();
            Ok(())
        })
        .description("Clear the visible output"),
        Command::new("erase_history", |_, ctx| {
            ctx.erase_history();
            Ok(())
        })
        .description("Drop all output and input history"),
    ];

    #[cfg(feature = "persist")]
    commands.push(
        Command::new("write_config", write_config)
            .description("Save settings and aliases to the config file")
            .optional_arg("path"),
    );

    commands
}

fn help(args: &CommandArgs, ctx: &mut CommandContext) -> Result<(), ConsoleError> {
    if let Some(name) = args.get(0) {
        return ctx.print_usage(name);
    }

    let lines: Vec<String> = ctx
        .registry()
        .commands()
        .map(|command| {
            let description = command.get_description();
            if description.is_empty() {
                format!("  {}", command.name())
            } else {
                format!("  {} - {}", command.name(), description)
            }
        })
        .collect();
    ctx.info("Available commands:");
    for line in lines {
        ctx.info(&line);
    }
    Ok(())
}

fn list_commands(_: &CommandArgs, ctx: &mut CommandContext) -> Result<(), ConsoleError> {
    let usages: Vec<String> = ctx.registry().commands().map(|c| c.usage()).collect();
    for usage in usages {
        ctx.info(&usage);
    }
    Ok(())
}

fn alias(args: &CommandArgs, ctx: &mut CommandContext) -> Result<(), ConsoleError> {
    match args.len() {
        0 => {
            let lines: Vec<String> = ctx
                .registry()
                .aliases()
                .map(|alias| format!("  {} -> {}", alias.name(), alias.command_line()))
                .collect();
            if lines.is_empty() {
                ctx.info("No aliases defined");
            }
            for line in lines {
                ctx.info(&line);
            }
            Ok(())
        }
        1 => {
            let name = &args[0];
            if !ctx.has_alias(name) {
                return Err(ConsoleError::AliasNotFound(name.to_string()));
            }
            ctx.print_usage(name)
        }
        // A single quoted argument is taken as the whole command line.
        2 => ctx.add_alias(&args[0], &args[1]),
        _ => {
            let line = args.as_slice()[1..]
                .iter()
                .map(|token| quote_token(token))
                .collect::<Vec<_>>()
                .join(" ");
            ctx.add_alias(&args[0], &line)
        }
    }
}

#[cfg(feature = "persist")]
fn write_config(args: &CommandArgs, ctx: &mut CommandContext) -> Result<(), ConsoleError> {
    use crate::persist::{ConfigPath, ConsoleConfigFile};

    let path = match args.get(0) {
        Some(path) => path.to_string(),
        None => ctx
            .host_mut::<bevy::prelude::World>()
            .and_then(|world| world.get_resource::<ConfigPath>())
            .map_or_else(|| ConfigPath::default().0, |path| path.0.clone()),
    };

    ConsoleConfigFile::from_console(ctx)
        .save(&path)
        .map_err(|e| ConsoleError::failed(e.to_string()))?;
    ctx.info(&format!("Config written to {path}"));
    Ok(())
}
