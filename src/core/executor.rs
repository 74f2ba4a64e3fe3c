//! Command line execution.
//!
//! One line flows through: `;` splitting, tokenizing, alias expansion, then
//! dispatch to a registered command or to the evaluator. Every failure is
//! reported to the history and returned as an [`ExitStatus`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::{
    expand_aliases, quote_token, split_commands, strip_comment, tokenize, CommandArgs, CommandContext,
    ConsoleError, ConsoleOutputLevel, DevConsole, ExitStatus,
};

impl DevConsole {
    /// Execute a command line.
    ///
    /// `silent` suppresses the input echo and expression results. Errors are
    /// always printed.
    ///
    /// A first token that is neither a command, an alias nor a resolvable
    /// name fails with [`ExitStatus::NotFound`]. [`ExitStatus::UnresolvedName`]
    /// is only returned for names later in an expression, as in `1 + missing`.
    pub fn execute_command(&mut self, line: &str, silent: bool) -> ExitStatus {
        self.execute_command_with_host(line, silent, None)
    }

    /// Record `line` in the input history, then execute it.
    ///
    /// This is the entry point for interactive input.
    pub fn submit(&mut self, line: &str, host: Option<&mut dyn Any>) -> ExitStatus {
        if self.session.is_enabled() {
            self.session.record_input(line.trim());
        }
        self.execute_command_with_host(line, false, host)
    }

    /// Execute a command line, handing `host` to command handlers.
    pub fn execute_command_with_host(
        &mut self,
        line: &str,
        silent: bool,
        host: Option<&mut dyn Any>,
    ) -> ExitStatus {
        match self.run_line(line, silent, host) {
            Ok(()) => ExitStatus::Success,
            Err(err) => {
                self.report(&err);
                err.status()
            }
        }
    }

    fn run_line(
        &mut self,
        line: &str,
        silent: bool,
        mut host: Option<&mut dyn Any>,
    ) -> Result<(), ConsoleError> {
        if !self.session.is_enabled() {
            return Err(ConsoleError::Disabled);
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if !silent {
            self.push_line(ConsoleOutputLevel::Command, format!("$ {line}"));
        }

        for segment in split_commands(line) {
            self.run_segment(segment, silent, host.as_deref_mut())?;
        }
        Ok(())
    }

    fn run_segment(
        &mut self,
        segment: &str,
        silent: bool,
        mut host: Option<&mut dyn Any>,
    ) -> Result<(), ConsoleError> {
        let tokens = tokenize(segment)?;
        if tokens.is_empty() {
            return Ok(());
        }

        match expand_aliases(&self.registry, &tokens)? {
            Some(invocations) => {
                for invocation in &invocations {
                    let raw = invocation
                        .iter()
                        .map(|token| quote_token(token))
                        .collect::<Vec<_>>()
                        .join(" ");
                    self.dispatch(&raw, invocation, silent, host.as_deref_mut())?;
                }
                Ok(())
            }
            None => self.dispatch(strip_comment(segment), &tokens, silent, host),
        }
    }

    /// Run one invocation whose first token is not an alias.
    fn dispatch(
        &mut self,
        raw: &str,
        tokens: &[String],
        silent: bool,
        host: Option<&mut dyn Any>,
    ) -> Result<(), ConsoleError> {
        let Some((name, args)) = tokens.split_first() else {
            return Ok(());
        };

        if let Some(command) = self.registry.get_command(name) {
            command.check_arity(args.len())?;
            let handler = command.handler();
            let args = CommandArgs::new(name, raw, args);

            let mut ctx = CommandContext::new(self, host).with_silent(silent);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&args, &mut ctx)));
            return outcome.unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(ConsoleError::failed(format!(
                    "command '{name}' panicked: {message}"
                )))
            });
        }

        if !self.config.evaluate_unknown_commands {
            self.suggest(name);
            return Err(ConsoleError::CommandNotFound(name.clone()));
        }

        match self.evaluate(raw) {
            Ok(value) => {
                if !silent {
                    self.push_line(ConsoleOutputLevel::Result, value.to_string());
                }
                Ok(())
            }
            // A first token that resolves to nothing reads as a mistyped command.
            Err(ConsoleError::UnresolvedName(unresolved)) if unresolved == *name => {
                self.suggest(name);
                Err(ConsoleError::CommandNotFound(unresolved))
            }
            Err(err) => Err(err),
        }
    }

    /// Print close matches for an unknown command name.
    fn suggest(&mut self, name: &str) {
        let candidates: Vec<&str> = self
            .registry
            .fuzzy_find(name)
            .into_iter()
            .take(3)
            .map(|(candidate, _, _)| candidate)
            .collect();
        if !candidates.is_empty() {
            let hint = format!("did you mean: {}?", candidates.join(", "));
            self.push_line(ConsoleOutputLevel::Info, hint);
        }
    }

    /// Run every line produced by the script source for `source`.
    ///
    /// Blank lines and lines starting with `#` or `//` are skipped. With
    /// `script_stop_on_error` the first failing line ends the script.
    /// Returns the status of the first failure, or success.
    pub fn execute_script(&mut self, source: &str, silent: bool) -> ExitStatus {
        self.execute_script_with_host(source, silent, None)
    }

    pub fn execute_script_with_host(
        &mut self,
        source: &str,
        silent: bool,
        mut host: Option<&mut dyn Any>,
    ) -> ExitStatus {
        if !self.session.is_enabled() {
            let err = ConsoleError::Disabled;
            self.report(&err);
            return err.status();
        }

        if self.script_depth >= self.config.max_script_depth {
            bevy::log::warn!(
                "Console: script '{}' exceeds maximum depth {}",
                source,
                self.config.max_script_depth
            );
            let err = ConsoleError::Script {
                script: source.to_string(),
                message: format!("maximum script depth {} exceeded", self.config.max_script_depth),
            };
            self.report(&err);
            return err.status();
        }

        let scripts = Arc::clone(&self.script_source);
        let lines = match scripts.open(source) {
            Ok(lines) => lines,
            Err(e) => {
                let err = ConsoleError::Script {
                    script: source.to_string(),
                    message: e.to_string(),
                };
                self.report(&err);
                return err.status();
            }
        };

        bevy::log::debug!("Console: executing script '{}'", source);
        self.script_depth += 1;
        let mut status = ExitStatus::Success;

        for (number, line) in lines.enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    let err = ConsoleError::Script {
                        script: source.to_string(),
                        message: format!("line {}: {}", number + 1, e),
                    };
                    self.report(&err);
                    status = err.status();
                    break;
                }
            };

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            let result = self.execute_command_with_host(line, silent, host.as_deref_mut());
            if !result.is_success() {
                if status.is_success() {
                    status = result;
                }
                if self.config.script_stop_on_error {
                    bevy::log::debug!(
                        "Console: script '{}' stopped at line {}",
                        source,
                        number + 1
                    );
                    break;
                }
            }
        }

        self.script_depth -= 1;
        status
    }

    /// Print usage of a command or the definition of an alias.
    pub fn usage(&mut self, name: &str) -> ExitStatus {
        match self.print_usage(name) {
            Ok(()) => ExitStatus::Success,
            Err(err) => {
                self.report(&err);
                err.status()
            }
        }
    }

    pub(crate) fn print_usage(&mut self, name: &str) -> Result<(), ConsoleError> {
        if let Some(command) = self.registry.get_command(name) {
            let usage = format!("usage: {}", command.usage());
            let description = command.get_description().to_string();
            self.push_line(ConsoleOutputLevel::Info, usage);
            if !description.is_empty() {
                self.push_line(ConsoleOutputLevel::Info, format!("  {description}"));
            }
            return Ok(());
        }

        if let Some(alias) = self.registry.get_alias(name) {
            let text = format!("alias {} -> {}", alias.name(), alias.command_line());
            self.push_line(ConsoleOutputLevel::Info, text);
            return Ok(());
        }

        Err(ConsoleError::CommandNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::ConsoleConfig;
    use crate::core::{Command, MemoryScriptSource, Value};

    #[derive(Default)]
    struct Calls(Mutex<Vec<Vec<String>>>);

    fn recording(console: &mut DevConsole, name: &str) -> Arc<Calls> {
        let calls = Arc::new(Calls::default());
        let sink = Arc::clone(&calls);
        console
            .register_command(Command::new(name, move |args, _| {
                sink.0.lock().unwrap().push(args.as_slice().to_vec());
                Ok(())
            }))
            .unwrap();
        calls
    }

    fn texts(console: &DevConsole) -> Vec<String> {
        console.history().iter().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn test_dispatch_to_command() {
        let mut console = DevConsole::default();
        let calls = recording(&mut console, "list");

        assert_eq!(console.execute_command("list a \"b c\"", false), ExitStatus::Success);
        assert_eq!(*calls.0.lock().unwrap(), vec![vec!["a", "b c"]]);
        assert_eq!(texts(&console), vec![r#"$ list a "b c""#]);
    }

    #[test]
    fn test_alias_dispatch_appends_extra_args() {
        let mut console = DevConsole::default();
        let calls = recording(&mut console, "list");
        console.add_alias("ls", "list --all").unwrap();

        assert_eq!(console.execute_command("ls extra", false), ExitStatus::Success);
        assert_eq!(*calls.0.lock().unwrap(), vec![vec!["--all", "extra"]]);
    }

    #[test]
    fn test_cyclic_alias_is_reported() {
        let mut console = DevConsole::default();
        console.add_alias("a", "b").unwrap();
        console.add_alias("b", "a").unwrap();

        assert_eq!(console.execute_command("a", false), ExitStatus::CyclicAlias);
        assert_eq!(
            console.history().last().unwrap().text,
            "alias cycle detected: a -> b -> a"
        );
    }

    #[test]
    fn test_disabled_console_runs_nothing() {
        let mut console = DevConsole::default();
        let calls = recording(&mut console, "list");
        console.set_enabled(false);

        assert_eq!(console.execute_command("list", false), ExitStatus::ConsoleDisabled);
        assert!(calls.0.lock().unwrap().is_empty());
        assert_eq!(console.history().last().unwrap().level, ConsoleOutputLevel::Error);
    }

    #[test]
    fn test_falls_back_to_evaluation() {
        let mut console = DevConsole::default();
        console.add_eval_input("hp", Value::Int(40));

        assert_eq!(console.execute_command("hp + 2", false), ExitStatus::Success);
        assert_eq!(console.history().last().unwrap().text, "42");
        assert_eq!(console.history().last().unwrap().level, ConsoleOutputLevel::Result);
    }

    #[test]
    fn test_silent_suppresses_echo_and_result_not_errors() {
        let mut console = DevConsole::default();
        assert_eq!(console.execute_command("1 + 1", true), ExitStatus::Success);
        assert!(console.history().is_empty());

        assert_eq!(console.execute_command("1 +", true), ExitStatus::EvaluationError);
        assert_eq!(console.history().len(), 1);
    }

    #[test]
    fn test_unknown_command_status() {
        let mut console = DevConsole::default();
        recording(&mut console, "spawn");

        assert_eq!(console.execute_command("spwn", false), ExitStatus::NotFound);
        assert!(texts(&console).iter().any(|t| t.contains("did you mean: spawn")));

        let mut config = ConsoleConfig::default();
        config.evaluate_unknown_commands = false;
        let mut console = DevConsole::new(config);
        assert_eq!(console.execute_command("1 + 1", false), ExitStatus::NotFound);
    }

    #[test]
    fn test_unresolved_name_status() {
        let mut console = DevConsole::default();
        assert_eq!(console.execute_command("1 + missing", false), ExitStatus::UnresolvedName);
        assert_eq!(
            console.history().last().unwrap().text,
            "unresolved name 'missing'"
        );
    }

    #[test]
    fn test_comment_after_expression() {
        let mut console = DevConsole::default();
        console.add_eval_input("hp", Value::Int(40));

        assert_eq!(console.execute_command("hp + 1 // note", false), ExitStatus::Success);
        assert_eq!(console.history().last().unwrap().text, "41");
    }

    #[test]
    fn test_deep_expression_is_an_error() {
        let mut console = DevConsole::default();

        let negations = format!("{}1", "-".repeat(20_000));
        assert_eq!(console.execute_command(&negations, true), ExitStatus::EvaluationError);

        let depth = 200_000;
        let parens = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(console.execute_command(&parens, true), ExitStatus::EvaluationError);
        assert!(console.history().last().unwrap().text.contains("nested too deeply"));

        assert_eq!(console.execute_command("-(-(1))", false), ExitStatus::Success);
        assert_eq!(console.history().last().unwrap().text, "1");
    }

    #[test]
    fn test_alias_fanout_is_bounded() {
        let mut console = DevConsole::default();
        let calls = recording(&mut console, "status");
        for i in 0..22 {
            let next = format!("a{}", i + 1);
            console.add_alias(&format!("a{i}"), &format!("{next}; {next}")).unwrap();
        }
        console.add_alias("a22", "status").unwrap();

        assert_eq!(console.execute_command("a0", true), ExitStatus::CyclicAlias);
        assert!(calls.0.lock().unwrap().is_empty());
        assert!(console.history().last().unwrap().text.contains("expands to more than"));

        assert_eq!(console.execute_command("a15", true), ExitStatus::Success);
        assert_eq!(calls.0.lock().unwrap().len(), 128);
    }

    #[test]
    fn test_parse_error_status() {
        let mut console = DevConsole::default();
        assert_eq!(console.execute_command("echo \"open", false), ExitStatus::ParseError);
    }

    #[test]
    fn test_arity_checked_before_handler() {
        let mut console = DevConsole::default();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        console
            .register_command(Command::new("give", move |_, _| {
                *counter.lock().unwrap() += 1;
                Ok(())
            }).arg("item"))
            .unwrap();

        assert_eq!(console.execute_command("give", false), ExitStatus::InvalidArguments);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_handler_error_and_panic() {
        let mut console = DevConsole::default();
        console
            .register_command(Command::new("fail", |_, _| Err(ConsoleError::failed("nope"))))
            .unwrap();
        console
            .register_command(Command::new("boom", |_, _| panic!("kaboom")))
            .unwrap();

        assert_eq!(console.execute_command("fail", false), ExitStatus::CommandFailed);
        assert_eq!(console.history().last().unwrap().text, "nope");

        assert_eq!(console.execute_command("boom", false), ExitStatus::CommandFailed);
        assert!(console.history().last().unwrap().text.contains("kaboom"));
    }

    #[test]
    fn test_chained_commands_stop_at_failure() {
        let mut console = DevConsole::default();
        let calls = recording(&mut console, "step");

        assert_eq!(
            console.execute_command("step 1; missing_cmd; step 2", false),
            ExitStatus::NotFound
        );
        assert_eq!(*calls.0.lock().unwrap(), vec![vec!["1"]]);
    }

    #[test]
    fn test_handler_can_reach_host_and_console() {
        let mut console = DevConsole::default();
        console
            .register_command(Command::new("bump", |_, ctx| {
                let counter = ctx
                    .host_mut::<u32>()
                    .ok_or_else(|| ConsoleError::failed("no host"))?;
                *counter += 1;
                let value = *counter;
                ctx.info(&format!("counter = {value}"));
                Ok(())
            }))
            .unwrap();

        let mut counter = 0u32;
        let status = console.execute_command_with_host("bump; bump", false, Some(&mut counter as &mut dyn Any));
        assert_eq!(status, ExitStatus::Success);
        assert_eq!(counter, 2);
        assert_eq!(console.history().last().unwrap().text, "counter = 2");

        assert_eq!(console.execute_command("bump", false), ExitStatus::CommandFailed);
    }

    #[test]
    fn test_submit_records_input() {
        let mut console = DevConsole::default();
        console.submit("1 + 1", None);
        console.execute_command("2 + 2", false);
        assert_eq!(console.session().input_history(), &["1 + 1"]);
    }

    #[test]
    fn test_execute_script() {
        let scripts = MemoryScriptSource::new()
            .with_script("ok", "# comment\n\nstep 1\n// another\nstep 2")
            .with_script("bad", "step 1\nnope\nstep 2");
        let mut console = DevConsole::default().with_script_source(scripts);
        let calls = recording(&mut console, "step");

        assert_eq!(console.execute_script("ok", true), ExitStatus::Success);
        assert_eq!(calls.0.lock().unwrap().len(), 2);

        assert_eq!(console.execute_script("bad", true), ExitStatus::NotFound);
        assert_eq!(calls.0.lock().unwrap().len(), 3);

        assert_eq!(console.execute_script("missing", true), ExitStatus::ScriptError);
    }

    #[test]
    fn test_execute_script_continue_on_error() {
        let scripts = MemoryScriptSource::new().with_script("bad", "step 1\nnope\nstep 2");
        let mut config = ConsoleConfig::default();
        config.script_stop_on_error = false;
        let mut console = DevConsole::new(config).with_script_source(scripts);
        let calls = recording(&mut console, "step");

        assert_eq!(console.execute_script("bad", true), ExitStatus::NotFound);
        assert_eq!(calls.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_script_depth_is_bounded() {
        let scripts = MemoryScriptSource::new().with_script("self", "run self");
        let mut console = DevConsole::default().with_script_source(scripts);
        console
            .register_command(Command::new("run", |args, ctx| {
                match ctx.execute_script(&args[0], true) {
                    ExitStatus::Success => Ok(()),
                    status => Err(ConsoleError::Script {
                        script: args[0].to_string(),
                        message: format!("failed with status {}", status.code()),
                    }),
                }
            }).arg("script"))
            .unwrap();

        assert_eq!(console.execute_command("run self", true), ExitStatus::ScriptError);
        assert_eq!(console.script_depth, 0);
        assert!(texts(&console)
            .iter()
            .any(|t| t.contains("maximum script depth 8 exceeded")));
    }

    #[test]
    fn test_usage() {
        let mut console = DevConsole::default();
        console
            .register_command(
                Command::new("give", |_, _| Ok(()))
                    .description("Give an item")
                    .arg("item")
                    .optional_arg("count"),
            )
            .unwrap();
        console.add_alias("g", "give sword").unwrap();

        assert_eq!(console.usage("give"), ExitStatus::Success);
        assert_eq!(texts(&console), vec!["usage: give <item> [count]", "  Give an item"]);

        assert_eq!(console.usage("g"), ExitStatus::Success);
        assert_eq!(console.history().last().unwrap().text, "alias g -> give sword");

        assert_eq!(console.usage("nope"), ExitStatus::NotFound);
    }
}
