//! Console commands.
//!
//! A [`Command`] is a named handler plus the argument specs used for arity
//! checks, usage strings and per-argument autocomplete.

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::{ConsoleError, DevConsole, ExitStatus};

/// Arguments passed to a command handler.
#[derive(Debug, Clone, Copy)]
pub struct CommandArgs<'a> {
    /// Name of the command being invoked.
    command: &'a str,
    /// The command line segment that produced this invocation.
    raw: &'a str,
    /// Parsed arguments (excluding command name).
    args: &'a [String],
}

impl<'a> CommandArgs<'a> {
    pub fn new(command: &'a str, raw: &'a str, args: &'a [String]) -> Self {
        Self { command, raw, args }
    }

    #[inline]
    pub fn command(&self) -> &'a str {
        self.command
    }

    #[inline]
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Raw text after the command word, quotes intact.
    pub fn raw_args(&self) -> &'a str {
        self.raw
            .trim_start()
            .split_once(char::is_whitespace)
            .map_or("", |(_, rest)| rest.trim())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).map(String::as_str)
    }

    /// Get an argument or a default value.
    #[inline]
    pub fn get_or(&self, index: usize, default: &'a str) -> &'a str {
        self.get(index).unwrap_or(default)
    }

    /// Parse an argument, failing with [`ConsoleError::InvalidArguments`]
    /// naming the argument if it is missing or malformed.
    pub fn parse<T>(&self, index: usize, name: &str) -> Result<T, ConsoleError>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.get(index).ok_or_else(|| ConsoleError::InvalidArguments {
            command: self.command.to_string(),
            message: format!("missing argument '{name}'"),
        })?;
        raw.parse().map_err(|err| ConsoleError::InvalidArguments {
            command: self.command.to_string(),
            message: format!("invalid value '{raw}' for '{name}': {err}"),
        })
    }

    /// Parse an optional argument with a default value.
    pub fn parse_or<T: std::str::FromStr>(&self, index: usize, default: T) -> T {
        self.get(index)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [String] {
        self.args
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &'a str> {
        self.args.iter().map(String::as_str)
    }

    pub fn join(&self, separator: &str) -> String {
        self.args.join(separator)
    }

    /// Join arguments starting from an index.
    pub fn join_from(&self, start: usize, separator: &str) -> String {
        self.args.get(start..).unwrap_or(&[]).join(separator)
    }
}

impl std::ops::Index<usize> for CommandArgs<'_> {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.args[index]
    }
}

/// Mutable access handed to a running command.
///
/// Derefs to the [`DevConsole`] so handlers can print, register and run
/// nested command lines. The host is whatever object the embedder passed to
/// execution; under the bevy plugin it is the `World`.
pub struct CommandContext<'a> {
    console: &'a mut DevConsole,
    host: Option<&'a mut dyn Any>,
    silent: bool,
}

impl<'a> CommandContext<'a> {
    pub fn new(console: &'a mut DevConsole, host: Option<&'a mut dyn Any>) -> Self {
        Self {
            console,
            host,
            silent: false,
        }
    }

    /// Mark the context as running a silent line.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Whether the line that invoked the command was run silently.
    #[inline]
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Downcast the host object.
    pub fn host_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.host.as_deref_mut()?.downcast_mut()
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    /// Run a command line from inside a handler, keeping the same host.
    pub fn execute(&mut self, line: &str, silent: bool) -> ExitStatus {
        self.console
            .execute_command_with_host(line, silent, self.host.as_deref_mut())
    }

    /// Run a script from inside a handler, keeping the same host.
    pub fn execute_script(&mut self, source: &str, silent: bool) -> ExitStatus {
        self.console
            .execute_script_with_host(source, silent, self.host.as_deref_mut())
    }
}

impl Deref for CommandContext<'_> {
    type Target = DevConsole;

    fn deref(&self) -> &Self::Target {
        self.console
    }
}

impl DerefMut for CommandContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.console
    }
}

/// Handler invoked with the parsed arguments.
///
/// Shared so the executor can call it while the registry stays reachable
/// through the context.
pub type CommandHandler =
    Arc<dyn Fn(&CommandArgs, &mut CommandContext) -> Result<(), ConsoleError> + Send + Sync>;

/// Dynamic suggestion provider.
///
/// Receives the partial argument being typed and returns candidates.
pub type AutocompleteProvider = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Where suggestions for an argument come from.
#[derive(Clone)]
pub enum CompletionSource {
    /// Registered command names.
    CommandNames,
    /// Registered alias names.
    AliasNames,
    /// Names of the current eval inputs.
    EvalInputs,
    Custom(AutocompleteProvider),
}

impl CompletionSource {
    pub fn custom<F>(provider: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        CompletionSource::Custom(Arc::new(provider))
    }
}

impl fmt::Debug for CompletionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionSource::CommandNames => write!(f, "CommandNames"),
            CompletionSource::AliasNames => write!(f, "AliasNames"),
            CompletionSource::EvalInputs => write!(f, "EvalInputs"),
            CompletionSource::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Required,
    Optional,
    /// Consumes every remaining token. Only meaningful as the last argument.
    Rest,
}

/// One declared argument of a command.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: Box<str>,
    pub kind: ArgKind,
    pub completion: Option<CompletionSource>,
}

impl ArgSpec {
    pub fn new(name: impl Into<Box<str>>, kind: ArgKind) -> Self {
        Self {
            name: name.into(),
            kind,
            completion: None,
        }
    }

    pub fn with_completion(mut self, source: CompletionSource) -> Self {
        self.completion = Some(source);
        self
    }
}

impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ArgKind::Required => write!(f, "<{}>", self.name),
            ArgKind::Optional => write!(f, "[{}]", self.name),
            ArgKind::Rest => write!(f, "[{}...]", self.name),
        }
    }
}

/// A console command with a handler function.
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::{Command, CompletionSource};
///
/// let spawn = Command::new("spawn", |args, ctx| {
///     let count: u32 = args.parse_or(1, 1);
///     ctx.info(&format!("spawning {count} x {}", &args[0]));
///     Ok(())
/// })
/// .description("Spawn entities")
/// .arg_with("kind", CompletionSource::custom(|_| vec!["crate".into(), "barrel".into()]))
/// .optional_arg("count");
///
/// assert_eq!(spawn.usage(), "spawn <kind> [count]");
/// ```
pub struct Command {
    name: Box<str>,
    description: String,
    args: Vec<ArgSpec>,
    handler: CommandHandler,
}

impl Command {
    pub fn new<F>(name: impl Into<Box<str>>, handler: F) -> Self
    where
        F: Fn(&CommandArgs, &mut CommandContext) -> Result<(), ConsoleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            args: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Append an argument spec.
    pub fn spec(mut self, spec: ArgSpec) -> Self {
        self.args.push(spec);
        self
    }

    pub fn arg(self, name: impl Into<Box<str>>) -> Self {
        self.spec(ArgSpec::new(name, ArgKind::Required))
    }

    /// Required argument with a completion source.
    pub fn arg_with(self, name: impl Into<Box<str>>, source: CompletionSource) -> Self {
        self.spec(ArgSpec::new(name, ArgKind::Required).with_completion(source))
    }

    pub fn optional_arg(self, name: impl Into<Box<str>>) -> Self {
        self.spec(ArgSpec::new(name, ArgKind::Optional))
    }

    pub fn rest_arg(self, name: impl Into<Box<str>>) -> Self {
        self.spec(ArgSpec::new(name, ArgKind::Rest))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut [ArgSpec] {
        &mut self.args
    }

    /// Clone of the handler, for invoking without borrowing the registry.
    pub fn handler(&self) -> CommandHandler {
        Arc::clone(&self.handler)
    }

    /// The spec that the argument at `index` binds to.
    pub fn arg_at(&self, index: usize) -> Option<&ArgSpec> {
        self.args
            .get(index)
            .or_else(|| self.args.last().filter(|spec| spec.kind == ArgKind::Rest))
    }

    /// Name followed by the argument synopsis, e.g. `give <item> [count]`.
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for spec in &self.args {
            usage.push(' ');
            usage.push_str(&spec.to_string());
        }
        usage
    }

    /// Check that `argc` arguments satisfy the declared specs.
    ///
    /// Commands without any specs accept anything.
    pub fn check_arity(&self, argc: usize) -> Result<(), ConsoleError> {
        if self.args.is_empty() {
            return Ok(());
        }

        let required = self
            .args
            .iter()
            .filter(|spec| spec.kind == ArgKind::Required)
            .count();
        let unbounded = self.args.iter().any(|spec| spec.kind == ArgKind::Rest);

        let message = if argc < required {
            format!("expected at least {required} argument(s), got {argc}")
        } else if !unbounded && argc > self.args.len() {
            format!("expected at most {} argument(s), got {argc}", self.args.len())
        } else {
            return Ok(());
        };

        Err(ConsoleError::InvalidArguments {
            command: self.name.to_string(),
            message: format!("{message} (usage: {})", self.usage()),
        })
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_args_basic() {
        let argv = strings(&["hello", "world"]);
        let args = CommandArgs::new("echo", "echo hello world", &argv);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(0), Some("hello"));
        assert_eq!(&args[1], "world");
        assert_eq!(args.get(2), None);
    }

    #[test]
    fn test_command_args_parse() {
        let argv = strings(&["42", "nope"]);
        let args = CommandArgs::new("set", "set 42 nope", &argv);
        assert_eq!(args.parse::<i32>(0, "value"), Ok(42));
        assert!(matches!(
            args.parse::<i32>(1, "other"),
            Err(ConsoleError::InvalidArguments { command, .. }) if command == "set"
        ));
        assert!(args.parse::<i32>(5, "missing").is_err());
        assert_eq!(args.parse_or::<i32>(5, 0), 0);
    }

    #[test]
    fn test_command_args_join() {
        let argv = strings(&["hello", "big", "world"]);
        let args = CommandArgs::new("echo", "echo hello big world", &argv);
        assert_eq!(args.join(" "), "hello big world");
        assert_eq!(args.join_from(1, " "), "big world");
        assert_eq!(args.join_from(9, " "), "");
    }

    #[test]
    fn test_usage_and_arity() {
        let cmd = Command::new("give", |_, _| Ok(()))
            .arg("item")
            .optional_arg("count");

        assert_eq!(cmd.usage(), "give <item> [count]");
        assert!(cmd.check_arity(1).is_ok());
        assert!(cmd.check_arity(2).is_ok());
        assert!(matches!(
            cmd.check_arity(0),
            Err(ConsoleError::InvalidArguments { .. })
        ));
        assert!(cmd.check_arity(3).is_err());
    }

    #[test]
    fn test_rest_arg_is_unbounded() {
        let cmd = Command::new("echo", |_, _| Ok(())).rest_arg("text");
        assert_eq!(cmd.usage(), "echo [text...]");
        assert!(cmd.check_arity(0).is_ok());
        assert!(cmd.check_arity(12).is_ok());
        assert_eq!(cmd.arg_at(7).map(|spec| &*spec.name), Some("text"));
    }

    #[test]
    fn test_commands_without_specs_accept_anything() {
        let cmd = Command::new("raw", |_, _| Ok(()));
        assert!(cmd.check_arity(0).is_ok());
        assert!(cmd.check_arity(99).is_ok());
        assert!(cmd.arg_at(0).is_none());
    }

    #[test]
    fn test_command_creation() {
        let cmd = Command::new("test", |_, _| Ok(())).description("A test command");
        assert_eq!(cmd.name(), "test");
        assert_eq!(cmd.get_description(), "A test command");
    }
}
