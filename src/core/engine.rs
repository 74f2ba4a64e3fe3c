//! The console engine and its capability interface.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use bevy::prelude::Resource;

use crate::config::ConsoleConfig;

use super::{
    boxed, evaluate, ClearScope, Command, CommandRegistry, Completion, CompletionSource,
    ConsoleError, ConsoleOutputLevel, ConsoleRenderer, ConsoleSession, EvalTarget, ExitStatus,
    FsScriptSource, LogSink, NullRenderer, ObjectRef, OutputLine, ScriptSource, TracingLogSink,
    Value,
};

/// Everything an embedder can ask of a console.
///
/// UIs and adapters depend on this trait rather than on [`DevConsole`].
///
/// Removing a missing command, alias or eval input is a no-op that returns
/// `false`.
pub trait ConsoleEngine {
    fn register_command(&mut self, command: Command) -> Result<(), ConsoleError>;
    fn unregister_command(&mut self, name: &str) -> bool;
    fn has_command(&self, name: &str) -> bool;
    fn get_command_names(&self, prefix: &str) -> Vec<String>;
    fn get_command_description(&self, name: &str) -> Result<String, ConsoleError>;

    fn add_alias(&mut self, alias: &str, command_line: &str) -> Result<(), ConsoleError>;
    fn remove_alias(&mut self, alias: &str) -> bool;
    fn has_alias(&self, alias: &str) -> bool;
    fn get_aliases(&self) -> Vec<String>;
    fn get_alias_argv(&self, alias: &str) -> Result<Vec<String>, ConsoleError>;

    fn add_argument_autocomplete_source(
        &mut self,
        command: &str,
        argument_index: usize,
        source: CompletionSource,
    ) -> Result<(), ConsoleError>;
    fn autocomplete(&self, line: &str) -> Vec<Completion>;

    fn info(&mut self, text: &str);
    fn warn(&mut self, text: &str);
    fn error(&mut self, text: &str);
    fn debug(&mut self, text: &str);
    fn print_boxed(&mut self, text: &str);
    fn print_line(&mut self, text: &str, to_stdout: bool);

    fn execute_command(&mut self, line: &str, silent: bool) -> ExitStatus;
    fn execute_script(&mut self, source: &str, silent: bool) -> ExitStatus;
    fn usage(&mut self, name: &str) -> ExitStatus;

    fn add_eval_input(&mut self, name: &str, value: Value);
    fn remove_eval_input(&mut self, name: &str) -> bool;
    fn get_eval_input_names(&self) -> Vec<String>;
    fn set_eval_base_instance(&mut self, instance: Option<&ObjectRef>);
    fn get_eval_base_instance(&self) -> Option<ObjectRef>;
    fn evaluate(&self, expression: &str) -> Result<Value, ConsoleError>;

    fn open_console(&mut self);
    fn close_console(&mut self);
    fn toggle_console(&mut self);
    fn clear_console(&mut self);
    fn erase_history(&mut self);
    fn toggle_history(&mut self);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn is_open(&self) -> bool;
}

/// The developer console.
///
/// Owns the command registry, the session and the eval environment, and
/// talks to the embedder through its collaborators. Under the bevy plugin it
/// lives in the `World` as a resource.
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::{Command, DevConsole, ExitStatus};
///
/// let mut console = DevConsole::default();
/// console
///     .register_command(Command::new("ping", |_, ctx| {
///         ctx.info("pong");
///         Ok(())
///     }))
///     .unwrap();
///
/// assert_eq!(console.execute_command("ping", false), ExitStatus::Success);
/// assert_eq!(console.history().last().unwrap().text, "pong");
/// ```
#[derive(Resource)]
pub struct DevConsole {
    pub(crate) registry: CommandRegistry,
    pub(crate) session: ConsoleSession,
    pub(crate) config: ConsoleConfig,
    pub(crate) script_source: Arc<dyn ScriptSource>,
    pub(crate) script_depth: usize,
    eval_inputs: BTreeMap<String, Value>,
    base: Option<Weak<dyn EvalTarget>>,
    renderer: Box<dyn ConsoleRenderer>,
    log_sink: Box<dyn LogSink>,
}

impl Default for DevConsole {
    fn default() -> Self {
        Self::new(ConsoleConfig::default())
    }
}

impl DevConsole {
    /// A console with the default collaborators: no renderer, scripts from
    /// the working directory and the `tracing` log as mirror.
    ///
    /// Built-in commands are not registered here, see
    /// [`register_builtins`](super::register_builtins).
    pub fn new(config: ConsoleConfig) -> Self {
        Self::new_with_renderer(config, NullRenderer)
    }

    /// Like [`new`](Self::new), with `renderer` attached before the
    /// greeting is printed.
    pub fn new_with_renderer(config: ConsoleConfig, renderer: impl ConsoleRenderer + 'static) -> Self {
        let session = ConsoleSession::new(config.enabled, config.open_on_start, config.record_history);
        let mut console = Self {
            registry: CommandRegistry::new(),
            session,
            config,
            script_source: Arc::new(FsScriptSource::default()),
            script_depth: 0,
            eval_inputs: BTreeMap::new(),
            base: None,
            renderer: Box::new(renderer),
            log_sink: Box::new(TracingLogSink),
        };

        if let Some(greeting) = console.config.greeting.clone() {
            console.print_boxed(&greeting);
        }
        console
    }

    pub fn with_renderer(mut self, renderer: impl ConsoleRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_script_source(mut self, source: impl ScriptSource + 'static) -> Self {
        self.script_source = Arc::new(source);
        self
    }

    pub fn with_log_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.log_sink = Box::new(sink);
        self
    }

    pub fn set_renderer(&mut self, renderer: Box<dyn ConsoleRenderer>) {
        self.renderer = renderer;
    }

    #[inline]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    #[inline]
    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    /// The full scrollback.
    pub fn history(&self) -> &[OutputLine] {
        self.session.history()
    }

    // --- registry -------------------------------------------------------

    pub fn register_command(&mut self, command: Command) -> Result<(), ConsoleError> {
        self.registry.register_command(command)
    }

    pub fn unregister_command(&mut self, name: &str) -> bool {
        self.registry.unregister_command(name)
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.registry.has_command(name)
    }

    pub fn get_command_names(&self, prefix: &str) -> Vec<String> {
        self.registry.get_command_names(prefix)
    }

    pub fn get_command_description(&self, name: &str) -> Result<String, ConsoleError> {
        self.registry.get_command_description(name).map(str::to_string)
    }

    pub fn add_alias(&mut self, alias: &str, command_line: &str) -> Result<(), ConsoleError> {
        self.registry.add_alias(alias, command_line)
    }

    pub fn remove_alias(&mut self, alias: &str) -> bool {
        self.registry.remove_alias(alias)
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.registry.has_alias(alias)
    }

    pub fn get_aliases(&self) -> Vec<String> {
        self.registry.get_aliases()
    }

    pub fn get_alias_argv(&self, alias: &str) -> Result<Vec<String>, ConsoleError> {
        self.registry.get_alias_argv(alias)
    }

    pub fn add_argument_autocomplete_source(
        &mut self,
        command: &str,
        argument_index: usize,
        source: CompletionSource,
    ) -> Result<(), ConsoleError> {
        self.registry
            .add_argument_autocomplete_source(command, argument_index, source)
    }

    // --- output ---------------------------------------------------------

    /// Append a line to the history and hand it to the renderer.
    pub fn push_line(&mut self, level: ConsoleOutputLevel, text: impl Into<String>) {
        let line = OutputLine::new(level, text);
        self.renderer.line_appended(&line);
        self.session.push(line);
    }

    pub fn info(&mut self, text: &str) {
        self.push_line(ConsoleOutputLevel::Info, text);
    }

    pub fn warn(&mut self, text: &str) {
        self.push_line(ConsoleOutputLevel::Warn, text);
    }

    pub fn error(&mut self, text: &str) {
        self.push_line(ConsoleOutputLevel::Error, text);
    }

    /// Dropped unless `show_debug` is set.
    pub fn debug(&mut self, text: &str) {
        if self.config.show_debug {
            self.push_line(ConsoleOutputLevel::Debug, text);
        }
    }

    pub fn print_boxed(&mut self, text: &str) {
        self.push_line(ConsoleOutputLevel::Boxed, boxed(text));
    }

    /// Print unstyled text, also writing it to the log sink if `to_stdout`.
    pub fn print_line(&mut self, text: &str, to_stdout: bool) {
        if to_stdout {
            self.log_sink.write_line(ConsoleOutputLevel::Plain, text);
        }
        self.push_line(ConsoleOutputLevel::Plain, text);
    }

    pub(crate) fn report(&mut self, err: &ConsoleError) {
        self.push_line(ConsoleOutputLevel::Error, err.to_string());
    }

    // --- evaluation -----------------------------------------------------

    /// Bind a name for expressions, replacing any previous binding.
    pub fn add_eval_input(&mut self, name: &str, value: impl Into<Value>) {
        self.eval_inputs.insert(name.to_string(), value.into());
    }

    pub fn remove_eval_input(&mut self, name: &str) -> bool {
        let removed = self.eval_inputs.remove(name).is_some();
        if !removed {
            bevy::log::debug!("Console: removal of unknown eval input '{}' ignored", name);
        }
        removed
    }

    /// Names of the eval inputs in lexicographic order.
    pub fn get_eval_input_names(&self) -> Vec<String> {
        self.eval_inputs.keys().cloned().collect()
    }

    pub fn eval_inputs(&self) -> &BTreeMap<String, Value> {
        &self.eval_inputs
    }

    /// Set or clear the implicit receiver of expressions.
    ///
    /// Only a weak reference is kept. Once the object is dropped the console
    /// behaves as if no base instance was set.
    pub fn set_eval_base_instance(&mut self, instance: Option<&ObjectRef>) {
        self.base = instance.map(Arc::downgrade);
    }

    pub fn get_eval_base_instance(&self) -> Option<ObjectRef> {
        self.base.as_ref().and_then(Weak::upgrade)
    }

    /// Evaluate an expression without touching console state.
    pub fn evaluate(&self, expression: &str) -> Result<Value, ConsoleError> {
        let base = self.get_eval_base_instance();
        evaluate(expression, base.as_deref(), &self.eval_inputs)
    }

    // --- session --------------------------------------------------------

    pub fn open_console(&mut self) {
        if self.session.open() {
            self.renderer.visibility_changed(true);
        }
    }

    pub fn close_console(&mut self) {
        if self.session.close() {
            self.renderer.visibility_changed(false);
        }
    }

    pub fn toggle_console(&mut self) {
        let open = self.session.toggle();
        self.renderer.visibility_changed(open);
    }

    /// Clear the visible buffer. The history is kept.
    pub fn clear_console(&mut self) {
        self.session.clear_visible();
        self.renderer.cleared(ClearScope::Visible);
    }

    pub fn erase_history(&mut self) {
        self.session.erase_history();
        self.renderer.cleared(ClearScope::History);
    }

    pub fn toggle_history(&mut self) {
        let recording = self.session.toggle_history();
        bevy::log::debug!("Console: history recording {}", if recording { "on" } else { "off" });
    }

    pub fn is_enabled(&self) -> bool {
        self.session.is_enabled()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.session.set_enabled(enabled);
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }
}

impl ConsoleEngine for DevConsole {
    fn register_command(&mut self, command: Command) -> Result<(), ConsoleError> {
        DevConsole::register_command(self, command)
    }

    fn unregister_command(&mut self, name: &str) -> bool {
        DevConsole::unregister_command(self, name)
    }

    fn has_command(&self, name: &str) -> bool {
        DevConsole::has_command(self, name)
    }

    fn get_command_names(&self, prefix: &str) -> Vec<String> {
        DevConsole::get_command_names(self, prefix)
    }

    fn get_command_description(&self, name: &str) -> Result<String, ConsoleError> {
        DevConsole::get_command_description(self, name)
    }

    fn add_alias(&mut self, alias: &str, command_line: &str) -> Result<(), ConsoleError> {
        DevConsole::add_alias(self, alias, command_line)
    }

    fn remove_alias(&mut self, alias: &str) -> bool {
        DevConsole::remove_alias(self, alias)
    }

    fn has_alias(&self, alias: &str) -> bool {
        DevConsole::has_alias(self, alias)
    }

    fn get_aliases(&self) -> Vec<String> {
        DevConsole::get_aliases(self)
    }

    fn get_alias_argv(&self, alias: &str) -> Result<Vec<String>, ConsoleError> {
        DevConsole::get_alias_argv(self, alias)
    }

    fn add_argument_autocomplete_source(
        &mut self,
        command: &str,
        argument_index: usize,
        source: CompletionSource,
    ) -> Result<(), ConsoleError> {
        DevConsole::add_argument_autocomplete_source(self, command, argument_index, source)
    }

    fn autocomplete(&self, line: &str) -> Vec<Completion> {
        DevConsole::autocomplete(self, line)
    }

    fn info(&mut self, text: &str) {
        DevConsole::info(self, text)
    }

    fn warn(&mut self, text: &str) {
        DevConsole::warn(self, text)
    }

    fn error(&mut self, text: &str) {
        DevConsole::error(self, text)
    }

    fn debug(&mut self, text: &str) {
        DevConsole::debug(self, text)
    }

    fn print_boxed(&mut self, text: &str) {
        DevConsole::print_boxed(self, text)
    }

    fn print_line(&mut self, text: &str, to_stdout: bool) {
        DevConsole::print_line(self, text, to_stdout)
    }

    fn execute_command(&mut self, line: &str, silent: bool) -> ExitStatus {
        DevConsole::execute_command(self, line, silent)
    }

    fn execute_script(&mut self, source: &str, silent: bool) -> ExitStatus {
        DevConsole::execute_script(self, source, silent)
    }

    fn usage(&mut self, name: &str) -> ExitStatus {
        DevConsole::usage(self, name)
    }

    fn add_eval_input(&mut self, name: &str, value: Value) {
        DevConsole::add_eval_input(self, name, value)
    }

    fn remove_eval_input(&mut self, name: &str) -> bool {
        DevConsole::remove_eval_input(self, name)
    }

    fn get_eval_input_names(&self) -> Vec<String> {
        DevConsole::get_eval_input_names(self)
    }

    fn set_eval_base_instance(&mut self, instance: Option<&ObjectRef>) {
        DevConsole::set_eval_base_instance(self, instance)
    }

    fn get_eval_base_instance(&self) -> Option<ObjectRef> {
        DevConsole::get_eval_base_instance(self)
    }

    fn evaluate(&self, expression: &str) -> Result<Value, ConsoleError> {
        DevConsole::evaluate(self, expression)
    }

    fn open_console(&mut self) {
        DevConsole::open_console(self)
    }

    fn close_console(&mut self) {
        DevConsole::close_console(self)
    }

    fn toggle_console(&mut self) {
        DevConsole::toggle_console(self)
    }

    fn clear_console(&mut self) {
        DevConsole::clear_console(self)
    }

    fn erase_history(&mut self) {
        DevConsole::erase_history(self)
    }

    fn toggle_history(&mut self) {
        DevConsole::toggle_history(self)
    }

    fn is_enabled(&self) -> bool {
        DevConsole::is_enabled(self)
    }

    fn set_enabled(&mut self, enabled: bool) {
        DevConsole::set_enabled(self, enabled)
    }

    fn is_open(&self) -> bool {
        DevConsole::is_open(self)
    }
}
