//! Core console types.
//!
//! This module provides the engine and its building blocks:
//! - [`DevConsole`] - The console engine, a bevy `Resource`
//! - [`ConsoleEngine`] - The capability interface UIs and adapters use
//! - [`Command`] - Console commands with argument specs and handlers
//! - [`CommandRegistry`] - Commands and aliases by name
//! - [`Trie`] - Ordered prefix lookup for names and autocomplete
//! - [`tokenize`] - Quote-aware command tokenizer
//! - [`evaluate`] - Expression evaluator
//! - Messages for communication between layers

mod alias;
mod autocomplete;
mod builtins;
mod command;
mod engine;
mod error;
mod evaluator;
mod events;
mod executor;
mod host;
mod registry;
mod session;
mod tokenizer;
mod trie;
mod value;

pub use alias::{expand_aliases, Alias, MAX_ALIAS_DEPTH, MAX_ALIAS_INVOCATIONS};
pub use autocomplete::{complete, match_and_sort, subsequence_match, Completion, MatchResult};
pub use builtins::register_builtins;
pub use command::{
    ArgKind, ArgSpec, AutocompleteProvider, Command, CommandArgs, CommandContext, CommandHandler,
    CompletionSource,
};
pub use engine::{ConsoleEngine, DevConsole};
pub use error::{ConsoleError, EntryKind, ExitStatus, ParseError};
pub use evaluator::evaluate;
pub use events::{
    ConsoleClearEvent, ConsoleEventsPlugin, ConsoleInputEvent, ConsoleOutputEvent,
    ConsoleToggleEvent,
};
pub use host::{
    ClearScope, ConsoleRenderer, FsScriptSource, LogSink, MemoryScriptSource, NullRenderer,
    ScriptLines, ScriptSource, TracingLogSink, MIRROR_TARGET,
};
pub use registry::CommandRegistry;
pub use session::{boxed, ConsoleOutputLevel, ConsoleSession, OutputLine};
pub use tokenizer::{quote_token, split_commands, strip_comment, tokenize};
pub use trie::{PrefixIter, Trie};
pub use value::{EvalTarget, ObjectRef, Value};
