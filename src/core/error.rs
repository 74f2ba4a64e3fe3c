//! Error taxonomy and exit status codes.
//!
//! Every failure the console can produce is a [`ConsoleError`]. None of them
//! is fatal: the executor reports them as an [`ExitStatus`] and appends the
//! message to the console history.

use std::fmt;

/// Malformed input line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A quoted string was opened but never closed.
    #[error("unterminated {quote} quote starting at position {position}")]
    UnterminatedQuote { quote: char, position: usize },
}

/// What kind of entry a name is registered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Command,
    Alias,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Command => write!(f, "a command"),
            EntryKind::Alias => write!(f, "an alias"),
        }
    }
}

/// Errors produced by the console engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("'{name}' is already registered as {existing}")]
    DuplicateName { name: String, existing: EntryKind },

    #[error("unknown command '{0}'")]
    CommandNotFound(String),

    #[error("unknown alias '{0}'")]
    AliasNotFound(String),

    #[error("command '{command}' has no argument at index {index}")]
    ArgumentNotFound { command: String, index: usize },

    /// The names visited before the cycle closed, ending with the repeated one.
    #[error("alias cycle detected: {}", chain.join(" -> "))]
    CyclicAlias { chain: Vec<String> },

    /// Expansion of `alias` grew past a fixed bound.
    #[error("alias '{alias}' {message}")]
    AliasExpansion { alias: String, message: String },

    #[error("unresolved name '{0}'")]
    UnresolvedName(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error("console is disabled")]
    Disabled,

    #[error("{command}: {message}")]
    InvalidArguments { command: String, message: String },

    #[error("{0}")]
    CommandFailed(String),

    #[error("script '{script}': {message}")]
    Script { script: String, message: String },
}

impl ConsoleError {
    /// Shorthand for a handler failure.
    pub fn failed(message: impl Into<String>) -> Self {
        ConsoleError::CommandFailed(message.into())
    }

    /// Shorthand for an evaluation failure.
    pub fn evaluation(message: impl Into<String>) -> Self {
        ConsoleError::Evaluation(message.into())
    }

    /// The status code this error is reported as.
    pub fn status(&self) -> ExitStatus {
        match self {
            ConsoleError::Parse(_) => ExitStatus::ParseError,
            ConsoleError::DuplicateName { .. } => ExitStatus::DuplicateName,
            ConsoleError::CommandNotFound(_)
            | ConsoleError::AliasNotFound(_)
            | ConsoleError::ArgumentNotFound { .. } => ExitStatus::NotFound,
            ConsoleError::CyclicAlias { .. } | ConsoleError::AliasExpansion { .. } => {
                ExitStatus::CyclicAlias
            }
            ConsoleError::UnresolvedName(_) => ExitStatus::UnresolvedName,
            ConsoleError::Evaluation(_) => ExitStatus::EvaluationError,
            ConsoleError::Disabled => ExitStatus::ConsoleDisabled,
            ConsoleError::CommandFailed(_) => ExitStatus::CommandFailed,
            ConsoleError::InvalidArguments { .. } => ExitStatus::InvalidArguments,
            ConsoleError::Script { .. } => ExitStatus::ScriptError,
        }
    }
}

/// Status code returned by command execution.
///
/// `0` is success, every other value names a failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ExitStatus {
    #[default]
    Success = 0,
    ParseError = 1,
    DuplicateName = 2,
    NotFound = 3,
    CyclicAlias = 4,
    UnresolvedName = 5,
    EvaluationError = 6,
    ConsoleDisabled = 7,
    CommandFailed = 8,
    InvalidArguments = 9,
    ScriptError = 10,
}

impl ExitStatus {
    /// The numeric code.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    #[inline]
    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl From<&ConsoleError> for ExitStatus {
    fn from(err: &ConsoleError) -> Self {
        err.status()
    }
}

impl<T> From<&Result<T, ConsoleError>> for ExitStatus {
    fn from(result: &Result<T, ConsoleError>) -> Self {
        match result {
            Ok(_) => ExitStatus::Success,
            Err(err) => err.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ConsoleError::Disabled.status().code(), 7);
        assert_eq!(
            ConsoleError::ArgumentNotFound { command: "x".into(), index: 2 }.status(),
            ExitStatus::NotFound
        );
    }

    #[test]
    fn test_cycle_message() {
        let err = ConsoleError::CyclicAlias {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "alias cycle detected: a -> b -> a");
    }

    #[test]
    fn test_alias_expansion_status() {
        let err = ConsoleError::AliasExpansion {
            alias: "big".into(),
            message: "expands to more than 1024 invocations".into(),
        };
        assert_eq!(err.to_string(), "alias 'big' expands to more than 1024 invocations");
        assert_eq!(err.status(), ExitStatus::CyclicAlias);
    }

    #[test]
    fn test_duplicate_message() {
        let err = ConsoleError::DuplicateName {
            name: "ls".into(),
            existing: EntryKind::Alias,
        };
        assert_eq!(err.to_string(), "'ls' is already registered as an alias");
    }
}
