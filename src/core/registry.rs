//! Command registry.
//!
//! Commands and aliases share one namespace: a name is either a command or
//! an alias, never both. Both tables are tries so name listings come out in
//! lexicographic order and prefix lookups stay cheap.

use super::{
    subsequence_match, Alias, ArgKind, Command, CompletionSource, ConsoleError, EntryKind,
    MatchResult, Trie,
};

/// Central storage for commands and aliases.
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::{Command, CommandRegistry};
///
/// let mut registry = CommandRegistry::new();
/// registry
///     .register_command(Command::new("quit", |_, _| Ok(())).description("Exit the game"))
///     .unwrap();
/// registry.add_alias("q", "quit").unwrap();
///
/// assert!(registry.has_command("quit"));
/// assert!(registry.add_alias("quit", "q").is_err());
/// ```
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Trie<Command>,
    aliases: Trie<Alias>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_vacant(&self, name: &str, allow: Option<EntryKind>) -> Result<(), ConsoleError> {
        let existing = if self.commands.contains(name) {
            EntryKind::Command
        } else if self.aliases.contains(name) {
            EntryKind::Alias
        } else {
            return Ok(());
        };

        if allow == Some(existing) {
            return Ok(());
        }
        Err(ConsoleError::DuplicateName {
            name: name.to_string(),
            existing,
        })
    }

    /// Register a command.
    ///
    /// Fails with [`ConsoleError::DuplicateName`] if the name is taken by a
    /// command or an alias.
    pub fn register_command(&mut self, command: Command) -> Result<(), ConsoleError> {
        validate_name(command.name())?;
        self.check_vacant(command.name(), None)?;

        bevy::log::debug!("Console: registered command '{}'", command.name());
        let name: Box<str> = command.name().into();
        self.commands.insert(&name, command);
        Ok(())
    }

    /// Remove a command. Missing names are ignored.
    ///
    /// Returns whether a command was removed.
    pub fn unregister_command(&mut self, name: &str) -> bool {
        let removed = self.commands.remove(name).is_some();
        if !removed {
            bevy::log::debug!("Console: unregister of unknown command '{}' ignored", name);
        }
        removed
    }

    #[inline]
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains(name)
    }

    pub fn get_command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Command names starting with `prefix`, in lexicographic order.
    pub fn get_command_names(&self, prefix: &str) -> Vec<String> {
        self.command_names(prefix).map(str::to_string).collect()
    }

    pub fn command_names<'a>(&'a self, prefix: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.commands.prefix_iter(prefix).map(|(name, _)| name)
    }

    /// All commands in lexicographic order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn get_command_description(&self, name: &str) -> Result<&str, ConsoleError> {
        self.commands
            .get(name)
            .map(Command::get_description)
            .ok_or_else(|| ConsoleError::CommandNotFound(name.to_string()))
    }

    /// Define an alias, replacing an existing alias of the same name.
    ///
    /// Fails with [`ConsoleError::DuplicateName`] if a command has the name,
    /// or with a parse error if `command_line` cannot be tokenized.
    pub fn add_alias(&mut self, name: &str, command_line: &str) -> Result<(), ConsoleError> {
        validate_name(name)?;
        self.check_vacant(name, Some(EntryKind::Alias))?;

        let alias = Alias::new(name, command_line)?;
        if self.aliases.insert(name, alias).is_some() {
            bevy::log::debug!("Console: redefined alias '{}'", name);
        }
        Ok(())
    }

    /// Remove an alias. Missing names are ignored.
    ///
    /// Returns whether an alias was removed.
    pub fn remove_alias(&mut self, name: &str) -> bool {
        let removed = self.aliases.remove(name).is_some();
        if !removed {
            bevy::log::debug!("Console: removal of unknown alias '{}' ignored", name);
        }
        removed
    }

    #[inline]
    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.contains(name)
    }

    pub fn get_alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    /// Alias names in lexicographic order.
    pub fn get_aliases(&self) -> Vec<String> {
        self.alias_names("").map(str::to_string).collect()
    }

    pub fn alias_names<'a>(&'a self, prefix: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.aliases.prefix_iter(prefix).map(|(name, _)| name)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.values()
    }

    /// The captured argv of an alias.
    pub fn get_alias_argv(&self, name: &str) -> Result<Vec<String>, ConsoleError> {
        self.aliases
            .get(name)
            .map(Alias::argv)
            .ok_or_else(|| ConsoleError::AliasNotFound(name.to_string()))
    }

    /// Attach a suggestion source to a command argument.
    ///
    /// The index must name a declared argument, or fall on a trailing rest
    /// argument, which covers every later position.
    pub fn add_argument_autocomplete_source(
        &mut self,
        command: &str,
        index: usize,
        source: CompletionSource,
    ) -> Result<(), ConsoleError> {
        let cmd = self
            .commands
            .get_mut(command)
            .ok_or_else(|| ConsoleError::CommandNotFound(command.to_string()))?;

        let specs = cmd.args_mut();
        let last = specs.len().saturating_sub(1);
        let slot = index.min(last);
        match specs.get_mut(slot) {
            Some(spec) if slot == index || spec.kind == ArgKind::Rest => {
                spec.completion = Some(source);
                Ok(())
            }
            _ => Err(ConsoleError::ArgumentNotFound {
                command: command.to_string(),
                index,
            }),
        }
    }

    /// Commands and aliases matching a fuzzy pattern, best first.
    pub fn fuzzy_find(&self, pattern: &str) -> Vec<(&str, EntryKind, MatchResult)> {
        let commands = self.commands.keys().map(|name| (name, EntryKind::Command));
        let aliases = self.aliases.keys().map(|name| (name, EntryKind::Alias));

        let mut matches: Vec<_> = commands
            .chain(aliases)
            .filter_map(|(name, kind)| {
                subsequence_match(pattern, name).map(|result| (name, kind, result))
            })
            .collect();

        matches.sort_by(|a, b| b.2.score.cmp(&a.2.score).then_with(|| a.0.cmp(b.0)));
        matches
    }

    /// Number of commands and aliases.
    pub fn len(&self) -> usize {
        self.commands.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.aliases.is_empty()
    }
}

fn validate_name(name: &str) -> Result<(), ConsoleError> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ';' | '"' | '\''));
    if invalid {
        return Err(ConsoleError::InvalidArguments {
            command: name.to_string(),
            message: "names must be non-empty and free of whitespace, quotes and ';'".to_string(),
        });
    }
    Ok(())
}
