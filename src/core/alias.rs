//! Aliases and alias expansion.

use super::{tokenizer, CommandRegistry, ConsoleError, ParseError};

/// Most invocations a single alias may expand to.
pub const MAX_ALIAS_INVOCATIONS: usize = 1024;

/// Deepest chain of aliases naming other aliases.
pub const MAX_ALIAS_DEPTH: usize = 64;

/// A named shortcut for one or more command invocations.
///
/// The command line is tokenized once at definition time. `;` separates
/// invocations, so `alias reset "respawn; heal 100"` expands to two commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    name: Box<str>,
    command_line: String,
    invocations: Vec<Vec<String>>,
}

impl Alias {
    pub fn new(name: impl Into<Box<str>>, command_line: impl Into<String>) -> Result<Self, ParseError> {
        let command_line = command_line.into();
        let invocations = tokenizer::split_commands(&command_line)
            .into_iter()
            .map(tokenizer::tokenize)
            .filter(|tokens| !matches!(tokens, Ok(t) if t.is_empty()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            command_line,
            invocations,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The command line as it was defined.
    #[inline]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn invocations(&self) -> &[Vec<String>] {
        &self.invocations
    }

    /// Captured tokens of every invocation, separated by `";"` tokens.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::new();
        for (i, invocation) in self.invocations.iter().enumerate() {
            if i > 0 {
                argv.push(";".to_string());
            }
            argv.extend(invocation.iter().cloned());
        }
        argv
    }
}

/// Expand `tokens` if its first token names an alias.
///
/// Returns `Ok(None)` when no alias matches. Otherwise every resulting
/// invocation starts with a non-alias token. Tokens after the alias name are
/// appended to the last invocation of the alias. Expansion fails with
/// [`ConsoleError::CyclicAlias`] as soon as an alias is reached again through
/// its own expansion, and with [`ConsoleError::AliasExpansion`] once it nests
/// deeper than [`MAX_ALIAS_DEPTH`] or yields more than
/// [`MAX_ALIAS_INVOCATIONS`] invocations.
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::{expand_aliases, CommandRegistry};
///
/// let mut registry = CommandRegistry::new();
/// registry.add_alias("ls", "list --all").unwrap();
///
/// let tokens = vec!["ls".to_string(), "extra".to_string()];
/// let expanded = expand_aliases(&registry, &tokens).unwrap().unwrap();
/// assert_eq!(expanded, vec![vec!["list", "--all", "extra"]]);
/// ```
pub fn expand_aliases(
    registry: &CommandRegistry,
    tokens: &[String],
) -> Result<Option<Vec<Vec<String>>>, ConsoleError> {
    let is_alias = tokens
        .first()
        .is_some_and(|name| registry.has_alias(name));
    if !is_alias {
        return Ok(None);
    }

    let mut expanded = Vec::new();
    let mut path = Vec::new();
    expand_into(registry, tokens.to_vec(), &mut path, &mut expanded)?;
    Ok(Some(expanded))
}

fn expand_into(
    registry: &CommandRegistry,
    tokens: Vec<String>,
    path: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
) -> Result<(), ConsoleError> {
    let Some(alias) = tokens.first().and_then(|name| registry.get_alias(name)) else {
        if out.len() >= MAX_ALIAS_INVOCATIONS {
            return Err(too_large(
                path,
                format!("expands to more than {MAX_ALIAS_INVOCATIONS} invocations"),
            ));
        }
        out.push(tokens);
        return Ok(());
    };

    let name = alias.name().to_string();
    if path.contains(&name) {
        path.push(name);
        return Err(ConsoleError::CyclicAlias {
            chain: std::mem::take(path),
        });
    }
    if path.len() >= MAX_ALIAS_DEPTH {
        return Err(too_large(
            path,
            format!("nests more than {MAX_ALIAS_DEPTH} aliases deep"),
        ));
    }
    path.push(name);

    let extra = &tokens[1..];
    let last = alias.invocations.len().saturating_sub(1);
    for (i, invocation) in alias.invocations.iter().enumerate() {
        let mut next = invocation.clone();
        if i == last {
            next.extend_from_slice(extra);
        }
        expand_into(registry, next, path, out)?;
    }

    path.pop();
    Ok(())
}

fn too_large(path: &[String], message: String) -> ConsoleError {
    ConsoleError::AliasExpansion {
        alias: path.first().cloned().unwrap_or_default(),
        message,
    }
}
