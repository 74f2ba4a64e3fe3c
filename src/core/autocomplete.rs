//! Line completion.
//!
//! The token under the cursor (the end of the line) is completed from
//! command and alias names when it is the first token of its `;` segment,
//! and from the argument's [`CompletionSource`] otherwise.

use std::collections::BTreeMap;

use super::{
    expand_aliases, quote_token, tokenize, CommandRegistry, CompletionSource, DevConsole, Value,
};

/// Result of a fuzzy match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Higher is better.
    pub score: i32,
    /// Char indices of the matched characters in the text.
    pub indices: Vec<usize>,
}

/// Case-insensitive subsequence match.
///
/// Every char of `pattern` must appear in `text` in order. Consecutive
/// matches, matches at word starts and a matching prefix score higher.
///
/// ```
/// use bevy_console_engine::core::subsequence_match;
///
/// let result = subsequence_match("sgr", "sv_gravity").unwrap();
/// assert_eq!(result.indices, vec![0, 3, 4]);
/// assert!(subsequence_match("xyz", "hello").is_none());
/// ```
pub fn subsequence_match(pattern: &str, text: &str) -> Option<MatchResult> {
    let mut wanted = pattern.chars().map(|c| c.to_lowercase().next().unwrap_or(c)).peekable();
    let mut score = 0;
    let mut indices = Vec::new();
    let mut prev: Option<char> = None;
    let mut last_match: Option<usize> = None;

    for (i, c) in text.chars().enumerate() {
        let Some(&target) = wanted.peek() else {
            break;
        };
        let lower = c.to_lowercase().next().unwrap_or(c);
        if lower == target {
            score += 1;
            if last_match.is_some_and(|last| last + 1 == i) {
                score += 10;
            }
            if prev.is_none_or(|p| matches!(p, '_' | '-' | '.' | ' ')) {
                score += 5;
            }
            indices.push(i);
            last_match = Some(i);
            wanted.next();
        }
        prev = Some(c);
    }

    if wanted.peek().is_some() {
        return None;
    }
    if indices.iter().enumerate().all(|(n, &i)| n == i) && !indices.is_empty() {
        score += 20;
    }
    Some(MatchResult { score, indices })
}

/// Candidates matching `pattern`, best first, ties in name order.
pub fn match_and_sort<'a>(
    pattern: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<(&'a str, MatchResult)> {
    let mut matches: Vec<_> = candidates
        .into_iter()
        .filter_map(|candidate| subsequence_match(pattern, candidate).map(|m| (candidate, m)))
        .collect();
    matches.sort_by(|a, b| b.1.score.cmp(&a.1.score).then_with(|| a.0.cmp(b.0)));
    matches
}

/// One completion of the current line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The whole line with the last token replaced.
    pub text: String,
    /// Char indices in `text` of the characters the typed partial matched.
    pub highlighted_indices: Vec<usize>,
}

/// Where the token being completed starts.
struct Cursor<'a> {
    /// The `;` segment holding the cursor.
    segment: &'a str,
    /// Byte offset in the line where the replacement goes.
    insert_at: usize,
}

fn locate(line: &str) -> Cursor<'_> {
    let mut segment_start = 0;
    let mut token_start = None;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                token_start.get_or_insert(i);
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                token_start.get_or_insert(i);
            }
            c if quote == Some(c) => quote = None,
            ';' if quote.is_none() => {
                segment_start = i + 1;
                token_start = None;
            }
            c if c.is_whitespace() && quote.is_none() => token_start = None,
            _ => {
                token_start.get_or_insert(i);
            }
        }
    }

    Cursor {
        segment: &line[segment_start..],
        insert_at: token_start.unwrap_or(line.len()),
    }
}

/// Complete `line` against `registry` and `eval_inputs`.
///
/// Returns nothing for lines that do not tokenize (an open quote) or whose
/// alias expansion fails.
pub fn complete(
    registry: &CommandRegistry,
    eval_inputs: &BTreeMap<String, Value>,
    line: &str,
) -> Vec<Completion> {
    let cursor = locate(line);
    let Ok(tokens) = tokenize(cursor.segment) else {
        return Vec::new();
    };
    let partial_typed = cursor.insert_at < line.len();
    let partial = if partial_typed {
        tokens.last().map(String::as_str).unwrap_or_default()
    } else {
        ""
    };
    let completed_args = tokens.len().saturating_sub(usize::from(partial_typed));

    let candidates: Vec<(String, Vec<usize>)> = if completed_args == 0 {
        command_candidates(registry, partial)
    } else {
        let Some((command, index)) = resolve_argument(registry, &tokens[..completed_args]) else {
            return Vec::new();
        };
        let source = registry
            .get_command(&command)
            .and_then(|cmd| cmd.arg_at(index))
            .and_then(|spec| spec.completion.clone());
        match source {
            Some(source) => argument_candidates(registry, eval_inputs, &source, partial),
            None => Vec::new(),
        }
    };

    let head = &line[..cursor.insert_at];
    let head_chars = head.chars().count();

    candidates
        .into_iter()
        .map(|(candidate, indices)| {
            let quoted = quote_token(&candidate);
            let shift = head_chars + usize::from(quoted != candidate);
            Completion {
                text: format!("{head}{quoted}"),
                highlighted_indices: indices.into_iter().map(|i| i + shift).collect(),
            }
        })
        .collect()
}

/// Command and alias names for the first token. Prefix matches in name
/// order, falling back to fuzzy matches when there are none.
fn command_candidates(registry: &CommandRegistry, partial: &str) -> Vec<(String, Vec<usize>)> {
    let prefix_len = partial.chars().count();
    let mut names: Vec<&str> = registry
        .command_names(partial)
        .chain(registry.alias_names(partial))
        .collect();
    names.sort_unstable();

    if !names.is_empty() {
        return names
            .into_iter()
            .map(|name| (name.to_string(), (0..prefix_len).collect()))
            .collect();
    }

    registry
        .fuzzy_find(partial)
        .into_iter()
        .map(|(name, _, result)| (name.to_string(), result.indices))
        .collect()
}

fn argument_candidates(
    registry: &CommandRegistry,
    eval_inputs: &BTreeMap<String, Value>,
    source: &CompletionSource,
    partial: &str,
) -> Vec<(String, Vec<usize>)> {
    let names: Vec<String> = match source {
        CompletionSource::CommandNames => registry.get_command_names(""),
        CompletionSource::AliasNames => registry.get_aliases(),
        CompletionSource::EvalInputs => eval_inputs.keys().cloned().collect(),
        CompletionSource::Custom(provider) => provider(partial),
    };

    let prefix_len = partial.chars().count();
    names
        .into_iter()
        .filter(|name| name.starts_with(partial))
        .map(|name| (name, (0..prefix_len).collect()))
        .collect()
}

/// The command and argument position the next token binds to, seeing
/// through aliases.
fn resolve_argument(registry: &CommandRegistry, tokens: &[String]) -> Option<(String, usize)> {
    let first = tokens.first()?;
    if registry.has_command(first) {
        return Some((first.clone(), tokens.len() - 1));
    }

    let invocations = expand_aliases(registry, &tokens[..1]).ok()??;
    let last = invocations.last()?;
    let command = last.first()?;
    Some((command.clone(), last.len() - 1 + tokens.len() - 1))
}

impl DevConsole {
    /// Completions for `line`, see [`complete`].
    pub fn autocomplete(&self, line: &str) -> Vec<Completion> {
        complete(&self.registry, self.eval_inputs(), line)
    }
}
