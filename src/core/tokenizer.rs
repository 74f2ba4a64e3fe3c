//! Tokenizer for console command lines.
//!
//! Splits a line into whitespace-separated tokens with support for quoted
//! strings and escapes. Pure functions, no state is kept between calls.

use std::iter::Peekable;
use std::str::CharIndices;

use super::ParseError;

/// Tokenize a command line.
///
/// # Syntax
///
/// - Tokens are separated by whitespace
/// - Quoted strings (single or double) preserve whitespace and may be glued
///   to surrounding text: `--name="a b"` is the single token `--name=a b`
/// - Escape sequences: `\"`, `\'`, `\\` (and `\ ` outside of quotes)
/// - Comments: `//` to end of line (only at token boundaries)
///
/// An unterminated quote is an error, empty input yields no tokens.
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::tokenize;
///
/// let tokens = tokenize(r#"foo "bar baz" qux"#).unwrap();
/// assert_eq!(tokens, vec!["foo", "bar baz", "qux"]);
///
/// assert!(tokenize(r#"foo "bar"#).is_err());
/// assert!(tokenize("   ").unwrap().is_empty());
/// ```
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    loop {
        while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}

        let Some(&(start, _)) = chars.peek() else {
            break;
        };

        if line[start..].starts_with("//") {
            break;
        }

        let mut token = String::new();
        while let Some(&(position, c)) = chars.peek() {
            match c {
                c if c.is_whitespace() => break,
                '"' | '\'' => {
                    chars.next();
                    read_quoted(&mut chars, c, position, &mut token)?;
                }
                '\\' => {
                    chars.next();
                    match chars.next_if(|&(_, next)| is_bare_escape(next)) {
                        Some((_, escaped)) => token.push(escaped),
                        None => token.push('\\'),
                    }
                }
                _ => {
                    token.push(c);
                    chars.next();
                }
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

fn is_bare_escape(c: char) -> bool {
    matches!(c, '"' | '\'' | '\\') || c.is_whitespace()
}

/// Consume a quoted section up to and including the closing quote.
fn read_quoted(
    chars: &mut Peekable<CharIndices<'_>>,
    quote: char,
    position: usize,
    token: &mut String,
) -> Result<(), ParseError> {
    while let Some((_, c)) = chars.next() {
        if c == quote {
            return Ok(());
        }
        if c == '\\' {
            match chars.next() {
                Some((_, escaped)) if escaped == quote || escaped == '\\' => token.push(escaped),
                Some((_, other)) => {
                    token.push('\\');
                    token.push(other);
                }
                None => break,
            }
        } else {
            token.push(c);
        }
    }

    Err(ParseError::UnterminatedQuote { quote, position })
}

/// The part of `line` before a `//` comment.
///
/// Uses the same rule as [`tokenize`]: a comment only starts at a token
/// boundary outside of quotes.
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::strip_comment;
///
/// assert_eq!(strip_comment("hp + 1 // note"), "hp + 1");
/// assert_eq!(strip_comment(r#"echo "a // b""#), r#"echo "a // b""#);
/// assert_eq!(strip_comment("http://example"), "http://example");
/// ```
pub fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    let mut escaped = false;
    let mut at_boundary = true;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            at_boundary = false;
            continue;
        }
        match quote {
            Some(q) => {
                if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if at_boundary && line[i..].starts_with("//") {
                    return line[..i].trim_end();
                }
                match c {
                    '\\' => escaped = true,
                    '"' | '\'' => quote = Some(c),
                    _ => {}
                }
            }
        }
        at_boundary = quote.is_none() && c.is_whitespace();
    }

    line
}

/// Quote a token so that [`tokenize`] reads it back unchanged.
pub fn quote_token(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';'))
        || token.starts_with("//");

    if !needs_quotes {
        return token.to_string();
    }

    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Split a command line by semicolons into multiple commands.
///
/// Respects quoted strings and escapes (semicolons inside quotes or after a
/// backslash are preserved).
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::split_commands;
///
/// let commands = split_commands("god; noclip; give ammo");
/// assert_eq!(commands, vec!["god", "noclip", "give ammo"]);
///
/// let commands = split_commands(r#"echo "hello; world"; quit"#);
/// assert_eq!(commands, vec![r#"echo "hello; world""#, "quit"]);
/// ```
pub fn split_commands(input: &str) -> Vec<&str> {
    let mut commands = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' | '\'' => match quote {
                None => quote = Some(c),
                Some(open) if open == c => quote = None,
                Some(_) => {}
            },
            ';' if quote.is_none() => {
                let cmd = input[start..i].trim();
                if !cmd.is_empty() {
                    commands.push(cmd);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    let cmd = input[start..].trim();
    if !cmd.is_empty() {
        commands.push(cmd);
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comment_matches_tokenize() {
        for line in ["hp + 1 // note", "say 'a // b' // c", "x\\ //y", "//only", "a//b"] {
            let stripped = strip_comment(line);
            assert_eq!(tokenize(stripped).unwrap(), tokenize(line).unwrap(), "{line}");
        }
        assert_eq!(strip_comment("hp + 1 // note"), "hp + 1");
        assert_eq!(strip_comment("//only"), "");
        assert_eq!(strip_comment("a//b"), "a//b");
    }

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize("echo hello world").unwrap(), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn test_tokenize_double_quotes() {
        assert_eq!(
            tokenize(r#"foo "bar baz" qux"#).unwrap(),
            vec!["foo", "bar baz", "qux"]
        );
    }

    #[test]
    fn test_tokenize_single_quotes() {
        assert_eq!(tokenize("say 'hello world'").unwrap(), vec!["say", "hello world"]);
    }

    #[test]
    fn test_tokenize_quote_glued_to_text() {
        assert_eq!(
            tokenize(r#"spawn --name="big crate""#).unwrap(),
            vec!["spawn", "--name=big crate"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  \t ").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_empty_quoted_token() {
        assert_eq!(tokenize(r#"set name """#).unwrap(), vec!["set", "name", ""]);
    }

    #[test]
    fn test_tokenize_unterminated() {
        assert_eq!(
            tokenize(r#"foo "bar"#),
            Err(ParseError::UnterminatedQuote { quote: '"', position: 4 })
        );
        assert!(matches!(
            tokenize("say 'oops"),
            Err(ParseError::UnterminatedQuote { quote: '\'', .. })
        ));
    }

    #[test]
    fn test_tokenize_escaped_quotes() {
        assert_eq!(
            tokenize(r#"echo "say \"hi\"""#).unwrap(),
            vec!["echo", r#"say "hi""#]
        );
        assert_eq!(tokenize(r#"echo it\'s"#).unwrap(), vec!["echo", "it's"]);
    }

    #[test]
    fn test_tokenize_backslash_kept_for_other_chars() {
        assert_eq!(tokenize(r"load C:\maps\one").unwrap(), vec!["load", r"C:\maps\one"]);
        assert_eq!(tokenize(r#"echo "a\nb""#).unwrap(), vec!["echo", r"a\nb"]);
    }

    #[test]
    fn test_tokenize_escaped_space() {
        assert_eq!(tokenize(r"open my\ file").unwrap(), vec!["open", "my file"]);
    }

    #[test]
    fn test_tokenize_comment() {
        assert_eq!(tokenize("echo hello // a comment").unwrap(), vec!["echo", "hello"]);
        assert_eq!(tokenize("echo http://host").unwrap(), vec!["echo", "http://host"]);
        assert!(tokenize("// only a comment").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_is_restartable() {
        assert!(tokenize(r#"a "b"#).is_err());
        assert_eq!(tokenize("a b").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_quote_token_roundtrip() {
        for token in ["plain", "two words", r#"say "hi""#, "", r"back\slash", "a;b"] {
            let line = format!("cmd {}", quote_token(token));
            assert_eq!(tokenize(&line).unwrap(), vec!["cmd", token]);
        }
    }

    #[test]
    fn test_split_commands_simple() {
        assert_eq!(split_commands("a 1; b; c"), vec!["a 1", "b", "c"]);
    }

    #[test]
    fn test_split_commands_quoted() {
        assert_eq!(
            split_commands(r#"echo "hello; world"; quit"#),
            vec![r#"echo "hello; world""#, "quit"]
        );
        assert_eq!(
            split_commands(r#"echo 'it"s; fine'; quit"#),
            vec![r#"echo 'it"s; fine'"#, "quit"]
        );
    }

    #[test]
    fn test_split_commands_escaped() {
        assert_eq!(split_commands(r"echo a\; b; c"), vec![r"echo a\; b", "c"]);
        assert_eq!(
            split_commands(r#"echo "test\"inside"; quit"#),
            vec![r#"echo "test\"inside""#, "quit"]
        );
        assert_eq!(
            split_commands(r#"echo "test\\"; quit"#),
            vec![r#"echo "test\\""#, "quit"]
        );
    }

    #[test]
    fn test_split_commands_empty() {
        assert!(split_commands("").is_empty());
        assert!(split_commands(";;;").is_empty());
    }
}
