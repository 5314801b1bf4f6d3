//! Command line tokenizing.

use once_cell::sync::Lazy;
use regex::Regex;

/// A quoted run, or a run of non-whitespace.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(.+?)"|(\S+)"#).expect("token pattern is valid")
});

/// A command line split into name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub name: String,
    pub args: Vec<String>,
}

/// Remove a single leading `prefix`, ignoring leading whitespace.
pub fn strip_prefix(input: &str, prefix: char) -> &str {
    let input = input.trim_start();
    input.strip_prefix(prefix).unwrap_or(input)
}

/// Split a line into tokens.
///
/// Double-quoted runs become one token with the quotes removed. Everything
/// else splits on whitespace. An unmatched quote is not an error: the rest of
/// the line is tokenized as plain words with stray quotes trimmed.
pub fn tokenize(input: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(input)
        .map(|m| m.as_str().trim_matches('"').trim().to_string())
        .collect()
}

/// Strip the prefix and tokenize. Returns `None` when nothing is left.
pub fn parse_line(input: &str, prefix: char) -> Option<ParsedLine> {
    let mut tokens = tokenize(strip_prefix(input, prefix)).into_iter();
    let name = tokens.next()?;
    Some(ParsedLine {
        name,
        args: tokens.collect(),
    })
}
