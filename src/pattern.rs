//! Route-pattern parsing.
//!
//! A pattern is a literal path interspersed with placeholders
//! (`/users/{id:\d+}`) and optionally terminated by nested optional
//! segments (`/archive[/{year}[/{month}]]`). Parsing expands the optional
//! segments into one token sequence per concrete form, shortest first, so
//! `/archive[/{year}]` produces two variants: `/archive` and
//! `/archive/{year}`.
//!
//! The parser is a pure function over the pattern string; it never touches
//! the route table.

use crate::error::BadRoute;

/// Pattern a placeholder falls back to when none is given: any non-empty
/// run of characters up to the next `/`.
pub const DEFAULT_PLACEHOLDER_REGEX: &str = "[^/]+";

/// One element of a parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A fixed stretch of path, matched verbatim.
    Literal(String),
    /// A named segment matched by `regex` and captured under `name`.
    Placeholder { name: String, regex: String },
}

impl Token {
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(text.into())
    }

    pub fn placeholder(name: impl Into<String>, regex: impl Into<String>) -> Self {
        Token::Placeholder {
            name: name.into(),
            regex: regex.into(),
        }
    }
}

/// Parses a route pattern into one token sequence per optional-segment
/// expansion.
///
/// A pattern with `k` nested optional groups yields `k + 1` variants; each
/// variant extends the previous one, so variant order is shortest to
/// longest. A pattern without placeholders or brackets yields exactly one
/// variant holding a single literal token.
///
/// # Errors
///
/// Fails when the optional-segment brackets are unbalanced, non-trailing,
/// or empty.
pub fn parse_path(pattern: &str) -> Result<Vec<Vec<Token>>, BadRoute> {
    let without_closing = pattern.trim_end_matches(']');
    let num_optionals = pattern.len() - without_closing.len();

    let segments = split_outside_placeholders(without_closing, b'[');

    if num_optionals != segments.len() - 1 {
        // a `]` before the trailing run gets the more specific message
        if split_outside_placeholders(without_closing, b']').len() > 1 {
            return Err(BadRoute::MisplacedOptionalSegment);
        }
        return Err(BadRoute::UnbalancedOptionalBrackets);
    }

    let mut prefix = String::with_capacity(without_closing.len());
    let mut variants = Vec::with_capacity(segments.len());

    for (i, segment) in segments.into_iter().enumerate() {
        if segment.is_empty() && i != 0 {
            return Err(BadRoute::EmptyOptionalSegment);
        }
        prefix.push_str(segment);
        variants.push(tokenize(&prefix));
    }

    Ok(variants)
}

/// Splits `pattern` on every occurrence of `separator` that is not inside
/// a placeholder. Placeholders may carry `{` `}` pairs in their regex
/// fragment, so the scan has to walk over them instead of splitting
/// blindly.
fn split_outside_placeholders(pattern: &str, separator: u8) -> Vec<&str> {
    let bytes = pattern.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(placeholder) = scan_placeholder(pattern, i) {
                i = placeholder.end;
                continue;
            }
        }
        if bytes[i] == separator {
            pieces.push(&pattern[start..i]);
            start = i + 1;
        }
        i += 1;
    }

    pieces.push(&pattern[start..]);
    pieces
}

/// A placeholder recognized at some position in a pattern.
struct PlaceholderSpan<'p> {
    /// Byte index one past the closing `}`.
    end: usize,
    name: &'p str,
    /// Raw regex fragment, untrimmed; `None` when the placeholder has no
    /// `:` part.
    regex: Option<&'p str>,
}

/// Tries to read a placeholder starting at `start` (which must point at a
/// `{`). Returns `None` when the text is not valid placeholder syntax, in
/// which case the `{` is treated as a literal character.
///
/// Accepted shape: `{ name }` or `{ name : regex }`, where `name` is
/// `[A-Za-z_][A-Za-z0-9_-]*` and `regex` may itself contain balanced
/// `{` `}` pairs (repetition counts such as `\d{1,9}`).
fn scan_placeholder(pattern: &str, start: usize) -> Option<PlaceholderSpan<'_>> {
    let bytes = pattern.as_bytes();
    let mut i = start + 1;

    while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
        i += 1;
    }

    let name_start = i;
    match bytes.get(i) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => i += 1,
        _ => return None,
    }
    while bytes
        .get(i)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
    {
        i += 1;
    }
    let name_end = i;

    while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
        i += 1;
    }

    match bytes.get(i) {
        Some(&b'}') => Some(PlaceholderSpan {
            end: i + 1,
            name: &pattern[name_start..name_end],
            regex: None,
        }),
        Some(&b':') => {
            let regex_start = i + 1;
            let mut depth = 0usize;
            i += 1;
            while let Some(&b) = bytes.get(i) {
                match b {
                    b'{' => depth += 1,
                    b'}' if depth == 0 => {
                        return Some(PlaceholderSpan {
                            end: i + 1,
                            name: &pattern[name_start..name_end],
                            regex: Some(&pattern[regex_start..i]),
                        });
                    }
                    b'}' => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
            None
        }
        _ => None,
    }
}

/// Tokenizes a bracket-free pattern: literal runs between placeholders are
/// emitted as literal tokens, in order. A pattern without placeholders
/// yields a single literal token, even when empty.
fn tokenize(pattern: &str) -> Vec<Token> {
    let bytes = pattern.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(placeholder) = scan_placeholder(pattern, i) {
                if i > literal_start {
                    tokens.push(Token::Literal(pattern[literal_start..i].to_string()));
                }
                let regex = placeholder
                    .regex
                    .map(str::trim)
                    .unwrap_or(DEFAULT_PLACEHOLDER_REGEX);
                tokens.push(Token::Placeholder {
                    name: placeholder.name.to_string(),
                    regex: regex.to_string(),
                });
                literal_start = placeholder.end;
                i = placeholder.end;
                continue;
            }
        }
        i += 1;
    }

    if tokens.is_empty() {
        return vec![Token::Literal(pattern.to_string())];
    }
    if literal_start < pattern.len() {
        tokens.push(Token::Literal(pattern[literal_start..].to_string()));
    }
    tokens
}
