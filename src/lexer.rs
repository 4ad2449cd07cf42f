//! Tokenizer for the surface syntax.
//!
//! The lexer scans left-to-right from offset 0. At each offset it tries a
//! fixed, priority-ordered set of anchored regular-expression classes and
//! accepts the first one that matches, advancing by the matched length.
//! Whitespace is discarded on the spot; comments are emitted as ordinary
//! tokens (carrying their literal text, leading `;` included) and elided by
//! the downstream stages.

use std::sync::LazyLock;

use regex::Regex;

use crate::LexError;

/// Token class patterns, tried in this order at every offset. The two-char
/// comparison operators come before the single-char ones because the regex
/// engine's alternation is leftmost-first, not longest-match.
const CLASS_PATTERNS: [&str; 7] = [
    r"\A(#t|#f)",            // boolean literals
    r"\A[()]",               // parens
    r"\A[0-9]+",             // integer literals
    r"\A(<=|>=|[+\-*/<>=])", // operator symbols
    r"\A[\w?-]+",            // identifiers
    r"\A;[^\n]*",            // line comments
    r"\A\s+",                // whitespace runs
];

/// Index of the whitespace class, the only one whose matches are dropped.
const WHITESPACE: usize = CLASS_PATTERNS.len() - 1;

static CLASSES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CLASS_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid token class pattern {p:?}: {e}")))
        .collect()
});

/// Tokenize `src` into an ordered sequence of token strings.
///
/// Fails with [`LexError`] at the first offset where no class matches; no
/// partial token stream is returned.
pub fn lex(src: &str) -> Result<Vec<String>, LexError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < src.len() {
        let rest = &src[offset..];
        let matched = CLASSES
            .iter()
            .enumerate()
            .find_map(|(class, re)| re.find(rest).map(|m| (class, m.end())));
        match matched {
            Some((class, len)) => {
                if class != WHITESPACE {
                    tokens.push(rest[..len].to_string());
                }
                offset += len;
            }
            None => {
                return Err(LexError {
                    offset,
                    found: rest.to_string(),
                });
            }
        }
    }
    Ok(tokens)
}

/// True for tokens produced by the line-comment class.
pub fn is_comment(token: &str) -> bool {
    token.starts_with(';')
}
