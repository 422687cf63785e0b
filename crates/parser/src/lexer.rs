//! Logos-based lexer for schedule operation text.
//!
//! Schedule text is an arbitrary mixture of three operation forms, matched
//! case-insensitively, with optional whitespace between their parts:
//!
//! - `r<N>(<X>)` -- transaction `tN` reads object `X`
//! - `w<N>(<X>)` -- transaction `tN` writes object `X`
//! - `c<N>` -- transaction `tN` commits
//!
//! `N` is a digit sequence and `X` a letter sequence. Anything else is
//! unmatched text. Scanning resumes one character after a failed match
//! position, so an operation hidden inside stray text (`xyzr1(A)`) is still
//! found.
//!
//! # Example input
//!
//! ```text
//! r1(X) w2(X) c1 R 3 ( Y ) c2
//! ```

use core::ops::Range;

use tscop_core::schedule::Action;

/// All token kinds produced by the schedule lexer.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(::logos::Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `r<N>(<X>)`
    #[regex(r"[rR][ \t\r\n\x0B\x0C]*[0-9]+[ \t\r\n\x0B\x0C]*\([ \t\r\n\x0B\x0C]*[A-Za-z]+[ \t\r\n\x0B\x0C]*\)")]
    Read,

    /// `w<N>(<X>)`
    #[regex(r"[wW][ \t\r\n\x0B\x0C]*[0-9]+[ \t\r\n\x0B\x0C]*\([ \t\r\n\x0B\x0C]*[A-Za-z]+[ \t\r\n\x0B\x0C]*\)")]
    Write,

    /// `c<N>`
    #[regex(r"[cC][ \t\r\n\x0B\x0C]*[0-9]+")]
    Commit,
}

/// A single token with its kind and the byte-offset span in the source.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Byte range `start..end` into the original input string.
    pub span: Range<usize>,
}

impl Token {
    /// Construct a new [`Token`].
    #[must_use]
    pub const fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }

    /// Return the source text for this token given the original input.
    #[must_use]
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.span.clone()]
    }

    /// Convert the token into an [`Action`]. The transaction id is `t`
    /// followed by the digits as written; the object id is kept as written.
    #[must_use]
    pub fn action(&self, input: &str) -> Action {
        let text = self.text(input);
        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        let transaction = format!("t{digits}");
        let object = || -> String {
            text.split_once('(')
                .map(|(_, rest)| rest.chars().filter(char::is_ascii_alphabetic).collect())
                .unwrap_or_default()
        };
        match self.kind {
            TokenKind::Read => Action::read(transaction, object()),
            TokenKind::Write => Action::write(transaction, object()),
            TokenKind::Commit => Action::commit(transaction),
        }
    }
}

/// Result of scanning schedule text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Recognised operations, in source order.
    pub tokens: Vec<Token>,
    /// Maximal runs of text that matched no operation.
    pub unmatched: Vec<Range<usize>>,
}

/// Scan `input` for operation tokens.
///
/// Text matching no operation is collected into [`Tokens::unmatched`]
/// instead of being reported as an error.
#[must_use]
pub fn tokenize(input: &str) -> Tokens {
    use logos::Logos as _;

    let mut tokens = Vec::new();
    let mut unmatched: Vec<Range<usize>> = Vec::new();
    let mut offset = 0;

    while offset < input.len() {
        let mut lexer = TokenKind::lexer(&input[offset..]);
        match lexer.next() {
            None => break,
            Some(Ok(kind)) => {
                let span = lexer.span();
                tokens.push(Token::new(kind, offset + span.start..offset + span.end));
                offset += span.end;
            }
            Some(Err(())) => {
                let start = offset + lexer.span().start;
                let end = start + input[start..].chars().next().map_or(1, char::len_utf8);
                match unmatched.last_mut() {
                    Some(last) if last.end == start => last.end = end,
                    _ => unmatched.push(start..end),
                }
                offset = end;
            }
        }
    }

    Tokens { tokens, unmatched }
}

/// Scan `input` and convert every recognised token into an [`Action`].
///
/// Unmatched text is silently skipped.
#[must_use]
pub fn actions(input: &str) -> Vec<Action> {
    tokenize(input)
        .tokens
        .iter()
        .map(|token| token.action(input))
        .collect()
}
