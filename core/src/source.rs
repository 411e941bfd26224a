//! Collaborator seams: where tokens and active tags come from.
//!
//! Speech-to-text and environment tracking live outside this crate. The
//! engine only sees them through these two traits, so the same trie can be
//! driven by a live recognizer, a test fixture or the CLI.

use crate::{TagSet, Token};
use std::fmt::Debug;

/// Turns transcribed text into typed tokens.
///
/// Implementations are expected to strip punctuation, case-normalize words
/// and emit `Number` tokens for spoken numbers.
///
/// # Example
///
/// ```
/// use parla::{Token, Tokenizer};
///
/// #[derive(Debug)]
/// struct Split;
///
/// impl Tokenizer for Split {
///     fn tokenize(&self, text: &str) -> Vec<Token> {
///         text.split_whitespace().map(Token::word).collect()
///     }
/// }
///
/// assert_eq!(Split.tokenize("Go Home"), vec![Token::word("go"), Token::word("home")]);
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Tokenizer`",
    label = "this type cannot turn text into tokens",
    note = "implement `fn tokenize(&self, text: &str) -> Vec<Token>`"
)]
pub trait Tokenizer: Send + Sync + Debug {
    /// Tokenize one transcript.
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Exposes the tags active in the environment.
///
/// Read once per match call; the matcher never caches the result.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `TagSource`",
    label = "this type cannot report active tags",
    note = "implement `fn active_tags(&self) -> TagSet`, or pass a `TagSet` directly"
)]
pub trait TagSource: Send + Sync + Debug {
    /// The currently active tags.
    fn active_tags(&self) -> TagSet;
}

#[diagnostic::do_not_recommend]
impl Tokenizer for Box<dyn Tokenizer> {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        (**self).tokenize(text)
    }
}

#[diagnostic::do_not_recommend]
impl TagSource for Box<dyn TagSource> {
    fn active_tags(&self) -> TagSet {
        (**self).active_tags()
    }
}

impl TagSource for TagSet {
    fn active_tags(&self) -> TagSet {
        self.clone()
    }
}
