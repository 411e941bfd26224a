//! `Token` — a typed unit of transcribed speech.
//!
//! Tokens are produced upstream by a [`Tokenizer`](crate::Tokenizer) and are
//! immutable once created. The matcher reads them and, for captures, clones
//! them into the [`Captures`](crate::Captures) table of a match.
//!
//! # Variants
//!
//! - `Word` — a spoken word, already case-normalized by the tokenizer
//! - `Number` — a spoken number
//! - `Merged` — several tokens collapsed into one capture (repeating wildcards,
//!   optionals whose body consumed more than one token)
//! - `Empty` — placeholder for a capture that matched nothing

use std::fmt;

/// A typed unit of transcribed speech.
///
/// # Example
///
/// ```
/// use parla::Token;
///
/// let word = Token::word("Hello");
/// assert_eq!(word.as_word(), Some("hello"));
/// assert!(Token::Number(3).is_number());
/// assert_eq!(Token::Merged(vec![Token::word("a"), Token::Number(2)]).to_string(), "a 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// A single word.
    Word(String),

    /// A single number.
    Number(i64),

    /// Several consecutive tokens captured together.
    Merged(Vec<Token>),

    /// A capture that consumed nothing (e.g. a skipped optional).
    Empty,
}

impl Token {
    /// Create a `Word` token, lower-casing the text.
    ///
    /// Tokenizers are expected to case-normalize already; this constructor
    /// makes hand-built tokens (tests, fixtures) behave the same way.
    pub fn word(text: impl AsRef<str>) -> Self {
        Self::Word(text.as_ref().to_lowercase())
    }

    /// Returns `true` if this is the `Word` variant.
    #[inline]
    #[must_use]
    pub fn is_word(&self) -> bool {
        matches!(self, Self::Word(_))
    }

    /// Returns `true` if this is the `Number` variant.
    #[inline]
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Returns `true` if this is the `Merged` variant.
    #[inline]
    #[must_use]
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged(_))
    }

    /// Returns `true` if this is the `Empty` variant.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Try to get the text of a `Word` token.
    #[inline]
    #[must_use]
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(w) => Some(w.as_str()),
            _ => None,
        }
    }

    /// Try to get the value of a `Number` token.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the parts of a `Merged` token.
    #[inline]
    #[must_use]
    pub fn as_merged(&self) -> Option<&[Token]> {
        match self {
            Self::Merged(parts) => Some(parts.as_slice()),
            _ => None,
        }
    }

    /// Case-insensitive comparison against a lower-case literal word.
    ///
    /// Only `Word` tokens can equal a literal; numbers never do. Compiled
    /// literals are always lower-case, so only the token side is folded.
    #[must_use]
    pub fn matches_word(&self, literal: &str) -> bool {
        self.as_word().is_some_and(|w| {
            w == literal || w.chars().flat_map(char::to_lowercase).eq(literal.chars())
        })
    }

    /// Returns a string describing the kind of this token.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Word(_) => "word",
            Self::Number(_) => "number",
            Self::Merged(_) => "merged",
            Self::Empty => "empty",
        }
    }

    /// Collapse a run of tokens into one capture value.
    ///
    /// A single token is returned as-is, several become `Merged`, none is `Empty`.
    #[must_use]
    pub fn collapse(tokens: &[Token]) -> Self {
        match tokens {
            [] => Self::Empty,
            [single] => single.clone(),
            many => Self::Merged(many.to_vec()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(w) => f.write_str(w),
            Self::Number(n) => write!(f, "{n}"),
            Self::Merged(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self::word(s)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self::word(s)
    }
}

impl From<i64> for Token {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl<T> From<Option<T>> for Token
where
    T: Into<Token>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Empty,
        }
    }
}
