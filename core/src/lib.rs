//! parla - voice command pattern matching
//!
//! Compiles voice command phrases into chains of matching steps, merges the
//! chains of every registered command into one ordered trie, and matches
//! tokenized transcripts against it, filtered by the tags active in the
//! environment.
//!
//! # Architecture
//!
//! - [`Token`] — One typed unit of a transcript (word, number, merged run)
//! - [`VoiceCommand`] — Id, phrases, tag requirements, captured value lists
//! - [`compile`] — Phrase text to a chain of [`NodeProcessor`]s
//! - [`TrieBuilder`] — Merges chains, orders siblings most specific first
//! - [`Trie`] — Current [`TrieSnapshot`], rebuilt and swapped as a whole
//! - [`Matcher`] — Backtracking walk producing [`CommandMatch`]es
//! - [`Recognizer`] — Trie plus [`Tokenizer`] and [`TagSource`] seams
//!
//! # Pattern syntax
//!
//! A phrase is whitespace separated. Each word is a literal or a symbol:
//!
//! | Word | Matches |
//! |------|---------|
//! | `go` | the word `go`, any case |
//! | `#n`, `N:n`, `Number:n` | one number, captured as `n` |
//! | `*x`, `WildCard:x` | any one token |
//! | `**x`, `**x{3}` | one or more tokens (at most 3), merged |
//! | `[a\|b]:x`, `OneOf:x{[a\|b]}` | one word from the list |
//! | `?[inner]:flag` | `inner`, or nothing |
//! | `&[a\|b]` | `a` then `b` |
//! | `~[a\|b]:i` | `a` or `b`, `i` is the alternative's index |
//!
//! A list item `_name` expands to the command's captured value list `name`.
//!
//! # Example
//!
//! ```
//! use parla::prelude::*;
//!
//! let trie = Trie::new();
//! let report = trie.set(&[
//!     VoiceCommand::new("scroll", "scroll [up|down]:dir ?[#n]:amount"),
//!     VoiceCommand::new("save", "save").with_requirement(TagRequirement::of(["editor"])),
//! ]);
//! assert!(report.is_clean());
//!
//! let snapshot = trie.get();
//! let tokens = [Token::word("scroll"), Token::word("down"), Token::Number(3)];
//! let hit = Matcher::new(&snapshot).match_span(&tokens, &TagSet::new()).unwrap();
//!
//! assert_eq!(hit.command.as_str(), "scroll");
//! assert_eq!(hit.get("dir"), Some(&Token::word("down")));
//! assert_eq!(hit.get("amount"), Some(&Token::Number(3)));
//!
//! // `save` needs the editor tag.
//! assert!(Matcher::new(&snapshot).match_span(&[Token::word("save")], &TagSet::new()).is_none());
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod command;
mod compiler;
mod matcher;
mod processor;
mod recognizer;
mod source;
mod tag;
mod token;
mod trie;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use command::{CapturedValues, CommandId, VoiceCommand};
pub use processor::{NodeProcessor, LITERAL_WEIGHT, REPEATING_WEIGHT, WILDCARD_WEIGHT};
pub use tag::{Tag, TagRequirement, TagSet};
pub use token::Token;

// Compilation and storage
pub use compiler::{compile, compile_phrase};
pub use trie::{Node, RebuildReport, Rejection, Trie, TrieBuilder, TrieSnapshot};

// Matching
pub use matcher::{Captures, CommandMatch, Matcher};
pub use recognizer::Recognizer;
pub use source::{TagSource, Tokenizer};

// Config (feature-gated)
#[cfg(feature = "serde")]
pub use config::{CommandConfig, CommandSetConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use parla::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        CommandId,
        // Matching
        CommandMatch,
        // Errors
        CompileError,
        Matcher,
        NodeProcessor,
        RebuildReport,
        Recognizer,
        Tag,
        TagRequirement,
        TagSet,
        // Traits
        TagSource,
        Token,
        Tokenizer,
        // Storage
        Trie,
        TrieBuilder,
        TrieSnapshot,
        VoiceCommand,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length in bytes of one phrase.
///
/// Phrases are written by hand; anything longer is almost certainly a
/// generated or corrupted entry.
pub const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum nesting of bracketed forms (`?[..]`, `&[..]`, `~[..]`).
///
/// Bounds compiler recursion and the size of the alternative sets the
/// matcher expands.
pub const MAX_NESTING_DEPTH: usize = 8;

/// Repeat bound meaning "no upper limit", as in `**rest{-1}`.
pub const UNBOUNDED: i64 = -1;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from compiling a command's phrases or loading its config.
///
/// Raised before anything reaches the trie. A command that fails is left
/// out of the rebuild as a whole; see [`RebuildReport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The phrase has no words.
    #[error("phrase is empty")]
    EmptyPattern,

    /// A word starts like a symbol but matches none.
    #[error("\"{word}\" is not a known symbol")]
    UnknownSymbol {
        /// The offending word.
        word: String,
    },

    /// A capture or flag name is missing.
    #[error("\"{word}\" needs a capture name")]
    MissingName {
        /// The offending word.
        word: String,
    },

    /// A name contains characters other than letters, digits and `_`.
    #[error("\"{name}\" is not a valid identifier")]
    InvalidIdentifier {
        /// The rejected name.
        name: String,
    },

    /// Brackets do not pair up.
    #[error("unbalanced brackets in \"{word}\"")]
    UnbalancedBrackets {
        /// The offending word.
        word: String,
    },

    /// A `OneOf` has no word list, or its list resolves to nothing.
    #[error("\"{word}\" has no words to choose from")]
    MissingList {
        /// The offending word.
        word: String,
    },

    /// A `_ref` item names a list the command does not carry.
    #[error("no captured value list named \"{name}\"")]
    UnknownCapturedList {
        /// The list name, without the `_ref` suffix.
        name: String,
    },

    /// A bracketed form has an empty body or an empty alternative.
    #[error("\"{word}\" has an empty body")]
    MissingBody {
        /// The offending word.
        word: String,
    },

    /// A repeat bound is neither a positive integer nor `-1`.
    #[error("repeat bound \"{bound}\" must be a positive integer or -1")]
    InvalidRepeatBound {
        /// The rejected bound text.
        bound: String,
    },

    /// An optional directly wraps another optional.
    #[error("\"{word}\" nests an optional directly inside an optional")]
    NestedOptional {
        /// The offending word.
        word: String,
    },

    /// Text follows the closing bracket of a form that takes no name.
    #[error("unexpected text after the closing bracket in \"{word}\"")]
    TrailingInput {
        /// The offending word.
        word: String,
    },

    /// The phrase exceeds [`MAX_PATTERN_LENGTH`].
    #[error("phrase length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the phrase.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Bracket nesting exceeds [`MAX_NESTING_DEPTH`].
    #[error("nesting depth is {depth}, but maximum allowed is {max}")]
    NestingTooDeep {
        /// Depth reached.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// A tag in a config is empty or only whitespace.
    #[error("invalid tag \"{tag}\"")]
    InvalidTag {
        /// The rejected tag text.
        tag: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Trie>();
        assert_send_sync::<TrieSnapshot>();
        assert_send_sync::<Recognizer>();
        assert_send_sync::<CompileError>();
        assert_send_sync::<CommandMatch>();
    }

    #[test]
    fn errors_name_the_fragment() {
        let err = CompileError::UnknownSymbol {
            word: "$x".into(),
        };
        assert!(err.to_string().contains("$x"));

        let err = CompileError::PatternTooLong { len: 2000, max: 1024 };
        assert_eq!(err.to_string(), "phrase length is 2000, but maximum allowed is 1024");
    }
}
