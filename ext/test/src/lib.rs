//! parla-test: test collaborators for the parla engine
//!
//! Provides a plain-text [`Tokenizer`] and a mutable [`TagSource`] so tests,
//! benches and the CLI can drive the engine without a speech recognizer.
//!
//! # Example
//!
//! ```
//! use parla_test::prelude::*;
//!
//! let env = TestEnvironment::new().with_tag("editor");
//! let recognizer = Recognizer::new(WhitespaceTokenizer, env.clone());
//! recognizer.set_commands(&[
//!     VoiceCommand::new("indent", "indent #lines")
//!         .with_requirement(TagRequirement::of(["editor"])),
//! ]);
//!
//! let hit = recognizer.recognize_one("Indent 4.").unwrap();
//! assert_eq!(hit.get("lines"), Some(&Token::Number(4)));
//!
//! env.deactivate("editor");
//! assert!(recognizer.recognize_one("indent 4").is_none());
//! ```

use parla::prelude::*;
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Splits on whitespace, drops punctuation, lower-cases words and turns
/// integers into `Number` tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace()
            .filter_map(|raw| {
                let cleaned: String = raw
                    .chars()
                    .enumerate()
                    .filter(|&(i, c)| c.is_alphanumeric() || (i == 0 && c == '-'))
                    .map(|(_, c)| c)
                    .collect();
                match cleaned.parse::<i64>() {
                    Ok(n) => Some(Token::Number(n)),
                    Err(_) => {
                        let word = cleaned.trim_start_matches('-');
                        (!word.is_empty()).then(|| Token::word(word))
                    }
                }
            })
            .collect()
    }
}

/// Active tag set that tests can switch while a recognizer holds it.
///
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct TestEnvironment {
    active: Arc<RwLock<TagSet>>,
}

impl TestEnvironment {
    /// Create an environment with no active tags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a tag (builder pattern).
    #[must_use]
    pub fn with_tag(self, tag: impl Into<Tag>) -> Self {
        self.activate(tag);
        self
    }

    /// Activate a tag.
    pub fn activate(&self, tag: impl Into<Tag>) {
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tag.into());
    }

    /// Deactivate a tag.
    pub fn deactivate(&self, tag: impl Into<Tag>) {
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&tag.into());
    }
}

impl TagSource for TestEnvironment {
    fn active_tags(&self) -> TagSet {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{TestEnvironment, WhitespaceTokenizer};
    pub use parla::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_types_numbers_and_words() {
        let tokens = WhitespaceTokenizer.tokenize("Scroll DOWN 12 times, -3 ok!");
        assert_eq!(
            tokens,
            vec![
                Token::word("scroll"),
                Token::word("down"),
                Token::Number(12),
                Token::word("times"),
                Token::Number(-3),
                Token::word("ok"),
            ]
        );
    }

    #[test]
    fn tokenizer_drops_pure_punctuation() {
        assert_eq!(WhitespaceTokenizer.tokenize("go - . home"), vec![Token::word("go"), Token::word("home")]);
        assert!(WhitespaceTokenizer.tokenize("   ").is_empty());
    }

    #[test]
    fn environment_clones_share_tags() {
        let env = TestEnvironment::new().with_tag("a");
        let view = env.clone();
        env.activate("b");
        env.deactivate("a");

        let tags = view.active_tags();
        assert!(tags.contains(&Tag::from("b")));
        assert!(!tags.contains(&Tag::from("a")));
    }

    #[test]
    fn end_to_end_tag_filtered_dispatch() {
        let env = TestEnvironment::new().with_tag("Requirement");
        let recognizer = Recognizer::new(WhitespaceTokenizer, env);
        let report = recognizer.set_commands(&[
            VoiceCommand::new("first", "go").with_requirement(TagRequirement::of(["Requirement"])),
            VoiceCommand::new("second", "go").with_requirement(TagRequirement::of(["Other"])),
        ]);
        assert!(report.is_clean());

        let hits = recognizer.recognize("go");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].command.as_str(), "first");
        assert!(hits[0].captures.is_empty());
    }
}
