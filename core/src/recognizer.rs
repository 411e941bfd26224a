//! Recognizer — a trie wired to its collaborators.
//!
//! Owns the [`Trie`] together with the [`Tokenizer`] that turns transcripts
//! into tokens and the [`TagSource`] consulted on every call. Command sets
//! are replaced through [`Recognizer::set_commands`] while other threads keep
//! matching against the snapshot they already hold.

use crate::{
    CommandMatch, Matcher, RebuildReport, TagSource, Tokenizer, Trie, TrieSnapshot, VoiceCommand,
};
use std::sync::Arc;

/// Transcript in, matched commands out.
///
/// # Example
///
/// ```
/// use parla::prelude::*;
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
/// let recognizer = Recognizer::new(Split, TagSet::new());
/// recognizer.set_commands(&[VoiceCommand::new("hello", "hello *who")]);
///
/// let hits = recognizer.recognize("Hello World");
/// assert_eq!(hits[0].command.as_str(), "hello");
/// assert_eq!(hits[0].get("who"), Some(&Token::word("world")));
/// ```
#[derive(Debug)]
pub struct Recognizer {
    trie: Trie,
    tokenizer: Box<dyn Tokenizer>,
    tags: Box<dyn TagSource>,
}

impl Recognizer {
    /// Create a recognizer with an empty command set.
    pub fn new(tokenizer: impl Tokenizer + 'static, tags: impl TagSource + 'static) -> Self {
        Self {
            trie: Trie::new(),
            tokenizer: Box::new(tokenizer),
            tags: Box::new(tags),
        }
    }

    /// Replace the command set. See [`Trie::set`].
    pub fn set_commands(&self, commands: &[VoiceCommand]) -> RebuildReport {
        self.trie.set(commands)
    }

    /// The snapshot new calls will match against.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TrieSnapshot> {
        self.trie.get()
    }

    /// Tokenize `text` and match it as a sequence of commands.
    ///
    /// Tags are read once, then the whole transcript is matched against a
    /// single snapshot.
    #[must_use]
    pub fn recognize(&self, text: &str) -> Vec<CommandMatch> {
        let tokens = self.tokenizer.tokenize(text);
        let active = self.tags.active_tags();
        let snapshot = self.trie.get();
        let matches = Matcher::new(&snapshot).match_transcript(&tokens, &active);
        tracing::debug!(
            tokens = tokens.len(),
            matches = matches.len(),
            "recognized transcript"
        );
        matches
    }

    /// Tokenize `text` and match it as exactly one command.
    #[must_use]
    pub fn recognize_one(&self, text: &str) -> Option<CommandMatch> {
        let tokens = self.tokenizer.tokenize(text);
        let active = self.tags.active_tags();
        Matcher::new(&self.trie.get()).match_span(&tokens, &active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tag, TagRequirement, TagSet, Token};
    use std::sync::RwLock;

    #[derive(Debug)]
    struct Split;

    impl Tokenizer for Split {
        fn tokenize(&self, text: &str) -> Vec<Token> {
            text.split_whitespace()
                .map(|w| w.parse().map_or_else(|_| Token::word(w), Token::Number))
                .collect()
        }
    }

    #[derive(Debug, Default)]
    struct Switchable(RwLock<TagSet>);

    impl TagSource for Arc<Switchable> {
        fn active_tags(&self) -> TagSet {
            self.0.read().map(|t| t.clone()).unwrap_or_default()
        }
    }

    #[test]
    fn tags_are_read_on_every_call() {
        let source = Arc::new(Switchable::default());
        let recognizer = Recognizer::new(Split, Arc::clone(&source));
        recognizer.set_commands(&[
            VoiceCommand::new("save", "save").with_requirement(TagRequirement::of(["editor"]))
        ]);

        assert!(recognizer.recognize_one("save").is_none());

        source.0.write().unwrap().insert(Tag::from("editor"));
        assert_eq!(recognizer.recognize_one("save").unwrap().command.as_str(), "save");
    }

    #[test]
    fn recognize_splits_transcript_into_commands() {
        let recognizer = Recognizer::new(Split, TagSet::new());
        recognizer.set_commands(&[
            VoiceCommand::new("down", "down #n"),
            VoiceCommand::new("enter", "enter"),
        ]);

        let ids: Vec<String> = recognizer
            .recognize("down 4 enter down 2")
            .iter()
            .map(|m| m.command.to_string())
            .collect();
        assert_eq!(ids, vec!["down", "enter", "down"]);
    }

    #[test]
    fn snapshot_survives_replacement() {
        let recognizer = Recognizer::new(Split, TagSet::new());
        recognizer.set_commands(&[VoiceCommand::new("old", "old")]);
        let held = recognizer.snapshot();

        recognizer.set_commands(&[VoiceCommand::new("new", "new")]);

        let tokens = [Token::word("old")];
        assert!(Matcher::new(&held).match_span(&tokens, &TagSet::new()).is_some());
        assert!(recognizer.recognize_one("old").is_none());
    }
}
