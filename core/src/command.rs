//! Voice command declarations: what the registry hands to the trie.

use crate::TagRequirement;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies one registered command. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(Arc<str>);

impl CommandId {
    /// Create a command id.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CommandId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Named word lists that patterns can reference inline as `[_name]`.
pub type CapturedValues = HashMap<String, Vec<String>>;

/// A command as registered: id, invocation phrases, tag requirements and
/// the word lists its phrases may reference.
///
/// # Example
///
/// ```
/// use parla::{TagRequirement, VoiceCommand};
///
/// let cmd = VoiceCommand::new("paint", "paint [_colors]:color")
///     .with_phrase("colour [_colors]:color")
///     .with_requirement(TagRequirement::of(["canvas"]))
///     .with_values("colors", ["red", "green"]);
///
/// assert_eq!(cmd.phrases().len(), 2);
/// assert_eq!(cmd.tag_requirements().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceCommand {
    id: CommandId,
    phrases: Vec<String>,
    tag_requirements: Vec<TagRequirement>,
    captured_values: CapturedValues,
}

impl VoiceCommand {
    /// Create a command with a single invocation phrase and no restrictions.
    pub fn new(id: impl Into<CommandId>, phrase: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phrases: vec![phrase.into()],
            tag_requirements: Vec::new(),
            captured_values: CapturedValues::new(),
        }
    }

    /// Add another invocation phrase (builder pattern).
    #[must_use]
    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrases.push(phrase.into());
        self
    }

    /// Add a tag requirement alternative (builder pattern).
    #[must_use]
    pub fn with_requirement(mut self, requirement: TagRequirement) -> Self {
        self.tag_requirements.push(requirement);
        self
    }

    /// Add a named word list for inline `[_name]` references (builder pattern).
    #[must_use]
    pub fn with_values<I, S>(mut self, name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.captured_values
            .insert(name.into(), words.into_iter().map(Into::into).collect());
        self
    }

    /// The command id.
    #[must_use]
    pub fn id(&self) -> &CommandId {
        &self.id
    }

    /// The invocation phrases, in declaration order.
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// The tag requirement alternatives as declared (may be empty).
    #[must_use]
    pub fn tag_requirements(&self) -> &[TagRequirement] {
        &self.tag_requirements
    }

    /// Requirements as stored in the trie: an empty declaration becomes `[∅]`.
    #[must_use]
    pub fn effective_requirements(&self) -> Vec<TagRequirement> {
        if self.tag_requirements.is_empty() {
            vec![TagRequirement::none()]
        } else {
            let mut reqs = Vec::with_capacity(self.tag_requirements.len());
            crate::tag::merge_requirements(&mut reqs, &self.tag_requirements);
            reqs
        }
    }

    /// The named word lists.
    #[must_use]
    pub fn captured_values(&self) -> &CapturedValues {
        &self.captured_values
    }
}
