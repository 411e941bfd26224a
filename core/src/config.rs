//! Config types for loading command sets from JSON or YAML.
//!
//! These mirror [`VoiceCommand`] but are serde-deserializable. Conversion
//! checks what deserialization cannot (at least one phrase, non-blank tags);
//! phrase compilation still happens when the commands are inserted.
//!
//! ```yaml
//! commands:
//!   - id: scroll
//!     phrases: ["scroll [up|down]:dir ?[#n]:amount"]
//!   - id: paint
//!     phrases: ["paint [_colors]:color"]
//!     tags: [[canvas], [editor, preview]]
//!     captured_values:
//!       colors: [red, green]
//! ```

use crate::{CapturedValues, CompileError, Tag, TagRequirement, VoiceCommand};
use serde::Deserialize;

/// A whole command set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandSetConfig {
    /// Commands in registration order.
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

impl CommandSetConfig {
    /// Convert every command, stopping at the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommandConfig::into_command`] error.
    pub fn into_commands(self) -> Result<Vec<VoiceCommand>, CompileError> {
        self.commands
            .into_iter()
            .map(CommandConfig::into_command)
            .collect()
    }
}

/// Configuration for one [`VoiceCommand`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Command id. Shared ids merge into one leaf per path.
    pub id: String,

    /// Invocation phrases.
    pub phrases: Vec<String>,

    /// Tag requirement alternatives; each inner list is one requirement.
    /// Omitted or empty means unrestricted.
    #[serde(default)]
    pub tags: Vec<Vec<String>>,

    /// Word lists referenced from phrases as `[_name]`.
    #[serde(default)]
    pub captured_values: CapturedValues,
}

impl CommandConfig {
    /// Build the runtime command.
    ///
    /// # Errors
    ///
    /// - [`CompileError::EmptyPattern`] when no phrase is given.
    /// - [`CompileError::InvalidTag`] for an empty or blank tag.
    pub fn into_command(self) -> Result<VoiceCommand, CompileError> {
        let mut phrases = self.phrases.into_iter();
        let first = phrases.next().ok_or(CompileError::EmptyPattern)?;
        let mut command = phrases.fold(VoiceCommand::new(self.id, first), VoiceCommand::with_phrase);

        for requirement in self.tags {
            let tags = requirement
                .into_iter()
                .map(|tag| {
                    if tag.trim().is_empty() {
                        Err(CompileError::InvalidTag { tag })
                    } else {
                        Ok(Tag::new(tag.trim()))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            command = command.with_requirement(TagRequirement::of(tags));
        }

        for (name, words) in self.captured_values {
            command = command.with_values(name, words);
        }
        Ok(command)
    }
}
