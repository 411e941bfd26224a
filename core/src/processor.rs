//! `NodeProcessor` — one compiled matching step.
//!
//! The [compiler](crate::compile) emits chains of processors, the
//! [trie](crate::Trie) stores them as nodes and the [matcher](crate::Matcher)
//! applies them to tokens. The variant set is closed; every consumer matches
//! exhaustively on it.

use crate::CommandId;
use std::fmt;
use std::num::NonZeroUsize;

/// Weight of a literal `Word` or a `Number`. Lowest ordinary weight.
pub const LITERAL_WEIGHT: u32 = 1;

/// Weight of a single-token wildcard. Every `OneOf` weighs less.
pub const WILDCARD_WEIGHT: u32 = 1 << 16;

/// Weight of a repeating wildcard. Saturates any `And` sum it takes part in.
pub const REPEATING_WEIGHT: u32 = u32::MAX;

/// One step of matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeProcessor {
    /// A literal word, stored lower-cased and matched case-insensitively.
    Word(String),

    /// A single `Number` token, captured under the given name.
    Number(String),

    /// Exactly one token of any kind, captured.
    WildCard(String),

    /// Between one and `max` tokens (unbounded when `None`), captured as `Merged`.
    RepeatingWildCard {
        /// Capture name.
        name: String,
        /// Upper bound on consumed tokens.
        max: Option<NonZeroUsize>,
    },

    /// A single word out of a fixed list, captured.
    OneOf {
        /// Capture name.
        name: String,
        /// Accepted words, lower-cased, in declaration order.
        words: Vec<String>,
    },

    /// Tries `inner`; succeeds consuming nothing when it fails.
    Optional {
        /// Flag capture: the inner match, or `Empty` when skipped.
        flag: String,
        /// The wrapped processor. Never itself an `Optional`.
        inner: Box<NodeProcessor>,
    },

    /// Children matched one after another.
    And(Vec<NodeProcessor>),

    /// Exactly one child matches at this position.
    Or {
        /// Records the 0-based index of the matching alternative.
        name: String,
        /// The alternatives, in declaration order.
        children: Vec<NodeProcessor>,
    },

    /// Terminal marker: a complete match of this command.
    CommandSuccess(CommandId),

    /// Placeholder used only at the trie root.
    Empty,
}

impl NodeProcessor {
    /// Specificity weight used to order trie siblings. Lower is tried first.
    ///
    /// # Example
    ///
    /// ```
    /// use parla::NodeProcessor;
    ///
    /// let word = NodeProcessor::Word("go".into());
    /// let any = NodeProcessor::WildCard("x".into());
    /// assert!(word.weight() < any.weight());
    /// ```
    #[must_use]
    pub fn weight(&self) -> u32 {
        match self {
            Self::Word(_) | Self::Number(_) => LITERAL_WEIGHT,
            Self::OneOf { words, .. } => {
                let count = u32::try_from(words.len()).unwrap_or(u32::MAX);
                LITERAL_WEIGHT
                    .saturating_add(count)
                    .min(WILDCARD_WEIGHT - 1)
            }
            Self::WildCard(_) => WILDCARD_WEIGHT,
            Self::RepeatingWildCard { .. } => REPEATING_WEIGHT,
            Self::Optional { inner, .. } => inner.weight(),
            Self::And(children) => children
                .iter()
                .fold(0_u32, |acc, child| acc.saturating_add(child.weight())),
            Self::Or { children, .. } => children
                .iter()
                .map(Self::weight)
                .min()
                .unwrap_or(REPEATING_WEIGHT),
            Self::CommandSuccess(_) | Self::Empty => 0,
        }
    }

    /// Sibling ordering key: non-terminal nodes by weight, terminals last.
    #[must_use]
    pub fn sort_key(&self) -> (bool, u32) {
        (self.is_terminal(), self.weight())
    }

    /// Returns `true` for `CommandSuccess`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CommandSuccess(_))
    }

    /// Whether an inserted chain may continue through an existing node
    /// holding `other` instead of branching.
    ///
    /// Structural equality, except that terminal markers only merge when
    /// they name the same command.
    #[must_use]
    pub fn can_merge(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::CommandSuccess(a), Self::CommandSuccess(b)) => a == b,
            (Self::Empty, _) | (_, Self::Empty) => false,
            (a, b) => a == b,
        }
    }

    /// Nesting depth of composite processors (leaf processors are 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Optional { inner, .. } => 1 + inner.depth(),
            Self::And(children) | Self::Or { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    /// The command id of a terminal marker.
    #[must_use]
    pub fn command_id(&self) -> Option<&CommandId> {
        match self {
            Self::CommandSuccess(id) => Some(id),
            _ => None,
        }
    }
}

/// Renders in pattern syntax (short symbols), e.g. `?[#n]:flag`.
impl fmt::Display for NodeProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(w) => f.write_str(w),
            Self::Number(name) => write!(f, "#{name}"),
            Self::WildCard(name) => write!(f, "*{name}"),
            Self::RepeatingWildCard { name, max: None } => write!(f, "**{name}"),
            Self::RepeatingWildCard {
                name,
                max: Some(max),
            } => write!(f, "**{name}{{{max}}}"),
            Self::OneOf { name, words } => write!(f, "[{}]:{name}", words.join("|")),
            Self::Optional { flag, inner } => write!(f, "?[{inner}]:{flag}"),
            Self::And(children) => {
                f.write_str("&[")?;
                write_alternatives(f, children)?;
                f.write_str("]")
            }
            Self::Or { name, children } => {
                f.write_str("~[")?;
                write_alternatives(f, children)?;
                write!(f, "]:{name}")
            }
            Self::CommandSuccess(id) => write!(f, "=> {id}"),
            Self::Empty => f.write_str("(root)"),
        }
    }
}

fn write_alternatives(f: &mut fmt::Formatter<'_>, children: &[NodeProcessor]) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str("|")?;
        }
        write!(f, "{child}")?;
    }
    Ok(())
}
