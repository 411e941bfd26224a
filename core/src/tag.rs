//! Tags and tag requirements.
//!
//! A [`Tag`] is an opaque environment label ("editor", "terminal", ...).
//! A [`TagRequirement`] is a conjunction of tags; a command carries a list of
//! requirements forming a disjunction: it is eligible when *any* requirement
//! is a subset of the active [`TagSet`].

use std::collections::BTreeSet;
use std::fmt;

/// An opaque environment label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(String);

impl Tag {
    /// Create a tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The set of tags active in the environment at match time.
pub type TagSet = BTreeSet<Tag>;

/// A conjunction of tags. The empty requirement means "no restriction".
///
/// # Example
///
/// ```
/// use parla::{Tag, TagRequirement, TagSet};
///
/// let req = TagRequirement::of(["editor", "focused"]);
/// let active: TagSet = ["editor", "focused", "dark"].into_iter().map(Tag::from).collect();
///
/// assert!(req.is_satisfied_by(&active));
/// assert_eq!(req.specificity(), 2);
/// assert!(TagRequirement::none().is_satisfied_by(&TagSet::new()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagRequirement(BTreeSet<Tag>);

impl TagRequirement {
    /// The unrestricted requirement (∅).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a requirement from tag names.
    pub fn of<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    /// The required tags.
    #[must_use]
    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.0
    }

    /// Returns `true` if this requirement places no restriction.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if every required tag is active.
    #[must_use]
    pub fn is_satisfied_by(&self, active: &TagSet) -> bool {
        self.0.is_subset(active)
    }

    /// How specific this requirement is: its tag count.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for TagRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str("}")
    }
}

impl<T: Into<Tag>> FromIterator<T> for TagRequirement {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

/// Returns `true` if any alternative is satisfied.
///
/// An empty alternative list is treated as unrestricted.
#[must_use]
pub fn any_satisfied(requirements: &[TagRequirement], active: &TagSet) -> bool {
    requirements.is_empty() || requirements.iter().any(|r| r.is_satisfied_by(active))
}

/// The specificity of the most specific satisfied alternative, if any.
#[must_use]
pub fn best_specificity(requirements: &[TagRequirement], active: &TagSet) -> Option<usize> {
    if requirements.is_empty() {
        return Some(0);
    }
    requirements
        .iter()
        .filter(|r| r.is_satisfied_by(active))
        .map(TagRequirement::specificity)
        .max()
}

/// Union `incoming` into `existing`, collapsing identical requirements.
///
/// Insertion order of first occurrence is preserved.
pub fn merge_requirements(existing: &mut Vec<TagRequirement>, incoming: &[TagRequirement]) {
    for req in incoming {
        if !existing.contains(req) {
            existing.push(req.clone());
        }
    }
}
