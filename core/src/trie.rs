//! Command trie: every compiled chain folded into one prefix-shared tree.
//!
//! Insertion walks a chain from the root. Where an existing child can merge
//! with the chain's next processor, the child's tag requirements absorb the
//! command's and the walk continues; otherwise the rest of the chain becomes
//! a fresh path, inserted among its siblings by specificity.
//!
//! # Sibling order
//!
//! Children are kept sorted by [`NodeProcessor::sort_key`]: literals first,
//! then one-ofs by list size, wildcards, repeating wildcards, and terminal
//! markers last. Ties keep first-insertion order.
//!
//! # Snapshots
//!
//! A built tree is an immutable [`TrieSnapshot`]. [`Trie`] hands out
//! `Arc`s to the current snapshot and replaces it wholesale on
//! [`Trie::set`], so a rebuild never touches a tree being matched.

use crate::tag::merge_requirements;
use crate::{compile, CommandId, CompileError, NodeProcessor, TagRequirement, VoiceCommand};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

/// One trie node: a processor, the tag requirements of every command
/// passing through it, and its ordered children.
#[derive(Debug, Clone)]
pub struct Node {
    tag_requirements: Vec<TagRequirement>,
    processor: NodeProcessor,
    children: Vec<Node>,
}

impl Node {
    /// The root: unrestricted, `Empty` processor.
    #[must_use]
    pub fn root() -> Self {
        Self {
            tag_requirements: vec![TagRequirement::none()],
            processor: NodeProcessor::Empty,
            children: Vec::new(),
        }
    }

    /// The step this node applies.
    #[must_use]
    pub fn processor(&self) -> &NodeProcessor {
        &self.processor
    }

    /// Requirement alternatives; the node is reachable if any is satisfied.
    #[must_use]
    pub fn tag_requirements(&self) -> &[TagRequirement] {
        &self.tag_requirements
    }

    /// Children in sibling order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Number of nodes in this subtree, this one included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// A single-branch path holding `chain`.
    fn path(chain: &[NodeProcessor], requirements: &[TagRequirement]) -> Option<Self> {
        let (head, tail) = chain.split_first()?;
        Some(Self {
            tag_requirements: requirements.to_vec(),
            processor: head.clone(),
            children: Self::path(tail, requirements).into_iter().collect(),
        })
    }

    /// Insert `chain` below this node.
    fn insert(&mut self, chain: &[NodeProcessor], requirements: &[TagRequirement]) {
        let mut node = self;
        for (i, processor) in chain.iter().enumerate() {
            match node
                .children
                .iter()
                .position(|child| child.processor.can_merge(processor))
            {
                Some(idx) => {
                    let child = &mut node.children[idx];
                    merge_requirements(&mut child.tag_requirements, requirements);
                    node = child;
                }
                None => {
                    let Some(fresh) = Self::path(&chain[i..], requirements) else {
                        return;
                    };
                    let key = fresh.processor.sort_key();
                    let at = node
                        .children
                        .partition_point(|c| c.processor.sort_key() <= key);
                    node.children.insert(at, fresh);
                    return;
                }
            }
        }
    }

    fn collect_commands<'a>(&'a self, out: &mut Vec<&'a CommandId>) {
        if let Some(id) = self.processor.command_id() {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        for child in &self.children {
            child.collect_commands(out);
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.processor, indent = depth * 2)?;
        let unrestricted = self.tag_requirements.iter().all(TagRequirement::is_unrestricted);
        if !unrestricted {
            f.write_str("  ")?;
            for (i, req) in self.tag_requirements.iter().enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                write!(f, "{req}")?;
            }
        }
        writeln!(f)?;
        for child in &self.children {
            child.render(f, depth + 1)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Folds compiled commands into a tree.
///
/// # Example
///
/// ```
/// use parla::{TrieBuilder, VoiceCommand};
///
/// let mut builder = TrieBuilder::new();
/// builder.insert(&VoiceCommand::new("stop", "stop")).unwrap();
/// builder.insert(&VoiceCommand::new("stop_all", "stop all")).unwrap();
///
/// let snapshot = builder.build();
/// // root -> stop -> {all -> =>stop_all, =>stop}
/// assert_eq!(snapshot.root().children().len(), 1);
/// assert_eq!(snapshot.command_ids().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TrieBuilder {
    root: Node,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieBuilder {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self { root: Node::root() }
    }

    /// Compile every phrase of `command`, then insert all chains.
    ///
    /// Nothing is inserted unless every phrase compiles.
    ///
    /// # Errors
    ///
    /// Returns the [`CompileError`] of the first phrase that fails.
    pub fn insert(&mut self, command: &VoiceCommand) -> Result<(), CompileError> {
        let chains = compile(command)?;
        let requirements = command.effective_requirements();
        for chain in &chains {
            self.insert_chain(chain, &requirements);
        }
        Ok(())
    }

    /// Insert an already compiled chain.
    pub fn insert_chain(&mut self, chain: &[NodeProcessor], requirements: &[TagRequirement]) {
        self.root.insert(chain, requirements);
    }

    /// Freeze into an immutable snapshot.
    #[must_use]
    pub fn build(self) -> TrieSnapshot {
        TrieSnapshot { root: self.root }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Snapshot
// ═══════════════════════════════════════════════════════════════════════════════

/// An immutable, built tree. Safe to match against from many threads.
#[derive(Debug, Clone)]
pub struct TrieSnapshot {
    root: Node,
}

impl Default for TrieSnapshot {
    fn default() -> Self {
        TrieBuilder::new().build()
    }
}

impl TrieSnapshot {
    /// The root node (`Empty` processor, unrestricted).
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Total nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Distinct command ids reachable in the tree, in depth-first order.
    #[must_use]
    pub fn command_ids(&self) -> Vec<&CommandId> {
        let mut out = Vec::new();
        self.root.collect_commands(&mut out);
        out
    }

    /// Returns `true` if no command is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}

/// Indented rendering, one processor per line with its tag requirements.
impl fmt::Display for TrieSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.render(f, 0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shared handle
// ═══════════════════════════════════════════════════════════════════════════════

/// A command rejected during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The rejected command.
    pub id: CommandId,
    /// Why its phrases did not compile.
    pub error: CompileError,
}

/// Outcome of [`Trie::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Commands inserted into the new tree.
    pub accepted: Vec<CommandId>,
    /// Commands left out, with their errors.
    pub rejected: Vec<Rejection>,
}

impl RebuildReport {
    /// Returns `true` if every command was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// The live command tree: rebuilt wholesale, read as snapshots.
///
/// # Example
///
/// ```
/// use parla::{Trie, VoiceCommand};
///
/// let trie = Trie::new();
/// let report = trie.set(&[
///     VoiceCommand::new("go", "go"),
///     VoiceCommand::new("broken", "go ?"),
/// ]);
/// assert_eq!(report.accepted.len(), 1);
/// assert_eq!(report.rejected[0].id.as_str(), "broken");
/// assert!(!trie.get().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct Trie {
    current: ArcSwap<TrieSnapshot>,
}

impl Trie {
    /// An empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a new tree from `commands` and swap it in.
    ///
    /// Each command is all-or-nothing; rejected commands are reported and
    /// skipped, the rest are still served.
    pub fn set(&self, commands: &[VoiceCommand]) -> RebuildReport {
        let mut builder = TrieBuilder::new();
        let mut report = RebuildReport::default();

        for command in commands {
            match builder.insert(command) {
                Ok(()) => report.accepted.push(command.id().clone()),
                Err(error) => {
                    tracing::warn!(command = %command.id(), %error, "rejected command");
                    report.rejected.push(Rejection {
                        id: command.id().clone(),
                        error,
                    });
                }
            }
        }

        let snapshot = Arc::new(builder.build());
        tracing::info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            nodes = snapshot.node_count(),
            "command trie rebuilt"
        );

        self.current.store(snapshot);
        report
    }

    /// The current snapshot.
    #[must_use]
    pub fn get(&self) -> Arc<TrieSnapshot> {
        self.current.load_full()
    }
}
