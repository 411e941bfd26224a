//! Matcher — walks a trie snapshot against a token span.
//!
//! Each processor yields its ways of consuming the head of the remaining
//! span, most preferred first. The walk tries them in order and recurses
//! into the node's children after each, so failure deeper down backtracks
//! into shorter repeating-wildcard runs, skipped optionals and other `Or`
//! alternatives. Reaching a `CommandSuccess` leaf records a candidate.
//!
//! # Choosing between candidates
//!
//! The candidate whose satisfied tag requirement has the most tags wins.
//! Ties go to the candidate found first, i.e. the one reached through the
//! most specific siblings, which also favours longer phrases over their
//! own prefixes because terminal markers sort last.
//!
//! The matcher holds no state between calls.

use crate::tag::{any_satisfied, best_specificity};
use crate::{CommandId, Node, NodeProcessor, TagSet, Token, TrieSnapshot};
use std::collections::BTreeMap;

/// Captured values of a match, by capture or flag name.
pub type Captures = BTreeMap<String, Token>;

/// One command recognized in a token span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    /// The matched command.
    pub command: CommandId,
    /// Values captured along the path.
    pub captures: Captures,
    /// Tokens consumed from the start of the span.
    pub consumed: usize,
    /// Tag count of the most specific satisfied requirement.
    pub specificity: usize,
}

impl CommandMatch {
    /// Look up a captured value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.captures.get(name)
    }
}

/// Stateless matcher over one snapshot.
///
/// # Example
///
/// ```
/// use parla::{Matcher, TagSet, Token, TrieBuilder, VoiceCommand};
///
/// let mut builder = TrieBuilder::new();
/// builder.insert(&VoiceCommand::new("walk", "walk #steps")).unwrap();
/// let snapshot = builder.build();
///
/// let tokens = [Token::word("walk"), Token::Number(3)];
/// let hit = Matcher::new(&snapshot).match_span(&tokens, &TagSet::new()).unwrap();
/// assert_eq!(hit.command.as_str(), "walk");
/// assert_eq!(hit.get("steps"), Some(&Token::Number(3)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'t> {
    root: &'t Node,
}

impl<'t> Matcher<'t> {
    /// Create a matcher over `snapshot`.
    #[must_use]
    pub fn new(snapshot: &'t TrieSnapshot) -> Self {
        Self {
            root: snapshot.root(),
        }
    }

    /// Every command reachable from the start of `tokens`, in discovery order.
    ///
    /// Candidates may consume any prefix of the span, including all of it.
    #[must_use]
    pub fn candidates(&self, tokens: &[Token], active: &TagSet) -> Vec<CommandMatch> {
        let mut out = Vec::new();
        let mut bindings = Vec::new();
        walk(self.root, tokens, 0, active, &mut bindings, &mut out);
        out
    }

    /// The best command consuming the whole span, if any.
    ///
    /// An empty span matches only phrases that can consume nothing, such
    /// as a lone optional.
    #[must_use]
    pub fn match_span(&self, tokens: &[Token], active: &TagSet) -> Option<CommandMatch> {
        select_best(
            self.candidates(tokens, active)
                .into_iter()
                .filter(|c| c.consumed == tokens.len()),
        )
    }

    /// Match a whole transcript as a sequence of commands.
    ///
    /// From the current position, the best candidate consuming at least one
    /// token is taken and matching resumes after it. Stops at the first
    /// position no command can consume; trailing tokens are left unmatched.
    #[must_use]
    pub fn match_transcript(&self, tokens: &[Token], active: &TagSet) -> Vec<CommandMatch> {
        let mut matches = Vec::new();
        let mut pos = 0;
        while pos < tokens.len() {
            let best = select_best(
                self.candidates(&tokens[pos..], active)
                    .into_iter()
                    .filter(|c| c.consumed > 0),
            );
            let Some(hit) = best else {
                break;
            };
            pos += hit.consumed;
            matches.push(hit);
        }
        matches
    }
}

/// Highest specificity wins; the first found wins ties.
fn select_best(candidates: impl IntoIterator<Item = CommandMatch>) -> Option<CommandMatch> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(b) if b.specificity >= candidate.specificity => Some(b),
        _ => Some(candidate),
    })
}

/// Captures bound along the current path, in binding order.
type Bindings = Vec<(String, Token)>;

/// Continuation run for each way a processor matches: the position after
/// it, and the bindings with its captures pushed.
type Next<'a> = dyn FnMut(usize, &mut Bindings) + 'a;

fn walk(
    node: &Node,
    tokens: &[Token],
    pos: usize,
    active: &TagSet,
    bindings: &mut Bindings,
    out: &mut Vec<CommandMatch>,
) {
    for child in node.children() {
        if !any_satisfied(child.tag_requirements(), active) {
            continue;
        }

        if let NodeProcessor::CommandSuccess(id) = child.processor() {
            let specificity = best_specificity(child.tag_requirements(), active).unwrap_or(0);
            tracing::trace!(command = %id, consumed = pos, specificity, "candidate");
            out.push(CommandMatch {
                command: id.clone(),
                captures: bindings.iter().cloned().collect(),
                consumed: pos,
                specificity,
            });
            continue;
        }

        apply(child.processor(), tokens, pos, bindings, &mut |end: usize, bindings: &mut Bindings| {
            walk(child, tokens, end, active, bindings, out);
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Processor application
// ═══════════════════════════════════════════════════════════════════════════════

/// Run `next` once for every way `processor` can match at `pos`, preferred
/// first.
///
/// Alternatives are produced lazily, so a failing continuation prunes a
/// composite before its remaining combinations are built. `bindings` is
/// left as it was found.
fn apply(
    processor: &NodeProcessor,
    tokens: &[Token],
    pos: usize,
    bindings: &mut Bindings,
    next: &mut Next<'_>,
) {
    let head = tokens.get(pos);
    match processor {
        NodeProcessor::Word(literal) => {
            if head.is_some_and(|t| t.matches_word(literal)) {
                next(pos + 1, bindings);
            }
        }

        NodeProcessor::Number(name) => {
            if let Some(token) = head.filter(|t| t.is_number()) {
                bind(bindings, name, token.clone(), pos + 1, next);
            }
        }

        NodeProcessor::WildCard(name) => {
            if let Some(token) = head {
                bind(bindings, name, token.clone(), pos + 1, next);
            }
        }

        NodeProcessor::RepeatingWildCard { name, max } => {
            let rest = tokens.len().saturating_sub(pos);
            let upper = max.map_or(rest, |m| m.get().min(rest));
            for n in (1..=upper).rev() {
                let run = Token::Merged(tokens[pos..pos + n].to_vec());
                bind(bindings, name, run, pos + n, next);
            }
        }

        NodeProcessor::OneOf { name, words } => {
            if let Some(token) = head.filter(|t| words.iter().any(|w| t.matches_word(w))) {
                bind(bindings, name, token.clone(), pos + 1, next);
            }
        }

        NodeProcessor::Optional { flag, inner } => {
            apply(inner, tokens, pos, bindings, &mut |end: usize, bindings: &mut Bindings| {
                bind(bindings, flag, Token::collapse(&tokens[pos..end]), end, &mut *next);
            });
            bind(bindings, flag, Token::Empty, pos, next);
        }

        NodeProcessor::And(children) => sequence(children, tokens, pos, bindings, next),

        NodeProcessor::Or { name, children } => {
            for (index, child) in children.iter().enumerate() {
                let index = i64::try_from(index).unwrap_or(i64::MAX);
                apply(child, tokens, pos, bindings, &mut |end: usize, bindings: &mut Bindings| {
                    bind(bindings, name, Token::Number(index), end, &mut *next);
                });
            }
        }

        // Terminals are handled by the walk; the root never matches tokens.
        NodeProcessor::CommandSuccess(_) | NodeProcessor::Empty => next(pos, bindings),
    }
}

/// Match `children` one after another starting at `pos`.
fn sequence(
    children: &[NodeProcessor],
    tokens: &[Token],
    pos: usize,
    bindings: &mut Bindings,
    next: &mut Next<'_>,
) {
    match children.split_first() {
        None => next(pos, bindings),
        Some((first, rest)) => {
            apply(first, tokens, pos, bindings, &mut |end: usize, bindings: &mut Bindings| {
                sequence(rest, tokens, end, bindings, &mut *next);
            });
        }
    }
}

/// Push one capture for the duration of `next`.
fn bind(bindings: &mut Bindings, name: &str, token: Token, end: usize, next: &mut Next<'_>) {
    bindings.push((name.to_string(), token));
    next(end, bindings);
    bindings.pop();
}
