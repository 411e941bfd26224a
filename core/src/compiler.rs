//! Compiler: invocation phrase -> `NodeProcessor` chain.
//!
//! A phrase is split on whitespace; each word is handed to a fixed chain of
//! sub-compilers ([`NodeCompiler`]), the first of which that recognizes the
//! word's start symbol compiles it. Composite bodies (`?[...]`, `&[...]`,
//! `~[...]`) recurse into the same chain.
//!
//! # Syntax
//!
//! | Kind | Short | Long |
//! |------|-------|------|
//! | Word | `go` | |
//! | Number | `#n` | `Number:n`, `N:n` |
//! | WildCard | `*x` | `WildCard:x` |
//! | RepeatingWildCard | `**rest`, `**rest{3}` | `RepeatingWildCard:rest{3}` |
//! | OneOf | `[a\|b]:x`, `[_list]:x` | `OneOf:x{[a\|b]}` |
//! | Optional | `?[body]:flag` | `Opt[body]:flag`, `Optional[body]:flag` |
//! | And | `&[a\|b]` | `A[a\|b]`, `And[a\|b]` |
//! | Or | `~[a\|b]:i` | `O[a\|b]:i`, `Or[a\|b]:i` |

use crate::{
    CapturedValues, CommandId, CompileError, NodeProcessor, VoiceCommand, MAX_NESTING_DEPTH,
    MAX_PATTERN_LENGTH, UNBOUNDED,
};
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").unwrap_or_else(|e| unreachable!("identifier regex: {e}"))
});

static REPEAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^{}]*)(?:\{(?P<bound>[^{}]*)\})?$")
        .unwrap_or_else(|e| unreachable!("repeat regex: {e}"))
});

/// Compile every invocation phrase of a command.
///
/// All phrases must compile; one bad phrase fails the whole command.
///
/// # Errors
///
/// Returns the first [`CompileError`] met, in phrase order.
pub fn compile(command: &VoiceCommand) -> Result<Vec<Vec<NodeProcessor>>, CompileError> {
    let chains = command
        .phrases()
        .iter()
        .map(|phrase| compile_phrase(phrase, command.id(), command.captured_values()))
        .collect::<Result<Vec<_>, _>>()?;

    for (phrase, chain) in command.phrases().iter().zip(&chains) {
        tracing::debug!(command = %command.id(), phrase = %phrase, nodes = chain.len(), "compiled phrase");
    }
    Ok(chains)
}

/// Compile one invocation phrase into a chain ending in `CommandSuccess(id)`.
///
/// # Example
///
/// ```
/// use parla::{compile_phrase, CapturedValues, NodeProcessor};
///
/// let chain = compile_phrase("go #steps", &"walk".into(), &CapturedValues::new()).unwrap();
/// assert_eq!(chain, vec![
///     NodeProcessor::Word("go".into()),
///     NodeProcessor::Number("steps".into()),
///     NodeProcessor::CommandSuccess("walk".into()),
/// ]);
/// ```
///
/// # Errors
///
/// Returns [`CompileError`] for empty phrases, unknown symbols, missing or
/// invalid names, unbalanced brackets, bad list references, bad repeat bounds
/// and directly nested optionals.
pub fn compile_phrase(
    phrase: &str,
    id: &CommandId,
    captured: &CapturedValues,
) -> Result<Vec<NodeProcessor>, CompileError> {
    if phrase.len() > MAX_PATTERN_LENGTH {
        return Err(CompileError::PatternTooLong {
            len: phrase.len(),
            max: MAX_PATTERN_LENGTH,
        });
    }

    let scope = Scope { captured, depth: 0 };
    let mut chain = phrase
        .split_whitespace()
        .map(|word| compile_word(word, scope))
        .collect::<Result<Vec<_>, _>>()?;

    if chain.is_empty() {
        return Err(CompileError::EmptyPattern);
    }

    chain.push(NodeProcessor::CommandSuccess(id.clone()));
    Ok(chain)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sub-compiler chain
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
struct Scope<'a> {
    captured: &'a CapturedValues,
    depth: usize,
}

impl Scope<'_> {
    fn nested(self) -> Result<Self, CompileError> {
        let depth = self.depth + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(CompileError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(Self { depth, ..self })
    }
}

/// One sub-compiler per node kind, tried in [`CHAIN`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeCompiler {
    Number,
    WildCard,
    RepeatingWildCard,
    OneOf,
    Optional,
    And,
    Or,
    Word,
}

const CHAIN: [NodeCompiler; 8] = [
    NodeCompiler::Number,
    NodeCompiler::WildCard,
    NodeCompiler::RepeatingWildCard,
    NodeCompiler::OneOf,
    NodeCompiler::Optional,
    NodeCompiler::And,
    NodeCompiler::Or,
    NodeCompiler::Word,
];

impl NodeCompiler {
    /// Start symbols, longest first so `Optional` is not mistaken for `Opt`.
    fn symbols(self) -> &'static [&'static str] {
        match self {
            Self::Number => &["Number:", "N:", "#"],
            Self::WildCard => &["WildCard:", "*"],
            Self::RepeatingWildCard => &["RepeatingWildCard:", "**"],
            Self::OneOf => &["OneOf:", "["],
            Self::Optional => &["Optional", "Opt", "?"],
            Self::And => &["And", "A", "&"],
            Self::Or => &["Or", "O", "~"],
            Self::Word => &[],
        }
    }

    /// If this compiler recognizes `word`, return what follows its start symbol.
    fn claim(self, word: &str) -> Option<&str> {
        match self {
            Self::Word => word
                .chars()
                .next()
                .is_some_and(char::is_alphabetic)
                .then_some(word),
            Self::WildCard if word.starts_with("**") => None,
            Self::Optional | Self::And | Self::Or => self.symbols().iter().find_map(|sym| {
                let rest = word.strip_prefix(sym)?;
                // Spelled-out symbols must open a body, or "Apple" would be an And.
                let spelled = sym.starts_with(char::is_alphabetic);
                (!spelled || rest.starts_with('[')).then_some(rest)
            }),
            _ => self
                .symbols()
                .iter()
                .find_map(|sym| word.strip_prefix(sym)),
        }
    }

    fn compile(self, word: &str, rest: &str, scope: Scope<'_>) -> Result<NodeProcessor, CompileError> {
        match self {
            Self::Number => Ok(NodeProcessor::Number(identifier(rest, word)?)),
            Self::WildCard => Ok(NodeProcessor::WildCard(identifier(rest, word)?)),
            Self::RepeatingWildCard => compile_repeating(word, rest),
            Self::OneOf => compile_one_of(word, rest, scope),
            Self::Optional => compile_optional(word, rest, scope),
            Self::And => {
                let (body, after) = bracketed(word, rest)?;
                if !after.is_empty() {
                    return Err(CompileError::TrailingInput { word: word.into() });
                }
                let children = compile_alternatives(word, body, scope.nested()?)?;
                Ok(NodeProcessor::And(children))
            }
            Self::Or => {
                let (body, after) = bracketed(word, rest)?;
                let name = trailing_name(word, after)?;
                let children = compile_alternatives(word, body, scope.nested()?)?;
                Ok(NodeProcessor::Or { name, children })
            }
            Self::Word => {
                if word.chars().all(char::is_alphabetic) {
                    Ok(NodeProcessor::Word(word.to_lowercase()))
                } else {
                    Err(CompileError::UnknownSymbol { word: word.into() })
                }
            }
        }
    }
}

/// Compile one whitespace-free word through the sub-compiler chain.
fn compile_word(word: &str, scope: Scope<'_>) -> Result<NodeProcessor, CompileError> {
    CHAIN
        .iter()
        .find_map(|compiler| compiler.claim(word).map(|rest| (*compiler, rest)))
        .ok_or_else(|| CompileError::UnknownSymbol { word: word.into() })
        .and_then(|(compiler, rest)| compiler.compile(word, rest, scope))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Node kinds
// ═══════════════════════════════════════════════════════════════════════════════

fn compile_repeating(word: &str, rest: &str) -> Result<NodeProcessor, CompileError> {
    let caps = REPEAT.captures(rest).ok_or_else(|| CompileError::UnbalancedBrackets {
        word: word.into(),
    })?;
    let name = identifier(caps.name("name").map_or("", |m| m.as_str()), word)?;

    let max = match caps.name("bound") {
        None => None,
        Some(bound) => parse_bound(bound.as_str())?,
    };
    Ok(NodeProcessor::RepeatingWildCard { name, max })
}

fn parse_bound(bound: &str) -> Result<Option<NonZeroUsize>, CompileError> {
    let invalid = || CompileError::InvalidRepeatBound {
        bound: bound.into(),
    };
    let value: i64 = bound.trim().parse().map_err(|_| invalid())?;
    if value == UNBOUNDED {
        return Ok(None);
    }
    usize::try_from(value)
        .ok()
        .and_then(NonZeroUsize::new)
        .map(Some)
        .ok_or_else(invalid)
}

fn compile_one_of(word: &str, rest: &str, scope: Scope<'_>) -> Result<NodeProcessor, CompileError> {
    let (name, list) = if word.starts_with('[') {
        // [a|b]:name
        let (body, after) = bracketed(word, word)?;
        (trailing_name(word, after)?, body)
    } else {
        // OneOf:name{[a|b]}
        let Some(open) = rest.find('{') else {
            identifier(rest, word)?;
            return Err(CompileError::MissingList { word: word.into() });
        };
        let name = identifier(&rest[..open], word)?;
        let inner = rest[open + 1..]
            .strip_suffix('}')
            .ok_or_else(|| CompileError::UnbalancedBrackets { word: word.into() })?;
        if !inner.starts_with('[') {
            return Err(CompileError::MissingList { word: word.into() });
        }
        let (body, after) = bracketed(word, inner)?;
        if !after.is_empty() {
            return Err(CompileError::TrailingInput { word: word.into() });
        }
        (name, body)
    };

    let words = resolve_list(word, list, scope.captured)?;
    Ok(NodeProcessor::OneOf { name, words })
}

/// Expand `a|b|_ref` into lower-cased words, de-duplicated in order.
fn resolve_list(
    word: &str,
    list: &str,
    captured: &CapturedValues,
) -> Result<Vec<String>, CompileError> {
    let mut words: Vec<String> = Vec::new();
    let mut push = |w: String| {
        if !words.contains(&w) {
            words.push(w);
        }
    };

    for item in list.split('|').map(str::trim).filter(|i| !i.is_empty()) {
        if let Some(reference) = item.strip_prefix('_') {
            let name = identifier(reference, word)?;
            let values = captured
                .get(&name)
                .ok_or(CompileError::UnknownCapturedList { name })?;
            values
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .for_each(&mut push);
        } else if item.chars().all(char::is_alphabetic) {
            push(item.to_lowercase());
        } else {
            return Err(CompileError::InvalidIdentifier { name: item.into() });
        }
    }

    if words.is_empty() {
        return Err(CompileError::MissingList { word: word.into() });
    }
    Ok(words)
}

fn compile_optional(word: &str, rest: &str, scope: Scope<'_>) -> Result<NodeProcessor, CompileError> {
    let (body, after) = bracketed(word, rest)?;
    let flag = trailing_name(word, after)?;
    if body.is_empty() {
        return Err(CompileError::MissingBody { word: word.into() });
    }

    let inner = compile_word(body, scope.nested()?)?;
    if matches!(inner, NodeProcessor::Optional { .. }) {
        return Err(CompileError::NestedOptional { word: word.into() });
    }
    Ok(NodeProcessor::Optional {
        flag,
        inner: Box::new(inner),
    })
}

fn compile_alternatives(
    word: &str,
    body: &str,
    scope: Scope<'_>,
) -> Result<Vec<NodeProcessor>, CompileError> {
    let items = split_top_level(body);
    if items.iter().all(|i| i.is_empty()) {
        return Err(CompileError::MissingBody { word: word.into() });
    }
    items
        .into_iter()
        .map(|item| {
            if item.is_empty() {
                Err(CompileError::MissingBody { word: word.into() })
            } else {
                compile_word(item, scope)
            }
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Lexical helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate a capture or flag name.
fn identifier(name: &str, word: &str) -> Result<String, CompileError> {
    if name.is_empty() {
        Err(CompileError::MissingName { word: word.into() })
    } else if IDENTIFIER.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(CompileError::InvalidIdentifier { name: name.into() })
    }
}

/// Parse the `:name` suffix that closes optionals, ors and short one-ofs.
fn trailing_name(word: &str, after: &str) -> Result<String, CompileError> {
    match after.strip_prefix(':') {
        Some(name) => identifier(name, word),
        None if after.is_empty() => Err(CompileError::MissingName { word: word.into() }),
        None => Err(CompileError::TrailingInput { word: word.into() }),
    }
}

/// Split `[body]after` at the bracket matching the leading `[`.
fn bracketed<'a>(word: &str, s: &'a str) -> Result<(&'a str, &'a str), CompileError> {
    if !s.starts_with('[') {
        return Err(CompileError::MissingBody { word: word.into() });
    }

    let mut depth = 0_usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    let after = &s[i + 1..];
                    if after.contains(['[', ']']) {
                        return Err(CompileError::UnbalancedBrackets { word: word.into() });
                    }
                    return Ok((&s[1..i], after));
                }
            }
            _ => {}
        }
    }
    Err(CompileError::UnbalancedBrackets { word: word.into() })
}

/// Split on `|` outside of nested brackets and braces.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                items.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&body[start..]);
    items
}
