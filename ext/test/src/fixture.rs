//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the parla engine. A fixture
//! declares a command set, optionally the ids the rebuild must reject, and
//! cases pairing a transcript and active tags with the expected matches.
//!
//! ```yaml
//! name: optional fallback
//! description: skipped optionals capture an empty flag
//! commands:
//!   - id: go
//!     phrases: ["go ?[phrase]:found"]
//! cases:
//!   - name: present
//!     transcript: go phrase
//!     expect:
//!       - command: go
//!         captures: { found: phrase }
//!   - name: absent
//!     transcript: go
//!     expect:
//!       - command: go
//!         captures: { found: "" }
//! ```
//!
//! Captured values are compared through their display form: merged runs
//! joined by spaces, skipped optionals as the empty string.

use crate::WhitespaceTokenizer;
use parla::prelude::*;
use parla::CommandConfig;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub commands: Vec<CommandConfig>,
    /// Ids the rebuild must leave out, in any order.
    #[serde(default)]
    pub rejected: Vec<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// How a case's transcript is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Consecutive commands until no command consumes the next token.
    #[default]
    Transcript,
    /// One command consuming the whole transcript.
    Span,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub transcript: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub mode: Mode,
    pub expect: Vec<ExpectedMatch>,
}

/// One expected match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpectedMatch {
    pub command: String,
    #[serde(default)]
    pub captures: BTreeMap<String, String>,
}

impl ExpectedMatch {
    fn from_match(m: &CommandMatch) -> Self {
        Self {
            command: m.command.to_string(),
            captures: m
                .captures
                .iter()
                .map(|(name, token)| (name.clone(), token.to_string()))
                .collect(),
        }
    }
}

impl TestCase {
    /// Build the active tag set from this case's tag list
    pub fn build_tags(&self) -> TagSet {
        self.tags.iter().map(|t| Tag::new(t.as_str())).collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Vec<ExpectedMatch>,
    pub actual: Vec<ExpectedMatch>,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Convert and register the command set.
    ///
    /// Commands whose config is invalid count as rejected, like commands
    /// whose phrases fail to compile.
    pub fn build(&self) -> (Trie, Vec<String>) {
        let mut rejected = Vec::new();
        let commands: Vec<VoiceCommand> = self
            .commands
            .iter()
            .filter_map(|config| {
                config.clone().into_command().map_or_else(
                    |_| {
                        rejected.push(config.id.clone());
                        None
                    },
                    Some,
                )
            })
            .collect();

        let trie = Trie::new();
        let report = trie.set(&commands);
        rejected.extend(report.rejected.iter().map(|r| r.id.to_string()));
        (trie, rejected)
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Vec<CaseResult> {
        let (trie, _) = self.build();
        let snapshot = trie.get();
        let matcher = Matcher::new(&snapshot);

        self.cases
            .iter()
            .map(|case| {
                let tokens = WhitespaceTokenizer.tokenize(&case.transcript);
                let active = case.build_tags();
                let matches = match case.mode {
                    Mode::Transcript => matcher.match_transcript(&tokens, &active),
                    Mode::Span => matcher.match_span(&tokens, &active).into_iter().collect(),
                };
                let actual: Vec<ExpectedMatch> =
                    matches.iter().map(ExpectedMatch::from_match).collect();
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect.clone(),
                    actual,
                }
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let (_, mut rejected) = self.build();
        let mut expected = self.rejected.clone();
        rejected.sort();
        expected.sort();
        assert_eq!(
            rejected, expected,
            "Fixture '{}' rejected the wrong commands",
            self.name
        );

        for result in self.run() {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {:?}, got {:?}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: optional fallback
commands:
  - id: go
    phrases: ["go ?[phrase]:found"]
cases:
  - name: present
    transcript: go phrase
    expect:
      - command: go
        captures: { found: phrase }
  - name: absent
    transcript: go
    mode: span
    expect:
      - command: go
        captures: { found: "" }
  - name: miss
    transcript: stop
    expect: []
"#;

    #[test]
    fn parses_and_runs_fixture() {
        let fixture = Fixture::from_yaml(YAML).unwrap();
        assert_eq!(fixture.cases.len(), 3);
        assert_eq!(fixture.cases[1].mode, Mode::Span);
        fixture.run_and_assert();
    }

    #[test]
    fn reports_failing_case() {
        let mut fixture = Fixture::from_yaml(YAML).unwrap();
        fixture.cases[0].expect.clear();

        let results = fixture.run();
        assert!(!results[0].passed);
        assert_eq!(results[0].actual.len(), 1);
        assert!(results[1].passed);
    }

    #[test]
    fn invalid_config_counts_as_rejected() {
        let fixture = Fixture::from_yaml(
            r"
name: rejections
commands:
  - id: ok
    phrases: [ok]
  - id: bad
    phrases: []
  - id: broken
    phrases: ['Number:']
",
        )
        .unwrap();
        let (_, rejected) = fixture.build();
        assert_eq!(rejected, vec!["bad", "broken"]);
    }
}
