//! Conformance tests that run YAML fixtures against parla
//!
//! Run with: cargo test -p parla-test --test conformance --features parla-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use parla_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The fixtures directory next to this crate's manifest
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    if !dir.exists() {
        panic!("Fixtures directory does not exist: {}", dir.display());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_syntax() {
    run_fixtures_in_dir(&fixtures_dir().join("01_syntax"));
}

#[test]
fn test_backtracking() {
    run_fixtures_in_dir(&fixtures_dir().join("02_backtracking"));
}

#[test]
fn test_tags() {
    run_fixtures_in_dir(&fixtures_dir().join("03_tags"));
}

#[test]
fn test_transcripts() {
    run_fixtures_in_dir(&fixtures_dir().join("04_transcripts"));
}

#[test]
fn test_rejections() {
    run_fixtures_in_dir(&fixtures_dir().join("05_rejections"));
}
