//! parla CLI — driving adapter for the parla matcher.
//!
//! Subcommands:
//! - `match <config> [--tags a,b] [--span] [--] words...` — match a transcript
//! - `check <config>` — compile every command, report rejections
//! - `tree <config>` — print the merged command tree
//!
//! Logging goes to stderr and is filtered by `RUST_LOG` (default `warn`).

use std::process;

use parla::prelude::*;
use parla::CommandSetConfig;
use parla_test::WhitespaceTokenizer;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "match" => cmd_match(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "tree" => cmd_tree(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_match(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("match requires a config file path".into());
    }

    let commands = load_commands(&args[0])?;
    let request = parse_match_args(&args[1..])?;
    let trie = build_trie(&commands);

    let lines = run_match(&trie.get(), &request);
    if lines.is_empty() {
        println!("(no match)");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a config file path".into());
    }

    let commands = load_commands(&args[0])?;
    let report = Trie::new().set(&commands);

    if report.is_clean() {
        println!("{} commands valid", report.accepted.len());
        return Ok(());
    }

    for rejection in &report.rejected {
        println!("{}: {}", rejection.id, rejection.error);
    }
    Err(format!(
        "{} of {} commands rejected",
        report.rejected.len(),
        commands.len()
    ))
}

fn cmd_tree(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("tree requires a config file path".into());
    }

    let commands = load_commands(&args[0])?;
    let snapshot = build_trie(&commands).get();
    print!("{snapshot}");
    println!(
        "({} nodes, {} commands)",
        snapshot.node_count(),
        snapshot.command_ids().len()
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Matching
// ═══════════════════════════════════════════════════════════════════════════════

/// A parsed `match` invocation.
#[derive(Debug, Default, PartialEq, Eq)]
struct MatchRequest {
    tags: TagSet,
    span: bool,
    transcript: String,
}

fn build_trie(commands: &[VoiceCommand]) -> Trie {
    let trie = Trie::new();
    let report = trie.set(commands);
    for rejection in &report.rejected {
        eprintln!("warning: skipped {}: {}", rejection.id, rejection.error);
    }
    trie
}

/// One line per match: the command id, then `name=value` captures.
fn run_match(snapshot: &TrieSnapshot, request: &MatchRequest) -> Vec<String> {
    let tokens = WhitespaceTokenizer.tokenize(&request.transcript);
    let matcher = Matcher::new(snapshot);
    let matches = if request.span {
        matcher.match_span(&tokens, &request.tags).into_iter().collect()
    } else {
        matcher.match_transcript(&tokens, &request.tags)
    };

    matches.iter().map(format_match).collect()
}

fn format_match(m: &CommandMatch) -> String {
    let mut line = m.command.to_string();
    for (name, value) in &m.captures {
        line.push_str(&format!(" {name}={value}"));
    }
    line
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_commands(path: &str) -> Result<Vec<VoiceCommand>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    parse_commands(path, &content)
}

fn parse_commands(path: &str, content: &str) -> Result<Vec<VoiceCommand>, String> {
    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config: CommandSetConfig = if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))?
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))?
    };

    tracing::debug!(path, commands = config.commands.len(), "loaded command set");
    config
        .into_commands()
        .map_err(|e| format!("invalid command config: {e}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_match_args(args: &[String]) -> Result<MatchRequest, String> {
    let mut request = MatchRequest::default();
    let mut words: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--tags" => {
                i += 1;
                let list = args
                    .get(i)
                    .ok_or_else(|| "--tags requires a comma-separated list".to_string())?;
                request.tags.extend(
                    list.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(Tag::from),
                );
            }
            "--span" => request.span = true,
            "--" => {
                words.extend(args[i + 1..].iter().map(String::as_str));
                break;
            }
            other if other.starts_with("--") => {
                return Err(format!("unexpected argument \"{other}\""));
            }
            word => words.push(word),
        }
        i += 1;
    }

    request.transcript = words.join(" ");
    Ok(request)
}

fn print_usage() {
    eprintln!(
        "Usage: parla <command> [options]

Commands:
  match <config> [--tags a,b] [--span] [--] words...   Match a transcript
  check <config>                                       Compile and report rejections
  tree <config>                                        Print the command tree
  help                                                 Show this help

Set RUST_LOG=debug for compile and rebuild logging."
    );
}
