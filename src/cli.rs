use std::env;
use std::fmt::Write as _;

use crate::config::{load_config, DrawConfig, CONFIG_ENV_VAR};
use crate::data::{
    load_catalog, read_records, validate_catalog, CandidateCatalog, DEFAULT_CATALOG_PATH,
};
use crate::draw::{entropy_seed, Assignment};
use crate::parallel::WorkerPool;
use crate::trials::{draw_with_retries, run_batch_parallel, BatchOptions};

const USAGE: &str = "usage: groupdraw <draw|batch|validate> [catalog] [options]";
const DEFAULT_MAX_ATTEMPTS: usize = 100;
const DEFAULT_BATCH_ATTEMPTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Draw,
    Batch,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("draw") => Some(Command::Draw),
        Some("batch") => Some(Command::Batch),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Draw) => handle_draw(args),
        Some(Command::Batch) => handle_batch(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_draw(args: &[String]) -> i32 {
    let Some((config, catalog)) = load_inputs(args) else {
        return 1;
    };
    let Some(seed) = resolve_seed(args) else {
        return 1;
    };
    let max_attempts = parse_usize_arg(
        flag_value(args, "--max-attempts"),
        "max-attempts",
        DEFAULT_MAX_ATTEMPTS,
    );

    match draw_with_retries(&catalog, &config, seed, max_attempts) {
        Ok(outcome) => {
            if has_flag(args, "--table") {
                print!("{}", render_table(&outcome.assignment));
                println!("attempts: {}", outcome.attempts);
                0
            } else {
                print_json(&outcome)
            }
        }
        Err(err) => {
            eprintln!("draw failed: {err}");
            if let Some(last) = err.dead_ends.last() {
                eprintln!("last attempt: {last}");
            }
            1
        }
    }
}

fn handle_batch(args: &[String]) -> i32 {
    let Some((config, catalog)) = load_inputs(args) else {
        return 1;
    };
    let Some(base_seed) = resolve_seed(args) else {
        return 1;
    };
    let attempts = parse_usize_arg(positional(args, 3), "attempts", DEFAULT_BATCH_ATTEMPTS);
    let workers = parse_usize_arg(flag_value(args, "--workers"), "workers", 0);

    let options = BatchOptions {
        attempts,
        base_seed,
        pool: WorkerPool::with_workers(workers),
        verify: true,
    };
    let summary = run_batch_parallel(&catalog, &config, &options);

    if has_flag(args, "--table") {
        println!("attempts\tsuccesses\tdead_ends\tdead_end_rate\tinvalid");
        println!(
            "{}\t{}\t{}\t{:.6}\t{}",
            summary.attempts,
            summary.successes,
            summary.dead_ends,
            summary.dead_end_rate,
            summary.invalid_successes
        );
    } else if print_json(&summary) != 0 {
        return 1;
    }

    if summary.invalid_successes > 0 {
        eprintln!(
            "{} successful attempt(s) violated draw invariants",
            summary.invalid_successes
        );
        return 1;
    }
    0
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(config) = resolve_config(args) else {
        return 1;
    };
    let path = catalog_path(args);
    let records = match read_records(path) {
        Ok(records) => records,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    let catalog = CandidateCatalog::from_records(records);
    let report = validate_catalog(&catalog, config.bucket_count());
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    if report.has_errors() {
        eprintln!("validation failed: {} error(s)", report.errors().count());
        return 1;
    }
    println!(
        "validation passed: {path} ({} candidates, {} tiers, {} pairs)",
        catalog.len(),
        catalog.tiers().len(),
        catalog.pairs().len()
    );
    0
}

/// Text rendering of an assignment, one block per group.
pub fn render_table(assignment: &Assignment) -> String {
    let mut out = String::new();
    for group in &assignment.groups {
        let _ = writeln!(out, "Group {} ({})", group.label, group.half.as_str());
        for (index, member) in group.members.iter().enumerate() {
            let _ = writeln!(out, "{} {}", index + 1, member);
        }
        let _ = writeln!(out, "{}", "*".repeat(10));
    }
    let _ = writeln!(out, "seed: {}", assignment.seed);
    out
}

fn load_inputs(args: &[String]) -> Option<(DrawConfig, CandidateCatalog)> {
    let config = resolve_config(args)?;
    let path = catalog_path(args);
    match load_catalog(path, config.bucket_count()) {
        Ok(catalog) => Some((config, catalog)),
        Err(err) => {
            eprintln!("failed to load catalog '{path}': {err}");
            None
        }
    }
}

fn resolve_config(args: &[String]) -> Option<DrawConfig> {
    let path = flag_value(args, "--config")
        .cloned()
        .or_else(|| env::var(CONFIG_ENV_VAR).ok());
    let Some(path) = path else {
        return Some(DrawConfig::default());
    };
    match load_config(&path) {
        Ok(config) => Some(config),
        Err(err) => {
            eprintln!("failed to load config '{path}': {err}");
            None
        }
    }
}

fn resolve_seed(args: &[String]) -> Option<u64> {
    if let Some(raw) = flag_value(args, "--seed") {
        return match raw.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                eprintln!("invalid seed '{raw}'");
                None
            }
        };
    }
    match entropy_seed() {
        Ok(seed) => Some(seed),
        Err(err) => {
            eprintln!("failed to read OS entropy for a seed: {err}");
            None
        }
    }
}

fn catalog_path(args: &[String]) -> &str {
    positional(args, 2)
        .map(String::as_str)
        .unwrap_or(DEFAULT_CATALOG_PATH)
}

/// Positional argument `index`, counting only non-flag arguments and skipping flag values.
fn positional(args: &[String], index: usize) -> Option<&String> {
    let mut plain = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if takes_value(arg) {
                iter.next();
            }
            continue;
        }
        plain.push(arg);
    }
    plain.get(index).copied()
}

fn takes_value(flag: &str) -> bool {
    matches!(flag, "--seed" | "--workers" | "--config" | "--max-attempts")
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize result: {err}");
            1
        }
    }
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
