use std::collections::BTreeMap;
use std::ops::Range;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DrawConfig;
use crate::data::{CandidateCatalog, Tier};
use crate::draw::{attempt_draw, audit, derive_seed, DeadEndReason};
use crate::parallel::{attempt_chunks, WorkerPool};

/// Number of progress-reporting chunks for [run_batch_with_progress].
const PROGRESS_BATCH_COUNT: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub attempts: usize,
    pub base_seed: u64,
    pub pool: WorkerPool,
    /// Re-check every successful attempt with [crate::draw::audit].
    pub verify: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            attempts: 1000,
            base_seed: 0,
            pool: WorkerPool::default(),
            verify: true,
        }
    }
}

/// Per-worker outcome counts. Merging is associative and commutative, so the summary does
/// not depend on how attempts were split across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tally {
    attempts: usize,
    successes: usize,
    invalid_successes: usize,
    dead_ends_by_tier: BTreeMap<Tier, usize>,
    dead_ends_by_reason: BTreeMap<DeadEndReason, usize>,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        self.attempts += other.attempts;
        self.successes += other.successes;
        self.invalid_successes += other.invalid_successes;
        for (tier, count) in other.dead_ends_by_tier {
            *self.dead_ends_by_tier.entry(tier).or_default() += count;
        }
        for (reason, count) in other.dead_ends_by_reason {
            *self.dead_ends_by_reason.entry(reason).or_default() += count;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub attempts: usize,
    pub base_seed: u64,
    pub successes: usize,
    pub dead_ends: usize,
    pub dead_end_rate: f64,
    pub dead_ends_by_tier: BTreeMap<Tier, usize>,
    pub dead_ends_by_reason: BTreeMap<DeadEndReason, usize>,
    /// Successful attempts that failed the audit. Always zero unless the engine is broken.
    pub invalid_successes: usize,
}

impl BatchSummary {
    fn from_tally(tally: Tally, base_seed: u64) -> Self {
        let dead_ends = tally.attempts - tally.successes;
        let dead_end_rate = if tally.attempts == 0 {
            0.0
        } else {
            dead_ends as f64 / tally.attempts as f64
        };
        Self {
            attempts: tally.attempts,
            base_seed,
            successes: tally.successes,
            dead_ends,
            dead_end_rate,
            dead_ends_by_tier: tally.dead_ends_by_tier,
            dead_ends_by_reason: tally.dead_ends_by_reason,
            invalid_successes: tally.invalid_successes,
        }
    }
}

pub fn run_batch(
    catalog: &CandidateCatalog,
    config: &DrawConfig,
    options: &BatchOptions,
) -> BatchSummary {
    run_batch_with_parallelism(catalog, config, options, false)
}

/// Like [run_batch] but distributes attempts across the worker pool via Rayon.
/// The summary is identical to the sequential run for the same options.
pub fn run_batch_parallel(
    catalog: &CandidateCatalog,
    config: &DrawConfig,
    options: &BatchOptions,
) -> BatchSummary {
    run_batch_with_parallelism(catalog, config, options, true)
}

/// Parallel batch in chunks, invoking `on_progress(done, total)` after each chunk.
pub fn run_batch_with_progress<F>(
    catalog: &CandidateCatalog,
    config: &DrawConfig,
    options: &BatchOptions,
    mut on_progress: F,
) -> BatchSummary
where
    F: FnMut(usize, usize),
{
    let total = options.attempts;
    on_progress(0, total);
    let mut tally = Tally::default();
    for chunk in attempt_chunks(total, PROGRESS_BATCH_COUNT) {
        let end = chunk.end;
        let done = options
            .pool
            .install(|| tally_range(catalog, config, options, chunk, true));
        tally = tally.merge(done);
        on_progress(end, total);
    }
    summarize(tally, options)
}

fn run_batch_with_parallelism(
    catalog: &CandidateCatalog,
    config: &DrawConfig,
    options: &BatchOptions,
    parallel: bool,
) -> BatchSummary {
    let tally = if parallel {
        options
            .pool
            .install(|| tally_range(catalog, config, options, 0..options.attempts, true))
    } else {
        tally_range(catalog, config, options, 0..options.attempts, false)
    };
    summarize(tally, options)
}

fn tally_range(
    catalog: &CandidateCatalog,
    config: &DrawConfig,
    options: &BatchOptions,
    indices: Range<usize>,
    parallel: bool,
) -> Tally {
    let record = |mut tally: Tally, index: usize| {
        tally.attempts += 1;
        match attempt_draw(catalog, config, derive_seed(options.base_seed, index as u64)) {
            Ok(assignment) => {
                tally.successes += 1;
                if options.verify && !audit(&assignment, catalog, config).is_empty() {
                    tally.invalid_successes += 1;
                }
            }
            Err(dead_end) => {
                if let Some(tier) = dead_end.tier {
                    *tally.dead_ends_by_tier.entry(tier).or_default() += 1;
                }
                *tally.dead_ends_by_reason.entry(dead_end.reason).or_default() += 1;
            }
        }
        tally
    };

    if parallel {
        indices
            .into_par_iter()
            .fold(Tally::default, record)
            .reduce(Tally::default, Tally::merge)
    } else {
        indices.fold(Tally::default(), record)
    }
}

fn summarize(tally: Tally, options: &BatchOptions) -> BatchSummary {
    let summary = BatchSummary::from_tally(tally, options.base_seed);
    if summary.invalid_successes > 0 {
        warn!(
            invalid = summary.invalid_successes,
            "successful attempts violated draw invariants"
        );
    }
    info!(
        attempts = summary.attempts,
        successes = summary.successes,
        dead_ends = summary.dead_ends,
        rate = summary.dead_end_rate,
        "batch complete"
    );
    summary
}
