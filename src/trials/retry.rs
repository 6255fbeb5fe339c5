use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::DrawConfig;
use crate::data::CandidateCatalog;
use crate::draw::{attempt_draw, derive_seed, Assignment, DeadEnd};

#[derive(Debug, Clone, Serialize)]
pub struct RetryOutcome {
    pub assignment: Assignment,
    /// Attempts used, including the successful one.
    pub attempts: usize,
    pub dead_ends: Vec<DeadEnd>,
}

#[derive(Debug, Error)]
#[error("no complete draw after {attempts} attempt(s)")]
pub struct RetriesExhausted {
    pub attempts: usize,
    pub dead_ends: Vec<DeadEnd>,
}

/// Discard dead-ended attempts and start over from an empty state, up to `max_attempts`
/// (at least one). Attempt `i` uses `derive_seed(seed, i)`; the winning seed is kept on the
/// assignment so the result can be replayed with [attempt_draw].
pub fn draw_with_retries(
    catalog: &CandidateCatalog,
    config: &DrawConfig,
    seed: u64,
    max_attempts: usize,
) -> Result<RetryOutcome, RetriesExhausted> {
    let attempts = max_attempts.max(1);
    let mut dead_ends = Vec::new();
    for index in 0..attempts {
        match attempt_draw(catalog, config, derive_seed(seed, index as u64)) {
            Ok(assignment) => {
                return Ok(RetryOutcome {
                    assignment,
                    attempts: index + 1,
                    dead_ends,
                })
            }
            Err(dead_end) => {
                debug!(attempt = index + 1, %dead_end, "attempt discarded");
                dead_ends.push(dead_end);
            }
        }
    }
    Err(RetriesExhausted {
        attempts,
        dead_ends,
    })
}
