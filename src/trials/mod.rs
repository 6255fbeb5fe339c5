//! Attempt-level harness around the draw engine: retry until success, or run many
//! independent attempts and tally how often they dead-end.

pub mod monte_carlo;
pub mod retry;

pub use monte_carlo::{
    run_batch, run_batch_parallel, run_batch_with_progress, BatchOptions, BatchSummary,
};
pub use retry::{draw_with_retries, RetriesExhausted, RetryOutcome};
