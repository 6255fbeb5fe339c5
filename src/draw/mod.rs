//! Constrained random assignment of candidates into buckets.
//!
//! [run_draw] sequences tiers through [RoundDrawer], which combines [LegalityFilter] and
//! [FeasibilityProjector] for each pick and commits into [DrawState]. A [DeadEnd] aborts the
//! whole attempt; there is no backtracking over committed placements.

pub mod audit;
pub mod dead_end;
pub mod feasibility;
pub mod halves;
pub mod legality;
pub mod orchestrator;
pub mod rng;
pub mod round;
pub mod state;

pub use audit::{audit, Violation};
pub use dead_end::{DeadEnd, DeadEndReason};
pub use feasibility::FeasibilityProjector;
pub use halves::{plan_halves, HalfPlan};
pub use legality::LegalityFilter;
pub use orchestrator::{attempt_draw, run_draw, Assignment, GroupAssignment};
pub use rng::{derive_seed, entropy_seed, Rng};
pub use round::RoundDrawer;
pub use state::{Bucket, BucketId, DrawState};
