//! Counters and summaries describing a solve.
//!
//! The solvers track how much work the contraction loop actually did;
//! the binary turns a finished labeling into a serializable run summary.

mod stats;

pub use stats::{RunSummary, SolveStats};
