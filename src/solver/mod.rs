//! The greedy additive edge contraction solvers.
//!
//! All variants share the same contract: given n feature rows of
//! dimension d they return one cluster label per input row, obtained by
//! repeatedly contracting the highest-weight positive edge of the
//! complete inner-product graph. They differ in how that edge is found:
//!
//! - [`gaec_adj_matrix`]: full O(n²) weight matrix, the exact reference
//! - [`gaec_flat_index`] / [`gaec_hnsw`]: 1-NN queries against a feature
//!   store, exact resp. approximate
//! - [`gaec_incremental_nn`]: a locally patched k-NN graph instead of
//!   per-contraction queries
//! - [`gaec_parallel_flat_index`] / [`gaec_parallel_hnsw`]: one greedy
//!   matching worth of contractions per round

mod adj_matrix;
mod cost;
mod incremental;
mod matching;
mod parallel;
mod sequential;

pub use adj_matrix::gaec_adj_matrix;
pub use cost::{append_dist_offset, cost_disconnected, cost_of_labeling};
pub use incremental::gaec_incremental_nn;
pub use matching::greedy_maximum_matching;
pub use parallel::{gaec_parallel_flat_index, gaec_parallel_hnsw};
pub use sequential::{gaec_flat_index, gaec_hnsw};
