//! # Densecut: Greedy Additive Edge Contraction for Dense Multicut
//!
//! This library computes heuristic multicut solutions on the *complete*
//! similarity graph of n points in R^d, where the weight of every edge
//! (i, j) is the inner product of the two feature vectors. Clusters are
//! grown by repeatedly contracting the highest-weight positive edge;
//! contracting sums the endpoint features, so the weight from the merged
//! vertex to any third vertex is exactly the sum of the two prior weights.
//!
//! ## Core Concepts
//!
//! - **Feature store**: the growing, append-only feature matrix; merged
//!   vertices get fresh ids, retired ids are filtered by an active bitmap
//! - **Expanding search**: the ANN backings never delete rows, so every
//!   nearest-neighbor query doubles its result count until enough active
//!   hits surface
//! - **Incremental k-NN graph**: a sparse neighbor view patched locally
//!   per contraction, trading exactness for far fewer index queries
//! - **Greedy matching**: the parallel variant contracts a vertex-disjoint
//!   batch of edges per round
//!
//! ## Modules
//!
//! - [`solver`]: the five contraction drivers and the cost accounting
//! - [`index`]: feature store, flat and HNSW inner-product indices
//! - [`knn`]: the incrementally maintained k-NN graph
//! - [`sets`]: union-find, edge heap, bitmap and selection primitives
//! - [`fs`]: instance loading (whitespace text and `.npy`)
//! - [`numerics`]: dot-product and feature-sum kernels
//! - [`statistics`]: solve counters and run summaries

pub mod error;
pub mod fs;
pub mod index;
pub mod knn;
pub mod numerics;
pub mod sets;
pub mod solver;
pub mod statistics;

pub use error::Error;
pub use index::IndexKind;
pub use solver::{
    append_dist_offset, cost_disconnected, cost_of_labeling, gaec_adj_matrix, gaec_flat_index,
    gaec_hnsw, gaec_incremental_nn, gaec_parallel_flat_index, gaec_parallel_hnsw,
};
