//! Sparse k-nearest-neighbor graph maintained across contractions.
//!
//! The incremental solver variant avoids re-querying the ANN index after
//! every contraction: it keeps a symmetric weighted adjacency of each
//! active vertex to (up to) its k best partners and patches that graph
//! locally when two vertices merge.

mod incremental;

pub use incremental::IncrementalNns;
