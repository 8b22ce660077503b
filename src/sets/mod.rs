//! Specialized data structures backing the contraction loop.
//!
//! # Main Components
//!
//! - [`TotalF32`]: total-order wrapper so edge weights can live in heaps
//! - [`BitSet`]: packed active-vertex bitmap
//! - [`UnionFind`]: disjoint-set forest tracking cluster membership
//! - [`TopCandidates`]: bounded best-k selection for the flat scan
//! - [`EdgeQueue`]: max-heap of candidate edges with lazy staleness

mod bitset;
mod edge_queue;
mod ordered_float;
mod top_candidates;
mod union_find;

pub use bitset::BitSet;
pub use edge_queue::{ContractionEdge, EdgeQueue};
pub use ordered_float::TotalF32;
pub use top_candidates::TopCandidates;
pub use union_find::UnionFind;
