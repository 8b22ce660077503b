//! Numerical kernels for feature-vector computations.
//!
//! Dense multicut edge weights are plain inner products between stored
//! feature rows, and contracting an edge sums the two feature rows
//! element-wise. Both kernels live here, exposed as an extension trait
//! over `[f32]`.

mod f32slice;

pub use f32slice::VectorLike;
