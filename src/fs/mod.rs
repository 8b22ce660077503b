//! File system I/O for loading dense multicut instances.
//!
//! Two on-disk shapes are supported: the whitespace text format
//! (`n d` followed by `n * d` floats, row-major) and 2-D float32 NumPy
//! files. The loaders are strict: a count mismatch is an error, not a
//! silent truncation.

mod instance;

pub use instance::Instance;
