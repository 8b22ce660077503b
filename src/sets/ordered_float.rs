use std::{cmp::Ordering, hash::Hash, hash::Hasher};

/// A wrapper around f32 that provides total ordering and proper equality
/// semantics.
///
/// Standard f32 does not implement `Ord` or `Eq` due to NaN values and
/// signed zeros. This wrapper uses bit-level comparison so edge weights can
/// be compared under a total order and used as heap keys.
#[derive(Debug, Copy, Clone)]
#[repr(transparent)]
pub struct TotalF32(pub f32);

impl PartialEq for TotalF32 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for TotalF32 {}

impl PartialOrd for TotalF32 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF32 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f32> for TotalF32 {
    fn from(x: f32) -> Self {
        TotalF32(x)
    }
}

impl Hash for TotalF32 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}
