use crate::sets::TotalF32;

/// A bounded selection structure keeping the `k` highest-weight candidates
/// seen so far.
///
/// The flat index scans every stored row and offers each (id, weight) pair
/// to this structure; at the end the survivors are the exact top-k by
/// inner product. Members are kept in descending weight order in a sorted
/// vector, so insertion is a binary search plus a bounded shift.
///
/// # Insertion Semantics
/// - If not full, the candidate is inserted at its sorted position.
/// - If full and the candidate beats the current minimum, the minimum is
///   evicted.
/// - If full and the candidate is no better than the minimum, it is
///   ignored.
pub struct TopCandidates {
    sorted_members: Vec<(TotalF32, usize)>,
    capacity: usize,
}

impl TopCandidates {
    /// Creates an empty selection with room for `capacity` candidates.
    ///
    /// # Panics
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        TopCandidates {
            sorted_members: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Offers one candidate; keeps it only if it ranks among the best `k`
    /// seen so far.
    pub fn insert(&mut self, index: usize, weight: f32) {
        let weight = TotalF32(weight);

        // Find the insertion point in the descending order (O(log k)).
        let idx = self
            .sorted_members
            .partition_point(|&(w, _)| w > weight);

        if self.sorted_members.len() < self.capacity {
            self.sorted_members.insert(idx, (weight, index));
        } else if idx < self.capacity {
            // Full, but the candidate beats the current minimum (last).
            self.sorted_members.pop();
            self.sorted_members.insert(idx, (weight, index));
        }
        // idx == capacity: no better than anything retained; ignore.
    }

    /// Number of candidates currently retained.
    pub fn len(&self) -> usize {
        self.sorted_members.len()
    }

    /// Returns `true` if nothing has been retained yet.
    pub fn is_empty(&self) -> bool {
        self.sorted_members.is_empty()
    }

    /// Consumes the selection, returning `(index, weight)` pairs in
    /// descending weight order.
    pub fn into_sorted_vec(self) -> Vec<(usize, f32)> {
        self.sorted_members
            .into_iter()
            .map(|(w, i)| (i, w.0))
            .collect()
    }
}
