use crate::index::AnnIndex;
use crate::numerics::VectorLike;
use crate::sets::TopCandidates;

/// Exact inner-product index: a flat row-major buffer scanned in full on
/// every query.
///
/// The scan touches all stored rows, retired or not, and selects the best
/// `nr_results` through a bounded [`TopCandidates`] pass, so a query costs
/// O(rows · d + rows · log k) and is exact.
pub struct FlatIndex {
    d: usize,
    rows: Vec<f32>,
}

impl FlatIndex {
    pub fn new(d: usize) -> Self {
        assert!(d > 0);
        FlatIndex { d, rows: Vec::new() }
    }

    fn row(&self, id: usize) -> &[f32] {
        &self.rows[id * self.d..(id + 1) * self.d]
    }
}

impl AnnIndex for FlatIndex {
    fn add(&mut self, id: usize, vector: &[f32]) {
        assert_eq!(vector.len(), self.d);
        assert_eq!(id, self.len(), "rows must be appended in id order");
        self.rows.extend_from_slice(vector);
    }

    fn search(&self, query: &[f32], nr_results: usize) -> Vec<(usize, f32)> {
        assert_eq!(query.len(), self.d);
        if self.is_empty() || nr_results == 0 {
            return Vec::new();
        }

        let mut best = TopCandidates::new(nr_results);
        for id in 0..self.len() {
            best.insert(id, self.row(id).dot(query));
        }
        best.into_sorted_vec()
    }

    fn len(&self) -> usize {
        self.rows.len() / self.d
    }
}
