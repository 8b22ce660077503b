use crate::index::AnnIndex;
use crate::numerics::VectorLike;
use crate::sets::BitSet;

/// The growing feature matrix of a solve, together with the liveness of
/// every vertex id and the backing ANN index.
///
/// # Invariants
/// - Row `i` of `features` is the feature vector of vertex id `i`; rows
///   are append-only and immutable once written.
/// - Ids in `[0, 2n)`: the first n are input points, the rest are minted
///   by [`FeatureStore::merge`] in contraction order.
/// - Every id is either active or retired; retirement is monotone. The
///   number of active ids equals n minus the number of merges performed.
/// - For two active ids, the inner product of their rows equals the total
///   weight of original-graph edges between the underlying point sets
///   (the additive contraction algebra).
///
/// The backing index never removes rows, so query results may contain
/// retired ids; every search below is an *expanding* search that doubles
/// the requested result count until enough active non-self hits are found.
pub struct FeatureStore<I: AnnIndex> {
    d: usize,
    features: Vec<f32>,
    active: BitSet,
    nr_active: usize,
    index: I,
    track_dist_offset: bool,
}

impl<I: AnnIndex> FeatureStore<I> {
    /// Builds the store over the n input rows and seeds the backing index
    /// with them.
    ///
    /// When `track_dist_offset` is set, the last of the `d` dimensions
    /// holds √offset and contributes with negated sign to every inner
    /// product computed through this store.
    ///
    /// # Panics
    /// Panics if `features.len() != n * d` or the index is non-empty.
    pub fn new(
        d: usize,
        n: usize,
        mut features: Vec<f32>,
        mut index: I,
        track_dist_offset: bool,
    ) -> Self {
        assert!(d > 0);
        assert_eq!(features.len(), n * d);
        assert!(index.is_empty());

        let max_ids = 2 * n;
        let mut active = BitSet::new(max_ids.max(1));
        for i in 0..n {
            index.add(i, &features[i * d..(i + 1) * d]);
            active.set_bit(i);
        }

        // Room for the rows the n - 1 possible merges will append.
        features.reserve(n.saturating_sub(1) * d);

        FeatureStore {
            d,
            features,
            active,
            nr_active: n,
            index,
            track_dist_offset,
        }
    }

    fn nr_appended(&self) -> usize {
        self.features.len() / self.d
    }

    /// The stored feature row of `id` (active or retired).
    pub fn features_of(&self, id: usize) -> &[f32] {
        assert!(id < self.nr_appended());
        &self.features[id * self.d..(id + 1) * self.d]
    }

    /// Copy of the row of `node` prepared for an ANN query: with offset
    /// tracking, the last coordinate is negated so the index's plain dot
    /// product comes out as the offset-corrected weight.
    fn query_vector(&self, node: usize) -> Vec<f32> {
        let mut q = self.features_of(node).to_vec();
        if self.track_dist_offset {
            let last = q.len() - 1;
            q[last] = -q[last];
        }
        q
    }

    /// Contracts the edge `{i, j}`: retires both ids, appends the
    /// element-wise sum row under a fresh id, registers it with the
    /// backing index and returns the fresh id.
    ///
    /// # Panics
    /// Panics if `i == j` or either operand is not active (driver bug).
    pub fn merge(&mut self, i: usize, j: usize) -> usize {
        assert_ne!(i, j);
        assert!(self.node_active(i), "merge() with retired node {i}");
        assert!(self.node_active(j), "merge() with retired node {j}");

        let new_id = self.nr_appended();
        assert!(new_id < self.active.capacity(), "no free vertex ids left");

        self.active.clear_bit(i);
        self.active.clear_bit(j);

        let merged = self.features_of(i).added(self.features_of(j));
        self.features.extend_from_slice(&merged);
        self.index.add(new_id, &merged);
        self.active.set_bit(new_id);
        self.nr_active -= 1;

        new_id
    }

    /// Retires `i` without a merge.
    ///
    /// # Panics
    /// Panics if `i` is already retired (driver bug).
    pub fn remove(&mut self, i: usize) {
        assert!(self.node_active(i), "remove() with retired node {i}");
        self.active.clear_bit(i);
        self.nr_active -= 1;
    }

    /// Inner product of the stored rows of `i` and `j`, with the last
    /// dimension negated under offset tracking.
    ///
    /// Retired operands are deliberately permitted: rows are immutable,
    /// and the incremental k-NN update computes weights against endpoints
    /// that have just been retired by the merge it is processing.
    pub fn inner_product(&self, i: usize, j: usize) -> f32 {
        let x = self.features_of(i).dot(self.features_of(j));
        if self.track_dist_offset {
            let li = self.features[(i + 1) * self.d - 1];
            let lj = self.features[(j + 1) * self.d - 1];
            // The plain dot counted +li*lj; the offset term must enter
            // negatively, hence the factor of two.
            x - 2.0 * li * lj
        } else {
            x
        }
    }

    /// The active neighbor of `node` with the highest edge weight, and
    /// that weight.
    ///
    /// # Panics
    /// Panics if `node` is inactive, or if no active non-self neighbor
    /// exists even at full index size; the latter can only happen when
    /// fewer than two active vertices remain and indicates a driver bug.
    pub fn nearest(&self, node: usize) -> (usize, f32) {
        assert!(self.node_active(node), "nearest() for retired node {node}");

        let query = self.query_vector(node);
        let total = self.index.len();
        let mut lookups: usize = 2;
        loop {
            let nr = lookups.min(total);
            for (id, w) in self.index.search(&query, nr) {
                if id != node && self.node_active(id) {
                    return (id, w);
                }
            }
            if nr == total {
                break;
            }
            lookups *= 2;
        }
        panic!(
            "no active nearest neighbor for node {node}: fewer than two active vertices remain"
        );
    }

    /// Batch 1-NN: the best active partner of every queried node.
    pub fn nearest_nodes(&self, nodes: &[usize]) -> Vec<(usize, f32)> {
        assert!(!nodes.is_empty());
        nodes.iter().map(|&v| self.nearest(v)).collect()
    }

    /// Batch top-k: for each queried node, its k best active distinct
    /// partners in descending weight order. Every returned list has
    /// exactly `k` entries.
    ///
    /// # Panics
    /// Panics if some query cannot be satisfied even at full index size;
    /// callers must clamp `k` to `nr_nodes() - 1`.
    pub fn nearest_k(&self, nodes: &[usize], k: usize) -> Vec<Vec<(usize, f32)>> {
        assert!(k > 0);
        nodes.iter().map(|&v| self.nearest_k_one(v, k)).collect()
    }

    fn nearest_k_one(&self, node: usize, k: usize) -> Vec<(usize, f32)> {
        assert!(self.node_active(node), "nearest_k() for retired node {node}");

        let query = self.query_vector(node);
        let total = self.index.len();
        let mut lookups = k + 1;
        loop {
            let nr = lookups.min(total);
            let kept: Vec<(usize, f32)> = self
                .index
                .search(&query, nr)
                .into_iter()
                .filter(|&(id, _)| id != node && self.node_active(id))
                .take(k)
                .collect();
            if kept.len() == k {
                return kept;
            }
            if nr == total {
                panic!(
                    "only {} of {k} active neighbors exist for node {node}: \
                     k must not exceed the number of other active vertices",
                    kept.len()
                );
            }
            lookups *= 2;
        }
    }

    /// Whether `idx` is currently active.
    ///
    /// # Panics
    /// Panics if `idx` was never appended.
    pub fn node_active(&self, idx: usize) -> bool {
        assert!(idx < self.nr_appended());
        self.active.get_bit(idx)
    }

    /// Number of currently active vertices.
    pub fn nr_nodes(&self) -> usize {
        self.nr_active
    }

    /// Highest id handed out so far.
    pub fn max_id(&self) -> usize {
        assert!(self.nr_appended() > 0);
        self.nr_appended() - 1
    }

    /// All currently active ids, ascending.
    pub fn active_ids(&self) -> Vec<usize> {
        (0..self.nr_appended())
            .filter(|&i| self.active.get_bit(i))
            .collect()
    }

    pub fn dim(&self) -> usize {
        self.d
    }

    pub fn track_dist_offset(&self) -> bool {
        self.track_dist_offset
    }
}
