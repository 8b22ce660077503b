use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use tracing::debug;

use crate::index::{AnnIndex, FeatureStore};
use crate::sets::TotalF32;

/// How many candidate neighbors a merged vertex may keep, as a multiple
/// of k.
const MERGE_CANDIDATE_FACTOR: usize = 10;

/// Symmetric weighted k-NN adjacency over the vertex id space, updated
/// locally on every contraction.
///
/// # Invariants
/// - Symmetry: `adjacency[a]` contains `b` iff `adjacency[b]` contains
///   `a`, with the same weight.
/// - Only non-negative weights are ever stored. This keeps `min_in_knn[v]`,
///   the smallest weight ever inserted at `v`, a valid upper bound on the
///   weight from `v` to any vertex outside its lists.
pub struct IncrementalNns {
    adjacency: Vec<HashMap<usize, f32>>,
    k: usize,
    min_in_knn: Vec<f32>,
}

impl IncrementalNns {
    /// Builds the graph from an initial k-NN sweep: `answers[c]` is the
    /// neighbor list of `query_nodes[c]` as returned by
    /// [`FeatureStore::nearest_k`]. Negative-weight neighbors are skipped.
    ///
    /// The id space is sized for `2 * n` vertices so merged ids can be
    /// addressed directly.
    pub fn new(query_nodes: &[usize], answers: &[Vec<(usize, f32)>], n: usize, k: usize) -> Self {
        assert!(k > 0);
        assert_eq!(query_nodes.len(), answers.len());

        let mut graph = IncrementalNns {
            adjacency: vec![HashMap::new(); 2 * n],
            k,
            min_in_knn: vec![f32::INFINITY; 2 * n],
        };

        for (&q, list) in query_nodes.iter().zip(answers) {
            for &(nn, w) in list {
                if w >= 0.0 {
                    graph.insert_edge(q, nn, w);
                }
            }
        }

        graph
    }

    /// Inserts the undirected edge `{a, b}` unless it is already known.
    /// Returns `true` if anything was inserted.
    fn insert_edge(&mut self, a: usize, b: usize, w: f32) -> bool {
        let mut inserted = false;
        if let Entry::Vacant(e) = self.adjacency[a].entry(b) {
            e.insert(w);
            inserted = true;
            if w < self.min_in_knn[a] {
                self.min_in_knn[a] = w;
            }
        }
        if let Entry::Vacant(e) = self.adjacency[b].entry(a) {
            e.insert(w);
            inserted = true;
            if w < self.min_in_knn[b] {
                self.min_in_knn[b] = w;
            }
        }
        inserted
    }

    /// Replaces the just-merged `i` and `j` by `new_id` in the graph and
    /// returns the adjacency of `new_id` with combined edge weights.
    ///
    /// Must be called directly after `store.merge(i, j)` returned
    /// `new_id`: `i` and `j` are retired but their rows still back the
    /// inner products computed here.
    ///
    /// For a neighbor in both lists the combined weight is the exact sum
    /// of the two stored weights; for a one-sided neighbor the missing
    /// half costs one inner product. Candidates are capped at 10·k (both-
    /// sided ones first) and certified against the outside bound
    /// U(i) + U(j); when nothing certifies, a global k-NN query on
    /// `new_id` keeps the driver from missing the true best partner.
    pub fn merge_nodes<I: AnnIndex>(
        &mut self,
        i: usize,
        j: usize,
        new_id: usize,
        store: &FeatureStore<I>,
    ) -> HashMap<usize, f32> {
        let (root, other) = if self.adjacency[i].len() >= self.adjacency[j].len() {
            (i, j)
        } else {
            (j, i)
        };

        let root_adj = std::mem::take(&mut self.adjacency[root]);
        let other_adj = std::mem::take(&mut self.adjacency[other]);

        // Neighbors present in both lists get exact sums and the first
        // claim on the candidate cap.
        let mut joint: Vec<(usize, f32)> = Vec::new();
        let mut single: Vec<(usize, f32)> = Vec::new();

        for (&nn, &cost_root) in &root_adj {
            if nn == other {
                continue;
            }
            if let Some(&cost_other) = other_adj.get(&nn) {
                joint.push((nn, cost_root + cost_other));
            } else {
                let w = cost_root + store.inner_product(nn, other);
                if w > 0.0 {
                    single.push((nn, w));
                }
            }
            self.adjacency[nn].remove(&root);
        }

        for (&nn, &cost_other) in &other_adj {
            if nn == root {
                continue;
            }
            if !root_adj.contains_key(&nn) {
                let w = cost_other + store.inner_product(nn, root);
                if w > 0.0 {
                    single.push((nn, w));
                }
            }
            self.adjacency[nn].remove(&other);
        }

        // Outside bound: any vertex absent from both lists has weight at
        // most U(root) to one endpoint and U(other) to the other, so a
        // kept candidate at or above their sum certifiably dominates
        // everything not inspected here.
        let outside_bound = self.min_in_knn[root] + self.min_in_knn[other];
        let cap = MERGE_CANDIDATE_FACTOR * self.k;

        joint.sort_by(|a, b| TotalF32(b.1).cmp(&TotalF32(a.1)));
        single.sort_by(|a, b| TotalF32(b.1).cmp(&TotalF32(a.1)));

        let mut nn_ij: HashMap<usize, f32> = HashMap::new();
        for (nn, w) in joint.into_iter().chain(single) {
            if nn_ij.len() >= cap {
                break;
            }
            if w >= outside_bound && w > 0.0 {
                nn_ij.insert(nn, w);
            }
        }

        if nn_ij.is_empty() {
            // Nothing certified: the best partner of the merged vertex may
            // live outside both lists. Ask the index directly.
            let k_search = self.k.min(store.nr_nodes().saturating_sub(1));
            if k_search > 0 {
                debug!(
                    nr_nodes = store.nr_nodes(),
                    "no certified candidate after merge, falling back to a global search"
                );
                let answers = store.nearest_k(&[new_id], k_search);
                for &(nn, w) in &answers[0] {
                    if w > 0.0 {
                        nn_ij.insert(nn, w);
                    }
                }
            }
        }

        // Wire the merged vertex in, both directions.
        for (&nn, &w) in &nn_ij {
            self.insert_edge(new_id, nn, w);
        }

        nn_ij
    }

    /// Fresh k-NN sweep over all active vertices, merging unseen edges
    /// into the graph. Returns the positive-weight edges that were not
    /// previously known; an empty result means the graph already knew
    /// every positive edge the index can surface.
    pub fn recheck_possible_contractions<I: AnnIndex>(
        &mut self,
        store: &FeatureStore<I>,
    ) -> Vec<(usize, usize, f32)> {
        let active = store.active_ids();
        if active.len() < 2 {
            return Vec::new();
        }

        let k = self.k.min(active.len() - 1);
        let answers = store.nearest_k(&active, k);

        let mut found = Vec::new();
        for (&q, list) in active.iter().zip(&answers) {
            for &(nn, w) in list {
                if w > 0.0 && self.insert_edge(q, nn, w) {
                    found.push((q, nn, w));
                }
            }
        }
        found
    }

    /// Current neighbors of `v` with their stored weights.
    pub fn neighbors(&self, v: usize) -> &HashMap<usize, f32> {
        &self.adjacency[v]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FlatIndex;

    fn store_of(features: Vec<f32>, n: usize, d: usize) -> FeatureStore<FlatIndex> {
        FeatureStore::new(d, n, features, FlatIndex::new(d), false)
    }

    fn knn_graph(store: &FeatureStore<FlatIndex>, n: usize, k: usize) -> IncrementalNns {
        let queries: Vec<usize> = (0..n).collect();
        let answers = store.nearest_k(&queries, k);
        IncrementalNns::new(&queries, &answers, n, k)
    }

    fn assert_symmetric(graph: &IncrementalNns, nr_ids: usize) {
        for a in 0..nr_ids {
            for (&b, &w) in graph.neighbors(a) {
                let back = graph.neighbors(b).get(&a);
                assert_eq!(back, Some(&w), "asymmetric edge {a} <-> {b}");
            }
        }
    }

    #[test]
    fn construction_is_symmetric() {
        let store = store_of(
            vec![1.0, 0.2, 1.0, 0.1, 0.2, 1.0, 0.1, 1.0],
            4,
            2,
        );
        let graph = knn_graph(&store, 4, 2);
        assert_symmetric(&graph, 8);
    }

    #[test]
    fn negative_weights_stay_out_of_the_graph() {
        // Opposite vectors: both pairwise weights are negative.
        let store = store_of(vec![1.0, 0.0, -1.0, 0.0], 2, 2);
        let graph = knn_graph(&store, 2, 1);
        assert!(graph.neighbors(0).is_empty());
        assert!(graph.neighbors(1).is_empty());
    }

    #[test]
    fn merge_sums_joint_neighbors_exactly() {
        // Triangle where every vertex lists both others (k = 2).
        let features = vec![1.0, 0.0, 1.0, 0.1, 0.5, 0.5];
        let mut store = store_of(features, 3, 2);
        let mut graph = knn_graph(&store, 3, 2);

        let w02 = store.inner_product(0, 2);
        let w12 = store.inner_product(1, 2);

        let new_id = store.merge(0, 1);
        let nn_ij = graph.merge_nodes(0, 1, new_id, &store);

        let combined = nn_ij.get(&2).copied().expect("vertex 2 must survive the merge");
        assert!((combined - (w02 + w12)).abs() < 1e-6);

        // The retired endpoints are gone from every adjacency.
        assert!(graph.neighbors(2).get(&0).is_none());
        assert!(graph.neighbors(2).get(&1).is_none());
        assert_eq!(graph.neighbors(2).get(&new_id), Some(&combined));
        assert_symmetric(&graph, 6);
    }

    #[test]
    fn merge_with_no_positive_partner_yields_empty_adjacency() {
        // Two orthogonal pairs: after merging one pair there is nothing
        // positive left for it, and the global fallback confirms that.
        let features = vec![2.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 1.0];
        let mut store = store_of(features, 4, 2);
        let mut graph = knn_graph(&store, 4, 1);

        let new_id = store.merge(0, 1);
        let nn_ij = graph.merge_nodes(0, 1, new_id, &store);

        assert!(nn_ij.is_empty());
        assert!(graph.neighbors(new_id).is_empty());
    }

    #[test]
    fn merge_falls_back_to_global_search_when_lists_are_blind() {
        // k = 1, so each vertex only lists its twin; the merged pair's
        // true partner sits outside both lists and must be found by the
        // fallback sweep.
        let features = vec![
            1.0, 0.0, // 0
            0.9, 0.1, // 1, twin of 0
            0.5, 0.8, // 2, positive to everything
            0.4, 0.9, // 3, twin of 2
        ];
        let mut store = store_of(features, 4, 1);
        let mut graph = knn_graph(&store, 4, 1);

        let new_id = store.merge(0, 1);
        let nn_ij = graph.merge_nodes(0, 1, new_id, &store);

        assert!(!nn_ij.is_empty());
        for (&nn, &w) in &nn_ij {
            assert!(store.node_active(nn));
            assert!(w > 0.0);
            assert!((w - store.inner_product(new_id, nn)).abs() < 1e-5);
        }
        assert_symmetric(&graph, 8);
    }

    #[test]
    fn recheck_surfaces_unknown_edges_once() {
        let features = vec![
            1.0, 0.2, // 0
            1.0, 0.1, // 1
            0.2, 1.0, // 2
            0.1, 1.0, // 3
        ];
        let store = store_of(features, 4, 2);

        // Seed the graph with truncated answers (only each vertex's top-1)
        // so the cross edges are unknown.
        let queries: Vec<usize> = (0..4).collect();
        let mut answers = store.nearest_k(&queries, 2);
        for list in &mut answers {
            list.truncate(1);
        }
        let mut graph = IncrementalNns::new(&queries, &answers, 4, 2);

        let found = graph.recheck_possible_contractions(&store);
        assert!(!found.is_empty());
        for &(a, b, w) in &found {
            assert!(w > 0.0);
            assert!((w - store.inner_product(a, b)).abs() < 1e-6);
        }
        assert_symmetric(&graph, 8);

        // Everything the index can surface is now known.
        let again = graph.recheck_possible_contractions(&store);
        assert!(again.is_empty());
    }
}
