use tracing::{debug, info};

use crate::index::{AnnIndex, FeatureStore, FlatIndex, HnswIndex};
use crate::sets::{EdgeQueue, UnionFind};
use crate::solver::cost::cost_disconnected;
use crate::statistics::SolveStats;

/// Greedy additive edge contraction with exact 1-NN queries against a
/// flat index. Produces the same partitions as [`super::gaec_adj_matrix`]
/// (up to ties) without ever holding the n² weight matrix.
pub fn gaec_flat_index(n: usize, d: usize, features: Vec<f32>, track_dist_offset: bool) -> Vec<usize> {
    if n < 2 {
        return (0..n).collect();
    }
    info!("dense gaec with flat index");
    gaec_sequential_impl(n, d, features, FlatIndex::new(d), track_dist_offset, "flat")
}

/// Greedy additive edge contraction with approximate 1-NN queries against
/// an HNSW index. Faster on large instances, at the price of occasionally
/// contracting a near-best edge instead of the best one.
pub fn gaec_hnsw(n: usize, d: usize, features: Vec<f32>, track_dist_offset: bool) -> Vec<usize> {
    if n < 2 {
        return (0..n).collect();
    }
    info!("dense gaec with hnsw index");
    gaec_sequential_impl(n, d, features, HnswIndex::new(d), track_dist_offset, "hnsw")
}

fn gaec_sequential_impl<I: AnnIndex>(
    n: usize,
    d: usize,
    features: Vec<f32>,
    index: I,
    track_dist_offset: bool,
    index_name: &str,
) -> Vec<usize> {
    assert_eq!(features.len(), n * d);
    if n < 2 {
        return (0..n).collect();
    }

    info!("[dense gaec {index_name}] find multicut for {n} nodes with features of dimension {d}");
    let mut multicut_cost = cost_disconnected(n, d, &features, track_dist_offset);
    let mut stats = SolveStats::new();

    let mut store = FeatureStore::new(d, n, features, index, track_dist_offset);

    let max_nr_ids = 2 * n;
    let mut uf = UnionFind::new(max_nr_ids);

    let mut pq = EdgeQueue::new();
    // Reverse hints: pq_pair[x] holds the vertices whose queue entries
    // point at x. When x retires they all need a fresh query.
    let mut pq_pair: Vec<Vec<u32>> = vec![Vec::new(); max_nr_ids];

    {
        let all_indices: Vec<usize> = (0..n).collect();
        let nns = store.nearest_nodes(&all_indices);
        stats.bump_nn_queries(n);
        for (i, &(nn, w)) in nns.iter().enumerate() {
            if w > 0.0 {
                pq.push(i, nn, w);
                pq_pair[nn].push(i as u32);
                stats.bump_pq_pushes(1);
            }
        }
    }

    // Iteratively contract the highest-weight positive edge.
    while let Some(edge) = pq.pop() {
        let [i, j] = edge.nodes;
        let w = edge.weight.0;
        debug_assert!(w > 0.0);
        // The edge survives only if neither endpoint was contracted away.
        if !store.node_active(i) || !store.node_active(j) {
            continue;
        }

        debug!("[dense gaec {index_name}] contracting edge {i} and {j} with cost {w}");
        let new_id = store.merge(i, j);
        uf.union(i, new_id);
        uf.union(j, new_id);
        multicut_cost -= w as f64;
        stats.bump_contractions();

        if store.nr_nodes() > 1 {
            // Re-query the merged vertex plus everyone whose pending entry
            // pointed at a now-retired endpoint.
            let mut new_query = vec![new_id];
            for &k in pq_pair[i].iter().chain(pq_pair[j].iter()) {
                if store.node_active(k as usize) {
                    new_query.push(k as usize);
                }
            }
            pq_pair[i].clear();
            pq_pair[j].clear();

            let answers = store.nearest_nodes(&new_query);
            stats.bump_nn_queries(new_query.len());
            for (&q, &(nn, w_new)) in new_query.iter().zip(&answers) {
                if w_new > 0.0 {
                    pq.push(nn, q, w_new);
                    pq_pair[nn].push(q as u32);
                    stats.bump_pq_pushes(1);
                }
            }
        }
    }

    let nr_clusters = uf.count() - (max_nr_ids - store.max_id() - 1);
    info!("[dense gaec {index_name}] final nr clusters = {nr_clusters}");
    info!("[dense gaec {index_name}] final multicut cost = {multicut_cost}");
    debug!(?stats, "[dense gaec {index_name}] solve finished");

    (0..n).map(|i| uf.find(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::cost::cost_of_labeling;
    use crate::solver::{append_dist_offset, gaec_adj_matrix};
    use rand::prelude::*;

    fn canonical(labels: &[usize]) -> Vec<usize> {
        let mut map = std::collections::HashMap::new();
        labels
            .iter()
            .map(|&l| {
                let next = map.len();
                *map.entry(l).or_insert(next)
            })
            .collect()
    }

    fn random_features(n: usize, d: usize, seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n * d).map(|_| rng.random_range(-1.0..1.0)).collect()
    }

    fn assert_valid_labeling(labels: &[usize], n: usize) {
        assert_eq!(labels.len(), n);
        for &l in labels {
            assert!(l < 2 * n.max(1));
        }
    }

    #[test]
    fn two_orthogonal_pairs_form_two_clusters() {
        let features = vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
        for labels in [
            gaec_flat_index(4, 2, features.clone(), false),
            gaec_hnsw(4, 2, features.clone(), false),
        ] {
            assert_eq!(canonical(&labels), vec![0, 0, 1, 1]);
        }
    }

    #[test]
    fn nonpositive_weights_keep_singletons() {
        let features = vec![1.0, 0.0, 0.0, 1.0, -1.0, 0.0];
        for labels in [
            gaec_flat_index(3, 2, features.clone(), false),
            gaec_hnsw(3, 2, features.clone(), false),
        ] {
            assert_eq!(canonical(&labels), vec![0, 1, 2]);
        }
    }

    #[test]
    fn objective_is_fully_recovered_on_the_two_pair_instance() {
        let features = vec![2.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 1.0];
        let labels = gaec_flat_index(4, 2, features.clone(), false);
        assert_eq!(canonical(&labels), vec![0, 0, 1, 1]);
        let final_cost = cost_of_labeling(4, 2, &features, &labels, false);
        assert!((final_cost - 0.0).abs() < 1e-6);
    }

    #[test]
    fn offset_half_keeps_the_same_partition() {
        let base = vec![2.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 1.0];
        let features = append_dist_offset(&base, 0.5, 4, 2).unwrap();
        let labels = gaec_flat_index(4, 3, features, true);
        assert_eq!(canonical(&labels), vec![0, 0, 1, 1]);
    }

    #[test]
    fn offset_zero_equals_no_offset_tracking() {
        let base = random_features(30, 8, 11);
        let with_column = append_dist_offset(&base, 0.0, 30, 8).unwrap();

        let plain = gaec_flat_index(30, 8, base, false);
        let tracked = gaec_flat_index(30, 9, with_column, true);
        assert_eq!(canonical(&plain), canonical(&tracked));
    }

    #[test]
    fn boundary_sizes() {
        assert!(gaec_flat_index(0, 4, vec![], false).is_empty());
        assert_eq!(gaec_flat_index(1, 2, vec![1.0, 2.0], false), vec![0]);

        let joined = gaec_flat_index(2, 1, vec![1.0, 2.0], false);
        assert_eq!(joined[0], joined[1]);
        let split = gaec_flat_index(2, 1, vec![1.0, -2.0], false);
        assert_ne!(split[0], split[1]);
    }

    #[test]
    fn identical_positive_features_collapse_to_one_cluster() {
        let features = vec![[1.0f32, 2.0]; 8].concat();
        for labels in [
            gaec_flat_index(8, 2, features.clone(), false),
            gaec_hnsw(8, 2, features.clone(), false),
        ] {
            assert!(labels.iter().all(|&l| l == labels[0]));
        }
    }

    #[test]
    fn flat_index_matches_the_adjacency_matrix_reference() {
        let n = 100;
        let d = 64;
        let features = random_features(n, d, 0);

        let reference = gaec_adj_matrix(n, d, features.clone(), false);
        let flat = gaec_flat_index(n, d, features, false);

        assert_valid_labeling(&flat, n);
        assert_eq!(canonical(&reference), canonical(&flat));
    }

    #[test]
    fn solving_twice_is_deterministic() {
        let features = random_features(60, 16, 5);
        let a = gaec_hnsw(60, 16, features.clone(), false);
        let b = gaec_hnsw(60, 16, features, false);
        assert_eq!(a, b);
    }

    #[test]
    fn hnsw_objective_is_close_to_exact() {
        let n = 100;
        let d = 64;
        let features = random_features(n, d, 0);

        let exact_labels = gaec_adj_matrix(n, d, features.clone(), false);
        let hnsw_labels = gaec_hnsw(n, d, features.clone(), false);
        assert_valid_labeling(&hnsw_labels, n);

        let exact_cost = cost_of_labeling(n, d, &features, &exact_labels, false);
        let hnsw_cost = cost_of_labeling(n, d, &features, &hnsw_labels, false);

        // Documented tolerance: the approximate index may trade a little
        // objective for speed, but not more than 5% relative.
        let tolerance = 0.05 * exact_cost.abs().max(1e-6);
        assert!(
            (hnsw_cost - exact_cost).abs() <= tolerance,
            "hnsw cost {hnsw_cost} drifted from exact {exact_cost}"
        );
    }
}
