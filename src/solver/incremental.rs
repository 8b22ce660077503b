use tracing::{debug, info};

use crate::index::{AnnIndex, FeatureStore, FlatIndex, HnswIndex, IndexKind};
use crate::knn::IncrementalNns;
use crate::sets::{EdgeQueue, UnionFind};
use crate::solver::cost::cost_disconnected;
use crate::statistics::SolveStats;

/// Greedy additive edge contraction driven by an incrementally maintained
/// k-NN graph.
///
/// One k-NN sweep builds the graph up front; afterwards every contraction
/// is served from local graph surgery instead of fresh index queries.
/// When the queue runs dry a single global re-sweep catches edges the
/// local view missed, and the loop resumes if it found any.
///
/// `k` is clamped to `n - 1`. The queue is bulk-pruned whenever it grows
/// past ten times its initial size.
pub fn gaec_incremental_nn(
    n: usize,
    d: usize,
    features: Vec<f32>,
    k: usize,
    index_kind: IndexKind,
    track_dist_offset: bool,
) -> Vec<usize> {
    assert!(k > 0, "k must be positive");
    if n < 2 {
        return (0..n).collect();
    }

    match index_kind {
        IndexKind::Flat => gaec_incremental_impl(
            n,
            d,
            features,
            k,
            FlatIndex::new(d),
            track_dist_offset,
            "flat",
        ),
        IndexKind::Hnsw => gaec_incremental_impl(
            n,
            d,
            features,
            k,
            HnswIndex::new(d),
            track_dist_offset,
            "hnsw",
        ),
    }
}

fn gaec_incremental_impl<I: AnnIndex>(
    n: usize,
    d: usize,
    features: Vec<f32>,
    k_in: usize,
    index: I,
    track_dist_offset: bool,
    index_name: &str,
) -> Vec<usize> {
    assert_eq!(features.len(), n * d);
    let k = k_in.min(n - 1);

    info!(
        "[dense gaec incremental nn] find multicut for {n} nodes with features of dimension {d} \
         and feature index type {index_name}"
    );
    let mut multicut_cost = cost_disconnected(n, d, &features, track_dist_offset);
    let mut stats = SolveStats::new();

    let mut store = FeatureStore::new(d, n, features, index, track_dist_offset);

    let max_nr_ids = 2 * n;
    let mut uf = UnionFind::new(max_nr_ids);

    let mut pq = EdgeQueue::new();
    let all_indices: Vec<usize> = (0..n).collect();
    let answers = store.nearest_k(&all_indices, k);
    stats.bump_nn_queries(n);
    info!("[dense gaec incremental nn] initial NN search complete");

    let mut nn_graph = IncrementalNns::new(&all_indices, &answers, n, k);
    for (i, list) in answers.iter().enumerate() {
        for &(nn, w) in list {
            if w > 0.0 {
                pq.push(i, nn, w);
            }
        }
    }
    stats.bump_pq_pushes(pq.len());
    let max_pq_size = pq.len() * 10;

    loop {
        while let Some(edge) = pq.pop() {
            let [i, j] = edge.nodes;
            let w = edge.weight.0;
            debug_assert!(w > 0.0);

            if store.node_active(i) && store.node_active(j) {
                debug!("[dense gaec incremental nn] contracting edge {i} and {j} with cost {w}");
                let new_id = store.merge(i, j);
                uf.union(i, new_id);
                uf.union(j, new_id);
                let nn_ij = nn_graph.merge_nodes(i, j, new_id, &store);
                multicut_cost -= w as f64;
                stats.bump_contractions();

                if store.nr_nodes() > 1 {
                    for (&nn, &w_new) in &nn_ij {
                        pq.push(new_id, nn, w_new);
                        stats.bump_pq_pushes(1);
                    }
                }
            }

            if pq.len() > max_pq_size {
                let before = pq.len();
                pq.prune(|v| store.node_active(v));
                stats.bump_pq_prunes();
                debug!(
                    "[dense gaec incremental nn] pruned PQ from {before} to {} entries",
                    pq.len()
                );
            }
        }

        // Queue drained: one global sweep to surface edges the local graph
        // surgery could not see. Terminate once it comes back empty.
        let remaining = nn_graph.recheck_possible_contractions(&store);
        stats.bump_recheck_rounds();
        info!(
            "[dense gaec incremental nn] found {} leftover contractions",
            remaining.len()
        );
        if remaining.is_empty() {
            break;
        }
        for &(a, b, w) in &remaining {
            pq.push(a, b, w);
        }
        stats.bump_pq_pushes(remaining.len());
    }

    let nr_clusters = uf.count() - (max_nr_ids - store.max_id() - 1);
    info!("[dense gaec incremental nn] final nr clusters = {nr_clusters}");
    info!("[dense gaec incremental nn] final multicut cost = {multicut_cost}");
    debug!(?stats, "[dense gaec incremental nn] solve finished");

    (0..n).map(|i| uf.find(i)).collect()
}
