use tracing::{debug, info};

use crate::index::{AnnIndex, FeatureStore, FlatIndex, HnswIndex};
use crate::sets::UnionFind;
use crate::solver::cost::cost_disconnected;
use crate::solver::matching::greedy_maximum_matching;
use crate::statistics::SolveStats;

/// Batch greedy additive edge contraction with an exact flat index: each
/// round queries the best partner of every active vertex, selects a
/// vertex-disjoint subset of the positive candidate edges by greedy
/// matching, and contracts the whole subset.
pub fn gaec_parallel_flat_index(
    n: usize,
    d: usize,
    features: Vec<f32>,
    track_dist_offset: bool,
) -> Vec<usize> {
    if n < 2 {
        return (0..n).collect();
    }
    info!("dense parallel gaec with flat index");
    gaec_parallel_impl(n, d, features, FlatIndex::new(d), track_dist_offset, "flat")
}

/// Batch greedy additive edge contraction with an approximate HNSW index.
pub fn gaec_parallel_hnsw(
    n: usize,
    d: usize,
    features: Vec<f32>,
    track_dist_offset: bool,
) -> Vec<usize> {
    if n < 2 {
        return (0..n).collect();
    }
    info!("dense parallel gaec with hnsw index");
    gaec_parallel_impl(n, d, features, HnswIndex::new(d), track_dist_offset, "hnsw")
}

fn gaec_parallel_impl<I: AnnIndex>(
    n: usize,
    d: usize,
    features: Vec<f32>,
    index: I,
    track_dist_offset: bool,
    index_name: &str,
) -> Vec<usize> {
    assert_eq!(features.len(), n * d);

    info!("[dense gaec parallel {index_name}] find multicut for {n} nodes with features of dimension {d}");
    let mut multicut_cost = cost_disconnected(n, d, &features, track_dist_offset);
    let mut stats = SolveStats::new();

    let mut store = FeatureStore::new(d, n, features, index, track_dist_offset);

    let max_nr_ids = 2 * n;
    let mut uf = UnionFind::new(max_nr_ids);

    let mut rounds = 0usize;
    // The matching must see every candidate of the round at once; two
    // merges sharing a vertex would break the additive feature update.
    while store.nr_nodes() > 1 {
        let active = store.active_ids();
        let answers = store.nearest_nodes(&active);
        stats.bump_nn_queries(active.len());

        let mut us = Vec::new();
        let mut vs = Vec::new();
        let mut ws = Vec::new();
        for (&q, &(nn, w)) in active.iter().zip(&answers) {
            if w > 0.0 {
                us.push(q);
                vs.push(nn);
                ws.push(w);
            }
        }
        if us.is_empty() {
            break;
        }

        let matching = greedy_maximum_matching(&us, &vs, &ws);
        debug!(
            "[dense gaec parallel {index_name}] round {rounds}: matching gave {} edges to contract",
            matching.len()
        );

        for [i, j] in matching {
            let w = store.inner_product(i, j);
            let new_id = store.merge(i, j);
            multicut_cost -= w as f64;
            uf.union(i, new_id);
            uf.union(j, new_id);
            stats.bump_contractions();
        }
        rounds += 1;
    }

    let nr_clusters = uf.count() - (max_nr_ids - store.max_id() - 1);
    let nr_contracted = n - nr_clusters;
    info!(
        "[dense gaec parallel {index_name}] final nr clusters = {nr_clusters} after {rounds} rounds, \
         i.e. {:.2} contractions per round",
        nr_contracted as f64 / rounds.max(1) as f64
    );
    info!("[dense gaec parallel {index_name}] final multicut cost = {multicut_cost}");
    debug!(?stats, "[dense gaec parallel {index_name}] solve finished");

    (0..n).map(|i| uf.find(i)).collect()
}
