use std::collections::BinaryHeap;

use tracing::{debug, info};

use crate::numerics::VectorLike;
use crate::sets::{BitSet, TotalF32, UnionFind};
use crate::solver::cost::cost_disconnected;
use crate::statistics::SolveStats;

/// One heap entry of the matrix solver. The stamp records the version of
/// the matrix cell the weight was read from; a popped entry older than
/// the cell is stale and dropped.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
struct StampedEdge {
    weight: TotalF32,
    nodes: [u32; 2],
    stamp: u32,
}

impl PartialOrd for StampedEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StampedEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight.cmp(&other.weight)
    }
}

/// Exact greedy additive edge contraction over a full weight matrix.
///
/// The O(n²) reference variant: every pairwise weight is materialized up
/// front, a contraction folds the retired row into the surviving one and
/// re-stamps the touched cells. Memory is Θ(n²), so this is the yardstick
/// for the index-backed variants rather than the tool for large n.
///
/// Returns one cluster label per input vertex; labels are arbitrary ids
/// partitioning `[0, n)`.
pub fn gaec_adj_matrix(n: usize, d: usize, features: Vec<f32>, track_dist_offset: bool) -> Vec<usize> {
    assert_eq!(features.len(), n * d);
    if n < 2 {
        return (0..n).collect();
    }

    info!("[adj matrix] compute multicut on graph with {n} nodes and {d} feature dimensions");
    let mut multicut_cost = cost_disconnected(n, d, &features, track_dist_offset);
    let mut stats = SolveStats::new();

    // Dense (weight, stamp) cells, addressed by the unordered pair.
    let mut edges: Vec<(f32, u32)> = vec![(0.0, 0); n * n];
    let cell = |i: usize, j: usize| if i > j { j * n + i } else { i * n + j };

    let weight_of = |i: usize, j: usize| {
        let fi = &features[i * d..(i + 1) * d];
        let fj = &features[j * d..(j + 1) * d];
        let w = fi.dot(fj);
        if track_dist_offset {
            w - 2.0 * fi[d - 1] * fj[d - 1]
        } else {
            w
        }
    };

    let mut pq: BinaryHeap<StampedEdge> = BinaryHeap::new();
    for i in 0..n {
        for j in 0..i {
            let w = weight_of(i, j);
            edges[cell(i, j)].0 = w;
            if w > 0.0 {
                pq.push(StampedEdge {
                    weight: TotalF32(w),
                    nodes: [i as u32, j as u32],
                    stamp: 0,
                });
            }
        }
    }
    stats.bump_pq_pushes(pq.len());

    let mut active = BitSet::new(n);
    for i in 0..n {
        active.set_bit(i);
    }
    let mut uf = UnionFind::new(n);

    while let Some(e) = pq.pop() {
        let (i, j) = (e.nodes[0] as usize, e.nodes[1] as usize);
        if e.stamp < edges[cell(i, j)].1 || !active.get_bit(i) || !active.get_bit(j) {
            continue;
        }

        debug!("[adj matrix] contracting edge {i} and {j} with cost {}", e.weight.0);
        uf.union(i, j);
        multicut_cost -= e.weight.0 as f64;
        stats.bump_contractions();

        // Contract: fold row j into row i, bumping the cell versions.
        active.clear_bit(j);
        for k in 0..n {
            if k != i && k != j && active.get_bit(k) {
                let merged = edges[cell(i, k)].0 + edges[cell(j, k)].0;
                let idx = cell(i, k);
                edges[idx].0 = merged;
                edges[idx].1 += 1;

                if merged > 0.0 {
                    pq.push(StampedEdge {
                        weight: TotalF32(merged),
                        nodes: [i as u32, k as u32],
                        stamp: edges[idx].1,
                    });
                    stats.bump_pq_pushes(1);
                }
            }
        }
    }

    info!("[adj matrix] final nr clusters = {}", uf.count());
    info!("[adj matrix] final multicut cost = {multicut_cost}");
    debug!(?stats, "[adj matrix] solve finished");

    (0..n).map(|i| uf.find(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::cost::cost_of_labeling;
    use crate::solver::append_dist_offset;

    /// Renumbers labels by first occurrence so partitions compare
    /// independently of the arbitrary cluster ids.
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

    #[test]
    fn two_orthogonal_pairs_form_two_clusters() {
        let features = vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
        let labels = gaec_adj_matrix(4, 2, features, false);
        assert_eq!(canonical(&labels), vec![0, 0, 1, 1]);
    }

    #[test]
    fn nonpositive_weights_keep_singletons() {
        let features = vec![1.0, 0.0, 0.0, 1.0, -1.0, 0.0];
        let labels = gaec_adj_matrix(3, 2, features, false);
        assert_eq!(canonical(&labels), vec![0, 1, 2]);
    }

    #[test]
    fn objective_is_fully_recovered_on_the_two_pair_instance() {
        let features = vec![2.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 1.0];
        let labels = gaec_adj_matrix(4, 2, features.clone(), false);
        assert_eq!(canonical(&labels), vec![0, 0, 1, 1]);

        // Initial objective 4, two contractions worth 2 each: final 0.
        let final_cost = cost_of_labeling(4, 2, &features, &labels, false);
        assert!((final_cost - 0.0).abs() < 1e-6);
    }

    #[test]
    fn offset_half_keeps_the_same_partition() {
        let base = vec![2.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 1.0];
        let features = append_dist_offset(&base, 0.5, 4, 2).unwrap();
        let labels = gaec_adj_matrix(4, 3, features, true);
        assert_eq!(canonical(&labels), vec![0, 0, 1, 1]);
    }

    #[test]
    fn single_node_is_its_own_cluster() {
        let labels = gaec_adj_matrix(1, 2, vec![3.0, -1.0], false);
        assert_eq!(labels, vec![0]);
    }

    #[test]
    fn two_nodes_follow_the_sign_of_their_weight() {
        let attracting = gaec_adj_matrix(2, 2, vec![1.0, 0.0, 1.0, 0.1], false);
        assert_eq!(attracting[0], attracting[1]);

        let repelling = gaec_adj_matrix(2, 2, vec![1.0, 0.0, -1.0, 0.1], false);
        assert_ne!(repelling[0], repelling[1]);
    }

    #[test]
    fn identical_positive_features_collapse_to_one_cluster() {
        let features = vec![[0.5f32, 0.5]; 6].concat();
        let labels = gaec_adj_matrix(6, 2, features, false);
        assert!(labels.iter().all(|&l| l == labels[0]));
    }

    #[test]
    fn empty_instance_yields_empty_labeling() {
        let labels = gaec_adj_matrix(0, 3, vec![], false);
        assert!(labels.is_empty());
    }
}
