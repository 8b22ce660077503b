use tracing::info;

use crate::error::Error;
use crate::numerics::VectorLike;

/// Cost of the all-singleton multicut: the sum of pairwise inner products
/// over all distinct point pairs, i.e. the total weight a solver could
/// possibly keep by contracting.
///
/// Computed from per-dimension coordinate sums, so it costs O(n·d) rather
/// than O(n²·d). Accumulation is f64; the f32 rows only enter linearly.
///
/// When `track_dist_offset` is set, the last dimension (the √offset
/// column) contributes negatively, subtracting offset once per pair:
/// exactly the bias the offset column adds to every edge weight.
pub fn cost_disconnected(n: usize, d: usize, features: &[f32], track_dist_offset: bool) -> f64 {
    assert_eq!(features.len(), n * d);

    let mut feature_sum = vec![0.0f64; d];
    for i in 0..n {
        for l in 0..d {
            feature_sum[l] += features[i * d + l] as f64;
        }
    }

    let signed = |l: usize, x: f64| {
        if track_dist_offset && l == d - 1 {
            -x
        } else {
            x
        }
    };

    let mut cost = 0.0;
    for l in 0..d {
        cost += signed(l, feature_sum[l] * feature_sum[l]);
    }

    // remove diagonal entries (self-edges)
    for i in 0..n {
        for l in 0..d {
            let x = features[i * d + l] as f64;
            cost -= signed(l, x * x);
        }
    }

    cost /= 2.0;
    info!("disconnected multicut cost = {cost}");
    cost
}

/// Multicut cost of a labeling: the total weight of edges whose endpoints
/// carry different labels. Equals the running objective every solver
/// reports at termination. O(n²·d), intended for summaries and tests, not
/// inner loops.
pub fn cost_of_labeling(
    n: usize,
    d: usize,
    features: &[f32],
    labels: &[usize],
    track_dist_offset: bool,
) -> f64 {
    assert_eq!(features.len(), n * d);
    assert_eq!(labels.len(), n);

    let mut cost = 0.0f64;
    for i in 0..n {
        for j in i + 1..n {
            if labels[i] != labels[j] {
                cost += pair_weight(features, d, i, j, track_dist_offset) as f64;
            }
        }
    }
    cost
}

fn pair_weight(features: &[f32], d: usize, i: usize, j: usize, track_dist_offset: bool) -> f32 {
    let fi = &features[i * d..(i + 1) * d];
    let fj = &features[j * d..(j + 1) * d];
    let w = fi.dot(fj);
    if track_dist_offset {
        w - 2.0 * fi[d - 1] * fj[d - 1]
    } else {
        w
    }
}

/// Biases every pairwise weight by −`dist_offset` without touching the
/// solvers: appends a √offset column to the feature matrix, to be
/// consumed with negated sign (`track_dist_offset = true`) downstream.
pub fn append_dist_offset(
    features: &[f32],
    dist_offset: f32,
    n: usize,
    d: usize,
) -> Result<Vec<f32>, Error> {
    if dist_offset < 0.0 {
        return Err(Error::NegativeOffset(dist_offset));
    }
    assert_eq!(features.len(), n * d);

    info!("accounting for dist_offset = {dist_offset} by adding an additional feature dimension");
    let column = dist_offset.sqrt();
    let mut with_offset = Vec::with_capacity(n * (d + 1));
    for i in 0..n {
        with_offset.extend_from_slice(&features[i * d..(i + 1) * d]);
        with_offset.push(column);
    }
    Ok(with_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The four-point instance with clusters {0,1} and {2,3}.
    fn two_pair_features() -> Vec<f32> {
        vec![2.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 1.0]
    }

    #[test]
    fn disconnected_cost_is_the_pairwise_sum() {
        // Pairwise products: (0,1)=2, (2,3)=2, everything else 0.
        let cost = cost_disconnected(4, 2, &two_pair_features(), false);
        assert!((cost - 4.0).abs() < 1e-9);
    }

    #[test]
    fn disconnected_cost_of_single_node_is_zero() {
        let cost = cost_disconnected(1, 3, &[1.0, 2.0, 3.0], false);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn offset_column_shifts_each_pair_by_the_offset() {
        let features = append_dist_offset(&two_pair_features(), 0.5, 4, 2).unwrap();
        let cost = cost_disconnected(4, 3, &features, true);
        // 6 pairs, each shifted down by 0.5.
        assert!((cost - (4.0 - 6.0 * 0.5)).abs() < 1e-6);
    }

    #[test]
    fn offset_zero_column_changes_nothing() {
        let features = append_dist_offset(&two_pair_features(), 0.0, 4, 2).unwrap();
        let plain = cost_disconnected(4, 2, &two_pair_features(), false);
        let tracked = cost_disconnected(4, 3, &features, true);
        assert!((plain - tracked).abs() < 1e-9);
    }

    #[test]
    fn negative_offset_is_rejected() {
        assert!(matches!(
            append_dist_offset(&two_pair_features(), -0.1, 4, 2),
            Err(Error::NegativeOffset(_))
        ));
    }

    #[test]
    fn labeling_cost_counts_cut_edges_only() {
        let features = two_pair_features();
        // Perfect clustering cuts only the zero-weight cross pairs.
        let good = cost_of_labeling(4, 2, &features, &[0, 0, 1, 1], false);
        assert!((good - 0.0).abs() < 1e-9);

        // All singletons cut everything.
        let singletons = cost_of_labeling(4, 2, &features, &[0, 1, 2, 3], false);
        assert!((singletons - 4.0).abs() < 1e-9);

        // Splitting a good pair cuts one weight-2 edge.
        let split = cost_of_labeling(4, 2, &features, &[0, 1, 2, 2], false);
        assert!((split - 2.0).abs() < 1e-9);
    }

    #[test]
    fn labeling_cost_respects_the_offset_column() {
        let features = append_dist_offset(&two_pair_features(), 0.5, 4, 2).unwrap();
        // Cutting all 6 pairs: 4 - 6*0.5 = 1.
        let singletons = cost_of_labeling(4, 3, &features, &[0, 1, 2, 3], true);
        assert!((singletons - 1.0).abs() < 1e-6);
        // The good clustering cuts the 4 cross pairs, each weighing -0.5.
        let good = cost_of_labeling(4, 3, &features, &[0, 0, 1, 1], true);
        assert!((good - (-2.0)).abs() < 1e-6);
    }
}
