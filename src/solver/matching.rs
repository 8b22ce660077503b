use crate::sets::{BitSet, TotalF32};

/// Greedy maximal matching over the candidate edges `{us[e], vs[e]}` with
/// weights `weights[e]`.
///
/// Edges are visited in descending weight order (ties by input position);
/// an edge is taken iff neither endpoint is already matched. The result
/// is maximal and vertex-disjoint but not necessarily maximum, which is
/// enough to pick a batch of simultaneously contractible edges.
///
/// # Panics
/// Panics if the three slices disagree in length or an edge is a
/// self-loop.
pub fn greedy_maximum_matching(us: &[usize], vs: &[usize], weights: &[f32]) -> Vec<[usize; 2]> {
    assert_eq!(us.len(), vs.len());
    assert_eq!(us.len(), weights.len());

    if us.is_empty() {
        return Vec::new();
    }

    let nr_vertices = 1 + us.iter().chain(vs.iter()).copied().max().unwrap_or(0);

    let mut order: Vec<usize> = (0..us.len()).collect();
    // Stable sort: equal weights keep their input order.
    order.sort_by(|&a, &b| TotalF32(weights[b]).cmp(&TotalF32(weights[a])));

    let mut taken = BitSet::new(nr_vertices);
    let mut matching = Vec::new();
    for &e in &order {
        let (i, j) = (us[e], vs[e]);
        assert_ne!(i, j);
        if !taken.get_bit(i) && !taken.get_bit(j) {
            taken.set_bit(i);
            taken.set_bit(j);
            matching.push([i, j]);
        }
    }

    matching
}
