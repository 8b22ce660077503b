use serde::Serialize;

/// Work counters for one contraction run.
///
/// Collected by every solver variant and emitted as a debug log line when
/// the solve finishes. Counters can be merged, e.g. when aggregating over
/// repeated runs.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SolveStats {
    /// Number of edges contracted
    contractions: usize,

    /// Number of single-vertex nearest-neighbor queries issued
    nn_queries: usize,

    /// Number of candidate edges pushed onto the priority queue
    pq_pushes: usize,

    /// Number of bulk staleness prunes of the priority queue
    pq_prunes: usize,

    /// Number of post-drain k-NN recheck sweeps (incremental variant)
    recheck_rounds: usize,
}

impl SolveStats {
    /// Creates a tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one contracted edge.
    pub fn bump_contractions(&mut self) {
        self.contractions += 1;
    }

    pub fn get_contractions(&self) -> usize {
        self.contractions
    }

    /// Records `amt` nearest-neighbor queries.
    pub fn bump_nn_queries(&mut self, amt: usize) {
        self.nn_queries += amt;
    }

    pub fn get_nn_queries(&self) -> usize {
        self.nn_queries
    }

    /// Records `amt` priority-queue pushes.
    pub fn bump_pq_pushes(&mut self, amt: usize) {
        self.pq_pushes += amt;
    }

    pub fn get_pq_pushes(&self) -> usize {
        self.pq_pushes
    }

    /// Records one bulk prune of the priority queue.
    pub fn bump_pq_prunes(&mut self) {
        self.pq_prunes += 1;
    }

    pub fn get_pq_prunes(&self) -> usize {
        self.pq_prunes
    }

    /// Records one post-drain recheck sweep.
    pub fn bump_recheck_rounds(&mut self) {
        self.recheck_rounds += 1;
    }

    pub fn get_recheck_rounds(&self) -> usize {
        self.recheck_rounds
    }

    /// Sums another tracker's counters into this one.
    pub fn merge(&mut self, other: &SolveStats) {
        self.contractions += other.contractions;
        self.nn_queries += other.nn_queries;
        self.pq_pushes += other.pq_pushes;
        self.pq_prunes += other.pq_prunes;
        self.recheck_rounds += other.recheck_rounds;
    }
}

/// One finished run, as printed by the binary's `--summary` flag.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub solver: String,
    pub nr_nodes: usize,
    pub dim: usize,
    pub nr_clusters: usize,
    pub disconnected_cost: f64,
    pub multicut_cost: f64,
    pub solve_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = SolveStats::new();
        assert_eq!(stats.get_contractions(), 0);
        assert_eq!(stats.get_nn_queries(), 0);
        assert_eq!(stats.get_pq_pushes(), 0);
        assert_eq!(stats.get_pq_prunes(), 0);
        assert_eq!(stats.get_recheck_rounds(), 0);
    }

    #[test]
    fn bumps_accumulate() {
        let mut stats = SolveStats::new();
        stats.bump_contractions();
        stats.bump_contractions();
        stats.bump_nn_queries(7);
        stats.bump_pq_pushes(3);
        stats.bump_pq_prunes();
        stats.bump_recheck_rounds();

        assert_eq!(stats.get_contractions(), 2);
        assert_eq!(stats.get_nn_queries(), 7);
        assert_eq!(stats.get_pq_pushes(), 3);
        assert_eq!(stats.get_pq_prunes(), 1);
        assert_eq!(stats.get_recheck_rounds(), 1);
    }

    #[test]
    fn merge_sums_counters() {
        let mut a = SolveStats::new();
        a.bump_contractions();
        a.bump_nn_queries(2);

        let mut b = SolveStats::new();
        b.bump_contractions();
        b.bump_pq_pushes(5);

        a.merge(&b);
        assert_eq!(a.get_contractions(), 2);
        assert_eq!(a.get_nn_queries(), 2);
        assert_eq!(a.get_pq_pushes(), 5);
    }

    #[test]
    fn summary_serializes_to_json() {
        let summary = RunSummary {
            solver: "flat_index".into(),
            nr_nodes: 4,
            dim: 2,
            nr_clusters: 2,
            disconnected_cost: 4.0,
            multicut_cost: 0.0,
            solve_ms: 1,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"solver\":\"flat_index\""));
        assert!(json.contains("\"nr_clusters\":2"));
    }
}
