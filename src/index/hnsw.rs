use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashSet;
use rand::prelude::*;
use rand_distr::Exp1;

use crate::index::AnnIndex;
use crate::numerics::VectorLike;
use crate::sets::TotalF32;

/// Hard cap on the layer a node can land on, whatever the level draw says.
const MAX_LEVEL: usize = 16;

/// Construction and search parameters for [`HnswIndex`].
#[derive(Debug, Clone)]
pub struct HnswParams {
    /// Maximum number of bi-directional links per node per layer (M).
    pub max_connections: usize,

    /// Maximum number of links on layer 0 (typically 2·M).
    pub max_connections_layer0: usize,

    /// Size of the dynamic candidate list while inserting.
    pub ef_construction: usize,

    /// Minimum size of the dynamic candidate list while searching; raised
    /// to the requested result count when that is larger.
    pub ef_search: usize,

    /// Normalization factor for the level draw, typically 1 / ln(M).
    pub level_multiplier: f64,

    /// Seed for the level-draw RNG. Fixing it makes construction, and
    /// therefore every query answer, deterministic for a given insertion
    /// order.
    pub seed: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        let m = 16;
        Self {
            max_connections: m,
            max_connections_layer0: m * 2,
            ef_construction: 200,
            ef_search: 200,
            level_multiplier: 1.0 / (m as f64).ln(),
            seed: 42,
        }
    }
}

struct HnswNode {
    /// Neighbor lists, one per layer this node participates in
    /// (`connections.len() == level + 1`).
    connections: Vec<Vec<usize>>,
}

/// Approximate inner-product index: a hierarchical navigable small-world
/// graph.
///
/// Layer 0 holds every row; higher layers hold geometrically fewer. A
/// query greedily descends from the top layer's entry point and runs a
/// best-first beam on layer 0. Rows are never removed; the contraction
/// loop keeps retired rows in place and filters them out of results via
/// the active bitmap in the feature store.
pub struct HnswIndex {
    d: usize,
    params: HnswParams,
    rows: Vec<f32>,
    nodes: Vec<HnswNode>,
    entry_point: Option<usize>,
    max_layer: usize,
    rng: StdRng,
}

impl HnswIndex {
    /// Creates an empty index with default parameters.
    pub fn new(d: usize) -> Self {
        Self::with_params(d, HnswParams::default())
    }

    pub fn with_params(d: usize, params: HnswParams) -> Self {
        assert!(d > 0);
        assert!(params.max_connections > 0);
        let rng = StdRng::seed_from_u64(params.seed);
        HnswIndex {
            d,
            params,
            rows: Vec::new(),
            nodes: Vec::new(),
            entry_point: None,
            max_layer: 0,
            rng,
        }
    }

    fn row(&self, id: usize) -> &[f32] {
        &self.rows[id * self.d..(id + 1) * self.d]
    }

    /// Draws the insertion level: floor of an Exp(1) sample scaled by the
    /// level multiplier, i.e. the standard geometric layer assignment.
    fn draw_level(&mut self) -> usize {
        let e: f64 = self.rng.sample(Exp1);
        ((e * self.params.level_multiplier) as usize).min(MAX_LEVEL)
    }

    /// Best-first beam on one layer. Returns up to `ef` results in
    /// descending inner-product order.
    fn search_layer(
        &self,
        query: &[f32],
        entries: &[usize],
        ef: usize,
        layer: usize,
    ) -> Vec<(usize, f32)> {
        let mut visited: HashSet<usize> = HashSet::new();
        // Frontier pops the most promising candidate first; `best` keeps
        // its worst retained score on top so eviction is O(log ef).
        let mut frontier: BinaryHeap<(TotalF32, usize)> = BinaryHeap::new();
        let mut best: BinaryHeap<Reverse<(TotalF32, usize)>> = BinaryHeap::new();

        for &ep in entries {
            if visited.insert(ep) {
                let score = TotalF32(self.row(ep).dot(query));
                frontier.push((score, ep));
                best.push(Reverse((score, ep)));
                if best.len() > ef {
                    best.pop();
                }
            }
        }

        while let Some((score, id)) = frontier.pop() {
            if best.len() >= ef {
                let Reverse((worst, _)) = *best.peek().unwrap();
                if score < worst {
                    break;
                }
            }

            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let Some(conns) = node.connections.get(layer) else {
                continue;
            };
            for &nb in conns {
                if visited.insert(nb) {
                    let nb_score = TotalF32(self.row(nb).dot(query));
                    let admit = if best.len() < ef {
                        true
                    } else {
                        let Reverse((worst, _)) = *best.peek().unwrap();
                        nb_score > worst
                    };
                    if admit {
                        frontier.push((nb_score, nb));
                        best.push(Reverse((nb_score, nb)));
                        if best.len() > ef {
                            best.pop();
                        }
                    }
                }
            }
        }

        let mut out: Vec<(usize, f32)> = best
            .into_iter()
            .map(|Reverse((w, id))| (id, w.0))
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }

    fn search_layer_ids(
        &self,
        query: &[f32],
        entries: &[usize],
        ef: usize,
        layer: usize,
    ) -> Vec<usize> {
        self.search_layer(query, entries, ef, layer)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    /// Re-selects the `m` strongest links of `id` on `layer` after a new
    /// back-link pushed the list over capacity.
    fn shrink_connections(&self, id: usize, layer: usize, m: usize) -> Vec<usize> {
        let base = self.row(id);
        let mut scored: Vec<(TotalF32, usize)> = self.nodes[id].connections[layer]
            .iter()
            .map(|&c| (TotalF32(self.row(c).dot(base)), c))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(m);
        scored.into_iter().map(|(_, c)| c).collect()
    }
}

impl AnnIndex for HnswIndex {
    fn add(&mut self, id: usize, vector: &[f32]) {
        assert_eq!(vector.len(), self.d);
        assert_eq!(id, self.len(), "rows must be appended in id order");

        self.rows.extend_from_slice(vector);
        let level = self.draw_level();
        let mut node = HnswNode {
            connections: vec![Vec::new(); level + 1],
        };

        let Some(entry) = self.entry_point else {
            self.entry_point = Some(id);
            self.max_layer = level;
            self.nodes.push(node);
            return;
        };

        // Greedy descent through the layers above the insertion level.
        let mut nearest = vec![entry];
        for layer in (level + 1..=self.max_layer).rev() {
            nearest = self.search_layer_ids(vector, &nearest, 1, layer);
        }

        for layer in (0..=level.min(self.max_layer)).rev() {
            let candidates =
                self.search_layer_ids(vector, &nearest, self.params.ef_construction, layer);

            let m = if layer == 0 {
                self.params.max_connections_layer0
            } else {
                self.params.max_connections
            };

            let neighbors: Vec<usize> = candidates.iter().copied().take(m).collect();
            node.connections[layer] = neighbors.clone();

            for &nb in &neighbors {
                if layer < self.nodes[nb].connections.len() {
                    self.nodes[nb].connections[layer].push(id);
                    if self.nodes[nb].connections[layer].len() > m {
                        let kept = self.shrink_connections(nb, layer, m);
                        self.nodes[nb].connections[layer] = kept;
                    }
                }
            }

            nearest = candidates;
        }

        self.nodes.push(node);

        if level > self.max_layer {
            self.max_layer = level;
            self.entry_point = Some(id);
        }
    }

    fn search(&self, query: &[f32], nr_results: usize) -> Vec<(usize, f32)> {
        assert_eq!(query.len(), self.d);
        let Some(entry) = self.entry_point else {
            return Vec::new();
        };
        if nr_results == 0 {
            return Vec::new();
        }

        let mut nearest = vec![entry];
        for layer in (1..=self.max_layer).rev() {
            nearest = self.search_layer_ids(query, &nearest, 1, layer);
        }

        let ef = self.params.ef_search.max(nr_results);
        let mut out = self.search_layer(query, &nearest, ef, 0);
        out.truncate(nr_results);
        out
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
