//! Second-order transition probabilities for biased walks.
//!
//! For every node `prev` and every neighbor `start` of `prev`, the table
//! holds the distribution over the *next* node given that a walk just moved
//! `prev -> start`, biased by the node2vec return parameter `p` and in-out
//! parameter `q`:
//!
//! - stepping straight back to `prev` gets weight `1/p`
//! - a candidate shared between `neighbors(prev)` and `neighbors(start)`
//!   (distance 1 from `prev`) gets weight `1`
//! - any other candidate (distance 2 from `prev`) gets weight `1/q`
//!
//! Construction is O(sum over edges of degree(start)) and embarrassingly
//! parallel across `prev`: each row is owned by exactly one worker, so the
//! parallel build needs no locking and produces the identical table.

use tracing::debug;

use crate::graph::BipartiteGraph;
use crate::sampler::WeightedSampler;
use crate::{Error, Result};

/// Precomputed second-order distributions, indexed by `(prev, cur)` adjacency
/// pairs. Built once from a pruned graph, immutable afterward.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    // Sorted neighbor lists, mirroring the graph; `dists[prev][j]` is the
    // distribution for cur = neighbors[prev][j].
    neighbors: Vec<Vec<usize>>,
    dists: Vec<Vec<WeightedSampler>>,
    p: f32,
    q: f32,
}

impl TransitionTable {
    /// Build the full table serially.
    ///
    /// Validates `p > 0` and `q > 0` (finite) up front; zero would divide by
    /// zero in the bias weights.
    pub fn new(graph: &BipartiteGraph, p: f32, q: f32) -> Result<Self> {
        validate_bias(p, q)?;
        let dists = (0..graph.node_count())
            .map(|prev| build_row(graph, prev, p, q))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::assemble(graph, dists, p, q))
    }

    /// Build the full table with one rayon task per `prev` row.
    ///
    /// Invariant: the result is identical to [`TransitionTable::new`] for any
    /// thread count.
    #[cfg(feature = "parallel")]
    pub fn new_parallel(graph: &BipartiteGraph, p: f32, q: f32) -> Result<Self> {
        use rayon::prelude::*;

        validate_bias(p, q)?;
        let dists = (0..graph.node_count())
            .into_par_iter()
            .map(|prev| build_row(graph, prev, p, q))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::assemble(graph, dists, p, q))
    }

    fn assemble(
        graph: &BipartiteGraph,
        dists: Vec<Vec<WeightedSampler>>,
        p: f32,
        q: f32,
    ) -> Self {
        let neighbors: Vec<Vec<usize>> = (0..graph.node_count())
            .map(|v| graph.neighbors(v).to_vec())
            .collect();
        debug!(
            nodes = neighbors.len(),
            pairs = neighbors.iter().map(Vec::len).sum::<usize>(),
            p,
            q,
            "built transition table"
        );
        Self { neighbors, dists, p, q }
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Return bias parameter the table was built with.
    pub fn p(&self) -> f32 {
        self.p
    }

    /// In-out bias parameter the table was built with.
    pub fn q(&self) -> f32 {
        self.q
    }

    /// The `cur` keys with an entry under `prev`, i.e. `prev`'s neighbors.
    pub fn starts(&self, prev: usize) -> &[usize] {
        self.neighbors.get(prev).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distribution over the next node for a walk that just moved
    /// `prev -> cur`, or `None` if the pair is not adjacent.
    pub fn get(&self, prev: usize, cur: usize) -> Option<&WeightedSampler> {
        let nbrs = self.neighbors.get(prev)?;
        let j = nbrs.binary_search(&cur).ok()?;
        Some(&self.dists[prev][j])
    }
}

fn validate_bias(p: f32, q: f32) -> Result<()> {
    if !(p > 0.0 && p.is_finite()) {
        return Err(Error::InvalidParameter(format!(
            "return bias p must be a positive real, got {p}"
        )));
    }
    if !(q > 0.0 && q.is_finite()) {
        return Err(Error::InvalidParameter(format!(
            "in-out bias q must be a positive real, got {q}"
        )));
    }
    Ok(())
}

fn build_row(graph: &BipartiteGraph, prev: usize, p: f32, q: f32) -> Result<Vec<WeightedSampler>> {
    let prev_nbrs = graph.neighbors(prev);
    prev_nbrs
        .iter()
        .map(|&start| {
            let start_nbrs = graph.neighbors(start);
            let mut dist = WeightedSampler::with_capacity(start_nbrs.len());
            dist.set(prev, 1.0 / p)?;
            for &nb in start_nbrs {
                if nb == prev {
                    continue;
                }
                // Sorted lists, so common-neighbor membership is a binary search.
                let w = if prev_nbrs.binary_search(&nb).is_ok() {
                    1.0
                } else {
                    1.0 / q
                };
                dist.set(nb, w)?;
            }
            Ok(dist)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_graph() -> BipartiteGraph {
        BipartiteGraph::from_edges(vec![("u1", "i1"), ("u1", "i2"), ("u2", "i1")]).unwrap()
    }

    fn assert_close_f32(a: f32, b: f32, eps: f32) {
        assert!(
            (a - b).abs() <= eps,
            "expected |{a} - {b}| <= {eps}, got {}",
            (a - b).abs()
        );
    }

    #[test]
    fn every_adjacent_pair_has_an_entry() {
        let g = toy_graph();
        let t = TransitionTable::new(&g, 1.0, 1.0).unwrap();
        for prev in g.all_nodes() {
            for &cur in g.neighbors(prev) {
                assert!(
                    t.get(prev, cur).is_some(),
                    "missing entry for adjacent pair ({prev}, {cur})"
                );
            }
        }
        // Non-adjacent pairs have none.
        let u1 = g.id_of("u1").unwrap();
        let u2 = g.id_of("u2").unwrap();
        assert!(t.get(u1, u2).is_none());
    }

    #[test]
    fn unit_bias_reduces_to_uniform_first_order_weights() {
        // p = q = 1: return weight 1, every candidate weight 1.
        let g = toy_graph();
        let t = TransitionTable::new(&g, 1.0, 1.0).unwrap();
        let u1 = g.id_of("u1").unwrap();
        let u2 = g.id_of("u2").unwrap();
        let i1 = g.id_of("i1").unwrap();

        let dist = t.get(u1, i1).unwrap();
        assert_eq!(dist.keys(), &[u1, u2]);
        assert_eq!(dist.weights(), &[1.0, 1.0]);
        let probs = dist.probabilities().unwrap();
        assert_close_f32(probs[0], 0.5, 1e-6);
        assert_close_f32(probs[1], 0.5, 1e-6);
    }

    #[test]
    fn return_bias_shifts_probability_mass_to_prev() {
        // p = 0.5 doubles the return weight; with one other candidate at
        // weight <= 1 the return probability must exceed 0.5.
        let g = toy_graph();
        let t = TransitionTable::new(&g, 0.5, 1.0).unwrap();
        let u1 = g.id_of("u1").unwrap();
        let i1 = g.id_of("i1").unwrap();

        let dist = t.get(u1, i1).unwrap();
        assert_eq!(dist.weights()[0], 2.0);
        let probs = dist.probabilities().unwrap();
        assert!(probs[0] > 0.5, "return probability {} <= 0.5", probs[0]);
    }

    #[test]
    fn in_out_bias_scales_distance_two_candidates() {
        let g = toy_graph();
        let t = TransitionTable::new(&g, 1.0, 2.0).unwrap();
        let u1 = g.id_of("u1").unwrap();
        let u2 = g.id_of("u2").unwrap();
        let i1 = g.id_of("i1").unwrap();

        // From u1 via i1, u2 is at distance 2 (not a neighbor of u1).
        let dist = t.get(u1, i1).unwrap();
        let j = dist.keys().iter().position(|&k| k == u2).unwrap();
        assert_close_f32(dist.weights()[j], 0.5, 1e-6);
    }

    #[test]
    fn dead_end_distribution_is_a_deterministic_backstep() {
        // i2's only neighbor is u1, so after u1 -> i2 the walk can only
        // return.
        let g = toy_graph();
        let t = TransitionTable::new(&g, 2.0, 1.0).unwrap();
        let u1 = g.id_of("u1").unwrap();
        let i2 = g.id_of("i2").unwrap();

        let dist = t.get(u1, i2).unwrap();
        assert_eq!(dist.keys(), &[u1]);
        let probs = dist.probabilities().unwrap();
        assert_close_f32(probs[0], 1.0, 1e-6);
    }

    #[test]
    fn non_positive_bias_parameters_are_rejected() {
        let g = toy_graph();
        for (p, q) in [(0.0, 1.0), (1.0, 0.0), (-1.0, 1.0), (1.0, f32::NAN)] {
            assert!(
                matches!(TransitionTable::new(&g, p, q), Err(Error::InvalidParameter(_))),
                "p={p} q={q} should be rejected"
            );
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_build_matches_serial() {
        let g = BipartiteGraph::from_edges(vec![
            ("u1", "i1"),
            ("u1", "i2"),
            ("u2", "i1"),
            ("u2", "i3"),
            ("u3", "i2"),
            ("u3", "i3"),
        ])
        .unwrap();

        let serial = TransitionTable::new(&g, 0.5, 2.0).unwrap();
        let parallel = TransitionTable::new_parallel(&g, 0.5, 2.0).unwrap();
        for prev in g.all_nodes() {
            assert_eq!(serial.starts(prev), parallel.starts(prev));
            for &cur in serial.starts(prev) {
                assert_eq!(
                    serial.get(prev, cur).unwrap(),
                    parallel.get(prev, cur).unwrap()
                );
            }
        }
    }
}
