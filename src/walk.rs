//! Biased random walk generation over a precomputed transition table.
//!
//! A walk is anchored at a seed node but the seed itself is not part of the
//! emitted sequence: the first emitted node is a uniform draw among the
//! seed's transition entries (there is no "previous of previous" to bias the
//! first hop), every later node is a second-order biased sample. An emitted
//! walk has exactly `length` nodes.
//!
//! RNG streams are split per (repetition, node) job from the configured seed,
//! so the serial, streaming and parallel generators all produce the same
//! walks in the same order, independent of thread count.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::WalkConfig;
use crate::transition::TransitionTable;
use crate::{Error, Result};

/// One biased walk anchored at `seed_node`, `length` nodes long.
///
/// Fails with [`Error::UnreachableSeed`] when `seed_node` has no transition
/// entries (no neighbors), and with [`Error::MissingTransition`] if the table
/// is inconsistent with the graph it was built from; the latter indicates a
/// construction bug, not a user error.
pub fn generate_walk<R: Rng>(
    table: &TransitionTable,
    seed_node: usize,
    length: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let starts = table.starts(seed_node);
    if starts.is_empty() {
        return Err(Error::UnreachableSeed(seed_node));
    }
    // First hop is an unbiased seed choice, not a weighted draw.
    let start = *starts.choose(rng).expect("non-empty start set");

    let mut walk = Vec::with_capacity(length);
    walk.push(start);

    let mut prev = seed_node;
    let mut curr = start;
    for _ in 1..length {
        let dist = table
            .get(prev, curr)
            .ok_or(Error::MissingTransition { prev, cur: curr })?;
        let next = dist.sample(rng)?;
        walk.push(next);
        prev = curr;
        curr = next;
    }
    Ok(walk)
}

/// All (repetition, node) jobs in deterministic order.
fn jobs(nodes: &[usize], walks_per_node: usize) -> impl Iterator<Item = usize> + '_ {
    (0..walks_per_node).flat_map(move |_| nodes.iter().copied())
}

fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

/// Per-job RNG stream: depends only on (seed, node, job index), never on
/// which thread runs the job.
fn job_rng(seed: u64, node: usize, idx: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(mix64(seed ^ ((idx as u64) << 32) ^ (node as u64)))
}

/// `walks_per_node x nodes.len()` walks, one per (repetition, node) pair, in
/// deterministic order for a fixed seed.
pub fn generate_walks(
    table: &TransitionTable,
    nodes: &[usize],
    config: WalkConfig,
) -> Result<Vec<Vec<usize>>> {
    jobs(nodes, config.walks_per_node)
        .enumerate()
        .map(|(idx, node)| {
            let mut rng = job_rng(config.seed, node, idx);
            generate_walk(table, node, config.length, &mut rng)
        })
        .collect()
}

/// Parallel variant of [`generate_walks`].
///
/// Invariant: output is identical to the serial generator for a fixed seed,
/// independent of rayon thread count.
#[cfg(feature = "parallel")]
pub fn generate_walks_parallel(
    table: &TransitionTable,
    nodes: &[usize],
    config: WalkConfig,
) -> Result<Vec<Vec<usize>>> {
    use rayon::prelude::*;

    let job_list: Vec<(usize, usize)> = jobs(nodes, config.walks_per_node).enumerate().collect();
    job_list
        .par_iter()
        .map(|&(idx, node)| {
            let mut rng = job_rng(config.seed, node, idx);
            generate_walk(table, node, config.length, &mut rng)
        })
        .collect()
}

/// Streaming variant: hands each walk to `sink` as a borrowed slice and
/// reuses one buffer, so memory stays flat in the number of walks. Walks
/// arrive in the same order [`generate_walks`] would return them.
pub fn generate_walks_streaming<F>(
    table: &TransitionTable,
    nodes: &[usize],
    config: WalkConfig,
    mut sink: F,
) -> Result<()>
where
    F: FnMut(&[usize]),
{
    let mut walk: Vec<usize> = Vec::with_capacity(config.length);
    for (idx, node) in jobs(nodes, config.walks_per_node).enumerate() {
        let mut rng = job_rng(config.seed, node, idx);

        walk.clear();
        let starts = table.starts(node);
        if starts.is_empty() {
            return Err(Error::UnreachableSeed(node));
        }
        let start = *starts.choose(&mut rng).expect("non-empty start set");
        walk.push(start);

        let mut prev = node;
        let mut curr = start;
        for _ in 1..config.length {
            let dist = table
                .get(prev, curr)
                .ok_or(Error::MissingTransition { prev, cur: curr })?;
            let next = dist.sample(&mut rng)?;
            walk.push(next);
            prev = curr;
            curr = next;
        }
        sink(&walk);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BipartiteGraph;

    fn four_node_graph() -> (BipartiteGraph, TransitionTable) {
        let g = BipartiteGraph::from_edges(vec![("u1", "i1"), ("u1", "i2"), ("u2", "i1")])
            .unwrap();
        let t = TransitionTable::new(&g, 0.5, 2.0).unwrap();
        (g, t)
    }

    #[test]
    fn walks_have_exactly_the_requested_length() {
        let (g, t) = four_node_graph();
        let nodes: Vec<usize> = g.all_nodes().collect();
        let cfg = WalkConfig { length: 7, walks_per_node: 3, seed: 9 };

        let walks = generate_walks(&t, &nodes, cfg).unwrap();
        assert_eq!(walks.len(), nodes.len() * cfg.walks_per_node);
        assert!(walks.iter().all(|w| w.len() == cfg.length));
    }

    #[test]
    fn every_consecutive_pair_is_a_graph_edge() {
        // Candidates are always drawn from {prev} ∪ neighbors(cur), and prev
        // is itself a neighbor of cur in an undirected graph, so each step
        // must land on an adjacent node.
        let (g, t) = four_node_graph();
        let nodes: Vec<usize> = g.all_nodes().collect();
        let cfg = WalkConfig { length: 10, walks_per_node: 4, seed: 123 };

        for walk in generate_walks(&t, &nodes, cfg).unwrap() {
            for win in walk.windows(2) {
                assert!(
                    g.neighbors(win[0]).binary_search(&win[1]).is_ok(),
                    "walk step {} -> {} is not an edge",
                    win[0],
                    win[1]
                );
            }
        }
    }

    #[test]
    fn seed_anchor_is_not_part_of_the_walk() {
        // The first emitted node comes from the seed's start set, i.e. its
        // neighbors, never the seed itself.
        let (g, t) = four_node_graph();
        let u1 = g.id_of("u1").unwrap();
        for s in 0..32u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(s);
            let walk = generate_walk(&t, u1, 5, &mut rng).unwrap();
            assert!(g.neighbors(u1).binary_search(&walk[0]).is_ok());
        }
    }

    #[test]
    fn fixed_seed_reproduces_identical_output() {
        let (g, t) = four_node_graph();
        let nodes: Vec<usize> = g.all_nodes().collect();
        let cfg = WalkConfig { length: 8, walks_per_node: 5, seed: 777 };

        let a = generate_walks(&t, &nodes, cfg).unwrap();
        let b = generate_walks(&t, &nodes, cfg).unwrap();
        assert_eq!(a, b, "same seed must yield identical walks");

        let other = generate_walks(&t, &nodes, WalkConfig { seed: 778, ..cfg }).unwrap();
        assert_ne!(a, other, "different seed should perturb the walks");
    }

    #[test]
    fn streaming_matches_collecting() {
        let (g, t) = four_node_graph();
        let nodes: Vec<usize> = g.all_nodes().collect();
        let cfg = WalkConfig { length: 6, walks_per_node: 2, seed: 5 };

        let collected = generate_walks(&t, &nodes, cfg).unwrap();
        let mut streamed: Vec<Vec<usize>> = Vec::new();
        generate_walks_streaming(&t, &nodes, cfg, |w| streamed.push(w.to_vec())).unwrap();
        assert_eq!(collected, streamed);
    }

    #[test]
    fn unknown_seed_node_is_unreachable() {
        let (g, t) = four_node_graph();
        let bogus = g.node_count() + 3;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            generate_walk(&t, bogus, 5, &mut rng),
            Err(Error::UnreachableSeed(_))
        ));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_serial_and_is_thread_count_invariant() {
        let (g, t) = four_node_graph();
        let nodes: Vec<usize> = g.all_nodes().collect();
        let cfg = WalkConfig { length: 8, walks_per_node: 5, seed: 999 };

        let serial = generate_walks(&t, &nodes, cfg).unwrap();

        let pool1 = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let pool4 = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let p1 = pool1.install(|| generate_walks_parallel(&t, &nodes, cfg)).unwrap();
        let p4 = pool4.install(|| generate_walks_parallel(&t, &nodes, cfg)).unwrap();

        assert_eq!(serial, p1);
        assert_eq!(p1, p4, "parallel output must be thread-count invariant");
    }
}
