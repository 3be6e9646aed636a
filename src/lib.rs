//! `bipwalk`: bipartite graph preprocessing + second-order biased walk sampling.
//!
//! This crate prepares training data for a downstream sequence-embedding
//! trainer (skip-gram with negative sampling, external to this crate): it
//! ingests a two-column relation as an edge list, prunes low-degree entities,
//! precomputes node2vec-style transition probabilities for every adjacent
//! `(previous, current)` pair, and generates fixed-length biased random walks
//! from them.
//!
//! Public invariants (must not drift):
//! - **Node order**: node ids are dense `0..n` in first-occurrence order of the
//!   input edge list; all internal APIs speak ids, strings only at the boundary.
//! - **Determinism**: walk generation is deterministic given identical inputs,
//!   configs and seed, independent of thread count.
//! - **Immutability**: [`BipartiteGraph`] and [`TransitionTable`] never change
//!   after construction; pruning returns a new graph.
//!
//! Swappable (allowed to change without breaking the contract):
//! - iteration strategy (serial vs parallel)
//! - internal data structures (so long as invariants hold)

pub mod config;
pub mod graph;
pub mod io;
pub mod pipeline;
pub mod sampler;
pub mod transition;
pub mod walk;

pub use config::{PipelineConfig, WalkConfig};
pub use graph::{BipartiteGraph, Role};
pub use io::{read_edge_list, write_walks};
pub use pipeline::{prepare_walks, WalkCorpus};
pub use sampler::WeightedSampler;
pub use transition::TransitionTable;
pub use walk::{generate_walk, generate_walks, generate_walks_streaming};

#[cfg(feature = "parallel")]
pub use walk::generate_walks_parallel;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("negative weight {0} in sampling distribution")]
    InvalidWeight(f32),
    #[error("cannot sample from an empty or zero-weight distribution")]
    EmptyDistribution,
    #[error("graph has no usable nodes or edges: {0}")]
    EmptyGraph(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("walk seed node {0} has no outgoing transitions")]
    UnreachableSeed(usize),
    #[error("no transition entry for step {prev} -> {cur}")]
    MissingTransition { prev: usize, cur: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
