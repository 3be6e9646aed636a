//! End-to-end preparation: raw edges -> pruned graph -> transition table ->
//! walk corpus.
//!
//! The pipeline is a batch computation with no partial-result recovery: any
//! stage error aborts the run before the parallel phases start (pruning) or
//! propagates out of them unchanged.

use tracing::info;

use crate::config::PipelineConfig;
use crate::graph::{BipartiteGraph, Role};
use crate::transition::TransitionTable;
use crate::walk;
use crate::Result;

/// Output of a preprocessing run: the pruned graph and one walk per
/// (repetition, node) pair, ready to feed a sequence-embedding trainer.
#[derive(Debug, Clone)]
pub struct WalkCorpus {
    graph: BipartiteGraph,
    walks: Vec<Vec<usize>>,
}

impl WalkCorpus {
    /// Walks over dense node ids, in deterministic (repetition, node) order.
    pub fn walks(&self) -> &[Vec<usize>] {
        &self.walks
    }

    /// The pruned graph the walks were sampled from.
    pub fn graph(&self) -> &BipartiteGraph {
        &self.graph
    }

    /// Walks rendered to boundary strings, one token vector per walk.
    pub fn walk_names(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.walks
            .iter()
            .map(|w| w.iter().map(|&v| self.graph.name(v)).collect())
    }

    /// Names of the surviving nodes of `role`, so the trainer's output
    /// vectors can be filtered down to the entity type whose embeddings are
    /// actually wanted.
    pub fn nodes_of_role(&self, role: Role) -> Vec<&str> {
        self.graph
            .nodes_of_role(role)
            .into_iter()
            .map(|v| self.graph.name(v))
            .collect()
    }

    /// Serialize the corpus as delimited text, one walk per line.
    pub fn write_walks<W: std::io::Write>(&self, out: W) -> Result<()> {
        crate::io::write_walks(&self.graph, &self.walks, out)
    }
}

/// Run the whole preprocessing pipeline on a raw edge list.
///
/// Validates the configuration eagerly, then: build adjacency, prune
/// low-degree nodes of `config.prune_role`, precompute the second-order
/// transition table (in parallel when the `parallel` feature is on), and
/// sample `walks_per_node` walks from every surviving node.
pub fn prepare_walks<I, A, B>(edges: I, config: &PipelineConfig) -> Result<WalkCorpus>
where
    I: IntoIterator<Item = (A, B)>,
    A: AsRef<str>,
    B: AsRef<str>,
{
    config.validate()?;

    let graph = BipartiteGraph::from_edges(edges)?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built bipartite adjacency"
    );

    let graph = graph.prune(config.prune_role, config.min_degree)?;

    #[cfg(feature = "parallel")]
    let table = TransitionTable::new_parallel(&graph, config.p, config.q)?;
    #[cfg(not(feature = "parallel"))]
    let table = TransitionTable::new(&graph, config.p, config.q)?;

    let nodes: Vec<usize> = graph.all_nodes().collect();

    #[cfg(feature = "parallel")]
    let walks = walk::generate_walks_parallel(&table, &nodes, config.walk_config())?;
    #[cfg(not(feature = "parallel"))]
    let walks = walk::generate_walks(&table, &nodes, config.walk_config())?;

    info!(walks = walks.len(), "generated walk corpus");
    Ok(WalkCorpus { graph, walks })
}
