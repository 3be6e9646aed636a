//! End-to-end sketch: edge list -> pruned graph -> transition table -> walks.
//!
//! Exercises the exact seams the downstream embedding trainer cares about:
//! - `prepare_walks` as the single pipeline entry point
//! - `WalkCorpus::write_walks` as the delimited-text boundary
//! - `WalkCorpus::nodes_of_role` to filter trainer output to one entity type
//!
//! Usage: `cargo run --example end_to_end [path/to/edges.txt]`
//! With no argument, a small built-in user/likes relation is used.

use std::io::Write;

use bipwalk::{prepare_walks, read_edge_list, PipelineConfig, Role};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let edges = match std::env::args().nth(1) {
        Some(path) => read_edge_list(path)?,
        None => vec![
            ("alice", "jazz"),
            ("alice", "gardening"),
            ("bob", "jazz"),
            ("bob", "chess"),
            ("carol", "chess"),
            ("carol", "gardening"),
            ("dan", "jazz"),
        ]
        .into_iter()
        .map(|(a, b)| (a.to_owned(), b.to_owned()))
        .collect(),
    };

    let config = PipelineConfig {
        min_degree: 1,
        p: 0.5,
        q: 2.0,
        walks_per_node: 2,
        walk_length: 8,
        context_size: 3,
        ..Default::default()
    };

    let corpus = prepare_walks(edges.iter().map(|(a, b)| (a, b)), &config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "# {} nodes, {} walks; embedding targets: {:?}",
        corpus.graph().node_count(),
        corpus.walks().len(),
        corpus.nodes_of_role(Role::Left)
    )?;
    corpus.write_walks(&mut out)?;
    Ok(())
}
