//! Edge-list reading and walk serialization at the pipeline boundary.
//!
//! Neither format is a contract of the algorithm: walks go out as plain
//! delimited text (one walk per line, space-separated node ids) so they can
//! be streamed into the external trainer without holding everything
//! resident.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::graph::BipartiteGraph;
use crate::{Error, Result};

/// Load a two-column relation (one `left right` or `left,right` pair per
/// line). Blank lines and lines starting with `#` are ignored.
pub fn read_edge_list<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>> {
    let reader = BufReader::new(File::open(path.as_ref())?);

    let mut edges = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty());
        let (left, right) = match (fields.next(), fields.next(), fields.next()) {
            (Some(a), Some(b), None) => (a, b),
            _ => {
                return Err(Error::InvalidParameter(format!(
                    "line {}: expected exactly two fields, got {line:?}",
                    line_no + 1
                )));
            }
        };
        edges.push((left.to_owned(), right.to_owned()));
    }
    Ok(edges)
}

/// Write walks as one line each, space-separated node names.
pub fn write_walks<W: Write>(
    graph: &BipartiteGraph,
    walks: &[Vec<usize>],
    mut out: W,
) -> Result<()> {
    for walk in walks {
        let mut first = true;
        for &node in walk {
            if !first {
                out.write_all(b" ")?;
            }
            out.write_all(graph.name(node).as_bytes())?;
            first = false;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}
