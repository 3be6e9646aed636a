//! Bipartite adjacency built from a raw edge list.
//!
//! Ingestion is column-typed (each node belongs to the column it first
//! appeared in) but the built graph is role-agnostic for traversal:
//! undirected, unweighted, with sorted neighbor lists.
//!
//! Node ids are dense `usize` indices assigned in first-occurrence order, so
//! everything downstream (transition table, walks) is index math; strings
//! only cross the boundary through [`BipartiteGraph::name`] and
//! [`BipartiteGraph::id_of`].

use std::collections::HashMap;

use tracing::info;

use crate::{Error, Result};

/// Which of the two entity types a node belongs to.
///
/// `Left` is the first edge-list column (e.g. "user"), `Right` the second
/// (e.g. "item"). If an id shows up in both columns, its first occurrence
/// wins; the extra edges are still added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Left,
    Right,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Left => Role::Right,
            Role::Right => Role::Left,
        }
    }
}

/// Undirected bipartite graph, immutable once built.
#[derive(Debug, Clone)]
pub struct BipartiteGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    roles: Vec<Role>,
    adj: Vec<Vec<usize>>,
}

impl BipartiteGraph {
    /// Build adjacency from `(left, right)` string pairs.
    ///
    /// Every pair adds `right` to `left`'s neighbor set and vice versa;
    /// duplicate pairs collapse to a single edge. Fails with
    /// [`Error::EmptyGraph`] when the input contains no edges.
    pub fn from_edges<I, A, B>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut graph = Self {
            names: Vec::new(),
            index: HashMap::new(),
            roles: Vec::new(),
            adj: Vec::new(),
        };

        let mut pairs = 0usize;
        for (left, right) in edges {
            let u = graph.intern(left.as_ref(), Role::Left);
            let v = graph.intern(right.as_ref(), Role::Right);
            graph.adj[u].push(v);
            graph.adj[v].push(u);
            pairs += 1;
        }
        if pairs == 0 {
            return Err(Error::EmptyGraph("edge list is empty".into()));
        }

        for nbrs in &mut graph.adj {
            nbrs.sort_unstable();
            nbrs.dedup();
        }
        Ok(graph)
    }

    fn intern(&mut self, name: &str, role: Role) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), id);
        self.roles.push(role);
        self.adj.push(Vec::new());
        id
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Sorted neighbor ids of `node`.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.adj.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }

    pub fn role(&self, node: usize) -> Role {
        self.roles[node]
    }

    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// All surviving node ids, both roles.
    pub fn all_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        0..self.node_count()
    }

    /// Node ids of one role, in id order.
    pub fn nodes_of_role(&self, role: Role) -> Vec<usize> {
        (0..self.node_count())
            .filter(|&v| self.roles[v] == role)
            .collect()
    }

    /// Remove every node of `role` whose degree is below `min_degree`, along
    /// with all edges touching it. Nodes on the other side left without any
    /// neighbor are dropped as well (they can no longer start or appear in a
    /// walk). Returns a new compacted graph; ids are re-assigned but relative
    /// order and names are preserved.
    ///
    /// Fails with [`Error::EmptyGraph`] if pruning removes every node of a
    /// role or leaves zero edges. Pruning an already-pruned graph with the
    /// same threshold is a no-op (modulo id compaction, which is stable).
    pub fn prune(&self, role: Role, min_degree: usize) -> Result<BipartiteGraph> {
        if min_degree == 0 {
            return Err(Error::InvalidParameter(
                "min_degree must be a positive integer".into(),
            ));
        }

        let keep: Vec<bool> = (0..self.node_count())
            .map(|v| self.roles[v] != role || self.degree(v) >= min_degree)
            .collect();

        // Second pass: surviving neighbor sets, then drop isolated leftovers.
        let survives: Vec<bool> = (0..self.node_count())
            .map(|v| keep[v] && self.neighbors(v).iter().any(|&u| keep[u]))
            .collect();

        let mut remap = vec![usize::MAX; self.node_count()];
        let mut pruned = Self {
            names: Vec::new(),
            index: HashMap::new(),
            roles: Vec::new(),
            adj: Vec::new(),
        };
        for v in 0..self.node_count() {
            if !survives[v] {
                continue;
            }
            let id = pruned.names.len();
            remap[v] = id;
            pruned.names.push(self.names[v].clone());
            pruned.index.insert(self.names[v].clone(), id);
            pruned.roles.push(self.roles[v]);
            pruned.adj.push(
                self.neighbors(v)
                    .iter()
                    .filter(|&&u| survives[u])
                    .copied()
                    .collect(),
            );
        }
        // Neighbor ids still reference the old numbering; remap keeps sort order
        // because compaction is monotone.
        for nbrs in &mut pruned.adj {
            for u in nbrs.iter_mut() {
                *u = remap[*u];
            }
        }

        info!(
            dropped_nodes = self.node_count() - pruned.node_count(),
            dropped_edges = self.edge_count() - pruned.edge_count(),
            min_degree,
            "pruned low-degree nodes"
        );

        if pruned.nodes_of_role(Role::Left).is_empty()
            || pruned.nodes_of_role(Role::Right).is_empty()
        {
            return Err(Error::EmptyGraph(format!(
                "pruning with min_degree={min_degree} removed every node of a role"
            )));
        }
        if pruned.edge_count() == 0 {
            return Err(Error::EmptyGraph(format!(
                "pruning with min_degree={min_degree} left zero edges"
            )));
        }
        Ok(pruned)
    }
}
