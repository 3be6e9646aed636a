//! Configuration value objects for walk generation and the full pipeline.

use crate::graph::Role;
use crate::{Error, Result};

/// Shape of a walk-generation run.
///
/// The bias parameters `p`/`q` are not here: they are owned by the
/// [`crate::TransitionTable`] the walks are sampled from, so a config/table
/// mismatch cannot exist.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkConfig {
    /// Number of nodes per emitted walk (seed anchor excluded).
    pub length: usize,
    /// Number of walks generated per seed node.
    pub walks_per_node: usize,
    /// Seed for deterministic RNG streams.
    pub seed: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self { length: 80, walks_per_node: 10, seed: 42 }
    }
}

/// Everything the preprocessing pipeline needs, validated up front so the
/// batch phases never start on inputs that cannot finish.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Minimum degree a node of `prune_role` must keep to survive pruning.
    pub min_degree: usize,
    /// Return bias: likelihood of a walk stepping back where it came from.
    pub p: f32,
    /// In-out bias: likelihood of exploring distance-2 nodes over shared
    /// neighbors.
    pub q: f32,
    pub walks_per_node: usize,
    pub walk_length: usize,
    /// Window size of the downstream skip-gram trainer. Not used by walk
    /// generation itself, but a window at least as long as the walks can
    /// never be satisfied, so it is rejected here.
    pub context_size: usize,
    /// Which side of the relation is degree-pruned.
    pub prune_role: Role,
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_degree: 1,
            p: 1.0,
            q: 1.0,
            walks_per_node: 10,
            walk_length: 80,
            context_size: 10,
            prune_role: Role::Right,
            seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Reject configurations that cannot produce a valid run.
    pub fn validate(&self) -> Result<()> {
        if !(self.p > 0.0 && self.p.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "return bias p must be a positive real, got {}",
                self.p
            )));
        }
        if !(self.q > 0.0 && self.q.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "in-out bias q must be a positive real, got {}",
                self.q
            )));
        }
        if self.min_degree == 0 {
            return Err(Error::InvalidParameter(
                "min_degree must be a positive integer".into(),
            ));
        }
        if self.walks_per_node == 0 {
            return Err(Error::InvalidParameter(
                "walks_per_node must be a positive integer".into(),
            ));
        }
        if self.walk_length == 0 {
            return Err(Error::InvalidParameter(
                "walk_length must be a positive integer".into(),
            ));
        }
        if self.context_size >= self.walk_length {
            return Err(Error::InvalidConfiguration(format!(
                "context_size ({}) must be smaller than walk_length ({})",
                self.context_size, self.walk_length
            )));
        }
        Ok(())
    }

    pub fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            length: self.walk_length,
            walks_per_node: self.walks_per_node,
            seed: self.seed,
        }
    }
}
