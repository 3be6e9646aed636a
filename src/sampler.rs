//! Weighted categorical sampling over node ids.

use crate::{Error, Result};
use rand::Rng;

/// A mapping from node id to non-negative weight that can draw ids with
/// probability proportional to weight.
///
/// Keys keep insertion order so `keys()` and `probabilities()` read out
/// aligned. Normalization is lazy: weights can be accumulated incrementally
/// and are only summed when probabilities are read or a draw is taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedSampler {
    keys: Vec<usize>,
    weights: Vec<f32>,
}

impl WeightedSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            weights: Vec::with_capacity(capacity),
        }
    }

    /// Insert or overwrite the weight for `key`.
    ///
    /// Rejects negative (and NaN) weights with [`Error::InvalidWeight`].
    pub fn set(&mut self, key: usize, weight: f32) -> Result<()> {
        if !(weight >= 0.0) {
            return Err(Error::InvalidWeight(weight));
        }
        match self.keys.iter().position(|&k| k == key) {
            Some(i) => self.weights[i] = weight,
            None => {
                self.keys.push(key);
                self.weights.push(weight);
            }
        }
        Ok(())
    }

    /// Keys in insertion order, aligned with [`WeightedSampler::probabilities`].
    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    /// Raw (unnormalized) weights, aligned with `keys()`.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Weight of `key` divided by the sum of all current weights, per key.
    ///
    /// Fails with [`Error::EmptyDistribution`] when there are no keys or all
    /// weights are zero.
    pub fn probabilities(&self) -> Result<Vec<f32>> {
        let sum: f32 = self.weights.iter().copied().sum();
        if !(sum > 0.0) {
            return Err(Error::EmptyDistribution);
        }
        Ok(self.weights.iter().map(|w| w / sum).collect())
    }

    /// Draw one key from the categorical distribution defined by the weights.
    ///
    /// Takes a caller-supplied RNG so draws are reproducible under a fixed
    /// seed. Scans the CDF over raw weights rather than materializing the
    /// normalized vector per draw.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<usize> {
        let sum: f32 = self.weights.iter().copied().sum();
        if !(sum > 0.0) {
            return Err(Error::EmptyDistribution);
        }
        if self.keys.len() == 1 {
            return Ok(self.keys[0]);
        }

        let mut r = rng.random::<f32>() * sum;
        for (i, &w) in self.weights.iter().enumerate() {
            if r <= w {
                return Ok(self.keys[i]);
            }
            r -= w;
        }
        Ok(*self.keys.last().expect("non-empty by sum check"))
    }
}
