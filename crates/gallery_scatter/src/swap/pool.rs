//! Mutable candidate pool for one draw category.
//!
//! A pool draws without replacement: each draw picks a uniformly random
//! index into the remaining items, records the pre-removal index, and
//! removes the item by swapping with the last element. Removal is
//! index-deterministic, so peers replaying the same draw sequence against
//! the same initial content converge on the same remaining pool. When a
//! draw hits an empty pool it refills from the full source set and clears
//! the used list for that category.
use rand::{Rng, RngCore};
use tracing::debug;

use crate::error::{Error, Result};
use crate::swap::PoolCategory;

#[derive(Debug, Clone)]
pub struct DistributionPool {
    category: PoolCategory,
    source: Vec<String>,
    items: Vec<String>,
    used: Vec<usize>,
    used_prev_round: Vec<usize>,
}

impl DistributionPool {
    pub fn new(category: PoolCategory) -> Self {
        Self {
            category,
            source: Vec::new(),
            items: Vec::new(),
            used: Vec::new(),
            used_prev_round: Vec::new(),
        }
    }

    pub fn category(&self) -> PoolCategory {
        self.category
    }

    /// Replace the full source set and reset the working pool to it.
    pub fn set_source(&mut self, source: Vec<String>) {
        self.source = source;
        self.reset();
    }

    /// Reload the working pool from the source set and clear the used list.
    /// The previous-round snapshot is left alone.
    pub fn reset(&mut self) {
        self.items.clone_from(&self.source);
        self.used.clear();
        debug!(category = %self.category, size = self.items.len(), "pool reset");
    }

    /// Freeze the current used list as the previous-round snapshot. Called
    /// once per category immediately before the first draw of a round.
    pub fn rotate_snapshot(&mut self) {
        self.used_prev_round.clone_from(&self.used);
    }

    /// Draw one asset without replacement.
    ///
    /// Returns the pre-removal index and the drawn asset. An empty working
    /// pool triggers exactly one refill-and-clear-used before the draw; an
    /// empty source set is a fatal configuration error for this category.
    pub fn draw<R: RngCore>(&mut self, rng: &mut R) -> Result<(usize, String)> {
        if self.source.is_empty() {
            return Err(Error::EmptySource {
                category: self.category,
            });
        }
        if self.items.is_empty() {
            debug!(category = %self.category, "pool exhausted, refilling from source");
            self.items.clone_from(&self.source);
            self.used.clear();
        }

        let index = rng.random_range(0..self.items.len());
        let asset = self.items.swap_remove(index);
        self.used.push(index);
        Ok((index, asset))
    }

    /// Remove already-consumed indices, in list order, using the same
    /// swap-removal primitive as [`DistributionPool::draw`]. Applied during
    /// client reconciliation against a host snapshot.
    pub fn remove_used(&mut self, indices: &[usize]) {
        for &index in indices {
            if index < self.items.len() {
                self.items.swap_remove(index);
                self.used.push(index);
            } else {
                debug!(
                    category = %self.category,
                    index,
                    remaining = self.items.len(),
                    "sync index out of range, ignoring"
                );
            }
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn used(&self) -> &[usize] {
        &self.used
    }

    pub fn used_prev_round(&self) -> &[usize] {
        &self.used_prev_round
    }
}
