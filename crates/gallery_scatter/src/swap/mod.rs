//! Deterministic without-replacement distribution of assets over placement targets.
//!
//! - [`pool`]: per-category candidate pools with used-index bookkeeping
//! - [`engine`]: round orchestration over enumerated placement targets
use std::fmt;

use crate::catalog::Shape;

pub mod engine;
pub mod pool;

pub use engine::{DistributionEngine, RoundSettings};
pub use pool::DistributionPool;

/// Draw category a pool serves: the unified pool or one per-shape pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolCategory {
    All,
    Landscape,
    Square,
    Portrait,
}

impl PoolCategory {
    pub fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::Landscape => PoolCategory::Landscape,
            Shape::Square => PoolCategory::Square,
            Shape::Portrait => PoolCategory::Portrait,
        }
    }
}

impl fmt::Display for PoolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolCategory::All => "all",
            PoolCategory::Landscape => "landscape",
            PoolCategory::Square => "square",
            PoolCategory::Portrait => "portrait",
        };
        f.write_str(name)
    }
}

/// One placement point in the scene, enumerated fresh each round by the
/// scene collaborator in a fixed, stable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementTarget {
    /// Opaque handle of the render object owning the slot.
    pub handle: u64,
    /// Material slot index on that object.
    pub slot: usize,
    /// Material name used for catalog lookup and exclusion checks.
    pub material: String,
}

impl PlacementTarget {
    pub fn new(handle: u64, slot: usize, material: impl Into<String>) -> Self {
        Self {
            handle,
            slot,
            material: material.into(),
        }
    }
}

/// One draw applied to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub handle: u64,
    pub slot: usize,
    pub category: PoolCategory,
    /// Pre-removal index drawn from the pool. Identical across peers for
    /// identical seed, pool content, and target enumeration order.
    pub index: usize,
    pub asset: String,
}

/// Result of one full distribution round.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct RoundResult {
    /// Assignments in draw order.
    pub assignments: Vec<Assignment>,
    /// Total placement targets examined, eligible or not.
    pub targets_checked: usize,
}

impl RoundResult {
    pub fn changed_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn changed_in(&self, category: PoolCategory) -> usize {
        self.assignments
            .iter()
            .filter(|assignment| assignment.category == category)
            .count()
    }
}

/// Used-index lists for every category, as exchanged during peer sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedSnapshot {
    pub all: Vec<usize>,
    pub portrait: Vec<usize>,
    pub square: Vec<usize>,
    pub landscape: Vec<usize>,
}
