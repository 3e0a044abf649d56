#![forbid(unsafe_code)]
//! gallery_scatter: deterministic, seed-reproducible distribution of visual
//! assets across placement points in a shared scene.
//!
//! Modules:
//! - index: hierarchical package index with orientation counts and windowed path queries
//! - catalog: name -> shape/display-mode classification lookup
//! - swap: without-replacement draw pools and round orchestration
//! - sync: session roles, peer messages, and host/client state reconciliation
//!
//! Peers that share a seed, pool content, and target enumeration order
//! reproduce bit-identical assignments without exchanging the assets
//! themselves; only the seed and used-index bookkeeping travel over the
//! wire.
pub mod catalog;
pub mod error;
pub mod index;
pub mod swap;
pub mod sync;

/// Convenient re-exports for common types. Import with `use gallery_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::catalog::{AssetClass, Catalog, ClassificationRecord, DisplayMode, Shape};
    pub use crate::error::{Error, Result};
    pub use crate::index::{ImageRecord, Orientation, PackageNode, PathIndex};
    pub use crate::swap::{
        Assignment, DistributionEngine, DistributionPool, PlacementTarget, PoolCategory,
        RoundResult, RoundSettings, UsedSnapshot,
    };
    pub use crate::sync::{
        InboundSender, PeerId, Role, SessionContext, SessionSync, SwapConfig, SwapMessage,
        SyncKind, Toggles, Transport,
    };
}
