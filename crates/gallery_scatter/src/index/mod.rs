//! Hierarchical index over a lazily-discovered image corpus.
//!
//! This module builds a tree of discovered asset packages and answers
//! total-count and windowed-path queries filtered by [`Orientation`]:
//! - [`node`]: package trees of directories and classified image leaves
//! - [`path_index`]: the ordered package index and its ring queries
use bitflags::bitflags;

pub mod node;
pub mod path_index;

pub use node::{ImageRecord, PackageNode};
pub use path_index::PathIndex;

/// Aspect ratio above which an image counts as landscape.
pub const LANDSCAPE_ASPECT_THRESHOLD: f32 = 1.3;
/// Aspect ratio below which an image counts as portrait.
pub const PORTRAIT_ASPECT_THRESHOLD: f32 = 6.0 / 7.0;

bitflags! {
    /// Orientation classes of an image, usable as a query mask.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Orientation: u8 {
        const LANDSCAPE = 1 << 0;
        const PORTRAIT  = 1 << 1;
        const SQUARE    = 1 << 2;
    }
}

impl Orientation {
    /// Classify a single image by its pixel dimensions.
    ///
    /// Aspect ratios above [`LANDSCAPE_ASPECT_THRESHOLD`] are landscape,
    /// below [`PORTRAIT_ASPECT_THRESHOLD`] portrait, everything between
    /// square. A zero height yields an infinite ratio and classifies as
    /// landscape rather than panicking.
    pub fn classify(width: u32, height: u32) -> Orientation {
        let aspect = width as f32 / height as f32;
        if aspect > LANDSCAPE_ASPECT_THRESHOLD {
            Orientation::LANDSCAPE
        } else if aspect < PORTRAIT_ASPECT_THRESHOLD {
            Orientation::PORTRAIT
        } else {
            Orientation::SQUARE
        }
    }
}
