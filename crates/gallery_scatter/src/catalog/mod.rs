//! Classification lookup deciding eligibility of placement targets.
//!
//! The catalog maps asset/material names (case-insensitive) to a shape and
//! the set of display modes the asset may be drawn under. It is loaded once
//! from a comma-separated text record source (see [`record`]) and read-only
//! afterwards; it is independent of the path index.
use std::collections::HashMap;

use bitflags::bitflags;

pub mod record;

pub use record::ClassificationRecord;

use crate::error::Result;

/// Shape class of an asset, as declared by its classification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Landscape,
    Square,
    Portrait,
}

impl Shape {
    /// Case-insensitive token parse; `None` for unknown tokens.
    pub fn from_token(token: &str) -> Option<Shape> {
        match token.trim().to_ascii_lowercase().as_str() {
            "landscape" => Some(Shape::Landscape),
            "square" => Some(Shape::Square),
            "portrait" => Some(Shape::Portrait),
            _ => None,
        }
    }
}

bitflags! {
    /// Eligibility categories gating which assets may be drawn in a round.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct DisplayMode: u8 {
        const NORMAL           = 1 << 0;
        const RUGS_AND_BANNERS = 1 << 1;
        const CHAOS            = 1 << 2;
    }
}

impl DisplayMode {
    /// Case-insensitive token parse; `None` for unknown tokens.
    pub fn from_token(token: &str) -> Option<DisplayMode> {
        match token.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(DisplayMode::NORMAL),
            "rugsandbanners" => Some(DisplayMode::RUGS_AND_BANNERS),
            "chaos" => Some(DisplayMode::CHAOS),
            _ => None,
        }
    }
}

/// Classification of one asset: its shape and the modes it is eligible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetClass {
    pub shape: Shape,
    pub modes: DisplayMode,
}

/// Case-insensitive name -> [`AssetClass`] lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, AssetClass>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from parsed records. Later records win on duplicate
    /// names.
    pub fn from_records(records: impl IntoIterator<Item = ClassificationRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(
                record.name,
                AssetClass {
                    shape: record.shape,
                    modes: record.modes,
                },
            );
        }
        catalog
    }

    /// Parse classification records from any reader and build a catalog.
    /// Malformed lines are skipped, never fatal.
    pub fn from_reader(reader: impl std::io::BufRead) -> Result<Self> {
        Ok(Self::from_records(record::parse_records(reader)?))
    }

    /// Convenience wrapper reading the record file at `path`.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn insert(&mut self, name: impl Into<String>, class: AssetClass) {
        self.entries.insert(name.into().to_ascii_lowercase(), class);
    }

    pub fn class_of(&self, name: &str) -> Option<&AssetClass> {
        self.entries.get(&name.trim().to_ascii_lowercase())
    }

    pub fn shape_of(&self, name: &str) -> Option<Shape> {
        self.class_of(name).map(|class| class.shape)
    }

    pub fn has_mode(&self, name: &str, mode: DisplayMode) -> bool {
        self.class_of(name)
            .is_some_and(|class| class.modes.intersects(mode))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
