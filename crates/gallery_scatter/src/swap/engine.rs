//! Round orchestration: deterministic assignment of pooled assets to targets.
//!
//! A round resolves its settings once (seed, active display mode, pool
//! layout), builds one seeded PCG generator, and walks the placement
//! targets in enumeration order, drawing from the unified pool or the
//! per-shape pool the target's classification selects. Given identical
//! seed, pool content and target order, every peer produces an identical
//! `(index, asset)` sequence; nothing else may consult randomness during
//! the round.
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::{debug, info};

use crate::catalog::{Catalog, DisplayMode};
use crate::error::Result;
use crate::swap::pool::DistributionPool;
use crate::swap::{Assignment, PlacementTarget, PoolCategory, RoundResult, UsedSnapshot};

/// Material name fragments that are never swapped; these belong to
/// structural frame assets sharing slots with swappable surfaces.
pub const DEFAULT_EXCLUDED_SUBSTRINGS: &[&str] = &[
    "Painting Frame Vertical Gold",
    "Painting Frame Horizontal Gold",
];

/// Settings a round runs under, resolved from the session before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSettings {
    /// Seed for the round's generator. Same seed on every peer.
    pub seed: u64,
    /// The single active display mode (priority-resolved, never a union).
    pub mode: DisplayMode,
    /// Per-shape pools when true, one unified pool when false.
    pub separated_pools: bool,
}

impl RoundSettings {
    pub fn new(seed: u64, mode: DisplayMode, separated_pools: bool) -> Self {
        Self {
            seed,
            mode,
            separated_pools,
        }
    }
}

/// Owns the per-category pools and runs distribution rounds over them.
pub struct DistributionEngine {
    all: DistributionPool,
    landscape: DistributionPool,
    square: DistributionPool,
    portrait: DistributionPool,
    excluded_substrings: Vec<String>,
}

impl Default for DistributionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DistributionEngine {
    pub fn new() -> Self {
        Self {
            all: DistributionPool::new(PoolCategory::All),
            landscape: DistributionPool::new(PoolCategory::Landscape),
            square: DistributionPool::new(PoolCategory::Square),
            portrait: DistributionPool::new(PoolCategory::Portrait),
            excluded_substrings: DEFAULT_EXCLUDED_SUBSTRINGS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }

    /// Replace the exclusion fragments checked against material names.
    pub fn with_excluded_substrings(mut self, excluded: Vec<String>) -> Self {
        self.excluded_substrings = excluded;
        self
    }

    /// Load the full candidate sets for every category and reset all pools.
    pub fn set_sources(
        &mut self,
        all: Vec<String>,
        landscape: Vec<String>,
        square: Vec<String>,
        portrait: Vec<String>,
    ) {
        self.all.set_source(all);
        self.landscape.set_source(landscape);
        self.square.set_source(square);
        self.portrait.set_source(portrait);
    }

    /// Reset every pool to its full source content and clear used lists.
    /// Called at session start and when leaving a multiplayer room.
    pub fn reset_pools(&mut self) {
        self.all.reset();
        self.landscape.reset();
        self.square.reset();
        self.portrait.reset();
        info!("all distribution pools reset");
    }

    pub fn pool(&self, category: PoolCategory) -> &DistributionPool {
        match category {
            PoolCategory::All => &self.all,
            PoolCategory::Landscape => &self.landscape,
            PoolCategory::Square => &self.square,
            PoolCategory::Portrait => &self.portrait,
        }
    }

    fn pool_mut(&mut self, category: PoolCategory) -> &mut DistributionPool {
        match category {
            PoolCategory::All => &mut self.all,
            PoolCategory::Landscape => &mut self.landscape,
            PoolCategory::Square => &mut self.square,
            PoolCategory::Portrait => &mut self.portrait,
        }
    }

    fn is_excluded(&self, material: &str) -> bool {
        self.excluded_substrings
            .iter()
            .any(|fragment| material.contains(fragment.as_str()))
    }

    /// Run one full distribution round over `targets` in enumeration order.
    ///
    /// Snapshots rotate (current used lists freeze as the previous round)
    /// before the first draw. Targets that are excluded, unclassified, or
    /// ineligible for the active mode are skipped without consuming a draw.
    pub fn run_round(
        &mut self,
        settings: &RoundSettings,
        targets: &[PlacementTarget],
        catalog: &Catalog,
    ) -> Result<RoundResult> {
        let mut rng = Pcg64::seed_from_u64(settings.seed);
        info!(
            seed = settings.seed,
            mode = ?settings.mode,
            separated_pools = settings.separated_pools,
            targets = targets.len(),
            "starting distribution round"
        );

        self.all.rotate_snapshot();
        self.landscape.rotate_snapshot();
        self.square.rotate_snapshot();
        self.portrait.rotate_snapshot();

        let mut result = RoundResult::default();
        for target in targets {
            result.targets_checked += 1;
            let material = target.material.trim();

            if self.is_excluded(material) {
                continue;
            }
            let Some(class) = catalog.class_of(material) else {
                continue;
            };
            if !class.modes.intersects(settings.mode) {
                continue;
            }

            let category = if settings.separated_pools {
                PoolCategory::for_shape(class.shape)
            } else {
                PoolCategory::All
            };

            let (index, asset) = self.pool_mut(category).draw(&mut rng)?;
            debug!(index, %category, target = material, "assigned asset");
            result.assignments.push(Assignment {
                handle: target.handle,
                slot: target.slot,
                category,
                index,
                asset,
            });
        }

        info!(
            changed = result.changed_count(),
            checked = result.targets_checked,
            "distribution round complete"
        );
        Ok(result)
    }

    /// Used-index lists for the in-progress round.
    pub fn used_snapshot(&self) -> UsedSnapshot {
        UsedSnapshot {
            all: self.all.used().to_vec(),
            portrait: self.portrait.used().to_vec(),
            square: self.square.used().to_vec(),
            landscape: self.landscape.used().to_vec(),
        }
    }

    /// Used-index lists frozen at the start of the current round, covering
    /// peers that joined mid-round and must reconcile against the previous
    /// completed round.
    pub fn prev_round_snapshot(&self) -> UsedSnapshot {
        UsedSnapshot {
            all: self.all.used_prev_round().to_vec(),
            portrait: self.portrait.used_prev_round().to_vec(),
            square: self.square.used_prev_round().to_vec(),
            landscape: self.landscape.used_prev_round().to_vec(),
        }
    }

    /// Rebuild the exact remaining-pool state a host snapshot describes:
    /// reset all pools, then remove each listed index in list order from
    /// the matching pool.
    pub fn apply_snapshot(&mut self, snapshot: &UsedSnapshot) {
        self.reset_pools();
        self.all.remove_used(&snapshot.all);
        self.portrait.remove_used(&snapshot.portrait);
        self.square.remove_used(&snapshot.square);
        self.landscape.remove_used(&snapshot.landscape);
        info!(
            all = snapshot.all.len(),
            portrait = snapshot.portrait.len(),
            square = snapshot.square.len(),
            landscape = snapshot.landscape.len(),
            "applied host pool snapshot"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AssetClass, Shape};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        for (name, shape, modes) in [
            ("Painting A", Shape::Landscape, DisplayMode::NORMAL | DisplayMode::CHAOS),
            ("Painting B", Shape::Portrait, DisplayMode::NORMAL),
            ("Painting C", Shape::Square, DisplayMode::NORMAL),
            ("Rug", Shape::Square, DisplayMode::RUGS_AND_BANNERS),
        ] {
            catalog.insert(name, AssetClass { shape, modes });
        }
        catalog
    }

    fn engine_with_sources() -> DistributionEngine {
        let mut engine = DistributionEngine::new();
        let assets: Vec<String> = (0..5).map(|i| format!("img-{i}")).collect();
        engine.set_sources(
            assets.clone(),
            assets[0..2].to_vec(),
            assets[2..4].to_vec(),
            assets[4..5].to_vec(),
        );
        engine
    }

    fn targets(names: &[&str]) -> Vec<PlacementTarget> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| PlacementTarget::new(i as u64, 0, *name))
            .collect()
    }

    #[test]
    fn identical_settings_produce_identical_assignments() {
        let catalog = catalog();
        let names = ["Painting A", "Painting B", "Painting C", "Painting A"];
        let settings = RoundSettings::new(12345, DisplayMode::NORMAL, false);

        let first = engine_with_sources()
            .run_round(&settings, &targets(&names), &catalog)
            .unwrap();
        let second = engine_with_sources()
            .run_round(&settings, &targets(&names), &catalog)
            .unwrap();

        assert_eq!(first.assignments, second.assignments);
        assert_eq!(first.changed_count(), 4);
    }

    #[test]
    fn seven_targets_over_five_assets_refill_on_sixth_draw() {
        // Pinned scenario: unified pool of 5, 7 eligible targets, seed 12345.
        let catalog = catalog();
        let names = ["Painting A"; 7];
        let settings = RoundSettings::new(12345, DisplayMode::NORMAL, false);

        let mut engine = engine_with_sources();
        let result = engine
            .run_round(&settings, &targets(&names), &catalog)
            .unwrap();
        assert_eq!(result.changed_count(), 7);

        // Draws 1-5 consume all five assets without repetition.
        let mut first_five: Vec<&str> = result.assignments[0..5]
            .iter()
            .map(|a| a.asset.as_str())
            .collect();
        first_five.sort();
        first_five.dedup();
        assert_eq!(first_five.len(), 5);

        // Draw 6 refilled the pool and cleared the used list; after draw 7
        // two fresh indices are recorded.
        assert_eq!(engine.pool(PoolCategory::All).used().len(), 2);
        assert_eq!(engine.pool(PoolCategory::All).remaining(), 3);
    }

    #[test]
    fn sixth_draw_refills_then_records_one_index() {
        let catalog = catalog();
        let names = ["Painting A"; 6];
        let settings = RoundSettings::new(12345, DisplayMode::NORMAL, false);

        let mut engine = engine_with_sources();
        let result = engine
            .run_round(&settings, &targets(&names), &catalog)
            .unwrap();
        assert_eq!(result.changed_count(), 6);
        assert_eq!(engine.pool(PoolCategory::All).used().len(), 1);
        assert_eq!(engine.pool(PoolCategory::All).remaining(), 4);
    }

    #[test]
    fn separated_pools_draw_by_target_shape() {
        let catalog = catalog();
        let names = ["Painting A", "Painting B", "Painting C"];
        let settings = RoundSettings::new(9, DisplayMode::NORMAL, true);

        let result = engine_with_sources()
            .run_round(&settings, &targets(&names), &catalog)
            .unwrap();

        let categories: Vec<PoolCategory> =
            result.assignments.iter().map(|a| a.category).collect();
        assert_eq!(
            categories,
            vec![
                PoolCategory::Landscape,
                PoolCategory::Portrait,
                PoolCategory::Square
            ]
        );
    }

    #[test]
    fn mode_and_exclusions_gate_eligibility() {
        let catalog = catalog();
        let names = [
            "Rug",                            // wrong mode under Normal
            "Painting Frame Vertical Gold",   // excluded fragment
            "Unknown Material",               // not in catalog
            "Painting A",
        ];
        let settings = RoundSettings::new(5, DisplayMode::NORMAL, false);

        let result = engine_with_sources()
            .run_round(&settings, &targets(&names), &catalog)
            .unwrap();
        assert_eq!(result.targets_checked, 4);
        assert_eq!(result.changed_count(), 1);
        assert_eq!(result.assignments[0].handle, 3);
    }

    #[test]
    fn chaos_mode_selects_chaos_eligible_assets_only() {
        let catalog = catalog();
        let names = ["Painting A", "Painting B"];
        let settings = RoundSettings::new(5, DisplayMode::CHAOS, false);

        let result = engine_with_sources()
            .run_round(&settings, &targets(&names), &catalog)
            .unwrap();
        assert_eq!(result.changed_count(), 1);
        assert_eq!(result.assignments[0].handle, 0);
    }

    #[test]
    fn empty_source_surfaces_as_error_for_eligible_target() {
        let catalog = catalog();
        let mut engine = DistributionEngine::new();
        engine.set_sources(Vec::new(), Vec::new(), Vec::new(), Vec::new());

        let settings = RoundSettings::new(1, DisplayMode::NORMAL, false);
        let err = engine
            .run_round(&settings, &targets(&["Painting A"]), &catalog)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::EmptySource {
                category: PoolCategory::All
            }
        ));
    }

    #[test]
    fn late_join_reconstruction_matches_host_round_start() {
        let catalog = catalog();
        let names = ["Painting A", "Painting A", "Painting A"];
        let settings = RoundSettings::new(77, DisplayMode::NORMAL, false);

        let mut host = engine_with_sources();
        host.run_round(&settings, &targets(&names), &catalog).unwrap();
        // Second round freezes round one's draws as the previous snapshot.
        host.run_round(&settings, &targets(&names), &catalog).unwrap();

        let mut joiner = engine_with_sources();
        joiner.apply_snapshot(&host.prev_round_snapshot());

        // The joiner's pool must equal the host's pool as it stood at the
        // start of round two: source minus round one's three draws.
        let mut expected: Vec<String> = {
            let mut replay = engine_with_sources();
            replay.run_round(&settings, &targets(&names), &catalog).unwrap();
            replay.pool(PoolCategory::All).items().to_vec()
        };
        let mut actual = joiner.pool(PoolCategory::All).items().to_vec();
        expected.sort();
        actual.sort();
        assert_eq!(expected, actual);
    }
}
