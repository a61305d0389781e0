//! The three transport-facing operations (fetch, advance, reset) over a grid store.

use crate::config::SimConfig;
use crate::core::{
    detect_changes, step_with_stats, ChangeSet, ChangedCell, GasRegistry, Grid, GridFactory,
    UnknownKindPolicy,
};
use crate::error::Result;
use crate::store::GridStore;

/// What one tick reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Only the cells that changed.
    Changes(Vec<ChangedCell>),
    /// A full grid, sent when a delta carries no useful information: nothing moved
    /// (the pre-step grid) or the shape changed (the new grid).
    FullGrid(Grid),
}

/// Drives load -> step -> diff -> save against a [`GridStore`].
///
/// Ticks through one `Simulator` are serialized by `&mut self`. Several simulators
/// sharing one backing store can still race and lose updates; coordinating them is
/// up to the caller.
#[derive(Debug)]
pub struct Simulator<S: GridStore> {
    registry: GasRegistry,
    store: S,
    factory: GridFactory,
    width: u32,
    height: u32,
    policy: UnknownKindPolicy,
}

impl<S: GridStore> Simulator<S> {
    /// Build a simulator over `store`. Clears the store first when the config asks to.
    pub fn open(config: &SimConfig, registry: GasRegistry, store: S) -> Result<Self> {
        config.validate()?;
        let sim = Self {
            registry,
            store,
            factory: GridFactory::new(config.grid.seed),
            width: config.grid.width,
            height: config.grid.height,
            policy: config.unknown_kind,
        };
        if config.store.clear_on_start {
            sim.store.clear()?;
            log::info!("Grid store cleared on start");
        }
        Ok(sim)
    }

    /// Kinds used to decode, step and encode grids.
    pub fn registry(&self) -> &GasRegistry {
        &self.registry
    }

    /// The backing snapshot store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current grid; a freshly generated one when nothing is persisted.
    pub fn load(&mut self) -> Result<Grid> {
        self.load_or_generate().map(|(grid, _)| grid)
    }

    fn load_or_generate(&mut self) -> Result<(Grid, bool)> {
        match self.store.load_snapshot()? {
            Some(snapshot) => {
                Grid::from_snapshot(&snapshot, &self.registry, self.policy).map(|g| (g, false))
            }
            None => {
                log::info!("No persisted grid, generating {}x{}", self.width, self.height);
                self.factory
                    .create_grid(&self.registry, self.width, self.height)
                    .map(|g| (g, true))
            }
        }
    }

    /// Persist `grid` as the current snapshot.
    pub fn save(&self, grid: &Grid) -> Result<()> {
        self.store.save_snapshot(&grid.to_snapshot(&self.registry)?)
    }

    /// Drop the persisted grid; the next load behaves as a first run.
    pub fn reset(&self) -> Result<()> {
        self.store.clear()?;
        log::info!("Grid store cleared");
        Ok(())
    }

    /// Fetch the current grid. A freshly generated grid is persisted right away so
    /// the next tick starts from what the caller has seen.
    pub fn current_grid(&mut self) -> Result<Grid> {
        let (grid, generated) = self.load_or_generate()?;
        if generated {
            self.save(&grid)?;
        }
        log::info!("Grid sent ({} cells)", grid.len());
        Ok(grid)
    }

    /// Advance one tick, persist the result and report what changed.
    pub fn advance(&mut self) -> Result<TickOutcome> {
        let grid = self.load()?;
        log::info!("Simulating grid ({} cells)", grid.len());

        let (next, stats) = step_with_stats(&grid, &self.registry);
        let changes = detect_changes(&grid, &next);
        log::info!(
            "Changes: {} cells ({} swaps)",
            changes.cells().len(),
            stats.swaps
        );

        self.save(&next)?;
        Ok(match changes {
            ChangeSet::Delta(cells) => TickOutcome::Changes(cells),
            ChangeSet::Unchanged => TickOutcome::FullGrid(grid),
            ChangeSet::Reshaped(_) => TickOutcome::FullGrid(next),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KindId;
    use crate::store::MemoryStore;

    fn small_config(seed: u64) -> SimConfig {
        let mut config = SimConfig::default();
        config.grid.width = 6;
        config.grid.height = 6;
        config.grid.seed = Some(seed);
        config
    }

    #[test]
    fn load_generates_when_store_empty() -> Result<()> {
        let mut sim = Simulator::open(&small_config(1), GasRegistry::default(), MemoryStore::new())?;
        assert!(sim.store().load_snapshot()?.is_none());
        let grid = sim.current_grid()?;
        assert_eq!((grid.width(), grid.height()), (6, 6));
        assert_eq!(sim.load()?, grid);
        Ok(())
    }

    #[test]
    fn advance_persists_new_grid() -> Result<()> {
        let registry = GasRegistry::default();
        let store = MemoryStore::new();
        let seeded = Grid::from_rows(&[&[5], &[1]], &registry)?;
        store.save_snapshot(&seeded.to_snapshot(&registry)?)?;

        let mut config = small_config(2);
        config.store.clear_on_start = false;
        let mut sim = Simulator::open(&config, registry, store)?;

        match sim.advance()? {
            TickOutcome::Changes(changes) => assert_eq!(changes.len(), 2),
            other => panic!("expected a delta, got {other:?}"),
        }
        assert_eq!(sim.load()?.column(0), vec![KindId(1), KindId(5)]);
        Ok(())
    }

    #[test]
    fn open_clears_when_configured() -> Result<()> {
        let registry = GasRegistry::default();
        let store = MemoryStore::new();
        store.save_snapshot(&Grid::from_rows(&[&[1]], &registry)?.to_snapshot(&registry)?)?;
        let sim = Simulator::open(&small_config(3), registry, store)?;
        assert!(sim.store().load_snapshot()?.is_none());
        Ok(())
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = small_config(4);
        config.grid.height = 0;
        assert!(Simulator::open(&config, GasRegistry::default(), MemoryStore::new()).is_err());
    }

    #[test]
    fn reset_empties_store_and_is_repeatable() -> Result<()> {
        let mut sim = Simulator::open(&small_config(5), GasRegistry::default(), MemoryStore::new())?;
        sim.current_grid()?;
        assert!(sim.store().load_snapshot()?.is_some());
        sim.reset()?;
        assert!(sim.store().load_snapshot()?.is_none());
        sim.reset()?;
        Ok(())
    }
}
