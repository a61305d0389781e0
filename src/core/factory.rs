use crate::core::gas::GasRegistry;
use crate::core::grid::{checked_area, Cell, Grid};
use crate::error::Result;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

/// Builds initial grids with every cell drawn uniformly from the registry.
#[derive(Debug)]
pub struct GridFactory {
    rng: StdRng,
}

impl GridFactory {
    /// Create a factory. `seed = None` draws a fresh seed from the thread RNG.
    pub fn new(seed: Option<u64>) -> Self {
        let rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        Self { rng }
    }

    /// Build a `width x height` grid of random kinds.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if either dimension is zero.
    pub fn create_grid(&mut self, registry: &GasRegistry, width: u32, height: u32) -> Result<Grid> {
        create_grid_with(registry, width, height, &mut self.rng)
    }
}

/// Build a random grid with a caller-supplied RNG, filling positions in row-major order.
pub fn create_grid_with<R: Rng + ?Sized>(
    registry: &GasRegistry,
    width: u32,
    height: u32,
    rng: &mut R,
) -> Result<Grid> {
    // Shape is checked before drawing; drawn kinds come from `registry` by construction.
    let size = checked_area(width, height)?;
    let cells = (0..size)
        .map(|_| Cell::new(registry.random_kind(&mut *rng).id))
        .collect();
    Grid::from_cells(width, height, cells)
}
