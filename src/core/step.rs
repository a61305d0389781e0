use crate::core::gas::{Density, GasRegistry, UNKNOWN_KIND_DENSITY};
use crate::core::grid::Grid;
use ordered_float::NotNan;

/// Counters reported by [`step_with_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Number of swapped pairs this tick.
    pub swaps: usize,
    /// Cells whose kind was not found in the registry and were ranked as empty.
    pub unknown: usize,
}

/// Advance the grid by one tick and return the new snapshot.
///
/// Every comparison reads the pre-step grid. Positions are scanned in row-major
/// order (top row first); a position not yet claimed this tick swaps with the cell
/// below it when that cell is unclaimed and strictly lighter. Both positions of a
/// swap become claimed, so every cell moves at most once per tick and the first
/// claim in scan order wins. Unclaimed positions keep their kind.
///
/// This one downward check also covers a lighter cell rising: if the cell above is
/// still unclaimed when its lower neighbour is reached, it already declined to sink
/// here, so it cannot be denser.
pub fn step(grid: &Grid, registry: &GasRegistry) -> Grid {
    step_with_stats(grid, registry).0
}

/// [`step`] that also reports how many swaps happened.
pub fn step_with_stats(grid: &Grid, registry: &GasRegistry) -> (Grid, StepStats) {
    let mut stats = StepStats::default();
    let densities = snapshot_densities(grid, registry, &mut stats);

    let width = grid.width() as usize;
    let height = grid.height() as usize;
    let mut next = grid.clone();
    let mut claimed = vec![false; grid.len()];

    // The bottom row has nothing below it; `below` can only have been claimed by
    // this same pair, so only `here` needs the check.
    for y in 0..height.saturating_sub(1) {
        for x in 0..width {
            let here = y * width + x;
            let below = here + width;
            if !claimed[here] && densities[below] < densities[here] {
                next.cells_mut().swap(here, below);
                claimed[here] = true;
                claimed[below] = true;
                stats.swaps += 1;
            }
        }
    }

    if stats.unknown > 0 {
        log::warn!(
            "{} cells reference kinds missing from the registry; ranked as density {}",
            stats.unknown,
            UNKNOWN_KIND_DENSITY
        );
    }
    log::debug!("step: {} swaps over {} cells", stats.swaps, grid.len());
    (next, stats)
}

/// Apply `n` ticks in sequence.
pub fn step_n(grid: &Grid, registry: &GasRegistry, n: usize) -> Grid {
    let mut current = grid.clone();
    for _ in 0..n {
        current = step(&current, registry);
    }
    current
}

/// True if another tick would leave the grid unchanged.
pub fn is_settled(grid: &Grid, registry: &GasRegistry) -> bool {
    step_with_stats(grid, registry).1.swaps == 0
}

fn snapshot_densities(grid: &Grid, registry: &GasRegistry, stats: &mut StepStats) -> Vec<Density> {
    let fallback = NotNan::new(UNKNOWN_KIND_DENSITY).unwrap_or_default();
    grid.cells()
        .iter()
        .map(|cell| match registry.density_of_id(cell.kind) {
            Ok(d) => d,
            Err(_) => {
                stats.unknown += 1;
                fallback
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gas::{GasKind, KindId};
    use crate::core::grid::{Cell, Position};
    use crate::error::Result;
    use rand::SeedableRng;

    fn column(ids: &[u8]) -> Result<Grid> {
        let rows: Vec<&[u8]> = ids.chunks(1).collect();
        Grid::from_rows(&rows, &GasRegistry::default())
    }

    fn ids(grid: &Grid) -> Vec<u8> {
        grid.cells().iter().map(|c| c.kind.0).collect()
    }

    #[test]
    fn heavy_over_light_swaps_down() -> Result<()> {
        let reg = GasRegistry::default();
        let (next, stats) = step_with_stats(&column(&[4, 1])?, &reg);
        assert_eq!(ids(&next), vec![1, 4]);
        assert_eq!(stats.swaps, 1);
        Ok(())
    }

    #[test]
    fn light_over_heavy_is_stable() -> Result<()> {
        let reg = GasRegistry::default();
        let grid = column(&[1, 4])?;
        assert_eq!(step(&grid, &reg), grid);
        assert!(is_settled(&grid, &reg));
        Ok(())
    }

    #[test]
    fn claimed_cells_do_not_move_twice() -> Result<()> {
        // 5 and 3 pair up first; the 1 cannot rise into the claimed middle row.
        let reg = GasRegistry::default();
        let next = step(&column(&[5, 3, 1])?, &reg);
        assert_eq!(ids(&next), vec![3, 5, 1]);
        Ok(())
    }

    #[test]
    fn every_swap_sinks_a_denser_cell_one_row() -> Result<()> {
        let reg = GasRegistry::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let width = 9;
        for _ in 0..50 {
            let grid = crate::core::create_grid_with(&reg, 9, 9, &mut rng)?;
            let (next, stats) = step_with_stats(&grid, &reg);
            let (before, after) = (ids(&grid), ids(&next));
            let mut lower_halves = vec![false; before.len()];
            let mut pairs = 0;
            for i in 0..before.len() {
                if before[i] == after[i] || lower_halves[i] {
                    continue;
                }
                let below = i + width;
                assert!(below < before.len(), "bottom cell {i} moved on its own");
                assert_eq!((after[i], after[below]), (before[below], before[i]));
                let upper = reg.density_of_id(KindId(before[i]))?;
                let lower = reg.density_of_id(KindId(before[below]))?;
                assert!(upper > lower);
                lower_halves[below] = true;
                pairs += 1;
            }
            assert_eq!(pairs, stats.swaps);
        }
        Ok(())
    }

    #[test]
    fn empty_rises_above_gas() -> Result<()> {
        let reg = GasRegistry::default();
        let next = step(&column(&[2, 0])?, &reg);
        assert_eq!(ids(&next), vec![0, 2]);
        Ok(())
    }

    #[test]
    fn columns_are_independent() -> Result<()> {
        let reg = GasRegistry::default();
        let grid = Grid::from_rows(&[&[5, 1], &[1, 5]], &reg)?;
        let next = step(&grid, &reg);
        assert_eq!(next.column(0), vec![KindId(1), KindId(5)]);
        assert_eq!(next.column(1), vec![KindId(1), KindId(5)]);
        Ok(())
    }

    #[test]
    fn single_row_never_changes() -> Result<()> {
        let reg = GasRegistry::default();
        let grid = Grid::from_rows(&[&[5, 0, 3, 1]], &reg)?;
        assert_eq!(step(&grid, &reg), grid);
        Ok(())
    }

    #[test]
    fn step_n_settles_sorted_column() -> Result<()> {
        let reg = GasRegistry::default();
        let grid = column(&[5, 4, 3, 2, 1, 0])?;
        let settled = step_n(&grid, &reg, 6);
        assert_eq!(ids(&settled), vec![0, 1, 2, 3, 4, 5]);
        assert!(is_settled(&settled, &reg));
        Ok(())
    }

    #[test]
    fn foreign_kinds_rank_as_empty() -> Result<()> {
        // Grid built against a registry that knows id 7; stepped with the default one.
        let wide = GasRegistry::new(vec![
            GasKind::new(0, "Empty", 0.0, "#fff")?,
            GasKind::new(3, "Gas 3", 3.0, "#f00")?,
            GasKind::new(7, "Exotic", 9.0, "#000")?,
        ])?;
        let grid = Grid::new(1, 2, vec![Cell::new(KindId(3)), Cell::new(KindId(7))], &wide)?;
        let (next, stats) = step_with_stats(&grid, &GasRegistry::default());
        assert_eq!(stats.unknown, 1);
        assert_eq!(next.get(Position::new(0, 0)), Some(Cell::new(KindId(7))));
        Ok(())
    }
}
