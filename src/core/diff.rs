use crate::core::gas::GasRegistry;
use crate::core::grid::{Cell, Grid, PlacedCell, Position};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A position whose content differs between two snapshots, carrying the new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedCell {
    pub position: Position,
    pub cell: Cell,
}

impl ChangedCell {
    /// Wire form of the change, in the same shape as snapshot cells.
    pub fn to_placed(&self, registry: &GasRegistry) -> Result<PlacedCell> {
        PlacedCell::resolve(self.position, self.cell, registry)
    }
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSet {
    /// Same shape, nothing differs.
    Unchanged,
    /// Same shape; only the differing positions.
    Delta(Vec<ChangedCell>),
    /// Cardinality differs; every cell of the new grid.
    Reshaped(Vec<ChangedCell>),
}

impl ChangeSet {
    /// The reported cells; empty for [`ChangeSet::Unchanged`].
    pub fn cells(&self) -> &[ChangedCell] {
        match self {
            ChangeSet::Unchanged => &[],
            ChangeSet::Delta(cells) | ChangeSet::Reshaped(cells) => cells,
        }
    }

    /// Owned form of [`ChangeSet::cells`].
    pub fn into_cells(self) -> Vec<ChangedCell> {
        match self {
            ChangeSet::Unchanged => Vec::new(),
            ChangeSet::Delta(cells) | ChangeSet::Reshaped(cells) => cells,
        }
    }
}

/// Minimal change list from `old` to `new`, in row-major scan order.
///
/// Grids of equal cardinality are compared index by index. If the cardinalities
/// differ the whole of `new` is returned instead; this never fails.
pub fn diff(old: &Grid, new: &Grid) -> Vec<ChangedCell> {
    detect_changes(old, new).into_cells()
}

/// Like [`diff`] but tells the empty and reshaped outcomes apart.
pub fn detect_changes(old: &Grid, new: &Grid) -> ChangeSet {
    if old.len() != new.len() {
        log::warn!(
            "grid shape changed ({} -> {} cells); reporting the full grid",
            old.len(),
            new.len()
        );
        return ChangeSet::Reshaped(full(new));
    }

    let changes: Vec<ChangedCell> = old
        .cells()
        .iter()
        .zip(new.cells())
        .enumerate()
        .filter(|(_, (a, b))| a.kind != b.kind)
        .map(|(idx, (_, &cell))| ChangedCell {
            position: new.position_of(idx),
            cell,
        })
        .collect();

    if changes.is_empty() {
        ChangeSet::Unchanged
    } else {
        ChangeSet::Delta(changes)
    }
}

/// Every cell of `grid` as a change, in scan order.
pub fn full(grid: &Grid) -> Vec<ChangedCell> {
    grid.iter()
        .map(|(position, cell)| ChangedCell { position, cell })
        .collect()
}

/// Write `changes` into `grid`. Applying the same list twice is the same as once.
///
/// Errors:
/// - `Error::InvalidParam` if a position lies outside the grid; nothing is written then.
pub fn apply_changes(grid: &mut Grid, changes: &[ChangedCell]) -> Result<()> {
    let indices = changes
        .iter()
        .map(|c| {
            grid.index_of(c.position).ok_or_else(|| {
                Error::InvalidParam(format!(
                    "change at ({}, {}) lies outside the {}x{} grid",
                    c.position.x,
                    c.position.y,
                    grid.width(),
                    grid.height()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cells = grid.cells_mut();
    for (idx, change) in indices.into_iter().zip(changes) {
        cells[idx] = change.cell;
    }
    Ok(())
}
