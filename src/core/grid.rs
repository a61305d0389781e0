use crate::core::gas::{GasRegistry, KindId, UnknownKindPolicy};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Grid coordinates. `x` is the column, `y` the row; row 0 is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    /// Column `x`, row `y`.
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Content of one grid position: a reference to a registered gas kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub kind: KindId,
}

impl Cell {
    /// A cell holding `kind`.
    #[inline]
    pub const fn new(kind: KindId) -> Self {
        Self { kind }
    }
}

/// One simulation snapshot, stored densely in row-major order (`y * width + x`).
///
/// Dimensions are fixed for the grid's lifetime and every position holds exactly
/// one cell. Grids are values: the step engine reads one and returns a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from row-major cells, checking that every kind is registered.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if a dimension is zero or `cells.len() != width * height`.
    /// - `Error::UnknownKind` if a cell references a kind missing from `registry`.
    pub fn new(width: u32, height: u32, cells: Vec<Cell>, registry: &GasRegistry) -> Result<Self> {
        let grid = Self::from_cells(width, height, cells)?;
        if let Some(cell) = grid.cells.iter().find(|c| !registry.contains(c.kind)) {
            return Err(Error::UnknownKind(cell.kind.to_string()));
        }
        Ok(grid)
    }

    /// Fill a grid with a single kind.
    pub fn filled(width: u32, height: u32, kind: KindId) -> Result<Self> {
        let size = checked_area(width, height)?;
        Self::from_cells(width, height, vec![Cell::new(kind); size])
    }

    /// Build a grid from rows of kind ids, top row first. Handy for fixtures.
    pub fn from_rows(rows: &[&[u8]], registry: &GasRegistry) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != width) {
            return Err(Error::InvalidParam("rows must all have the same length".into()));
        }
        let cells = rows
            .iter()
            .flat_map(|r| r.iter().map(|&id| Cell::new(KindId(id))))
            .collect();
        Self::new(dim(width)?, dim(height)?, cells, registry)
    }

    /// Shape-checked construction without registry validation.
    pub(crate) fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Result<Self> {
        let size = checked_area(width, height)?;
        if cells.len() != size {
            return Err(Error::InvalidParam(format!(
                "expected {size} cells for a {width}x{height} grid, got {}",
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells (`width * height`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid; dimensions are at least 1x1.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major cell storage.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Dense index of `pos`, or `None` outside the grid.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if pos.x < self.width && pos.y < self.height {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Grid::index_of`] for in-range indices.
    #[inline]
    pub fn position_of(&self, index: usize) -> Position {
        let w = self.width as usize;
        Position::new((index % w) as u32, (index / w) as u32)
    }

    /// Cell at `pos`, or `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index_of(pos).map(|idx| self.cells[idx])
    }

    /// Iterate all positions with their cells in row-major scan order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &cell)| (self.position_of(idx), cell))
    }

    /// Kinds of one column, top to bottom.
    pub fn column(&self, x: u32) -> Vec<KindId> {
        (0..self.height)
            .filter_map(|y| self.get(Position::new(x, y)))
            .map(|c| c.kind)
            .collect()
    }

    /// Encode as a coordinate-tagged snapshot (kind names and colors resolved).
    pub fn to_snapshot(&self, registry: &GasRegistry) -> Result<GridSnapshot> {
        let cells = self
            .iter()
            .map(|(pos, cell)| PlacedCell::resolve(pos, cell, registry))
            .collect::<Result<Vec<_>>>()?;
        Ok(GridSnapshot {
            width: self.width,
            height: self.height,
            cells,
        })
    }

    /// Decode a coordinate-tagged snapshot into a dense grid.
    ///
    /// The list may be in any order but must cover the rectangle exactly once.
    /// Unknown gas names follow `policy`.
    pub fn from_snapshot(
        snapshot: &GridSnapshot,
        registry: &GasRegistry,
        policy: UnknownKindPolicy,
    ) -> Result<Self> {
        let (width, height) = (snapshot.width, snapshot.height);
        let size = checked_area(width, height)?;
        if snapshot.cells.len() != size {
            return Err(Error::InvalidParam(format!(
                "snapshot lists {} cells for a {width}x{height} grid",
                snapshot.cells.len()
            )));
        }

        let mut slots: Vec<Option<Cell>> = vec![None; size];
        for placed in &snapshot.cells {
            if placed.x >= width || placed.y >= height {
                return Err(Error::InvalidParam(format!(
                    "cell ({}, {}) lies outside the {width}x{height} grid",
                    placed.x, placed.y
                )));
            }
            let idx = placed.y as usize * width as usize + placed.x as usize;
            let kind = registry.resolve_name(&placed.cell.gas_name, policy)?;
            if slots[idx].replace(Cell::new(kind.id)).is_some() {
                return Err(Error::InvalidParam(format!(
                    "duplicate cell at ({}, {})",
                    placed.x, placed.y
                )));
            }
        }

        // Count matched and no duplicates, so every slot is filled.
        let cells = slots.into_iter().flatten().collect();
        Self::from_cells(width, height, cells)
    }
}

pub(crate) fn checked_area(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidParam(format!(
            "grid dimensions must be > 0, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| Error::InvalidParam(format!("grid {width}x{height} is too large")))
}

fn dim(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::InvalidParam(format!("dimension {n} is too large")))
}

/// Display form of a cell as stored and served: kind name plus color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub gas_name: String,
    pub gas_color: String,
}

/// A cell tagged with its own coordinates (sparse addressing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub x: u32,
    pub y: u32,
    pub cell: CellView,
}

impl PlacedCell {
    /// Tag `cell` with `pos`, resolving its kind to name and color.
    ///
    /// Errors:
    /// - `Error::UnknownKind` if the kind is missing from `registry`.
    pub fn resolve(pos: Position, cell: Cell, registry: &GasRegistry) -> Result<Self> {
        let kind = registry.lookup(cell.kind)?;
        Ok(Self {
            x: pos.x,
            y: pos.y,
            cell: CellView {
                gas_name: kind.name.clone(),
                gas_color: kind.color.clone(),
            },
        })
    }
}

/// Serializable form of a [`Grid`]: dimensions plus a coordinate-tagged cell list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<PlacedCell>,
}
