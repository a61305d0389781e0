use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::SimConfig;
use crate::core::{ChangedCell, GasRegistry, Grid};
use crate::error::Error;
use crate::service::{Simulator, TickOutcome};
use crate::store::{GridStore, JsonFileStore, MemoryStore};

fn py_err(e: Error) -> PyErr {
    match e {
        Error::InvalidParam(_) | Error::UnknownKind(_) => PyValueError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

fn grid_array(grid: &Grid) -> Array2<u8> {
    let (h, w) = (grid.height() as usize, grid.width() as usize);
    let mut arr = Array2::<u8>::zeros((h, w));
    for (pos, cell) in grid.iter() {
        arr[[pos.y as usize, pos.x as usize]] = cell.kind.0;
    }
    arr
}

fn changes_array<'a>(changes: impl ExactSizeIterator<Item = &'a ChangedCell>) -> Array2<i64> {
    let mut arr = Array2::<i64>::zeros((changes.len(), 3));
    for (i, c) in changes.enumerate() {
        arr[[i, 0]] = c.position.x as i64;
        arr[[i, 1]] = c.position.y as i64;
        arr[[i, 2]] = c.cell.kind.0 as i64;
    }
    arr
}

/// GasGrid: Python-facing wrapper around the simulator.
///
/// API:
/// - __new__(width, height, seed=None, path=None)
/// - get_grid() -> np.ndarray uint8, shape (height, width), kind ids
/// - simulate() -> np.ndarray int64, shape (M, 3), rows of [x, y, kind_id]
/// - reset()
/// - registry() -> list of (id, name, density, color)
#[pyclass]
pub struct GasGrid {
    sim: Simulator<Box<dyn GridStore>>,
}

#[pymethods]
impl GasGrid {
    /// Open a simulator with the default six-kind registry.
    ///
    /// Parameters
    /// - width, height: grid dimensions (> 0)
    /// - seed: RNG seed for generated grids; None for nondeterministic
    /// - path: JSON snapshot file; None keeps the snapshot in memory
    ///
    /// Any previously persisted snapshot at `path` is kept.
    #[new]
    #[pyo3(signature = (width, height, seed=None, path=None))]
    fn new(width: u32, height: u32, seed: Option<u64>, path: Option<String>) -> PyResult<Self> {
        let mut config = SimConfig::default();
        config.grid.width = width;
        config.grid.height = height;
        config.grid.seed = seed;
        config.store.clear_on_start = false;
        let store: Box<dyn GridStore> = match path {
            Some(p) => Box::new(JsonFileStore::new(p)),
            None => Box::new(MemoryStore::new()),
        };
        let sim = Simulator::open(&config, GasRegistry::default(), store).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Current grid as an (H, W) array of kind ids.
    fn get_grid(&mut self, py: Python<'_>) -> PyResult<Py<PyArray2<u8>>> {
        let grid = self.sim.current_grid().map_err(py_err)?;
        Ok(grid_array(&grid).into_pyarray(py).into())
    }

    /// Advance one tick (releases the GIL) and return the changed cells as (M, 3)
    /// rows of [x, y, kind_id]. When nothing moved, every cell is returned.
    fn simulate(&mut self, py: Python<'_>) -> PyResult<Py<PyArray2<i64>>> {
        let outcome = py.detach(|| self.sim.advance()).map_err(py_err)?;
        let arr = match outcome {
            TickOutcome::Changes(changes) => changes_array(changes.iter()),
            TickOutcome::FullGrid(grid) => changes_array(crate::core::diff::full(&grid).iter()),
        };
        Ok(arr.into_pyarray(py).into())
    }

    /// Drop the persisted grid; the next call starts from a fresh random grid.
    fn reset(&self) -> PyResult<()> {
        self.sim.reset().map_err(py_err)
    }

    /// Registered kinds as (id, name, density, color) tuples.
    fn registry(&self) -> Vec<(u8, String, f64, String)> {
        self.sim
            .registry()
            .kinds()
            .iter()
            .map(|k| (k.id.0, k.name.clone(), k.density_f64(), k.color.clone()))
            .collect()
    }
}

/// The gasgrid Python module entry point.
#[pymodule]
fn gasgrid(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<GasGrid>()?;
    Ok(())
}
