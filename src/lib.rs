//! Vertical density-ordering gas grid.
//!
//! Each tick lets every cell trade places with a vertical neighbour: lighter gas rises
//! past denser gas above it, denser gas sinks past lighter gas below it. Ticks are pure
//! snapshot transforms, and [`core::diff`] reduces consecutive snapshots to the cells
//! that actually changed.
//!
//! ```
//! use gasgrid::core::{diff, step, GasRegistry, Grid};
//!
//! let registry = GasRegistry::default();
//! let grid = Grid::from_rows(&[&[5], &[1], &[3]], &registry)?;
//! let next = step(&grid, &registry);
//! assert_eq!(diff(&grid, &next).len(), 2);
//! # Ok::<(), gasgrid::error::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod service;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use crate::core::{ChangedCell, GasRegistry, Grid};
pub use crate::service::{Simulator, TickOutcome};
