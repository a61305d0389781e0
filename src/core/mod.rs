#![allow(missing_docs)]

//! Core grid model and the pure simulation pipeline.
//!
//! A tick is `step` followed by `diff`: the engine reads an immutable snapshot and
//! returns a new one, and the change detector reduces old/new to a minimal delta.

pub mod diff;
pub mod factory;
pub mod gas;
pub mod grid;
pub mod step;

pub use diff::{apply_changes, detect_changes, diff, ChangeSet, ChangedCell};
pub use factory::{create_grid_with, GridFactory};
pub use gas::{Density, GasKind, GasRegistry, KindId, UnknownKindPolicy, UNKNOWN_KIND_DENSITY};
pub use grid::{Cell, CellView, Grid, GridSnapshot, PlacedCell, Position};
pub use step::{is_settled, step, step_n, step_with_stats, StepStats};
