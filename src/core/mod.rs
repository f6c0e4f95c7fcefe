//! Board model and grid algorithms.
//!
//! Pure, synchronous logic: no locking, no I/O. Everything concurrent lives
//! above this module and reaches the grids only through `GameState`.

pub mod common;
pub mod config;
pub mod coord;
pub mod grid;
pub mod placement;
pub mod ship;

// Re-export commonly used types
pub use common::{CellState, CoordError, PlacementError, ShotResult, UnknownShotResult};
pub use config::*;
pub use coord::{parse_coords, Coord};
pub use grid::Grid;
pub use placement::{
    commit_ship, random_fleet, random_placement, validate_fleet, validate_placement,
    validate_placement_str,
};
pub use ship::{draw_border, locate_ship, locate_with, sink_ship, ShipClass, ShipExtent};
