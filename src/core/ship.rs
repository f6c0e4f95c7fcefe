//! Ship classes and the on-demand ship extent search.
//!
//! Ships are never stored. A ship is whatever connected run of struck cells
//! the grid currently shows, found again each time it is needed.

use super::common::CellState;
use super::coord::{Coord, DIRECTIONS};
use super::grid::Grid;

/// A fleet entry: ships of one length and how many of them there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipClass {
    length: usize,
    count: usize,
}

impl ShipClass {
    pub const fn new(length: usize, count: usize) -> Self {
        Self { length, count }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// The cells making up one ship. The origin comes first; the rest are in
/// discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipExtent {
    cells: Vec<Coord>,
}

impl ShipExtent {
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Ship length.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.cells.contains(&c)
    }

    /// In-bounds cells touching the extent that are not part of it.
    pub fn border(&self) -> Vec<Coord> {
        let mut ring = Vec::new();
        for cell in &self.cells {
            for n in cell.neighbors() {
                if !self.contains(n) && !ring.contains(&n) {
                    ring.push(n);
                }
            }
        }
        ring
    }
}

/// Walk from `origin` along each of the 8 directions while `is_part` holds,
/// collecting every cell reached.
pub fn locate_with<F>(grid: &Grid, origin: Coord, is_part: F) -> ShipExtent
where
    F: Fn(CellState) -> bool,
{
    let mut cells = vec![origin];
    for (dx, dy) in DIRECTIONS {
        let mut cursor = origin;
        while let Some(next) = cursor.offset(dx, dy) {
            if !is_part(grid.get(next)) {
                break;
            }
            cells.push(next);
            cursor = next;
        }
    }
    ShipExtent { cells }
}

/// Find the struck ship through `origin` (a Hit or Sunk cell).
pub fn locate_ship(grid: &Grid, origin: Coord) -> ShipExtent {
    locate_with(grid, origin, CellState::is_struck)
}

/// Locate the ship through `origin` and mark every surrounding cell that is
/// not a ship as `Miss`.
pub fn draw_border(grid: &mut Grid, origin: Coord) -> ShipExtent {
    let extent = locate_ship(grid, origin);
    for c in extent.border() {
        if !grid.get(c).is_occupied() {
            grid.set(c, CellState::Miss);
        }
    }
    extent
}

/// Confirm the ship through `origin` as destroyed: its cells become `Sunk`
/// and its border becomes `Miss`.
pub fn sink_ship(grid: &mut Grid, origin: Coord) -> ShipExtent {
    grid.set(origin, CellState::Sunk);
    let extent = draw_border(grid, origin);
    for &c in extent.cells() {
        grid.set(c, CellState::Sunk);
    }
    extent
}
