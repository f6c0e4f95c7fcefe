//! Fixed 10×10 matrix of cell states.

use core::fmt;

use super::common::CellState;
use super::config::BOARD_SIZE;
use super::coord::Coord;

const N: usize = BOARD_SIZE as usize;

/// One side of the board. Indexed `[x][y]`; bounds are guaranteed by [`Coord`].
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    cells: [[CellState; N]; N],
}

impl Grid {
    /// Create an all-`Empty` grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid with every listed coordinate set to `state` and the rest empty.
    pub fn from_coords<I: IntoIterator<Item = Coord>>(coords: I, state: CellState) -> Self {
        let mut grid = Self::new();
        for c in coords {
            grid.set(c, state);
        }
        grid
    }

    pub fn get(&self, c: Coord) -> CellState {
        self.cells[c.x()][c.y()]
    }

    pub fn set(&mut self, c: Coord, state: CellState) {
        self.cells[c.x()][c.y()] = state;
    }

    /// Visit every cell, column by column.
    pub fn for_each<F: FnMut(Coord, CellState)>(&self, mut visit: F) {
        for c in Coord::all() {
            visit(c, self.get(c));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, CellState)> + '_ {
        Coord::all().map(move |c| (c, self.get(c)))
    }

    /// Number of cells currently in `state`.
    pub fn count(&self, state: CellState) -> usize {
        self.iter().filter(|&(_, s)| s == state).count()
    }

    /// Coordinates of all cells in `state`.
    pub fn coords_with(&self, state: CellState) -> Vec<Coord> {
        self.iter()
            .filter(|&(_, s)| s == state)
            .map(|(c, _)| c)
            .collect()
    }

    /// `true` if any cell is in `state`.
    pub fn contains(&self, state: CellState) -> bool {
        self.iter().any(|(_, s)| s == state)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{")?;
        for y in 0..N as i32 {
            write!(f, "  ")?;
            for x in 0..N as i32 {
                let ch = match Coord::new(x, y).map(|c| self.get(c)) {
                    Some(CellState::Ship) => 'S',
                    Some(CellState::Hit) => 'H',
                    Some(CellState::Miss) => 'M',
                    Some(CellState::Sunk) => 'X',
                    _ => '.',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
