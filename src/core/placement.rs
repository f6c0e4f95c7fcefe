//! Ship placement checks and random fleet generation.

use rand::Rng;

use super::common::{CellState, PlacementError};
use super::config::{BOARD_SIZE, FLEET, MAX_SHIP_LENGTH};
use super::coord::{parse_coords, Coord};
use super::grid::Grid;
use super::ship::locate_with;

/// Validate one candidate ship against the ships already committed in
/// `committed`. Checks run in order and the first failure is returned.
pub fn validate_placement(coords: &[Coord], committed: &Grid) -> Result<(), PlacementError> {
    if coords.is_empty() || coords.len() > MAX_SHIP_LENGTH {
        return Err(PlacementError::BadLength(coords.len()));
    }

    let first = coords[0];
    let same_column = coords.iter().all(|c| c.x() == first.x());
    let same_row = coords.iter().all(|c| c.y() == first.y());
    if !same_column && !same_row {
        return Err(PlacementError::NotStraight);
    }

    for (i, pair) in coords.windows(2).enumerate() {
        if !pair[0].is_adjacent(pair[1]) {
            return Err(PlacementError::NotContiguous(pair[0], pair[1]));
        }
        if coords[..=i].contains(&pair[1]) {
            return Err(PlacementError::Duplicate(pair[1]));
        }
    }

    for &c in coords {
        let touching = std::iter::once(c)
            .chain(c.neighbors())
            .any(|n| committed.get(n) == CellState::Ship);
        if touching {
            return Err(PlacementError::TouchesShip(c));
        }
    }
    Ok(())
}

/// Parse coordinate strings and validate them as one ship.
pub fn validate_placement_str<S: AsRef<str>>(
    coords: &[S],
    committed: &Grid,
) -> Result<Vec<Coord>, PlacementError> {
    let parsed = parse_coords(coords)?;
    validate_placement(&parsed, committed)?;
    Ok(parsed)
}

/// Commit a validated ship into `grid`.
pub fn commit_ship(grid: &mut Grid, coords: &[Coord]) {
    for &c in coords {
        grid.set(c, CellState::Ship);
    }
}

/// Returns a random valid placement for a ship of `length`.
pub fn random_placement<R: Rng>(
    rng: &mut R,
    committed: &Grid,
    length: usize,
) -> Result<Vec<Coord>, PlacementError> {
    let size = BOARD_SIZE as i32;
    let span = length as i32;
    for _ in 0..100 {
        let vertical: bool = rng.random();
        let (max_x, max_y) = if vertical {
            (size - 1, size - span)
        } else {
            (size - span, size - 1)
        };
        let x = rng.random_range(0..=max_x);
        let y = rng.random_range(0..=max_y);
        let coords: Option<Vec<Coord>> = (0..span)
            .map(|i| {
                if vertical {
                    Coord::new(x, y + i)
                } else {
                    Coord::new(x + i, y)
                }
            })
            .collect();
        if let Some(coords) = coords {
            if validate_placement(&coords, committed).is_ok() {
                return Ok(coords);
            }
        }
    }
    Err(PlacementError::UnableToPlace)
}

/// Check that the `Ship` cells of `grid` form exactly the standard fleet:
/// every ship straight and no longer than four, no two ships touching, and
/// the right number of ships of each length.
pub fn validate_fleet(grid: &Grid) -> Result<(), PlacementError> {
    let mut committed = Grid::new();
    let mut lengths = [0usize; MAX_SHIP_LENGTH + 1];
    for origin in grid.coords_with(CellState::Ship) {
        if committed.get(origin) == CellState::Ship {
            continue;
        }
        let mut cells = locate_with(grid, origin, |s| s == CellState::Ship)
            .cells()
            .to_vec();
        cells.sort();
        validate_placement(&cells, &committed)?;
        commit_ship(&mut committed, &cells);
        lengths[cells.len()] += 1;
    }
    for class in FLEET.iter() {
        let found = lengths[class.length()];
        if found != class.count() {
            return Err(PlacementError::WrongFleet {
                length: class.length(),
                expected: class.count(),
                found,
            });
        }
    }
    Ok(())
}

/// Build a full random fleet. Restarts from an empty board when a layout
/// paints itself into a corner.
pub fn random_fleet<R: Rng>(rng: &mut R) -> Result<Grid, PlacementError> {
    'attempt: for _ in 0..50 {
        let mut grid = Grid::new();
        for class in FLEET.iter() {
            for _ in 0..class.count() {
                match random_placement(rng, &grid, class.length()) {
                    Ok(coords) => commit_ship(&mut grid, &coords),
                    Err(_) => continue 'attempt,
                }
            }
        }
        return Ok(grid);
    }
    Err(PlacementError::UnableToPlace)
}
