//! Common types for the board: cell states, shot results and errors.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::coord::Coord;

/// State of one cell on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    /// Nothing known or placed here.
    #[default]
    Empty,
    /// An intact ship segment (only ever on our own board).
    Ship,
    /// A ship segment that has been shot.
    Hit,
    /// A shot that landed in water, or water proven by a sunk ship's border.
    Miss,
    /// A segment of a ship that is confirmed destroyed.
    Sunk,
}

impl CellState {
    /// `true` for cells that belong to a ship which has been struck.
    pub fn is_struck(self) -> bool {
        matches!(self, CellState::Hit | CellState::Sunk)
    }

    /// `true` for any cell occupied by a ship, struck or not.
    pub fn is_occupied(self) -> bool {
        matches!(self, CellState::Ship | CellState::Hit | CellState::Sunk)
    }

    /// `true` once a shot at this cell has been resolved.
    pub fn is_resolved(self) -> bool {
        matches!(self, CellState::Hit | CellState::Miss | CellState::Sunk)
    }

    /// Miss and Sunk are terminal: nothing ever overwrites them.
    pub fn is_terminal(self) -> bool {
        matches!(self, CellState::Miss | CellState::Sunk)
    }
}

/// Outcome of a shot as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotResult {
    Hit,
    Miss,
    Sunk,
}

impl ShotResult {
    /// `true` when the shot struck a ship.
    pub fn is_hit(self) -> bool {
        matches!(self, ShotResult::Hit | ShotResult::Sunk)
    }

    /// Cell state this result leaves on the opponent grid.
    pub fn cell_state(self) -> CellState {
        match self {
            ShotResult::Hit => CellState::Hit,
            ShotResult::Miss => CellState::Miss,
            ShotResult::Sunk => CellState::Sunk,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShotResult::Hit => "hit",
            ShotResult::Miss => "miss",
            ShotResult::Sunk => "sunk",
        }
    }
}

impl fmt::Display for ShotResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShotResult {
    type Err = UnknownShotResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hit" => Ok(ShotResult::Hit),
            "miss" => Ok(ShotResult::Miss),
            "sunk" => Ok(ShotResult::Sunk),
            other => Err(UnknownShotResult(other.to_string())),
        }
    }
}

/// A shot result string the client does not understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownShotResult(pub String);

impl fmt::Display for UnknownShotResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown shot result '{}'", self.0)
    }
}

impl std::error::Error for UnknownShotResult {}

/// Errors produced while parsing a coordinate such as `"C5"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    /// Input was empty after trimming.
    Empty,
    /// First character is not a column letter A-J.
    BadColumn(char),
    /// Row part is missing or not a number.
    BadRow(String),
    /// Row number outside 1-10.
    RowOutOfRange(usize),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::Empty => write!(f, "empty coordinate"),
            CoordError::BadColumn(c) => write!(f, "invalid column '{}' - must be a letter A-J", c),
            CoordError::BadRow(r) => write!(f, "invalid row '{}' - must be a number 1-10", r),
            CoordError::RowOutOfRange(r) => write!(f, "row {} out of bounds - must be 1-10", r),
        }
    }
}

impl std::error::Error for CoordError {}

/// Reasons a candidate ship placement is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// A coordinate string could not be parsed.
    Coord(CoordError),
    /// Ship length outside 1-4.
    BadLength(usize),
    /// Coordinates do not share a row or a column.
    NotStraight,
    /// Two consecutive coordinates are not one step apart.
    NotContiguous(Coord, Coord),
    /// The same coordinate appears twice.
    Duplicate(Coord),
    /// Coordinate is on, or next to, an already committed ship.
    TouchesShip(Coord),
    /// A full layout holds the wrong number of ships of one length.
    WrongFleet {
        length: usize,
        expected: usize,
        found: usize,
    },
    /// Random placement gave up.
    UnableToPlace,
}

impl From<CoordError> for PlacementError {
    fn from(err: CoordError) -> Self {
        PlacementError::Coord(err)
    }
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::Coord(e) => write!(f, "coordinate error: {}", e),
            PlacementError::BadLength(n) => write!(f, "ship length {} is not between 1 and 4", n),
            PlacementError::NotStraight => write!(f, "ship must lie in a single row or column"),
            PlacementError::NotContiguous(a, b) => write!(f, "{} and {} are not adjacent", a, b),
            PlacementError::Duplicate(c) => write!(f, "{} is used twice", c),
            PlacementError::TouchesShip(c) => write!(f, "{} touches another ship", c),
            PlacementError::WrongFleet {
                length,
                expected,
                found,
            } => write!(
                f,
                "expected {} ships of length {}, found {}",
                expected, length, found
            ),
            PlacementError::UnableToPlace => write!(f, "unable to place fleet"),
        }
    }
}

impl std::error::Error for PlacementError {}
