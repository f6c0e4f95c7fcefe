//! Board coordinates and their `"C5"` text form.

use core::fmt;
use core::str::FromStr;

use super::common::CoordError;
use super::config::BOARD_SIZE;

const SIZE: i32 = BOARD_SIZE as i32;

/// The 8 compass and diagonal steps, straight axes first.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

/// The 4 straight steps: right, left, down, up.
pub const STRAIGHT: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A cell on the 10×10 board. `x` is the column (A-J), `y` the row (1-10),
/// both zero based. A `Coord` is always in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    x: u8,
    y: u8,
}

impl Coord {
    /// Build a coordinate, returning `None` when outside the board.
    pub fn new(x: i32, y: i32) -> Option<Self> {
        if (0..SIZE).contains(&x) && (0..SIZE).contains(&y) {
            Some(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            None
        }
    }

    pub fn x(self) -> usize {
        self.x as usize
    }

    pub fn y(self) -> usize {
        self.y as usize
    }

    /// Step by `(dx, dy)`, or `None` if that leaves the board.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Self::new(self.x as i32 + dx, self.y as i32 + dy)
    }

    /// In-bounds cells touching this one, diagonals included.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        DIRECTIONS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// Every cell of the board, column by column.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|x| (0..BOARD_SIZE).map(move |y| Coord { x, y }))
    }

    /// `true` when `other` is exactly one straight step away.
    pub fn is_adjacent(self, other: Coord) -> bool {
        STRAIGHT
            .iter()
            .any(|&(dx, dy)| self.offset(dx, dy) == Some(other))
    }

    pub fn column_letter(self) -> char {
        (b'A' + self.x) as char
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letter(), self.y + 1)
    }
}

impl FromStr for Coord {
    type Err = CoordError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let mut chars = input.chars();
        let col_ch = chars.next().ok_or(CoordError::Empty)?;
        let col = col_ch.to_ascii_uppercase();
        if !('A'..='J').contains(&col) {
            return Err(CoordError::BadColumn(col_ch));
        }
        let row_str = chars.as_str();
        // Plain decimal digits only: no sign, no zero padding.
        let digits_only = !row_str.is_empty() && row_str.bytes().all(|b| b.is_ascii_digit());
        if !digits_only || (row_str.len() > 1 && row_str.starts_with('0')) {
            return Err(CoordError::BadRow(row_str.to_string()));
        }
        let row: usize = row_str
            .parse()
            .map_err(|_| CoordError::BadRow(row_str.to_string()))?;
        if row == 0 || row > BOARD_SIZE as usize {
            return Err(CoordError::RowOutOfRange(row));
        }
        Ok(Coord {
            x: col as u8 - b'A',
            y: (row - 1) as u8,
        })
    }
}

/// Parse a batch of coordinate strings, stopping at the first bad one.
pub fn parse_coords<S: AsRef<str>>(coords: &[S]) -> Result<Vec<Coord>, CoordError> {
    coords.iter().map(|c| c.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_ten() {
        let c: Coord = "j10".parse().unwrap();
        assert_eq!((c.x(), c.y()), (9, 9));
        assert_eq!(c.to_string(), "J10");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<Coord>(), Err(CoordError::Empty));
        assert_eq!("K1".parse::<Coord>(), Err(CoordError::BadColumn('K')));
        assert_eq!("A0".parse::<Coord>(), Err(CoordError::RowOutOfRange(0)));
        assert_eq!("A11".parse::<Coord>(), Err(CoordError::RowOutOfRange(11)));
        assert!(matches!("A".parse::<Coord>(), Err(CoordError::BadRow(_))));
        assert!(matches!("Ax".parse::<Coord>(), Err(CoordError::BadRow(_))));
    }

    #[test]
    fn row_must_be_plain_digits() {
        for bad in ["A+5", "A05", "A010", "A00", "B-1", "C 3"] {
            assert!(
                matches!(bad.parse::<Coord>(), Err(CoordError::BadRow(_))),
                "{:?} should be a bad row",
                bad
            );
        }
    }

    #[test]
    fn corner_has_three_neighbors() {
        let corner = Coord::new(0, 0).unwrap();
        assert_eq!(corner.neighbors().count(), 3);
        let mid = Coord::new(4, 4).unwrap();
        assert_eq!(mid.neighbors().count(), 8);
    }
}
