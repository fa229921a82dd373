// Board squares and square sets
//
// index = col + 8 * row
// col 0..7 = files a..h, row 0 = rank 8 (top), row 7 = rank 1 (bottom)
//
//   a8 b8 c8 d8 e8 f8 g8 h8      00 01 02 03 04 05 06 07
//   ...                          ...
//   a1 b1 c1 d1 e1 f1 g1 h1      56 57 58 59 60 61 62 63

use crate::error::{PositionError, PositionResult};
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Square(u8);

pub fn are_valid_coords(col: i32, row: i32) -> bool {
    (0..8).contains(&col) && (0..8).contains(&row)
}

impl Square {
    /// Square from column and row, both in `0..8`.
    pub fn new(col: i32, row: i32) -> PositionResult<Square> {
        if !are_valid_coords(col, row) {
            return Err(PositionError::InvalidCoordinates { col, row });
        }
        Ok(Square((col + 8 * row) as u8))
    }

    /// Square from a raw index. Panics outside `0..64`.
    pub fn from_index(index: usize) -> Square {
        assert!(index < 64, "square index {index} out of range");
        Square(index as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn col(self) -> i32 {
        (self.0 % 8) as i32
    }

    pub fn row(self) -> i32 {
        (self.0 / 8) as i32
    }

    /// The square `dc` columns and `dr` rows away, if still on the board.
    pub fn offset(self, dc: i32, dr: i32) -> Option<Square> {
        let (col, row) = (self.col() + dc, self.row() + dr);
        if are_valid_coords(col, row) {
            Some(Square((col + 8 * row) as u8))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col() as u8) as char;
        let rank = 8 - self.row();
        write!(f, "{}{}", file, rank)
    }
}

impl FromStr for Square {
    type Err = PositionError;

    /// Parses algebraic text like `e4` (case-insensitive file letter).
    fn from_str(s: &str) -> PositionResult<Square> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(PositionError::notation(s, "expected a file letter and a rank digit"));
        };
        let file = file.to_ascii_lowercase();
        if !file.is_ascii_lowercase() {
            return Err(PositionError::notation(s, "file must be a letter"));
        }
        let Some(rank) = rank.to_digit(10) else {
            return Err(PositionError::notation(s, "rank must be a digit"));
        };
        Square::new(file as i32 - 'a' as i32, 8 - rank as i32)
    }
}

/// Set of squares packed into a `u64`, bit `i` = square index `i`.
/// Iterates in ascending index order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct SquareSet(u64);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet(0);

    pub fn contains(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.index()) != 0
    }

    pub fn insert(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.index();
    }

    pub fn remove(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq.index());
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn first(self) -> Option<Square> {
        self.into_iter().next()
    }
}

impl Iterator for SquareSet {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(Square::from_index(index))
    }
}
