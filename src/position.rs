use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A board coordinate. Row 0 = rank 1, col 0 = file a.
///
/// Out-of-range values are allowed so that offset arithmetic never has to
/// special-case the edges; use [`Position::is_valid`] before indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    /// Sentinel meaning "no position".
    pub const NONE: Position = Position { row: -1, col: -1 };

    pub const fn new(row: i8, col: i8) -> Self {
        Position { row, col }
    }

    pub const fn is_valid(self) -> bool {
        self.row >= 0 && self.row < 8 && self.col >= 0 && self.col < 8
    }

    /// Parse two-character algebraic notation, e.g. "e4".
    pub fn from_algebraic(s: &str) -> Result<Position, ParseError> {
        let invalid = || ParseError::InvalidSquare {
            notation: s.to_string(),
        };
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(invalid());
        }
        let (file, rank) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(invalid());
        }
        Ok(Position::new((rank - b'1') as i8, (file - b'a') as i8))
    }

    /// Algebraic notation, or `None` for an off-board position.
    pub fn to_algebraic(self) -> Option<String> {
        if !self.is_valid() {
            return None;
        }
        let file = (b'a' + self.col as u8) as char;
        let rank = (b'1' + self.row as u8) as char;
        Some(format!("{file}{rank}"))
    }

    pub fn file_char(self) -> char {
        (b'a' + self.col.clamp(0, 7) as u8) as char
    }

    /// Shift by a row/col delta. The result may be off the board; it
    /// saturates at the `i8` limits, which are never valid squares.
    pub const fn offset(self, dr: i8, dc: i8) -> Position {
        Position::new(self.row.saturating_add(dr), self.col.saturating_add(dc))
    }

    pub fn file_distance(self, other: Position) -> u8 {
        self.col.abs_diff(other.col)
    }

    pub fn rank_distance(self, other: Position) -> u8 {
        self.row.abs_diff(other.row)
    }

    pub fn is_diagonal(self, other: Position) -> bool {
        self != other && self.file_distance(other) == self.rank_distance(other)
    }

    pub fn is_straight(self, other: Position) -> bool {
        self != other && (self.row == other.row || self.col == other.col)
    }

    pub fn is_knight_move(self, other: Position) -> bool {
        let (f, r) = (self.file_distance(other), self.rank_distance(other));
        (f == 2 && r == 1) || (f == 1 && r == 2)
    }

    /// Squares strictly between `self` and `other` along a rank, file or
    /// diagonal. Empty when the two are not aligned.
    pub fn between(self, other: Position) -> Vec<Position> {
        if !self.is_straight(other) && !self.is_diagonal(other) {
            return Vec::new();
        }
        let dr = other.row.cmp(&self.row) as i8;
        let dc = other.col.cmp(&self.col) as i8;
        let mut squares = Vec::new();
        let mut cur = self.offset(dr, dc);
        while cur != other {
            squares.push(cur);
            cur = cur.offset(dr, dc);
        }
        squares
    }

    /// a1 is a dark square.
    pub fn is_light(self) -> bool {
        (i16::from(self.row) + i16::from(self.col)).rem_euclid(2) == 1
    }

    pub(crate) fn idx(self) -> (usize, usize) {
        (self.row as usize, self.col as usize)
    }

    /// All 64 squares, rank 1 first.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..8).flat_map(|row| (0..8).map(move |col| Position::new(row, col)))
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::NONE
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_algebraic() {
            Some(s) => f.write_str(&s),
            None => write!(f, "({}, {})", self.row, self.col),
        }
    }
}

impl FromStr for Position {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_algebraic(s)
    }
}
