use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Position;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

pub const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const STRAIGHTS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a pawn advance.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn back_rank(self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_start_row(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_row(self) -> i8 {
        self.opposite().back_rank()
    }

    /// Row a pawn of this colour stands on when it can capture en passant.
    pub fn en_passant_row(self) -> i8 {
        match self {
            Color::White => 4,
            Color::Black => 3,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Uppercase letter used in notation and FEN.
    pub fn letter(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    /// Case-insensitive inverse of [`PieceType::letter`].
    pub fn from_letter(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceType::Knight | PieceType::Bishop | PieceType::Rook | PieceType::Queen
        )
    }

    /// Ray directions for sliding pieces; empty for the others.
    pub fn slide_directions(self) -> &'static [(i8, i8)] {
        const QUEEN: [(i8, i8); 8] = [
            (0, 1), (0, -1), (1, 0), (-1, 0),
            (1, 1), (1, -1), (-1, 1), (-1, -1),
        ];
        match self {
            PieceType::Bishop => &DIAGONALS,
            PieceType::Rook => &STRAIGHTS,
            PieceType::Queen => &QUEEN,
            _ => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
    /// Set on the first move and never cleared; castling depends on it.
    pub has_moved: bool,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Self {
        Piece {
            piece_type,
            color,
            has_moved: false,
        }
    }

    /// FEN character: uppercase for White, lowercase for Black.
    pub fn symbol(&self) -> char {
        let c = self.piece_type.letter();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn from_symbol(c: char) -> Option<Piece> {
        let piece_type = PieceType::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(piece_type, color))
    }

    /// Every square this piece could reach from `from` on an empty board.
    /// Pawn shapes include both capture diagonals and the double step from
    /// the starting row. Occupancy is the board's concern.
    pub fn move_shape(&self, from: Position) -> Vec<Position> {
        let mut targets = Vec::new();
        match self.piece_type {
            PieceType::Pawn => {
                let dir = self.color.forward();
                targets.push(from.offset(dir, 0));
                if from.row == self.color.pawn_start_row() {
                    targets.push(from.offset(2 * dir, 0));
                }
                targets.push(from.offset(dir, -1));
                targets.push(from.offset(dir, 1));
            }
            PieceType::Knight => {
                targets.extend(KNIGHT_OFFSETS.iter().map(|&(dr, dc)| from.offset(dr, dc)));
            }
            PieceType::King => {
                targets.extend(KING_OFFSETS.iter().map(|&(dr, dc)| from.offset(dr, dc)));
            }
            PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
                for &(dr, dc) in self.piece_type.slide_directions() {
                    let mut cur = from.offset(dr, dc);
                    while cur.is_valid() {
                        targets.push(cur);
                        cur = cur.offset(dr, dc);
                    }
                }
            }
        }
        targets.retain(|p| p.is_valid());
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    #[test]
    fn knight_in_corner_has_two_shapes() {
        let n = Piece::new(PieceType::Knight, Color::White);
        let mut shapes = n.move_shape(sq("a1"));
        shapes.sort();
        assert_eq!(shapes, vec![sq("c2"), sq("b3")]);
    }

    #[test]
    fn queen_shape_ignores_occupancy() {
        let q = Piece::new(PieceType::Queen, Color::Black);
        assert_eq!(q.move_shape(sq("d4")).len(), 27);
    }

    #[test]
    fn pawn_shapes_follow_colour() {
        let wp = Piece::new(PieceType::Pawn, Color::White);
        let shapes = wp.move_shape(sq("e2"));
        assert!(shapes.contains(&sq("e3")));
        assert!(shapes.contains(&sq("e4")));
        assert!(shapes.contains(&sq("d3")));

        let bp = Piece::new(PieceType::Pawn, Color::Black);
        let shapes = bp.move_shape(sq("a7"));
        assert_eq!(shapes.len(), 3);
        assert!(shapes.contains(&sq("a5")));
        assert!(shapes.contains(&sq("b6")));
    }

    #[test]
    fn symbols_round_trip() {
        for c in "PNBRQKpnbrqk".chars() {
            assert_eq!(Piece::from_symbol(c).unwrap().symbol(), c);
        }
        assert!(Piece::from_symbol('x').is_none());
    }

    #[test]
    fn promotion_rows() {
        assert_eq!(Color::White.promotion_row(), 7);
        assert_eq!(Color::Black.promotion_row(), 0);
        assert!(!PieceType::King.is_promotion_target());
        assert!(PieceType::Knight.is_promotion_target());
    }
}
