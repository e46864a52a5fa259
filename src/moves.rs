use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::CastleSide;
use crate::error::ParseError;
use crate::piece::{Color, PieceType};
use crate::position::Position;

/// A move request as supplied by a caller.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    /// Convert to UCI notation, e.g. "e2e4", "a7a8q"
    pub fn to_uci(&self) -> String {
        let promo = match self.promotion {
            Some(PieceType::Queen) => "q",
            Some(PieceType::Rook) => "r",
            Some(PieceType::Bishop) => "b",
            Some(PieceType::Knight) => "n",
            _ => "",
        };
        format!("{}{}{promo}", self.from, self.to)
    }

    /// Parse from UCI notation
    pub fn from_uci(s: &str) -> Result<Move, ParseError> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(ParseError::InvalidLength { len: s.len() });
        }
        let from = Position::from_algebraic(&s[0..2])?;
        let to = Position::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceType::from_letter(c) {
                Some(pt) if pt.is_promotion_target() && c.is_ascii_lowercase() => Some(pt),
                _ => return Err(ParseError::InvalidPromotion { char: c }),
            },
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// A move that was applied to a game.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    /// Full-move number the move was played in.
    pub move_number: u32,
    pub color: Color,
    /// Type of the moving piece before any promotion.
    pub piece: PieceType,
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceType>,
    pub is_capture: bool,
    pub castling: Option<CastleSide>,
    pub is_en_passant: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
}

impl MoveRecord {
    pub fn as_move(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    pub fn is_castling(&self) -> bool {
        self.castling.is_some()
    }

    pub fn is_double_pawn_step(&self) -> bool {
        self.piece == PieceType::Pawn && self.from.rank_distance(self.to) == 2
    }

    /// Short algebraic-style notation without disambiguation, e.g. "Nf3",
    /// "exd6", "O-O", "e8=Q+".
    pub fn notation(&self) -> String {
        let mut s = match self.castling {
            Some(CastleSide::Kingside) => "O-O".to_string(),
            Some(CastleSide::Queenside) => "O-O-O".to_string(),
            None => {
                let mut s = String::new();
                if self.piece != PieceType::Pawn {
                    s.push(self.piece.letter());
                } else if self.is_capture {
                    s.push(self.from.file_char());
                }
                if self.is_capture {
                    s.push('x');
                }
                s.push_str(&self.to.to_string());
                if let Some(pt) = self.promotion {
                    s.push('=');
                    s.push(pt.letter());
                }
                s
            }
        };
        if self.is_checkmate {
            s.push('#');
        } else if self.is_check {
            s.push('+');
        }
        s
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Color::White => write!(f, "{}. {}", self.move_number, self.notation()),
            Color::Black => write!(f, "{}... {}", self.move_number, self.notation()),
        }
    }
}
