use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::piece::{Color, Piece, PieceType, DIAGONALS, KING_OFFSETS, KNIGHT_OFFSETS, STRAIGHTS};
use crate::position::Position;

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Column the king starts on.
pub const KING_HOME_COL: i8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// Side implied by a two-file king move, if it is one.
    pub fn from_king_move(from: Position, to: Position) -> Option<CastleSide> {
        match to.col.saturating_sub(from.col) {
            2 => Some(CastleSide::Kingside),
            -2 => Some(CastleSide::Queenside),
            _ => None,
        }
    }

    pub fn rook_from_col(self) -> i8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    pub fn rook_to_col(self) -> i8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    pub fn king_to_col(self) -> i8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }
}

/// Castling rights derived from the `has_moved` flags of the kings and
/// rooks on their home squares.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    white_king: Position,
    black_king: Position,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            white_king: Position::NONE,
            black_king: Position::NONE,
        }
    }

    /// Standard starting position.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for (col, &pt) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(pt, Color::White));
            board.squares[1][col] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[6][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[7][col] = Some(Piece::new(pt, Color::Black));
        }
        board.white_king = Position::new(0, KING_HOME_COL);
        board.black_king = Position::new(7, KING_HOME_COL);
        board
    }

    fn check_bounds(pos: Position) -> Result<(), GameError> {
        if pos.is_valid() {
            Ok(())
        } else {
            Err(GameError::OffBoard { position: pos })
        }
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        if !pos.is_valid() {
            return None;
        }
        let (r, c) = pos.idx();
        self.squares[r][c]
    }

    /// Put a piece on a square during setup, returning what was there.
    pub fn place_piece(&mut self, pos: Position, piece: Piece) -> Result<Option<Piece>, GameError> {
        Self::check_bounds(pos)?;
        let (r, c) = pos.idx();
        let old = self.squares[r][c].replace(piece);
        self.refresh_king_positions();
        Ok(old)
    }

    /// Clear a square, returning the piece that stood there.
    pub fn remove_piece(&mut self, pos: Position) -> Result<Option<Piece>, GameError> {
        Self::check_bounds(pos)?;
        let (r, c) = pos.idx();
        let old = self.squares[r][c].take();
        if old.map(|p| p.piece_type) == Some(PieceType::King) {
            self.refresh_king_positions();
        }
        Ok(old)
    }

    pub fn clear(&mut self) {
        *self = Board::empty();
    }

    /// Relocate the piece on `from` to `to`, capturing whatever stands there.
    ///
    /// The piece is marked as moved. A pawn landing on its far rank is
    /// replaced by `promotion` when one is given. Returns the captured piece.
    pub fn move_piece(
        &mut self,
        from: Position,
        to: Position,
        promotion: Option<PieceType>,
    ) -> Result<Option<Piece>, GameError> {
        Self::check_bounds(from)?;
        Self::check_bounds(to)?;
        if from == to {
            return Err(GameError::IllegalMove { from, to });
        }
        let (fr, fc) = from.idx();
        let (tr, tc) = to.idx();
        let mut piece = self.squares[fr][fc]
            .take()
            .ok_or(GameError::EmptySquare { position: from })?;
        piece.has_moved = true;

        if let Some(promo) = promotion {
            if piece.piece_type == PieceType::Pawn && to.row == piece.color.promotion_row() {
                piece.piece_type = promo;
            }
        }

        let captured = self.squares[tr][tc].replace(piece);

        if piece.piece_type == PieceType::King {
            match piece.color {
                Color::White => self.white_king = to,
                Color::Black => self.black_king = to,
            }
        }
        if let Some(c) = captured.filter(|c| c.piece_type == PieceType::King) {
            match c.color {
                Color::White => self.white_king = Position::NONE,
                Color::Black => self.black_king = Position::NONE,
            }
        }
        Ok(captured)
    }

    /// Cached king square, or [`Position::NONE`] when that king is absent.
    pub fn king_position(&self, color: Color) -> Position {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .map(|(pos, _)| pos)
    }

    /// Rebuild both king caches by scanning the board.
    pub fn refresh_king_positions(&mut self) {
        self.white_king = self.find_king(Color::White).unwrap_or(Position::NONE);
        self.black_king = self.find_king(Color::Black).unwrap_or(Position::NONE);
    }

    /// Occupied squares with their pieces, rank 1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.piece_at(pos).map(|p| (pos, p)))
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Pseudo-legal destinations for the piece on `pos`. Does not include
    /// castling or en passant, and ignores whether the mover's king ends up
    /// attacked.
    pub fn possible_moves(&self, pos: Position) -> Vec<Position> {
        let mut moves = Vec::new();
        let Some(piece) = self.piece_at(pos) else {
            return moves;
        };
        match piece.piece_type {
            PieceType::Pawn => self.pawn_moves(pos, piece.color, &mut moves),
            PieceType::Knight | PieceType::King => {
                for target in piece.move_shape(pos) {
                    if self.piece_at(target).map(|p| p.color != piece.color).unwrap_or(true) {
                        moves.push(target);
                    }
                }
            }
            PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
                self.sliding_moves(pos, piece.color, piece.piece_type.slide_directions(), &mut moves)
            }
        }
        moves
    }

    fn pawn_moves(&self, pos: Position, color: Color, moves: &mut Vec<Position>) {
        let dir = color.forward();
        let forward = pos.offset(dir, 0);

        // Single push
        if forward.is_valid() && self.piece_at(forward).is_none() {
            moves.push(forward);

            // Double push
            let double = forward.offset(dir, 0);
            if pos.row == color.pawn_start_row() && self.piece_at(double).is_none() {
                moves.push(double);
            }
        }

        // Captures
        for dc in [-1, 1] {
            let target = pos.offset(dir, dc);
            if self.piece_at(target).map(|p| p.color != color).unwrap_or(false) {
                moves.push(target);
            }
        }
    }

    fn sliding_moves(
        &self,
        pos: Position,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Position>,
    ) {
        for &(dr, dc) in directions {
            let mut cur = pos.offset(dr, dc);
            while cur.is_valid() {
                if let Some(p) = self.piece_at(cur) {
                    if p.color != color {
                        moves.push(cur);
                    }
                    break;
                }
                moves.push(cur);
                cur = cur.offset(dr, dc);
            }
        }
    }

    fn unmoved(&self, pos: Position, piece_type: PieceType, color: Color) -> bool {
        self.piece_at(pos)
            .map(|p| p.piece_type == piece_type && p.color == color && !p.has_moved)
            .unwrap_or(false)
    }

    /// True when king and rook for `side` are unmoved on their home squares.
    /// Says nothing about the squares between them.
    pub fn has_castling_right(&self, color: Color, side: CastleSide) -> bool {
        let row = color.back_rank();
        self.unmoved(Position::new(row, KING_HOME_COL), PieceType::King, color)
            && self.unmoved(Position::new(row, side.rook_from_col()), PieceType::Rook, color)
    }

    pub fn castling_rights(&self) -> CastlingRights {
        CastlingRights {
            white_kingside: self.has_castling_right(Color::White, CastleSide::Kingside),
            white_queenside: self.has_castling_right(Color::White, CastleSide::Queenside),
            black_kingside: self.has_castling_right(Color::Black, CastleSide::Kingside),
            black_queenside: self.has_castling_right(Color::Black, CastleSide::Queenside),
        }
    }

    /// Board-shape check only: rights intact and the squares between king
    /// and rook empty. Attacks on the king's path are the game's concern.
    pub fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        if !self.has_castling_right(color, side) {
            return false;
        }
        let row = color.back_rank();
        Position::new(row, KING_HOME_COL)
            .between(Position::new(row, side.rook_from_col()))
            .into_iter()
            .all(|p| self.piece_at(p).is_none())
    }

    pub fn can_castle_kingside(&self, color: Color) -> bool {
        self.can_castle(color, CastleSide::Kingside)
    }

    pub fn can_castle_queenside(&self, color: Color) -> bool {
        self.can_castle(color, CastleSide::Queenside)
    }

    /// True if any piece of the side opposing `defending` attacks `pos`.
    pub fn is_square_under_attack(&self, pos: Position, defending: Color) -> bool {
        if !pos.is_valid() {
            return false;
        }
        let attacker = defending.opposite();
        self.slider_attacks(pos, attacker, &DIAGONALS, PieceType::Bishop)
            || self.slider_attacks(pos, attacker, &STRAIGHTS, PieceType::Rook)
            || self.offset_attacks(pos, attacker, &KNIGHT_OFFSETS, PieceType::Knight)
            || self.pawn_attacks(pos, attacker)
            || self.offset_attacks(pos, attacker, &KING_OFFSETS, PieceType::King)
    }

    /// Rays from `pos`; the first occupant attacks if it is the attacker's
    /// `slider` or queen.
    fn slider_attacks(
        &self,
        pos: Position,
        attacker: Color,
        directions: &[(i8, i8)],
        slider: PieceType,
    ) -> bool {
        directions.iter().any(|&(dr, dc)| {
            let mut cur = pos.offset(dr, dc);
            while cur.is_valid() {
                if let Some(p) = self.piece_at(cur) {
                    return p.color == attacker
                        && (p.piece_type == slider || p.piece_type == PieceType::Queen);
                }
                cur = cur.offset(dr, dc);
            }
            false
        })
    }

    fn offset_attacks(
        &self,
        pos: Position,
        attacker: Color,
        offsets: &[(i8, i8)],
        piece_type: PieceType,
    ) -> bool {
        offsets.iter().any(|&(dr, dc)| {
            self.piece_at(pos.offset(dr, dc))
                .map(|p| p.color == attacker && p.piece_type == piece_type)
                .unwrap_or(false)
        })
    }

    fn pawn_attacks(&self, pos: Position, attacker: Color) -> bool {
        // A pawn on (row - forward, col ± 1) attacks (row, col)
        let back = -attacker.forward();
        [-1, 1].iter().any(|&dc| {
            self.piece_at(pos.offset(back, dc))
                .map(|p| p.color == attacker && p.piece_type == PieceType::Pawn)
                .unwrap_or(false)
        })
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        let king = self.king_position(color);
        king.is_valid() && self.is_square_under_attack(king, color)
    }
}
