//! Position identity for repetition detection.
//!
//! Two positions are the same when piece placement, side to move, castling
//! rights and en-passant availability all match. Object identity and move
//! order play no part, so the counter below is a pure function over keys.

use std::collections::HashMap;

use crate::board::{Board, CastlingRights};
use crate::moves::MoveRecord;
use crate::piece::{Color, PieceType};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PositionKey {
    placement: [[Option<(PieceType, Color)>; 8]; 8],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant_file: Option<i8>,
}

impl PositionKey {
    pub fn new(board: &Board, side_to_move: Color, en_passant_file: Option<i8>) -> Self {
        let mut placement = [[None; 8]; 8];
        for (pos, piece) in board.pieces() {
            let (r, c) = pos.idx();
            placement[r][c] = Some((piece.piece_type, piece.color));
        }
        PositionKey {
            placement,
            side_to_move,
            castling: board.castling_rights(),
            en_passant_file,
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn en_passant_file(&self) -> Option<i8> {
        self.en_passant_file
    }
}

/// File open to an en-passant capture after `last` was played on `board`.
///
/// Only a double pawn step with an opposing pawn standing beside its
/// destination opens one.
pub fn en_passant_file(board: &Board, last: Option<&MoveRecord>) -> Option<i8> {
    let last = last.filter(|m| m.is_double_pawn_step())?;
    let capturer = last.color.opposite();
    let beside = [last.to.offset(0, -1), last.to.offset(0, 1)];
    beside
        .iter()
        .any(|&p| {
            board
                .piece_at(p)
                .map(|pc| pc.piece_type == PieceType::Pawn && pc.color == capturer)
                .unwrap_or(false)
        })
        .then_some(last.to.col)
}

/// True as soon as any key has occurred `limit` times.
pub fn reaches_limit<I>(keys: I, limit: usize) -> bool
where
    I: IntoIterator<Item = PositionKey>,
{
    let mut counts: HashMap<PositionKey, usize> = HashMap::new();
    for key in keys {
        let count = counts.entry(key).or_insert(0);
        *count += 1;
        if *count >= limit {
            return true;
        }
    }
    false
}
