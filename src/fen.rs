//! Position setup from FEN.
//!
//! Only what is needed to start a game from an arbitrary position: castling
//! availability becomes `has_moved` flags and the en-passant square becomes
//! a synthesised last move.

use crate::board::{Board, CastleSide, KING_HOME_COL};
use crate::config::RulesConfig;
use crate::error::FenError;
use crate::game::Game;
use crate::moves::MoveRecord;
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Game {
    /// Set up a game from a FEN string. Only the placement and side-to-move
    /// fields are required; the rest default to "- - 0 1".
    pub fn from_fen(fen: &str, config: RulesConfig) -> Result<Game, FenError> {
        config.validate().map_err(|e| FenError::InvalidConfig {
            message: e.to_string(),
        })?;
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        let mut board = parse_placement(fields[0])?;
        let turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        for color in [Color::White, Color::Black] {
            let count = board
                .pieces()
                .filter(|(_, p)| p.piece_type == PieceType::King && p.color == color)
                .count();
            if count != 1 {
                return Err(FenError::KingCount { color, count });
            }
        }

        apply_castling(&mut board, fields.get(2).copied().unwrap_or("-"))?;

        let full_move_number = parse_clock(fields.get(5).copied().unwrap_or("1"))?.max(1);
        let last_move = parse_en_passant(
            &board,
            turn,
            fields.get(3).copied().unwrap_or("-"),
            full_move_number,
        )?;
        let half_move_clock = parse_clock(fields.get(4).copied().unwrap_or("0"))?;

        if board.is_in_check(turn.opposite()) {
            return Err(FenError::OpponentInCheck {
                color: turn.opposite(),
            });
        }

        Ok(Game::from_setup(
            board,
            turn,
            last_move,
            half_move_clock,
            full_move_number,
            config,
        ))
    }
}

fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }
    let mut board = Board::empty();
    for (i, rank) in ranks.iter().enumerate() {
        let row = 7 - i as i8;
        let mut files = 0usize;
        for c in rank.chars() {
            let too_long = |files| FenError::BadRankLength {
                rank: 8 - i,
                files,
            };
            if let Some(skip) = c.to_digit(10) {
                files += skip as usize;
                if files > 8 {
                    return Err(too_long(files));
                }
                continue;
            }
            let mut piece = Piece::from_symbol(c).ok_or(FenError::InvalidPiece { char: c })?;
            piece.has_moved = match piece.piece_type {
                // Kings and rooks start moved; castling rights clear them.
                PieceType::King | PieceType::Rook => true,
                PieceType::Pawn => row != piece.color.pawn_start_row(),
                _ => false,
            };
            board
                .place_piece(Position::new(row, files as i8), piece)
                .map_err(|_| too_long(files + 1))?;
            files += 1;
        }
        if files != 8 {
            return Err(FenError::BadRankLength {
                rank: 8 - i,
                files,
            });
        }
    }
    Ok(board)
}

fn apply_castling(board: &mut Board, field: &str) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }
    for c in field.chars() {
        let (color, side) = match c {
            'K' => (Color::White, CastleSide::Kingside),
            'Q' => (Color::White, CastleSide::Queenside),
            'k' => (Color::Black, CastleSide::Kingside),
            'q' => (Color::Black, CastleSide::Queenside),
            _ => return Err(FenError::InvalidCastling { char: c }),
        };
        let row = color.back_rank();
        let king_pos = Position::new(row, KING_HOME_COL);
        let rook_pos = Position::new(row, side.rook_from_col());
        let (Some(mut king), Some(mut rook)) = (board.piece_at(king_pos), board.piece_at(rook_pos))
        else {
            return Err(FenError::InvalidCastling { char: c });
        };
        if king.piece_type != PieceType::King
            || rook.piece_type != PieceType::Rook
            || king.color != color
            || rook.color != color
        {
            return Err(FenError::InvalidCastling { char: c });
        }
        king.has_moved = false;
        rook.has_moved = false;
        for (pos, piece) in [(king_pos, king), (rook_pos, rook)] {
            board
                .place_piece(pos, piece)
                .map_err(|_| FenError::InvalidCastling { char: c })?;
        }
    }
    Ok(())
}

fn parse_en_passant(
    board: &Board,
    turn: Color,
    field: &str,
    full_move_number: u32,
) -> Result<Option<MoveRecord>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let invalid = || FenError::InvalidEnPassant {
        found: field.to_string(),
    };
    let target = Position::from_algebraic(field).map_err(|_| invalid())?;
    let mover = turn.opposite();
    // The skipped square sits between the double step's origin and the pawn.
    let pawn_pos = target.offset(-turn.forward(), 0);
    let origin = target.offset(turn.forward(), 0);
    let pawn_there = board
        .piece_at(pawn_pos)
        .map(|p| p.piece_type == PieceType::Pawn && p.color == mover)
        .unwrap_or(false);
    if origin.row != mover.pawn_start_row()
        || !pawn_there
        || board.piece_at(target).is_some()
        || board.piece_at(origin).is_some()
    {
        return Err(invalid());
    }
    let move_number = match mover {
        Color::White => full_move_number,
        Color::Black => full_move_number.saturating_sub(1).max(1),
    };
    Ok(Some(MoveRecord {
        move_number,
        color: mover,
        piece: PieceType::Pawn,
        from: origin,
        to: pawn_pos,
        promotion: None,
        is_capture: false,
        castling: None,
        is_en_passant: false,
        is_check: false,
        is_checkmate: false,
    }))
}

fn parse_clock(field: &str) -> Result<u32, FenError> {
    field.parse().map_err(|_| FenError::InvalidClock {
        found: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    #[test]
    fn start_fen_matches_new_game() {
        let game = Game::from_fen(START_FEN, RulesConfig::default()).unwrap();
        assert_eq!(game, Game::new());
    }

    #[test]
    fn optional_fields_default() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 b", RulesConfig::default()).unwrap();
        assert_eq!(game.current_turn(), Color::Black);
        assert_eq!(game.half_move_clock(), 0);
        assert_eq!(game.full_move_number(), 1);
        assert!(game.piece_at(sq("e1")).unwrap().has_moved);
        assert!(game.piece_at(sq("a1")).unwrap().has_moved);
    }

    #[test]
    fn castling_field_clears_moved_flags() {
        let game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 3 20", RulesConfig::default())
            .unwrap();
        let rights = game.board().castling_rights();
        assert!(rights.white_kingside);
        assert!(!rights.white_queenside);
        assert!(!rights.black_kingside);
        assert!(rights.black_queenside);
        assert_eq!(game.half_move_clock(), 3);
        assert_eq!(game.full_move_number(), 20);
    }

    #[test]
    fn en_passant_square_becomes_last_move() {
        let game = Game::from_fen(
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            RulesConfig::default(),
        )
        .unwrap();
        let last = game.last_move().unwrap();
        assert_eq!((last.from, last.to), (sq("f7"), sq("f5")));
        assert_eq!(last.color, Color::Black);
        assert!(game.is_valid_move(sq("e5"), sq("f6"), Color::White));
        assert!(!game.is_valid_move(sq("e5"), sq("d6"), Color::White));
    }

    #[test]
    fn rejects_malformed_input() {
        let cfg = RulesConfig::default;
        assert_eq!(
            Game::from_fen("8/8/8 w", cfg()),
            Err(FenError::WrongRankCount { found: 3 })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K3", cfg()),
            Err(FenError::TooFewFields { found: 1 })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K2X w", cfg()),
            Err(FenError::InvalidPiece { char: 'X' })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K w", cfg()),
            Err(FenError::BadRankLength { rank: 1, files: 5 })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K2RR w", cfg()),
            Err(FenError::BadRankLength { rank: 1, files: 9 })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K3P w", cfg()),
            Err(FenError::BadRankLength { rank: 1, files: 9 })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K9 w", cfg()),
            Err(FenError::BadRankLength { rank: 1, files: 14 })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K3 x", cfg()),
            Err(FenError::InvalidSideToMove {
                found: "x".to_string()
            })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/8 w", cfg()),
            Err(FenError::KingCount {
                color: Color::White,
                count: 0
            })
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K3 w K", cfg()),
            Err(FenError::InvalidCastling { char: 'K' })
        );
        assert!(matches!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - e3", cfg()),
            Err(FenError::InvalidEnPassant { .. })
        ));
        assert!(matches!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1", cfg()),
            Err(FenError::InvalidClock { .. })
        ));
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K2r b", cfg()),
            Err(FenError::OpponentInCheck {
                color: Color::White
            })
        );
    }
}
