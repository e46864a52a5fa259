//! Error types for the rules engine.
//!
//! Illegal input is an expected, recoverable condition (moves arrive from
//! untrusted remote players), so every fallible operation returns one of
//! these instead of panicking.

use thiserror::Error;

use crate::piece::{Color, PieceType};
use crate::position::Position;

/// Errors raised by board mutation and by game-level move handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The game already reached a terminal state.
    #[error("Game is already over")]
    GameOver,

    /// A move was submitted by the side that is not on move.
    #[error("It is not {color}'s turn")]
    NotYourTurn { color: Color },

    /// A coordinate outside the 8x8 board.
    #[error("Position {position} is off the board")]
    OffBoard { position: Position },

    /// No piece on the source square.
    #[error("No piece at {position}")]
    EmptySquare { position: Position },

    /// The source square holds a piece of the other colour.
    #[error("Piece at {position} does not belong to {color}")]
    WrongColor { position: Position, color: Color },

    /// The destination holds a piece of the mover's own colour.
    #[error("Cannot capture own piece at {position}")]
    SelfCapture { position: Position },

    /// The move does not match the piece's movement rules.
    #[error("Illegal move from {from} to {to}")]
    IllegalMove { from: Position, to: Position },

    /// The move would leave the mover's own king attacked.
    #[error("Move from {from} to {to} leaves the king in check")]
    KingExposed { from: Position, to: Position },

    /// Pawns may only promote to a knight, bishop, rook or queen.
    #[error("Cannot promote to {piece_type:?}")]
    InvalidPromotion { piece_type: PieceType },

    /// Board state disagrees with what validation approved.
    #[error("Internal inconsistency: {message}")]
    Inconsistent { message: String },

    /// Accepting or declining when no draw was offered.
    #[error("No draw offer is pending")]
    NoDrawOffer,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors from parsing squares and move strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid square notation '{notation}'")]
    InvalidSquare { notation: String },

    #[error("Move must be 4-5 characters, found {len}")]
    InvalidLength { len: usize },

    #[error("Invalid promotion piece '{char}'")]
    InvalidPromotion { char: char },
}

/// Errors from setting up a position from FEN.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN must have at least 2 fields, found {found}")]
    TooFewFields { found: usize },

    #[error("FEN placement must have 8 ranks, found {found}")]
    WrongRankCount { found: usize },

    #[error("Invalid piece character '{char}' in FEN")]
    InvalidPiece { char: char },

    #[error("Rank {rank} describes {files} files")]
    BadRankLength { rank: usize, files: usize },

    #[error("Invalid side to move '{found}', expected 'w' or 'b'")]
    InvalidSideToMove { found: String },

    #[error("Invalid castling character '{char}' in FEN")]
    InvalidCastling { char: char },

    #[error("Invalid en passant square '{found}'")]
    InvalidEnPassant { found: String },

    #[error("Invalid move clock '{found}'")]
    InvalidClock { found: String },

    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: Color, count: usize },

    #[error("{color} is in check but it is not their move")]
    OpponentInCheck { color: Color },

    #[error("Invalid rules config: {message}")]
    InvalidConfig { message: String },
}

/// Errors from loading a [`RulesConfig`](crate::config::RulesConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
