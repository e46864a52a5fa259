pub mod board;
pub mod config;
pub mod error;
pub mod fen;
pub mod game;
pub mod moves;
pub mod piece;
pub mod position;
pub mod protocol;
pub mod repetition;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::{Board, CastleSide, CastlingRights};
pub use config::RulesConfig;
pub use error::{ConfigError, FenError, GameError, ParseError};
pub use game::{Game, GameResult, Termination};
pub use moves::{Move, MoveRecord};
pub use piece::{Color, Piece, PieceType};
pub use position::Position;
pub use protocol::{GameStatus, MoveOutcome, SharedGame};
