//! Caller-facing surface for a server or UI: a lockable game handle and the
//! serialisable status it reports after every action.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::{Game, Termination};
use crate::moves::{Move, MoveRecord};
use crate::piece::{Color, PieceType};
use crate::position::Position;

/// Snapshot of a game as seen by both players.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub side_to_move: Color,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_draw: bool,
    pub game_over: bool,
    pub result: String,
    pub termination: Option<Termination>,
    pub half_move_clock: u32,
    pub full_move_number: u32,
    pub draw_offer: Option<Color>,
}

impl Game {
    pub fn status(&self) -> GameStatus {
        let side = self.current_turn();
        GameStatus {
            side_to_move: side,
            is_check: self.is_check(),
            is_checkmate: self.is_checkmate(side),
            is_stalemate: self.is_stalemate(side),
            is_draw: self.is_draw(),
            game_over: self.is_game_over(),
            result: self.game_result().to_string(),
            termination: self.termination(),
            half_move_clock: self.half_move_clock(),
            full_move_number: self.full_move_number(),
            draw_offer: self.draw_offer(),
        }
    }
}

/// Reply to a move submission. Exactly one of `record` and `error` is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    #[serde(flatten)]
    pub status: GameStatus,
    pub record: Option<MoveRecord>,
    pub error: Option<String>,
}

impl MoveOutcome {
    fn new(game: &Game, result: Result<MoveRecord, GameError>) -> Self {
        let (record, error) = match result {
            Ok(record) => (Some(record), None),
            Err(e) => (None, Some(e.to_string())),
        };
        MoveOutcome {
            status: game.status(),
            record,
            error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.record.is_some()
    }
}

/// A game shared between connections. Every call takes the lock for its
/// whole duration, so concurrent submissions are applied one at a time.
#[derive(Clone, Debug, Default)]
pub struct SharedGame {
    inner: Arc<Mutex<Game>>,
}

impl SharedGame {
    pub fn new(game: Game) -> Self {
        SharedGame {
            inner: Arc::new(Mutex::new(game)),
        }
    }

    pub fn submit(
        &self,
        from: Position,
        to: Position,
        color: Color,
        promotion: Option<PieceType>,
    ) -> MoveOutcome {
        let mut game = self.inner.lock();
        let result = game.make_move(from, to, color, promotion);
        MoveOutcome::new(&game, result)
    }

    pub fn submit_uci(&self, uci: &str, color: Color) -> MoveOutcome {
        let mut game = self.inner.lock();
        let result = game.make_uci_move(uci, color);
        if let Err(e) = &result {
            debug!("{color} submitted {uci:?}: {e}");
        }
        MoveOutcome::new(&game, result)
    }

    pub fn resign(&self, color: Color) -> Result<GameStatus, GameError> {
        self.update(|game| game.resign(color))
    }

    pub fn offer_draw(&self, color: Color) -> Result<GameStatus, GameError> {
        self.update(|game| game.offer_draw(color))
    }

    pub fn accept_draw(&self) -> Result<GameStatus, GameError> {
        self.update(Game::accept_draw)
    }

    pub fn decline_draw(&self) -> Result<GameStatus, GameError> {
        self.update(Game::decline_draw)
    }

    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        self.inner.lock().legal_moves_for(color)
    }

    pub fn status(&self) -> GameStatus {
        self.inner.lock().status()
    }

    /// Read access under the lock.
    pub fn with_game<R>(&self, f: impl FnOnce(&Game) -> R) -> R {
        f(&self.inner.lock())
    }

    fn update(
        &self,
        f: impl FnOnce(&mut Game) -> Result<(), GameError>,
    ) -> Result<GameStatus, GameError> {
        let mut game = self.inner.lock();
        f(&mut game)?;
        Ok(game.status())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::game::GameResult;

    #[test]
    fn outcome_carries_record_or_error() {
        let shared = SharedGame::default();
        let ok = shared.submit_uci("e2e4", Color::White);
        assert!(ok.is_ok());
        assert_eq!(ok.status.side_to_move, Color::Black);
        assert_eq!(ok.record.unwrap().notation(), "e4");

        let err = shared.submit_uci("e2e4", Color::White);
        assert!(!err.is_ok());
        assert_eq!(err.error.as_deref(), Some("It is not White's turn"));
        assert_eq!(err.status, ok.status);

        let bad = shared.submit_uci("e7", Color::Black);
        assert!(bad.error.is_some());
    }

    #[test]
    fn outcome_json_round_trip() {
        let shared = SharedGame::default();
        for uci in ["f2f3", "e7e5", "g2g4"] {
            let color = shared.status().side_to_move;
            assert!(shared.submit_uci(uci, color).is_ok());
        }
        let mate = shared.submit(
            Position::from_algebraic("d8").unwrap(),
            Position::from_algebraic("h4").unwrap(),
            Color::Black,
            None,
        );
        assert!(mate.status.is_checkmate);
        assert!(mate.status.game_over);
        assert_eq!(mate.status.result, "0-1");

        let json = serde_json::to_string(&mate).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"], "0-1");
        assert_eq!(value["side_to_move"], "White");
        assert!(value["error"].is_null());
        let back: MoveOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mate);
    }

    #[test]
    fn draw_and_resign_through_handle() {
        let shared = SharedGame::default();
        assert_eq!(shared.accept_draw(), Err(GameError::NoDrawOffer));
        let status = shared.offer_draw(Color::Black).unwrap();
        assert_eq!(status.draw_offer, Some(Color::Black));
        assert_eq!(shared.decline_draw().unwrap().draw_offer, None);

        shared.offer_draw(Color::White).unwrap();
        let status = shared.accept_draw().unwrap();
        assert!(status.game_over);
        assert!(status.is_draw);
        assert_eq!(status.termination, Some(Termination::DrawAgreement));
        assert_eq!(shared.resign(Color::Black), Err(GameError::GameOver));
        assert_eq!(shared.with_game(|g| g.result()), GameResult::Draw);
    }

    #[test]
    fn concurrent_submissions_apply_once() {
        let shared = SharedGame::default();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || shared.submit_uci("e2e4", Color::White).is_ok())
            })
            .collect();
        let applied = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(applied, 1);
        assert_eq!(shared.with_game(|g| g.move_history().len()), 1);
        assert_eq!(shared.legal_moves(Color::Black).len(), 20);
    }
}
