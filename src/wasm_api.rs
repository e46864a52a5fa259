use crate::config::RulesConfig;
use crate::game::Game;
use crate::moves::{Move, MoveRecord};
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::protocol::{GameStatus, MoveOutcome, SharedGame};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: PieceType,
    color: Color,
}

#[derive(Serialize)]
struct BoardState {
    /// Indexed `[row][col]`, row 0 = rank 1.
    squares: Vec<Vec<Option<SquarePiece>>>,
    #[serde(flatten)]
    status: GameStatus,
    legal_moves: Vec<Move>,
    last_move: Option<MoveRecord>,
    history: Vec<String>,
}

#[derive(Serialize)]
struct ErrorReply {
    error: String,
}

fn build_board_state(game: &Game) -> BoardState {
    let squares = (0..8)
        .map(|r| {
            (0..8)
                .map(|c| {
                    game.piece_at(Position::new(r, c)).map(|p| SquarePiece {
                        piece_type: p.piece_type,
                        color: p.color,
                    })
                })
                .collect()
        })
        .collect();

    BoardState {
        squares,
        status: game.status(),
        legal_moves: game.legal_moves_for(game.current_turn()),
        last_move: game.last_move().copied(),
        history: game.move_history().iter().map(MoveRecord::to_string).collect(),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn string_to_piece_type(s: &str) -> Option<PieceType> {
    match s {
        "Queen" | "q" => Some(PieceType::Queen),
        "Rook" | "r" => Some(PieceType::Rook),
        "Bishop" | "b" => Some(PieceType::Bishop),
        "Knight" | "n" => Some(PieceType::Knight),
        _ => None,
    }
}

fn string_to_color(s: &str) -> Option<Color> {
    match s {
        "White" | "w" => Some(Color::White),
        "Black" | "b" => Some(Color::Black),
        _ => None,
    }
}

/// Browser handle over one game. Moves are submitted for the side to move.
#[wasm_bindgen]
pub struct WasmGame {
    game: SharedGame,
}

#[wasm_bindgen]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            game: SharedGame::default(),
        }
    }

    /// Start from a FEN position. Returns an error string on bad input.
    pub fn from_fen(fen: &str) -> Result<WasmGame, JsValue> {
        let game = Game::from_fen(fen, RulesConfig::default())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmGame {
            game: SharedGame::new(game),
        })
    }

    pub fn reset(&mut self) {
        self.game = SharedGame::default();
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&self.game.with_game(build_board_state))
    }

    pub fn make_move(
        &mut self,
        from_row: i8,
        from_col: i8,
        to_row: i8,
        to_col: i8,
        promotion: Option<String>,
    ) -> JsValue {
        let promotion = promotion.as_deref().and_then(string_to_piece_type);
        let color = self.game.status().side_to_move;
        let outcome: MoveOutcome = self.game.submit(
            Position::new(from_row, from_col),
            Position::new(to_row, to_col),
            color,
            promotion,
        );
        to_js(&outcome)
    }

    pub fn make_uci_move(&mut self, uci: &str) -> JsValue {
        let color = self.game.status().side_to_move;
        to_js(&self.game.submit_uci(uci, color))
    }

    pub fn get_legal_moves_for_square(&self, row: i8, col: i8) -> JsValue {
        let targets = self
            .game
            .with_game(|g| g.legal_moves(Position::new(row, col)));
        to_js(&targets)
    }

    pub fn resign(&mut self, color: &str) -> JsValue {
        self.status_or_error(color, |game, c| game.resign(c))
    }

    pub fn offer_draw(&mut self, color: &str) -> JsValue {
        self.status_or_error(color, |game, c| game.offer_draw(c))
    }

    pub fn accept_draw(&mut self) -> JsValue {
        match self.game.accept_draw() {
            Ok(status) => to_js(&status),
            Err(e) => to_js(&ErrorReply {
                error: e.to_string(),
            }),
        }
    }

    pub fn decline_draw(&mut self) -> JsValue {
        match self.game.decline_draw() {
            Ok(status) => to_js(&status),
            Err(e) => to_js(&ErrorReply {
                error: e.to_string(),
            }),
        }
    }
}

impl WasmGame {
    fn status_or_error(
        &self,
        color: &str,
        f: impl FnOnce(&SharedGame, Color) -> Result<GameStatus, crate::error::GameError>,
    ) -> JsValue {
        let Some(color) = string_to_color(color) else {
            return to_js(&ErrorReply {
                error: format!("Unknown colour '{color}'"),
            });
        };
        match f(&self.game, color) {
            Ok(status) => to_js(&status),
            Err(e) => to_js(&ErrorReply {
                error: e.to_string(),
            }),
        }
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
