// =============================================================================
// Game state machine
//
// Owns the board plus everything the board alone cannot know: whose turn it
// is, the move history, the move clocks and the last move (for en passant).
// Every what-if question ("would this leave my king in check?") is answered
// on a cloned board; the live board is only replaced once a move has been
// fully applied to its clone.
//
// Coordinate system: row 0 = rank 1, col 0 = file a. White moves up.
// =============================================================================

use std::fmt;

use log::{debug, error, info, trace};
use serde::{Deserialize, Serialize};

use crate::board::{Board, CastleSide, KING_HOME_COL};
use crate::config::RulesConfig;
use crate::error::{ConfigError, GameError};
use crate::moves::{Move, MoveRecord};
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;
use crate::repetition::{self, PositionKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameResult {
    #[default]
    InProgress,
    WhiteWin,
    BlackWin,
    Draw,
}

impl GameResult {
    pub fn win_for(color: Color) -> GameResult {
        match color {
            Color::White => GameResult::WhiteWin,
            Color::Black => GameResult::BlackWin,
        }
    }

    /// PGN result token.
    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWin => "1-0",
            GameResult::BlackWin => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::InProgress => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
    Resignation,
    DrawAgreement,
}

/// What a move does to the board besides relocating the moving piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MoveKind {
    piece: Piece,
    is_capture: bool,
    castling: Option<CastleSide>,
    is_en_passant: bool,
}

fn classify(board: &Board, from: Position, to: Position) -> Option<MoveKind> {
    let piece = board.piece_at(from)?;
    let target = board.piece_at(to);
    let castling = match piece.piece_type {
        PieceType::King if from.row == to.row => CastleSide::from_king_move(from, to),
        _ => None,
    };
    let is_en_passant =
        piece.piece_type == PieceType::Pawn && from.col != to.col && target.is_none();
    Some(MoveKind {
        piece,
        is_capture: target.is_some() || is_en_passant,
        castling,
        is_en_passant,
    })
}

/// Apply a classified move to `board`: rook relocation for castling, pawn
/// removal for en passant, then the primary move.
fn play(
    board: &mut Board,
    from: Position,
    to: Position,
    promotion: Option<PieceType>,
    kind: MoveKind,
) -> Result<(), GameError> {
    let color = kind.piece.color;

    if let Some(side) = kind.castling {
        let rook_from = Position::new(from.row, side.rook_from_col());
        let rook_to = Position::new(from.row, side.rook_to_col());
        match board.piece_at(rook_from) {
            Some(r) if r.piece_type == PieceType::Rook && r.color == color && !r.has_moved => {}
            _ => {
                return Err(GameError::Inconsistent {
                    message: format!("no unmoved {color} rook on {rook_from} to castle with"),
                })
            }
        }
        board.move_piece(rook_from, rook_to, None)?;
    }

    if kind.is_en_passant {
        let victim = Position::new(from.row, to.col);
        match board.remove_piece(victim)? {
            Some(p) if p.piece_type == PieceType::Pawn && p.color != color => {}
            _ => {
                return Err(GameError::Inconsistent {
                    message: format!("no pawn on {victim} to capture en passant"),
                })
            }
        }
    }

    board.move_piece(from, to, promotion)?;
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    current_turn: Color,
    move_history: Vec<MoveRecord>,
    half_move_clock: u32,
    full_move_number: u32,
    /// Only the immediately preceding move can be captured en passant.
    last_move: Option<MoveRecord>,
    game_over: bool,
    result: GameResult,
    termination: Option<Termination>,
    draw_offer: Option<Color>,
    /// Where repetition replay starts from.
    initial_board: Board,
    initial_turn: Color,
    initial_last_move: Option<MoveRecord>,
    config: RulesConfig,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::start(RulesConfig::default())
    }

    /// Standard start under custom rules. The config is validated first.
    pub fn with_config(config: RulesConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::start(config))
    }

    fn start(config: RulesConfig) -> Self {
        let board = Board::new();
        Game {
            initial_board: board.clone(),
            board,
            current_turn: Color::White,
            move_history: Vec::new(),
            half_move_clock: 0,
            full_move_number: 1,
            last_move: None,
            game_over: false,
            result: GameResult::InProgress,
            termination: None,
            draw_offer: None,
            initial_turn: Color::White,
            initial_last_move: None,
            config,
        }
    }

    /// Start from an arbitrary position. The position may already be
    /// terminal (e.g. a mate set up from FEN).
    pub(crate) fn from_setup(
        board: Board,
        turn: Color,
        last_move: Option<MoveRecord>,
        half_move_clock: u32,
        full_move_number: u32,
        config: RulesConfig,
    ) -> Self {
        let mut game = Game {
            initial_board: board.clone(),
            board,
            current_turn: turn,
            move_history: Vec::new(),
            half_move_clock,
            full_move_number,
            last_move,
            game_over: false,
            result: GameResult::InProgress,
            termination: None,
            draw_offer: None,
            initial_turn: turn,
            initial_last_move: last_move,
            config,
        };
        game.update_game_state(turn);
        game
    }

    /// Back to the standard starting position, keeping the config.
    pub fn reset(&mut self) {
        *self = Game::start(self.config.clone());
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.board.piece_at(pos)
    }

    pub fn piece_count(&self) -> usize {
        self.board.piece_count()
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn move_history(&self) -> &[MoveRecord] {
        &self.move_history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.last_move.as_ref()
    }

    pub fn half_move_clock(&self) -> u32 {
        self.half_move_clock
    }

    pub fn full_move_number(&self) -> u32 {
        self.full_move_number
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// "1-0", "0-1", "1/2-1/2" or "*".
    pub fn game_result(&self) -> &'static str {
        self.result.as_str()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Colour with a pending draw offer.
    pub fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Making moves
    // -------------------------------------------------------------------------

    /// Validate and apply a move for `player_color`.
    ///
    /// On any error the game is left exactly as it was. On success the
    /// returned record describes the move, including whether it gave check
    /// or mate.
    pub fn make_move(
        &mut self,
        from: Position,
        to: Position,
        player_color: Color,
        promotion: Option<PieceType>,
    ) -> Result<MoveRecord, GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }
        if player_color != self.current_turn {
            trace!("{player_color} tried {from}{to} out of turn");
            return Err(GameError::NotYourTurn {
                color: player_color,
            });
        }
        let kind = self.validate(from, to, player_color).map_err(|e| {
            trace!("rejected {from}{to} for {player_color}: {e}");
            e
        })?;
        let promotion = self.resolve_promotion(kind.piece, to, promotion)?;

        let mut next = self.board.clone();
        if let Err(e) = play(&mut next, from, to, promotion, kind) {
            error!("validated move {from}{to} failed to apply: {e}");
            return Err(e);
        }
        self.board = next;

        if kind.piece.piece_type == PieceType::Pawn || kind.is_capture {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock += 1;
        }

        let opponent = player_color.opposite();
        let mut record = MoveRecord {
            move_number: self.full_move_number,
            color: player_color,
            piece: kind.piece.piece_type,
            from,
            to,
            promotion,
            is_capture: kind.is_capture,
            castling: kind.castling,
            is_en_passant: kind.is_en_passant,
            is_check: false,
            is_checkmate: false,
        };
        // The opponent's replies (en passant included) depend on this move
        // being the last one.
        self.last_move = Some(record);
        record.is_check = self.is_in_check(opponent);
        record.is_checkmate = record.is_check && !self.has_legal_moves(opponent);
        self.last_move = Some(record);
        self.move_history.push(record);

        if player_color == Color::Black {
            self.full_move_number += 1;
        }
        self.current_turn = opponent;
        if self.draw_offer == Some(opponent) {
            self.draw_offer = None;
        }

        debug!(
            "{player_color} played {} ({})",
            record.as_move().to_uci(),
            record.notation()
        );

        self.update_game_state(self.current_turn);
        Ok(record)
    }

    /// Parse a UCI move such as "e2e4" or "e7e8q" and play it.
    pub fn make_uci_move(&mut self, uci: &str, player_color: Color) -> Result<MoveRecord, GameError> {
        let mv = Move::from_uci(uci)?;
        self.make_move(mv.from, mv.to, player_color, mv.promotion)
    }

    fn resolve_promotion(
        &self,
        piece: Piece,
        to: Position,
        requested: Option<PieceType>,
    ) -> Result<Option<PieceType>, GameError> {
        if piece.piece_type != PieceType::Pawn || to.row != piece.color.promotion_row() {
            return Ok(None);
        }
        let piece_type = requested.unwrap_or(self.config.default_promotion);
        if !piece_type.is_promotion_target() {
            return Err(GameError::InvalidPromotion { piece_type });
        }
        Ok(Some(piece_type))
    }

    // -------------------------------------------------------------------------
    // Legality
    // -------------------------------------------------------------------------

    /// Read-only legality check, ignoring whose turn it is.
    pub fn is_valid_move(&self, from: Position, to: Position, player_color: Color) -> bool {
        self.validate(from, to, player_color).is_ok()
    }

    fn validate(&self, from: Position, to: Position, color: Color) -> Result<MoveKind, GameError> {
        for position in [from, to] {
            if !position.is_valid() {
                return Err(GameError::OffBoard { position });
            }
        }
        let kind = classify(&self.board, from, to)
            .ok_or(GameError::EmptySquare { position: from })?;
        if kind.piece.color != color {
            return Err(GameError::WrongColor {
                position: from,
                color,
            });
        }
        if self.board.piece_at(to).map(|p| p.color == color).unwrap_or(false) {
            return Err(GameError::SelfCapture { position: to });
        }

        let shape_ok = if kind.castling.is_some() {
            self.is_valid_castling(from, to, color)
        } else if kind.is_en_passant {
            self.is_valid_en_passant(from, to, color)
        } else {
            self.board.possible_moves(from).contains(&to)
        };
        if !shape_ok {
            return Err(GameError::IllegalMove { from, to });
        }

        if self.would_be_in_check(from, to, color) {
            return Err(GameError::KingExposed { from, to });
        }
        Ok(kind)
    }

    fn is_valid_castling(&self, from: Position, to: Position, color: Color) -> bool {
        let Some(side) = CastleSide::from_king_move(from, to) else {
            return false;
        };
        let row = color.back_rank();
        if from != Position::new(row, KING_HOME_COL) || to.row != row {
            return false;
        }
        // Unmoved king and rook at home, nothing between them.
        if !self.board.can_castle(color, side) {
            return false;
        }
        // Origin through destination: covers "not castling out of check".
        let step = (to.col - from.col).signum();
        let mut col = from.col;
        loop {
            if self.board.is_square_under_attack(Position::new(row, col), color) {
                return false;
            }
            if col == to.col {
                return true;
            }
            col += step;
        }
    }

    fn is_valid_en_passant(&self, from: Position, to: Position, color: Color) -> bool {
        let Some(last) = self.last_move.as_ref() else {
            return false;
        };
        let is_own_pawn = self
            .board
            .piece_at(from)
            .map(|p| p.piece_type == PieceType::Pawn && p.color == color)
            .unwrap_or(false);
        if !is_own_pawn || to.row != from.row + color.forward() || from.file_distance(to) != 1 {
            return false;
        }
        let victim = Position::new(from.row, to.col);
        let victim_is_pawn = self
            .board
            .piece_at(victim)
            .map(|p| p.piece_type == PieceType::Pawn && p.color != color)
            .unwrap_or(false);
        victim_is_pawn
            && last.color != color
            && last.is_double_pawn_step()
            && last.to == victim
            && last.from.col == to.col
    }

    /// Would `color`'s king be attacked after playing `from`→`to`?
    /// Evaluated on a copy; the live board is never touched.
    pub fn would_be_in_check(&self, from: Position, to: Position, color: Color) -> bool {
        if !to.is_valid() {
            return false;
        }
        let Some(kind) = classify(&self.board, from, to) else {
            return false;
        };
        let mut sim = self.board.clone();
        if play(&mut sim, from, to, None, kind).is_err() {
            return true;
        }
        sim.is_in_check(color)
    }

    pub fn is_square_under_attack(&self, pos: Position, defending: Color) -> bool {
        self.board.is_square_under_attack(pos, defending)
    }

    /// Legal destinations for the piece on `pos`, castling and en passant
    /// included.
    pub fn legal_moves(&self, pos: Position) -> Vec<Position> {
        let Some(piece) = self.board.piece_at(pos) else {
            return Vec::new();
        };
        let mut candidates = self.board.possible_moves(pos);
        match piece.piece_type {
            PieceType::King if !piece.has_moved && !self.is_in_check(piece.color) => {
                for side in [CastleSide::Kingside, CastleSide::Queenside] {
                    candidates.push(Position::new(pos.row, side.king_to_col()));
                }
            }
            PieceType::Pawn if pos.row == piece.color.en_passant_row() => {
                if let Some(last) = self.last_move.as_ref().filter(|m| m.is_double_pawn_step()) {
                    if last.to.row == pos.row && last.to.file_distance(pos) == 1 {
                        candidates.push(Position::new(pos.row + piece.color.forward(), last.to.col));
                    }
                }
            }
            _ => {}
        }
        candidates
            .into_iter()
            .filter(|&to| self.validate(pos, to, piece.color).is_ok())
            .collect()
    }

    /// Every legal move for `color`. Promotions are listed once, without a
    /// piece; [`RulesConfig::default_promotion`] applies when played.
    pub fn legal_moves_for(&self, color: Color) -> Vec<Move> {
        self.board
            .pieces()
            .filter(|(_, p)| p.color == color)
            .flat_map(|(from, _)| {
                self.legal_moves(from)
                    .into_iter()
                    .map(move |to| Move::new(from, to))
            })
            .collect()
    }

    pub fn has_legal_moves(&self, color: Color) -> bool {
        self.board
            .pieces()
            .filter(|(_, p)| p.color == color)
            .any(|(pos, _)| !self.legal_moves(pos).is_empty())
    }

    // -------------------------------------------------------------------------
    // Game-end predicates
    // -------------------------------------------------------------------------

    pub fn is_in_check(&self, color: Color) -> bool {
        self.board.is_in_check(color)
    }

    /// Is the side to move in check?
    pub fn is_check(&self) -> bool {
        self.is_in_check(self.current_turn)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_legal_moves(color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_legal_moves(color)
    }

    /// Any draw condition holds, or the game was already drawn.
    pub fn is_draw(&self) -> bool {
        self.result == GameResult::Draw
            || self.is_stalemate(self.current_turn)
            || self.half_move_clock >= self.config.fifty_move_limit
            || !self.has_sufficient_material()
            || self.is_threefold_repetition()
    }

    /// False only for the dead material configurations: K v K, K+minor v K,
    /// K+B v K+B with same-coloured bishops, K+N v K+N, K+N+N v K.
    pub fn has_sufficient_material(&self) -> bool {
        #[derive(Default)]
        struct Side {
            bishops: usize,
            knights: usize,
            bishop_on_light: Option<bool>,
        }

        let mut white = Side::default();
        let mut black = Side::default();
        let mut total = 0;
        for (pos, piece) in self.board.pieces() {
            total += 1;
            let side = match piece.color {
                Color::White => &mut white,
                Color::Black => &mut black,
            };
            match piece.piece_type {
                PieceType::Pawn | PieceType::Rook | PieceType::Queen => return true,
                PieceType::Bishop => {
                    side.bishops += 1;
                    side.bishop_on_light.get_or_insert(pos.is_light());
                }
                PieceType::Knight => side.knights += 1,
                PieceType::King => {}
            }
        }

        let minors = white.bishops + white.knights + black.bishops + black.knights;
        let dead = match total {
            2 => true,
            3 => minors == 1,
            4 => {
                (white.bishops == 1
                    && black.bishops == 1
                    && white.bishop_on_light == black.bishop_on_light)
                    || (white.knights == 1 && black.knights == 1)
                    || (white.knights == 2 && black.bishops + black.knights == 0)
                    || (black.knights == 2 && white.bishops + white.knights == 0)
            }
            _ => false,
        };
        !dead
    }

    /// Replays the history from the initial position and counts each
    /// resulting position, the live one included.
    pub fn is_threefold_repetition(&self) -> bool {
        repetition::reaches_limit(self.position_keys(), self.config.repetition_limit)
    }

    fn position_keys(&self) -> Vec<PositionKey> {
        let mut board = self.initial_board.clone();
        let mut keys = Vec::with_capacity(self.move_history.len() + 1);
        keys.push(PositionKey::new(
            &board,
            self.initial_turn,
            repetition::en_passant_file(&board, self.initial_last_move.as_ref()),
        ));
        for record in &self.move_history {
            let applied = classify(&board, record.from, record.to)
                .ok_or(GameError::EmptySquare {
                    position: record.from,
                })
                .and_then(|kind| play(&mut board, record.from, record.to, record.promotion, kind));
            if let Err(e) = applied {
                error!("history replay diverged at {}: {e}", record.as_move());
                break;
            }
            keys.push(PositionKey::new(
                &board,
                record.color.opposite(),
                repetition::en_passant_file(&board, Some(record)),
            ));
        }
        keys
    }

    /// Assign the terminal state, if any, for `color` about to move.
    fn update_game_state(&mut self, color: Color) {
        let in_check = self.is_in_check(color);
        let can_move = self.has_legal_moves(color);
        let ending = if in_check && !can_move {
            Some((GameResult::win_for(color.opposite()), Termination::Checkmate))
        } else if !can_move {
            Some((GameResult::Draw, Termination::Stalemate))
        } else if !self.has_sufficient_material() {
            Some((GameResult::Draw, Termination::InsufficientMaterial))
        } else if self.half_move_clock >= self.config.fifty_move_limit {
            Some((GameResult::Draw, Termination::FiftyMoveRule))
        } else if self.is_threefold_repetition() {
            Some((GameResult::Draw, Termination::ThreefoldRepetition))
        } else {
            None
        };
        if let Some((result, termination)) = ending {
            self.finish(result, termination);
        }
    }

    fn finish(&mut self, result: GameResult, termination: Termination) {
        self.game_over = true;
        self.result = result;
        self.termination = Some(termination);
        self.draw_offer = None;
        info!("game over: {result} ({termination:?})");
    }

    // -------------------------------------------------------------------------
    // Resignation and draw offers
    // -------------------------------------------------------------------------

    pub fn resign(&mut self, color: Color) -> Result<(), GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }
        self.finish(GameResult::win_for(color.opposite()), Termination::Resignation);
        Ok(())
    }

    pub fn offer_draw(&mut self, color: Color) -> Result<(), GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }
        self.draw_offer = Some(color);
        Ok(())
    }

    pub fn accept_draw(&mut self) -> Result<(), GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }
        if self.draw_offer.is_none() {
            return Err(GameError::NoDrawOffer);
        }
        self.finish(GameResult::Draw, Termination::DrawAgreement);
        Ok(())
    }

    pub fn decline_draw(&mut self) -> Result<(), GameError> {
        self.draw_offer.take().map(|_| ()).ok_or(GameError::NoDrawOffer)
    }
}
