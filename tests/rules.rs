//! Whole-game scenarios driven through the public API.

use chess_rules::{
    Color, Game, GameError, GameResult, PieceType, Position, RulesConfig, SharedGame, Termination,
};

fn sq(s: &str) -> Position {
    s.parse().unwrap()
}

fn play(game: &mut Game, moves: &[&str]) {
    for uci in moves {
        let color = game.current_turn();
        if let Err(e) = game.make_uci_move(uci, color) {
            panic!("{uci} rejected: {e}");
        }
    }
}

#[test]
fn fools_mate() {
    let mut game = Game::new();
    play(&mut game, &["f2f3", "e7e5", "g2g4"]);
    let record = game
        .make_move(sq("d8"), sq("h4"), Color::Black, None)
        .unwrap();
    assert!(record.is_checkmate);
    assert_eq!(record.notation(), "Qh4#");
    assert!(game.is_checkmate(Color::White));
    assert!(game.is_game_over());
    assert_eq!(game.result(), GameResult::BlackWin);
    assert_eq!(game.game_result(), "0-1");
    assert_eq!(game.termination(), Some(Termination::Checkmate));
    assert_eq!(
        game.make_uci_move("a2a3", Color::White),
        Err(GameError::GameOver)
    );
}

#[test]
fn pawn_push_and_turn_alternation() {
    let mut game = Game::new();
    let record = game
        .make_move(sq("e2"), sq("e4"), Color::White, None)
        .unwrap();
    assert_eq!(record.to_string(), "1. e4");
    assert!(game.piece_at(sq("e2")).is_none());
    let pawn = game.piece_at(sq("e4")).unwrap();
    assert_eq!((pawn.piece_type, pawn.color), (PieceType::Pawn, Color::White));
    assert!(pawn.has_moved);
    assert_eq!(game.current_turn(), Color::Black);

    assert_eq!(
        game.make_move(sq("d2"), sq("d4"), Color::White, None),
        Err(GameError::NotYourTurn {
            color: Color::White
        })
    );
    let reply = game.make_uci_move("c7c5", Color::Black).unwrap();
    assert_eq!(reply.to_string(), "1... c5");
    assert_eq!(game.current_turn(), Color::White);
    assert_eq!(game.full_move_number(), 2);
}

#[test]
fn castling_needs_clear_path() {
    let mut game = Game::new();
    assert!(!game.is_valid_move(sq("e1"), sq("g1"), Color::White));
    assert!(!game.board().can_castle_kingside(Color::White));

    play(&mut game, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
    assert!(game.board().can_castle_kingside(Color::White));
    let record = game.make_uci_move("e1g1", Color::White).unwrap();
    assert!(record.is_castling());
    assert_eq!(record.notation(), "O-O");

    let king = game.piece_at(sq("g1")).unwrap();
    let rook = game.piece_at(sq("f1")).unwrap();
    assert_eq!(king.piece_type, PieceType::King);
    assert_eq!(rook.piece_type, PieceType::Rook);
    assert!(king.has_moved && rook.has_moved);
    assert!(game.piece_at(sq("h1")).is_none());
    assert!(game.piece_at(sq("e1")).is_none());
}

#[test]
fn en_passant_only_on_the_next_move() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
    assert!(game.legal_moves(sq("e5")).contains(&sq("d6")));

    let mut taken = game.clone();
    let record = taken.make_uci_move("e5d6", Color::White).unwrap();
    assert!(record.is_en_passant);
    assert_eq!(record.notation(), "exd6");
    assert!(taken.piece_at(sq("d5")).is_none());

    play(&mut game, &["a2a3", "h7h6"]);
    assert_eq!(
        game.make_uci_move("e5d6", Color::White),
        Err(GameError::IllegalMove {
            from: sq("e5"),
            to: sq("d6")
        })
    );
}

#[test]
fn promotion_choices() {
    let mut game = Game::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1", RulesConfig::default()).unwrap();
    let mut under = game.clone();
    under
        .make_move(sq("e7"), sq("e8"), Color::White, Some(PieceType::Rook))
        .unwrap();
    assert_eq!(under.piece_at(sq("e8")).unwrap().piece_type, PieceType::Rook);

    assert_eq!(
        game.make_uci_move("e7e8k", Color::White),
        Err(GameError::Parse(chess_rules::ParseError::InvalidPromotion { char: 'k' }))
    );
    let record = game.make_uci_move("e7e8", Color::White).unwrap();
    assert_eq!(record.promotion, Some(PieceType::Queen));
    assert_eq!(record.notation(), "e8=Q");
}

#[test]
fn lone_kings_are_drawn() {
    let game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1", RulesConfig::default()).unwrap();
    assert!(!game.has_sufficient_material());
    assert!(game.is_draw());
    assert!(game.is_game_over());
    assert_eq!(game.termination(), Some(Termination::InsufficientMaterial));
}

#[test]
fn capture_into_bare_kings_ends_game() {
    let mut game =
        Game::from_fen("4k3/8/8/8/8/8/3q4/4K3 w - - 0 1", RulesConfig::default()).unwrap();
    let record = game.make_uci_move("e1d2", Color::White).unwrap();
    assert!(record.is_capture);
    assert_eq!(game.piece_count(), 2);
    assert_eq!(game.game_result(), "1/2-1/2");
}

#[test]
fn configured_fifty_move_limit() {
    let config = RulesConfig::from_json(r#"{"fifty_move_limit": 6, "repetition_limit": 5}"#).unwrap();
    let mut game = Game::with_config(config).unwrap();
    play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3"]);
    assert!(!game.is_game_over());
    play(&mut game, &["g8f6"]);
    assert_eq!(game.half_move_clock(), 6);
    assert_eq!(game.termination(), Some(Termination::FiftyMoveRule));
}

#[test]
fn shared_game_resignation() {
    let shared = SharedGame::default();
    assert!(shared.submit_uci("d2d4", Color::White).is_ok());
    let status = shared.resign(Color::Black).unwrap();
    assert!(status.game_over);
    assert_eq!(status.result, "1-0");
    assert_eq!(status.termination, Some(Termination::Resignation));
    let late = shared.submit_uci("d7d5", Color::Black);
    assert_eq!(late.error.as_deref(), Some("Game is already over"));
}
