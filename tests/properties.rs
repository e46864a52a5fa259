//! Property-based tests over random legal games.

use chess_rules::{Color, Game, PieceType, Position};
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

fn ply_strategy() -> impl Strategy<Value = usize> {
    1..=80usize
}

/// Plays up to `plies` random legal moves, calling `check` before each one.
fn random_game(
    seed: u64,
    plies: usize,
    mut check: impl FnMut(&Game, &mut StdRng) -> Result<(), TestCaseError>,
) -> Result<Game, TestCaseError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::new();
    for _ in 0..plies {
        if game.is_game_over() {
            break;
        }
        check(&game, &mut rng)?;
        let color = game.current_turn();
        let moves = game.legal_moves_for(color);
        prop_assert!(!moves.is_empty(), "live game without legal moves");
        let mv = moves[rng.gen_range(0..moves.len())];
        let record = game.make_move(mv.from, mv.to, color, None);
        prop_assert!(record.is_ok(), "listed move {} rejected: {:?}", mv, record);
    }
    Ok(game)
}

fn king_count(game: &Game, color: Color) -> usize {
    game.board()
        .pieces()
        .filter(|(_, p)| p.piece_type == PieceType::King && p.color == color)
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Turns alternate, history grows by one per move and records the mover.
    #[test]
    fn prop_turns_alternate(seed in seed_strategy(), plies in ply_strategy()) {
        let game = random_game(seed, plies, |_, _| Ok(()))?;
        let history = game.move_history();
        for (i, record) in history.iter().enumerate() {
            let expected = if i % 2 == 0 { Color::White } else { Color::Black };
            prop_assert_eq!(record.color, expected);
            prop_assert_eq!(record.move_number as usize, i / 2 + 1);
        }
        if !game.is_game_over() {
            let expected = if history.len() % 2 == 0 { Color::White } else { Color::Black };
            prop_assert_eq!(game.current_turn(), expected);
        }
    }

    /// After any applied move the mover's king is safe and both kings remain.
    #[test]
    fn prop_mover_never_left_in_check(seed in seed_strategy(), plies in ply_strategy()) {
        let game = random_game(seed, plies, |game, _| {
            let mover = game.current_turn().opposite();
            prop_assert!(!game.is_in_check(mover));
            prop_assert_eq!(king_count(game, Color::White), 1);
            prop_assert_eq!(king_count(game, Color::Black), 1);
            for color in [Color::White, Color::Black] {
                let king = game.board().king_position(color);
                prop_assert_eq!(
                    game.piece_at(king).map(|p| p.piece_type),
                    Some(PieceType::King)
                );
            }
            Ok(())
        })?;
        if let Some(last) = game.last_move() {
            prop_assert!(!game.is_in_check(last.color));
        }
    }

    /// Moves not in the legal list are rejected without touching the game.
    #[test]
    fn prop_rejections_leave_state_unchanged(seed in seed_strategy(), plies in ply_strategy()) {
        random_game(seed, plies, |game, rng| {
            let color = game.current_turn();
            for _ in 0..8 {
                let from = Position::new(rng.gen_range(0..8), rng.gen_range(0..8));
                let to = Position::new(rng.gen_range(0..8), rng.gen_range(0..8));
                let is_listed = game.board().piece_at(from).map(|p| p.color) == Some(color)
                    && game.legal_moves(from).contains(&to);
                if is_listed {
                    continue;
                }
                let mut copy = game.clone();
                prop_assert!(copy.make_move(from, to, color, None).is_err());
                prop_assert_eq!(&copy, game);
            }

            // Right move, wrong side.
            if let Some(mv) = game.legal_moves_for(color).first() {
                let mut copy = game.clone();
                prop_assert!(copy.make_move(mv.from, mv.to, color.opposite(), None).is_err());
                prop_assert_eq!(&copy, game);
            }
            Ok(())
        })?;
    }

    /// Every listed move passes the read-only legality check.
    #[test]
    fn prop_listed_moves_are_valid(seed in seed_strategy(), plies in 1..=40usize) {
        random_game(seed, plies, |game, _| {
            let color = game.current_turn();
            for mv in game.legal_moves_for(color) {
                prop_assert!(game.is_valid_move(mv.from, mv.to, color));
                prop_assert!(!game.would_be_in_check(mv.from, mv.to, color));
            }
            Ok(())
        })?;
    }
}
