use chess_rules::{Game, Piece, PieceType};
use rand::seq::SliceRandom;
use rand::Rng;

const DEFAULT_GAMES: usize = 1;
const DEFAULT_MAX_PLIES: usize = 300;

/// Play one game of uniformly random legal moves. Promotions pick a random
/// piece so underpromotion gets exercised too.
fn play_random_game(rng: &mut impl Rng, max_plies: usize) -> Game {
    const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    let mut game = Game::new();
    let mut plies = 0;
    while !game.is_game_over() && plies < max_plies {
        let color = game.current_turn();
        let moves = game.legal_moves_for(color);
        let Some(mv) = moves.choose(rng).copied() else {
            break;
        };
        let promotion = match game.piece_at(mv.from) {
            Some(Piece {
                piece_type: PieceType::Pawn,
                ..
            }) if mv.to.row == color.promotion_row() => PROMOTIONS.choose(rng).copied(),
            _ => None,
        };
        if let Err(e) = game.make_move(mv.from, mv.to, color, promotion) {
            eprintln!("Listed move {mv} was rejected: {e}");
            break;
        }
        plies += 1;
    }
    game
}

fn main() {
    let mut args = std::env::args().skip(1);
    let games: usize = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_GAMES);
    let max_plies: usize = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_PLIES);

    let mut rng = rand::thread_rng();
    let mut last = None;
    for i in 0..games {
        let game = play_random_game(&mut rng, max_plies);
        let ending = game
            .termination()
            .map(|t| format!("{t:?}"))
            .unwrap_or_else(|| "ply limit".to_string());
        eprintln!(
            "Game {}: {} after {} plies ({ending})",
            i + 1,
            game.game_result(),
            game.move_history().len()
        );
        last = Some(game);
    }

    if let Some(game) = last {
        match serde_json::to_string_pretty(&game.status()) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Could not serialise status: {e}"),
        }
    }
}
