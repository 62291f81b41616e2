use chess_rules::{Color, EnPassantRule, GameConfig, GameError, GameState, Phase, PieceType, Square};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GAMES: u64 = 12;
const MAX_PLIES: usize = 160;
const PROMOTION_CHOICES: [PieceType; 4] = [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

/// Strict en passant, so every generated move keeps both kings on the board.
fn playout_config() -> GameConfig {
    GameConfig { en_passant: EnPassantRule::Strict, ..GameConfig::default() }
}

fn candidate_moves(game: &GameState) -> Vec<(Square, Square)> {
    game.legal_moves()
        .into_iter()
        .flat_map(|(from, targets)| targets.into_iter().map(move |to| (from, to)))
        .collect()
}

fn assert_board_invariants(game: &GameState) {
    game.position().validate().expect("position stays valid");
    for color in [Color::White, Color::Black] {
        assert!(game.position().king_square(color).is_some());
        assert!(game.position().pieces_of(color).count() <= 16);
    }
    let captured = game.captured_by(Color::White).len() + game.captured_by(Color::Black).len();
    assert_eq!(game.position().pieces().len() + captured, 32);
}

/// Tries a target the selected piece cannot reach and checks nothing but the selection changed.
fn try_unreachable_target(game: &mut GameState, from: Square) {
    game.select_piece(from).expect("own piece is selectable");
    let Some((_, targets)) = game.selection() else { return };
    let targets = targets.to_vec();
    let Some(illegal) = (0..64u8).map(|i| Square::new(i / 8, i % 8)).find(|s| *s != from && !targets.contains(s)) else {
        return;
    };

    let position = game.position().clone();
    let history = game.history().to_vec();
    assert_eq!(game.attempt_move(illegal), Err(GameError::IllegalTarget { from, to: illegal }));
    assert_eq!(game.position(), &position);
    assert_eq!(game.history(), history.as_slice());
    assert_eq!(game.phase(), &Phase::AwaitingSelection);
}

#[test]
fn seeded_random_games_keep_the_board_consistent() {
    for seed in 0..GAMES {
        let mut rng = StdRng::seed_from_u64(0x5EED_0000 + seed);
        let mut game = GameState::new(playout_config());

        for ply in 0..MAX_PLIES {
            if game.is_over() {
                break;
            }
            let moves = candidate_moves(&game);
            if moves.is_empty() {
                break;
            }
            let (from, to) = moves[rng.random_range(0..moves.len())];
            if ply % 7 == 0 {
                try_unreachable_target(&mut game, from);
            }

            let mover = game.active();
            game.play(from, to).unwrap_or_else(|e| panic!("seed {} ply {}: {}", seed, ply, e));
            if let Phase::AwaitingPromotion { color, .. } = game.phase() {
                assert_eq!(*color, mover);
                let kind = PROMOTION_CHOICES[rng.random_range(0..PROMOTION_CHOICES.len())];
                game.choose_promotion(kind).expect("promotion accepted");
            }

            assert_board_invariants(&game);
            if !game.is_over() {
                assert_eq!(game.active(), mover.opponent());
                assert!(!game.legal_moves().is_empty(), "a side with no moves means the game is over");
            }
        }
    }
}

#[test]
fn same_seed_replays_the_same_game() {
    let play = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = GameState::new(playout_config());
        for _ in 0..40 {
            if game.is_over() { break; }
            let moves = candidate_moves(&game);
            let (from, to) = moves[rng.random_range(0..moves.len())];
            game.play(from, to).expect("legal move");
            if matches!(game.phase(), Phase::AwaitingPromotion { .. }) {
                game.choose_promotion(PieceType::Queen).expect("promotion accepted");
            }
        }
        game.position().canonical_key()
    };
    assert_eq!(play(42), play(42));
}
