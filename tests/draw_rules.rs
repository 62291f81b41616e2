use chess_rules::draw::{is_insufficient_material, is_threefold_repetition};
use chess_rules::{
    AutoDrawRules, Color, DrawReason, GameConfig, GameEvent, GameResult, GameState, Position, Square,
};

fn sq(row: u8, col: u8) -> Square {
    Square::new(row, col)
}

fn diagram(rows: &str) -> Position {
    Position::from_diagram(rows).expect("valid diagram")
}

/// Knights hop out and back on both sides; four plies return to the start.
const KNIGHT_SHUFFLE: [((u8, u8), (u8, u8)); 4] = [
    ((7, 6), (5, 5)),
    ((0, 6), (2, 5)),
    ((5, 5), (7, 6)),
    ((2, 5), (0, 6)),
];

fn shuffle_ply(game: &mut GameState, ply: usize) -> Vec<GameEvent> {
    let ((fr, fc), (tr, tc)) = KNIGHT_SHUFFLE[ply % KNIGHT_SHUFFLE.len()];
    game.play(sq(fr, fc), sq(tr, tc)).expect("shuffle move is legal")
}

#[test]
fn fifty_move_rule_fires_exactly_on_the_hundredth_ply() {
    let mut game = GameState::default();
    for ply in 0..99 {
        shuffle_ply(&mut game, ply);
        assert!(!game.is_over(), "game ended early at ply {}", ply + 1);
    }
    assert_eq!(game.halfmove_clock(), 99);

    let events = shuffle_ply(&mut game, 99);
    let result = GameResult::Draw(DrawReason::FiftyMoveRule);
    assert_eq!(events.last(), Some(&GameEvent::GameOver(result)));
    assert_eq!(game.result(), Some(result));
    assert_eq!(game.history().len(), 100);
}

#[test]
fn pawn_move_resets_the_halfmove_clock() {
    let mut game = GameState::default();
    for ply in 0..6 {
        shuffle_ply(&mut game, ply);
    }
    assert_eq!(game.halfmove_clock(), 6);
    game.play(sq(6, 0), sq(5, 0)).unwrap();
    assert_eq!(game.halfmove_clock(), 0);
}

#[test]
fn repetition_is_detected_but_does_not_end_the_game_by_default() {
    let mut game = GameState::default();
    for ply in 0..9 {
        shuffle_ply(&mut game, ply);
    }
    assert!(game.is_threefold_repetition());
    assert!(is_threefold_repetition(game.history()));
    assert!(!game.is_over());
}

#[test]
fn threefold_repetition_ends_the_game_when_enabled() {
    let config = GameConfig {
        draw_rules: AutoDrawRules { threefold_repetition: true, ..AutoDrawRules::default() },
        ..GameConfig::default()
    };
    let mut game = GameState::new(config);
    for ply in 0..8 {
        shuffle_ply(&mut game, ply);
        assert!(!game.is_over());
    }
    // The position after the first ply now occurs for the third time
    shuffle_ply(&mut game, 8);
    assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::ThreefoldRepetition)));
}

#[test]
fn perpetual_check_rule_ignores_quiet_shuffling() {
    let config = GameConfig {
        draw_rules: AutoDrawRules { perpetual_check: true, ..AutoDrawRules::default() },
        ..GameConfig::default()
    };
    let mut game = GameState::new(config);
    for ply in 0..12 {
        shuffle_ply(&mut game, ply);
    }
    assert!(!game.is_perpetual_check());
    assert!(!game.is_over());
}

#[test]
fn insufficient_material_cases() {
    let lone_bishop = diagram("....k...\n........\n........\n........\n........\n........\n......B.\n....K...");
    let lone_rook = diagram("....k...\n........\n........\n........\n........\n........\n......R.\n....K...");
    // (6,6) is light, (1,2) is dark
    let opposite_bishops = diagram("....k...\n..b.....\n........\n........\n........\n........\n......B.\n....K...");
    // (6,6) and (1,1) are both light
    let same_bishops = diagram("....k...\n.b......\n........\n........\n........\n........\n......B.\n....K...");

    assert!(is_insufficient_material(&lone_bishop));
    assert!(!is_insufficient_material(&lone_rook));
    assert!(is_insufficient_material(&opposite_bishops));
    assert!(!is_insufficient_material(&same_bishops));
}

#[test]
fn capture_into_bare_material_draws_when_enabled() {
    let rows = "....k...\n........\n........\n........\n...p....\n..B.....\n........\n....K...";
    let config = GameConfig {
        draw_rules: AutoDrawRules { insufficient_material: true, ..AutoDrawRules::default() },
        ..GameConfig::default()
    };

    let mut game = GameState::from_position(diagram(rows), Color::White, config);
    game.play(sq(5, 2), sq(4, 3)).unwrap();
    assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::InsufficientMaterial)));

    let mut lenient = GameState::from_position(diagram(rows), Color::White, GameConfig::default());
    lenient.play(sq(5, 2), sq(4, 3)).unwrap();
    assert!(lenient.is_insufficient_material());
    assert!(!lenient.is_over());
}
