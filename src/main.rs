use chess_rules::{Color, GameConfig, GameEvent, GameMode, GameResult, GameState, Phase, PieceType, Square};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const PROMOTION_CHOICES: [PieceType; 4] = [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

lazy_static! {
    static ref ALGEBRAIC_SQUARE: Regex = Regex::new(r"^([a-h])([1-8])$").expect("valid regex");
    static ref NUMERIC_SQUARE: Regex = Regex::new(r"^([0-7])\s*,\s*([0-7])$").expect("valid regex");
    static ref MOVE_PAIR: Regex = Regex::new(r"^([a-h][1-8])\s*-?\s*([a-h][1-8])$").expect("valid regex");
    static ref PROMOTE: Regex = Regex::new(r"^promote\s+([qrbn])$").expect("valid regex");
}

// --- Input Parsing ---

#[derive(Debug)]
enum UserInput {
    Square(Square),
    Move(Square, Square),
    Promote(PieceType),
    Command(Command),
}

#[derive(Debug)]
enum Command {
    OfferDraw, AcceptDraw, DeclineDraw,
    Resign, Random, Json, Reset, Help, Quit,
}

/// `e2` style: files a..h are columns 0..7, rank 1 is white's back row (row 7).
fn algebraic_to_square(s: &str) -> Option<Square> {
    let caps = ALGEBRAIC_SQUARE.captures(s)?;
    let file = caps[1].bytes().next()?;
    let rank = caps[2].bytes().next()?;
    Some(Square::new(b'8' - rank, file - b'a'))
}

fn parse_square(s: &str) -> Option<Square> {
    if let Some(sq) = algebraic_to_square(s) {
        return Some(sq);
    }
    let caps = NUMERIC_SQUARE.captures(s)?;
    Some(Square::new(caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn parse_user_input(input: &str) -> Option<UserInput> {
    let lower = input.trim().to_lowercase();
    let command = match lower.as_str() {
        "offer draw" => Some(Command::OfferDraw),
        "accept draw" => Some(Command::AcceptDraw),
        "decline draw" => Some(Command::DeclineDraw),
        "resign" => Some(Command::Resign),
        "random" => Some(Command::Random),
        "json" => Some(Command::Json),
        "reset" => Some(Command::Reset),
        "help" | "?" => Some(Command::Help),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    };
    if let Some(command) = command {
        return Some(UserInput::Command(command));
    }

    if let Some(caps) = PROMOTE.captures(&lower) {
        return caps[1].chars().next().and_then(PieceType::from_letter).map(UserInput::Promote);
    }
    if let Some(caps) = MOVE_PAIR.captures(&lower) {
        return Some(UserInput::Move(algebraic_to_square(&caps[1])?, algebraic_to_square(&caps[2])?));
    }
    parse_square(&lower).map(UserInput::Square)
}

// --- Startup ---

fn load_config(args: &[String]) -> Result<GameConfig, Box<dyn Error>> {
    let mut config = GameConfig::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a file path")?;
                config = GameConfig::from_json_file(path)?;
            }
            "--mode" => {
                let name = iter.next().ok_or("--mode needs classic, rapid or blitz")?;
                config.mode = GameMode::parse(name).ok_or_else(|| format!("unknown mode '{}'", name))?;
            }
            other => return Err(format!("unknown argument '{}'", other).into()),
        }
    }
    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// --- Main Game Loop ---

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let args: Vec<String> = env::args().skip(1).collect();
    let config = load_config(&args)?;
    let mut game = GameState::new(config);
    let mut rng = rand::rng();

    println!("==============================");
    println!("|     Chess Rules Engine     |");
    println!("==============================");
    print_help();

    'game_loop: loop {
        println!("------------------------------------------");
        println!("{}", game);
        if game.is_over() {
            print!("\nType 'reset' for a new game or 'quit' to leave: ");
        } else {
            print!("\n{}'s input: ", prompt_color(&game));
        }
        io::stdout().flush()?;

        let waiting_since = Instant::now();
        let mut input_line = String::new();
        match io::stdin().read_line(&mut input_line) {
            Ok(0) => {
                println!("\nEnd of input detected. Quitting.");
                break 'game_loop;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}. Try again or use 'quit'.", e);
                continue 'game_loop;
            }
        }

        // Thinking time is charged before the input itself is processed
        if !game.is_over() {
            let outcome = game.tick(waiting_since.elapsed());
            report(outcome);
            if game.is_over() { continue 'game_loop; }
        }

        let input = input_line.trim();
        if input.is_empty() { continue 'game_loop; }

        match parse_user_input(input) {
            Some(UserInput::Square(square)) => {
                let is_target = game.selection().is_some() && !holds_active_piece(&game, square);
                let outcome = if is_target { game.attempt_move(square) } else { game.select_piece(square) };
                report(outcome);
            }
            Some(UserInput::Move(from, to)) => report(game.play(from, to)),
            Some(UserInput::Promote(kind)) => report(game.choose_promotion(kind)),
            Some(UserInput::Command(command)) => match command {
                Command::OfferDraw => report(game.offer_draw()),
                Command::AcceptDraw => report(game.respond_draw(responder(&game), true)),
                Command::DeclineDraw => report(game.respond_draw(responder(&game), false)),
                Command::Resign => report(game.resign()),
                Command::Random => play_random_move(&mut game, &mut rng),
                Command::Json => println!("{}", serde_json::to_string_pretty(&game.snapshot())?),
                Command::Reset => report(Ok(game.reset())),
                Command::Help => print_help(),
                Command::Quit => {
                    println!("Exiting game.");
                    break 'game_loop;
                }
            },
            None => println!("Input Error: could not understand '{}'. Type 'help' for commands.", input),
        }
    }

    println!("\nGame session finished.");
    Ok(())
}

fn holds_active_piece(game: &GameState, square: Square) -> bool {
    game.position().piece_at(square).is_some_and(|p| p.color == game.active())
}

/// The player expected to type next: the addressed player while a draw offer is open.
fn prompt_color(game: &GameState) -> Color {
    match game.phase() {
        Phase::AwaitingDrawResponse { requested_by } => requested_by.opponent(),
        _ => game.active(),
    }
}

fn responder(game: &GameState) -> Color {
    game.pending_draw_offer().map_or(game.active(), |by| by.opponent())
}

fn play_random_move(game: &mut GameState, rng: &mut impl Rng) {
    if matches!(game.phase(), Phase::AwaitingPromotion { .. }) {
        let kind = PROMOTION_CHOICES[rng.random_range(0..PROMOTION_CHOICES.len())];
        report(game.choose_promotion(kind));
        return;
    }
    let moves: Vec<(Square, Square)> = game.legal_moves()
        .into_iter()
        .flat_map(|(from, targets)| targets.into_iter().map(move |to| (from, to)))
        .collect();
    if moves.is_empty() {
        println!("No legal move available.");
        return;
    }
    let (from, to) = moves[rng.random_range(0..moves.len())];
    println!("Random move: {} -> {}", from, to);
    report(game.play(from, to));
}

fn report(outcome: Result<Vec<GameEvent>, chess_rules::GameError>) {
    match outcome {
        Ok(events) => events.iter().for_each(describe_event),
        Err(e) => println!("Error: {}", e),
    }
}

fn describe_event(event: &GameEvent) {
    match event {
        GameEvent::Captured(record) => println!("{} captures {:?} on {}.", record.by, record.piece.kind, record.piece.square),
        GameEvent::Castled { rook_from, rook_to } => println!("Castled: rook {} -> {}.", rook_from, rook_to),
        GameEvent::PromotionPending { square, color } => println!("{} pawn on {} promotes: type 'promote q|r|b|n'.", color, square),
        GameEvent::Promoted { square, to } => println!("Pawn on {} becomes a {:?}.", square, to),
        GameEvent::Check { color } => println!("--- {} is in check! ---", color),
        GameEvent::DrawOffered { by } => println!("--- {} offers a draw. {} may 'accept draw' or 'decline draw'. ---", by, by.opponent()),
        GameEvent::DrawDeclined { by } => println!("--- {} declines the draw offer. ---", by),
        GameEvent::GameOver(result) => match result {
            GameResult::Win(color, reason) => println!("\n=== GAME OVER: {} wins by {:?}. ===", color, reason),
            GameResult::Draw(reason) => println!("\n=== GAME OVER: Draw by {:?}. ===", reason),
        },
        GameEvent::Reset => println!("--- New game. ---"),
        GameEvent::PieceSelected { .. } | GameEvent::SelectionCleared | GameEvent::Moved { .. } => {}
    }
}

/// Prints available commands.
fn print_help() {
    println!("\nAvailable Commands:");
    println!("  <square>       Select a piece (e.g. e2 or 6,4); with a piece selected, move it there.");
    println!("  <from><to>     Select and move in one go (e.g. e2e4).");
    println!("  promote <p>    Choose the promotion piece: q, r, b or n.");
    println!("  offer draw     Offer a draw before selecting a piece.");
    println!("  accept draw    Accept the opponent's draw offer (ends game).");
    println!("  decline draw   Decline the opponent's draw offer.");
    println!("  resign         Forfeit the game (ends game).");
    println!("  random         Play a random legal move for the side to move.");
    println!("  json           Print the current game state as JSON.");
    println!("  reset          Start a new game.");
    println!("  help           Show this help message.");
    println!("  quit / exit    Exit.");
    println!("Options: --config <file.json>, --mode <classic|rapid|blitz>. Set RUST_LOG for diagnostics.");
    println!();
}
