//! The game state machine.
//!
//! A [`GameState`] holds everything a game needs between two player inputs: the position, the
//! side to move, the current [`Phase`], the en-passant target, the halfmove clock, the ply
//! history, captured pieces and the clocks. Inputs arrive as [`Command`]s and are processed to
//! completion, terminal evaluation included, before the next one is looked at.

use crate::check::{is_checkmate, is_in_check, is_stalemate};
use crate::clock::{format_duration, Clock};
use crate::config::GameConfig;
use crate::draw::{
    has_sufficient_mating_material, is_fifty_move_rule, is_insufficient_material,
    is_perpetual_check, is_threefold_repetition, HistoryEntry,
};
use crate::error::GameError;
use crate::movegen::{all_legal_moves, is_castle, is_en_passant_capture, legal_moves};
use crate::position::Position;
use crate::types::{Color, Piece, PieceType, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

// --- Results ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win(Color, WinReason),
    Draw(DrawReason),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum WinReason { Checkmate, Timeout, Resignation }

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    FiftyMoveRule,
    Agreement,
    InsufficientMaterial,
    ThreefoldRepetition,
    PerpetualCheck,
    TimeoutVsInsufficientMaterial,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Win(color, reason) => write!(f, "{} wins by {:?}", color, reason),
            GameResult::Draw(reason) => write!(f, "draw by {:?}", reason),
        }
    }
}

// --- Phases, Commands and Events ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingSelection,
    PieceSelected { square: Square, targets: Vec<Square> },
    /// A pawn reached its last row; the ply is committed on the board but not finalized.
    AwaitingPromotion { square: Square, color: Color },
    AwaitingDrawResponse { requested_by: Color },
    GameOver(GameResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Select(Square),
    Move(Square),
    Promote(PieceType),
    OfferDraw,
    RespondDraw { by: Color, accept: bool },
    Resign,
    /// Time spent by the side to move since the last tick.
    Tick(Duration),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureRecord {
    pub piece: Piece,
    pub by: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    PieceSelected { square: Square, targets: Vec<Square> },
    SelectionCleared,
    Moved { piece: Piece, from: Square, to: Square },
    Captured(CaptureRecord),
    Castled { rook_from: Square, rook_to: Square },
    PromotionPending { square: Square, color: Color },
    Promoted { square: Square, to: PieceType },
    Check { color: Color },
    DrawOffered { by: Color },
    DrawDeclined { by: Color },
    GameOver(GameResult),
    Reset,
}

/// Read-only view of a game for a UI, serializable as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub pieces: Vec<Piece>,
    pub active: Color,
    pub phase: Phase,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub captured_by_white: Vec<Piece>,
    pub captured_by_black: Vec<Piece>,
    pub white_time: Duration,
    pub black_time: Duration,
}

// --- Game State ---

#[derive(Debug, Clone)]
pub struct GameState {
    position: Position,
    active: Color,
    phase: Phase,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    history: Vec<HistoryEntry>,
    /// Pieces taken, indexed by the capturing color.
    captured: [Vec<Piece>; 2],
    clock: Clock,
    config: GameConfig,
}

impl Default for GameState {
    fn default() -> Self { GameState::new(GameConfig::default()) }
}

impl GameState {
    /// A new game from the standard setup with white to move.
    pub fn new(config: GameConfig) -> Self {
        GameState::from_position(Position::standard(), Color::White, config)
    }

    /// A game starting from an arbitrary valid position.
    pub fn from_position(position: Position, active: Color, config: GameConfig) -> Self {
        GameState {
            position,
            active,
            phase: Phase::AwaitingSelection,
            en_passant: None,
            halfmove_clock: 0,
            history: Vec::new(),
            captured: [Vec::new(), Vec::new()],
            clock: Clock::new(config.mode),
            config,
        }
    }

    pub fn position(&self) -> &Position { &self.position }
    pub fn active(&self) -> Color { self.active }
    pub fn phase(&self) -> &Phase { &self.phase }
    pub fn en_passant(&self) -> Option<Square> { self.en_passant }
    pub fn halfmove_clock(&self) -> u32 { self.halfmove_clock }
    pub fn history(&self) -> &[HistoryEntry] { &self.history }
    pub fn clock(&self) -> &Clock { &self.clock }
    pub fn config(&self) -> &GameConfig { &self.config }

    pub fn captured_by(&self, color: Color) -> &[Piece] { &self.captured[color.index()] }

    pub fn result(&self) -> Option<GameResult> {
        match self.phase { Phase::GameOver(result) => Some(result), _ => None }
    }

    pub fn is_over(&self) -> bool { self.result().is_some() }

    pub fn selection(&self) -> Option<(Square, &[Square])> {
        match &self.phase {
            Phase::PieceSelected { square, targets } => Some((*square, targets.as_slice())),
            _ => None,
        }
    }

    pub fn pending_draw_offer(&self) -> Option<Color> {
        match self.phase { Phase::AwaitingDrawResponse { requested_by } => Some(requested_by), _ => None }
    }

    /// Legal moves of every piece of the side to move, keyed by origin.
    pub fn legal_moves(&self) -> Vec<(Square, Vec<Square>)> {
        all_legal_moves(self.active, &self.position, self.en_passant, self.config.move_rules())
    }

    pub fn is_insufficient_material(&self) -> bool { is_insufficient_material(&self.position) }
    pub fn is_threefold_repetition(&self) -> bool { is_threefold_repetition(&self.history) }
    pub fn is_perpetual_check(&self) -> bool { is_perpetual_check(&self.history) }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pieces: self.position.pieces().to_vec(),
            active: self.active,
            phase: self.phase.clone(),
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            captured_by_white: self.captured_by(Color::White).to_vec(),
            captured_by_black: self.captured_by(Color::Black).to_vec(),
            white_time: self.clock.remaining(Color::White),
            black_time: self.clock.remaining(Color::Black),
        }
    }

    // --- Command Dispatch ---

    /// Processes one command in place. A rejected command leaves the game as it was, except that
    /// an illegal move target drops the current selection.
    pub fn apply(&mut self, command: Command) -> Result<Vec<GameEvent>, GameError> {
        let outcome = match command.clone() {
            Command::Reset => Ok(self.handle_reset()),
            _ if self.is_over() => Err(GameError::GameAlreadyOver),
            Command::Select(square) => self.handle_select(square),
            Command::Move(target) => self.handle_move(target),
            Command::Promote(kind) => self.handle_promotion(kind),
            Command::OfferDraw => self.handle_offer_draw(),
            Command::RespondDraw { by, accept } => self.handle_draw_response(by, accept),
            Command::Resign => Ok(self.handle_resign()),
            Command::Tick(elapsed) => Ok(self.handle_tick(elapsed)),
        };
        if let Err(e) = &outcome {
            warn!(?command, error = %e, "command rejected");
        }
        outcome
    }

    pub fn select_piece(&mut self, square: Square) -> Result<Vec<GameEvent>, GameError> {
        self.apply(Command::Select(square))
    }

    pub fn attempt_move(&mut self, target: Square) -> Result<Vec<GameEvent>, GameError> {
        self.apply(Command::Move(target))
    }

    /// Selects the piece on `from` and moves it to `to`.
    pub fn play(&mut self, from: Square, to: Square) -> Result<Vec<GameEvent>, GameError> {
        let mut events = self.select_piece(from)?;
        events.extend(self.attempt_move(to)?);
        Ok(events)
    }

    pub fn choose_promotion(&mut self, kind: PieceType) -> Result<Vec<GameEvent>, GameError> {
        self.apply(Command::Promote(kind))
    }

    pub fn offer_draw(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.apply(Command::OfferDraw)
    }

    pub fn respond_draw(&mut self, by: Color, accept: bool) -> Result<Vec<GameEvent>, GameError> {
        self.apply(Command::RespondDraw { by, accept })
    }

    pub fn resign(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.apply(Command::Resign)
    }

    pub fn tick(&mut self, elapsed: Duration) -> Result<Vec<GameEvent>, GameError> {
        self.apply(Command::Tick(elapsed))
    }

    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.handle_reset()
    }

    // --- Handlers ---

    fn blocked_by_pending_state(&self) -> Option<GameError> {
        match self.phase {
            Phase::AwaitingPromotion { square, .. } => Some(GameError::PromotionPending(square)),
            Phase::AwaitingDrawResponse { requested_by } => Some(GameError::DrawResponsePending(requested_by.opponent())),
            _ => None,
        }
    }

    fn handle_select(&mut self, square: Square) -> Result<Vec<GameEvent>, GameError> {
        if let Some(err) = self.blocked_by_pending_state() {
            return Err(err);
        }
        let piece = *self.position.piece_at(square).ok_or(GameError::EmptySquare(square))?;
        if piece.color != self.active {
            return Err(GameError::NotYourTurn { active: self.active, piece_color: piece.color, square });
        }

        let targets = legal_moves(&piece, &self.position, self.en_passant, self.config.move_rules());
        debug!(%square, kind = ?piece.kind, count = targets.len(), "piece selected");
        let mut events = Vec::new();
        if self.selection().is_some() {
            events.push(GameEvent::SelectionCleared);
        }
        self.phase = Phase::PieceSelected { square, targets: targets.clone() };
        events.push(GameEvent::PieceSelected { square, targets });
        Ok(events)
    }

    fn handle_move(&mut self, target: Square) -> Result<Vec<GameEvent>, GameError> {
        if let Some(err) = self.blocked_by_pending_state() {
            return Err(err);
        }
        let (from, allowed) = match &self.phase {
            Phase::PieceSelected { square, targets } => (*square, targets.contains(&target)),
            _ => return Err(GameError::NothingSelected),
        };
        if !allowed {
            self.phase = Phase::AwaitingSelection;
            return Err(GameError::IllegalTarget { from, to: target });
        }
        let outcome = self.commit_move(from, target);
        if outcome.is_err() {
            self.phase = Phase::AwaitingSelection;
        }
        outcome
    }

    /// Applies a move already known to be legal. The board is changed on a copy that replaces
    /// the live position only once it validates, so a failed ply leaves the game untouched.
    fn commit_move(&mut self, from: Square, to: Square) -> Result<Vec<GameEvent>, GameError> {
        let piece = *self.position.piece_at(from).ok_or(GameError::EmptySquare(from))?;
        let mut events = Vec::new();

        let is_en_passant = is_en_passant_capture(&piece, to, self.en_passant, &self.position);
        // The pawn taken en passant stands beside the origin, one row behind the destination
        let capture_square = if is_en_passant { Square::new(from.row, to.col) } else { to };
        let mut next = self.position.clone();
        let captured = next.remove_at(capture_square);

        if is_castle(&piece, to) {
            let (rook_col, rook_dest_col) = if to.col > from.col { (7, 5) } else { (0, 3) };
            let rook_from = Square::new(from.row, rook_col);
            let rook_to = Square::new(from.row, rook_dest_col);
            if next.relocate(rook_from, rook_to).is_some() {
                events.push(GameEvent::Castled { rook_from, rook_to });
            }
        }

        let moved = next.relocate(from, to).ok_or(GameError::EmptySquare(from))?;
        next.validate()?;
        self.position = next;
        events.push(GameEvent::Moved { piece: moved, from, to });

        if let Some(victim) = captured {
            debug!(square = %capture_square, kind = ?victim.kind, en_passant = is_en_passant, "piece captured");
            self.captured[piece.color.index()].push(victim);
            events.push(GameEvent::Captured(CaptureRecord { piece: victim, by: piece.color }));
        }

        if piece.kind == PieceType::Pawn && to.row == piece.color.promotion_row() {
            info!(color = %piece.color, square = %to, "promotion pending");
            self.phase = Phase::AwaitingPromotion { square: to, color: piece.color };
            events.push(GameEvent::PromotionPending { square: to, color: piece.color });
            return Ok(events);
        }

        let passed_over = (piece.kind == PieceType::Pawn && from.row.abs_diff(to.row) == 2)
            .then(|| Square::new((from.row + to.row) / 2, from.col));
        let resets_clock = piece.kind == PieceType::Pawn || captured.is_some();
        info!(color = %piece.color, %from, %to, kind = ?piece.kind, "move committed");
        self.finalize_turn(resets_clock, passed_over, &mut events);
        Ok(events)
    }

    fn handle_promotion(&mut self, kind: PieceType) -> Result<Vec<GameEvent>, GameError> {
        let Phase::AwaitingPromotion { square, color } = self.phase else {
            return Err(GameError::NoPromotionPending);
        };
        if !kind.is_promotion_choice() {
            return Err(GameError::InvalidPromotionPiece(kind));
        }
        self.position.set_kind(square, kind).ok_or(GameError::EmptySquare(square))?;
        info!(%color, %square, ?kind, "pawn promoted");

        let mut events = vec![GameEvent::Promoted { square, to: kind }];
        self.finalize_turn(true, None, &mut events);
        Ok(events)
    }

    /// Hands the turn over and evaluates the position the next side faces.
    fn finalize_turn(&mut self, resets_clock: bool, passed_over: Option<Square>, events: &mut Vec<GameEvent>) {
        self.en_passant = passed_over;
        self.halfmove_clock = if resets_clock { 0 } else { self.halfmove_clock + 1 };
        self.active = self.active.opponent();
        self.phase = Phase::AwaitingSelection;
        self.history.push(HistoryEntry::new(self.position.clone(), self.active, self.halfmove_clock));

        let next = self.active;
        let rules = self.config.move_rules();
        let result = if is_fifty_move_rule(self.halfmove_clock) {
            Some(GameResult::Draw(DrawReason::FiftyMoveRule))
        } else if is_checkmate(next, &self.position, self.en_passant, rules) {
            Some(GameResult::Win(next.opponent(), WinReason::Checkmate))
        } else if is_stalemate(next, &self.position, self.en_passant, rules) {
            Some(GameResult::Draw(DrawReason::Stalemate))
        } else {
            if is_in_check(next, &self.position) {
                debug!(color = %next, "check");
                events.push(GameEvent::Check { color: next });
            }
            self.automatic_draw().map(GameResult::Draw)
        };

        if let Some(result) = result {
            self.end_game(result, events);
        }
    }

    fn automatic_draw(&self) -> Option<DrawReason> {
        let rules = self.config.draw_rules;
        if rules.insufficient_material && self.is_insufficient_material() {
            Some(DrawReason::InsufficientMaterial)
        } else if rules.threefold_repetition && self.is_threefold_repetition() {
            Some(DrawReason::ThreefoldRepetition)
        } else if rules.perpetual_check && self.is_perpetual_check() {
            Some(DrawReason::PerpetualCheck)
        } else {
            None
        }
    }

    fn end_game(&mut self, result: GameResult, events: &mut Vec<GameEvent>) {
        info!(%result, plies = self.history.len(), "game over");
        self.phase = Phase::GameOver(result);
        events.push(GameEvent::GameOver(result));
    }

    fn handle_offer_draw(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != Phase::AwaitingSelection {
            return Err(GameError::DrawOfferNotAllowed);
        }
        info!(by = %self.active, "draw offered");
        self.phase = Phase::AwaitingDrawResponse { requested_by: self.active };
        Ok(vec![GameEvent::DrawOffered { by: self.active }])
    }

    fn handle_draw_response(&mut self, by: Color, accept: bool) -> Result<Vec<GameEvent>, GameError> {
        let Phase::AwaitingDrawResponse { requested_by } = self.phase else {
            return Err(GameError::NoDrawOffer);
        };
        if by == requested_by {
            return Err(GameError::NotAddressedPlayer(by));
        }

        let mut events = Vec::new();
        if accept {
            info!(%by, "draw accepted");
            self.end_game(GameResult::Draw(DrawReason::Agreement), &mut events);
        } else {
            info!(%by, "draw declined");
            self.phase = Phase::AwaitingSelection;
            events.push(GameEvent::DrawDeclined { by });
        }
        Ok(events)
    }

    fn handle_resign(&mut self) -> Vec<GameEvent> {
        info!(color = %self.active, "resigned");
        let mut events = Vec::new();
        self.end_game(GameResult::Win(self.active.opponent(), WinReason::Resignation), &mut events);
        events
    }

    fn handle_tick(&mut self, elapsed: Duration) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.config.clock_enabled || !self.clock.charge(self.active, elapsed) {
            return events;
        }
        // The flagged side loses unless the opponent could never mate
        let opponent = self.active.opponent();
        let result = if has_sufficient_mating_material(opponent, &self.position) {
            GameResult::Win(opponent, WinReason::Timeout)
        } else {
            GameResult::Draw(DrawReason::TimeoutVsInsufficientMaterial)
        };
        self.end_game(result, &mut events);
        events
    }

    fn handle_reset(&mut self) -> Vec<GameEvent> {
        info!("game reset");
        *self = GameState::new(self.config);
        vec![GameEvent::Reset]
    }
}

/// Applies `command` to a copy of `state`, leaving the input untouched.
pub fn transition(state: &GameState, command: Command) -> (GameState, Result<Vec<GameEvent>, GameError>) {
    let mut next = state.clone();
    let outcome = next.apply(command);
    (next, outcome)
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in [Color::White, Color::Black] {
            let mut taken = self.captured_by(color).to_vec();
            taken.sort_by_key(|p| p.kind.value());
            write!(f, "Captured by {}: ", color)?;
            for piece in taken { write!(f, "{} ", piece)?; }
            writeln!(f)?;
        }
        writeln!(f, "---------------------")?;
        writeln!(f, "Black Time: {}", format_duration(self.clock.remaining(Color::Black)))?;
        writeln!(f, "White Time: {}", format_duration(self.clock.remaining(Color::White)))?;
        writeln!(f, "---------------------")?;
        write!(f, "{}", self.position)?;

        match &self.phase {
            Phase::AwaitingSelection => writeln!(f, "{} to move.", self.active)?,
            Phase::PieceSelected { square, targets } => {
                write!(f, "{} selected {} ->", self.active, square)?;
                for target in targets { write!(f, " {}", target)?; }
                writeln!(f)?;
            }
            Phase::AwaitingPromotion { square, color } => writeln!(f, "{} must choose a promotion for {}.", color, square)?,
            Phase::AwaitingDrawResponse { requested_by } => writeln!(f, "{} offers a draw; {} to answer.", requested_by, requested_by.opponent())?,
            Phase::GameOver(result) => writeln!(f, "Game over: {}.", result)?,
        }
        if self.phase != Phase::AwaitingSelection || !is_in_check(self.active, &self.position) {
            return Ok(());
        }
        writeln!(f, "{} is in check.", self.active)
    }
}
