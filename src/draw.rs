//! Draw rules evaluated over the current position and the recorded history.
//!
//! Agreed draws are not decided here; they are a negotiation handled by the game state machine.

use crate::check::is_in_check;
use crate::position::Position;
use crate::types::{Color, PieceType};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Plies without a pawn move or capture after which the fifty-move rule applies.
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;
/// Occurrences of one position that make a threefold repetition.
pub const REPETITION_COUNT: usize = 3;
/// Consecutive checking plies the perpetual-check heuristic looks at.
pub const PERPETUAL_CHECK_WINDOW: usize = 6;

/// One committed ply as seen by the draw rules: an immutable copy of the position after the
/// ply, the color to move next and the halfmove clock at that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub position: Position,
    pub to_move: Color,
    pub halfmove_clock: u32,
}

impl HistoryEntry {
    pub fn new(position: Position, to_move: Color, halfmove_clock: u32) -> Self {
        HistoryEntry { position, to_move, halfmove_clock }
    }

    /// Whether the side that did not make this ply was left in check.
    pub fn left_opponent_in_check(&self) -> bool {
        is_in_check(self.to_move, &self.position)
    }
}

// --- Fifty-Move Rule ---

pub fn is_fifty_move_rule(halfmove_clock: u32) -> bool {
    halfmove_clock >= FIFTY_MOVE_HALFMOVES
}

// --- Insufficient Material ---

/// King vs king, king and one minor piece vs king, or one bishop each where the two bishops
/// stand on squares of different colors.
pub fn is_insufficient_material(position: &Position) -> bool {
    let others: Vec<_> = position.pieces().iter().filter(|p| p.kind != PieceType::King).collect();
    match others.as_slice() {
        [] => true,
        [only] => matches!(only.kind, PieceType::Bishop | PieceType::Knight),
        [a, b] => {
            a.kind == PieceType::Bishop && b.kind == PieceType::Bishop
                && a.color != b.color
                && a.square.is_light() != b.square.is_light()
        }
        _ => false,
    }
}

/// Whether `color` keeps material that could deliver mate against a lone king: any pawn, rook
/// or queen, two minor pieces, or bishop and knight together.
pub fn has_sufficient_mating_material(color: Color, position: &Position) -> bool {
    let mut knights = 0;
    let mut bishops = 0;
    for piece in position.pieces_of(color) {
        match piece.kind {
            PieceType::Pawn | PieceType::Rook | PieceType::Queen => return true,
            PieceType::Knight => knights += 1,
            PieceType::Bishop => bishops += 1,
            PieceType::King => {}
        }
    }
    knights + bishops >= 2
}

// --- Repetition ---

/// True once any position has been recorded three or more times.
pub fn is_threefold_repetition(history: &[HistoryEntry]) -> bool {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for entry in history {
        let count = seen.entry(entry.position.canonical_key()).or_insert(0);
        *count += 1;
        if *count >= REPETITION_COUNT {
            debug!(count = *count, "position repeated");
            return true;
        }
    }
    false
}

/// Heuristic: the last six recorded plies each left the side to move in check. This does not
/// verify that the positions repeat.
pub fn is_perpetual_check(history: &[HistoryEntry]) -> bool {
    if history.len() < PERPETUAL_CHECK_WINDOW {
        return false;
    }
    history[history.len() - PERPETUAL_CHECK_WINDOW..]
        .iter()
        .all(HistoryEntry::left_opponent_in_check)
}
