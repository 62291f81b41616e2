//! Check detection and terminal-state classification.

use crate::config::MoveRules;
use crate::movegen::{attacked_squares, has_legal_move, pseudo_legal_with};
use crate::position::Position;
use crate::types::{Color, Piece, Square};

// --- Check Detection ---

/// Whether `color`'s king is attacked by any opposing piece's pseudo-legal move set.
/// A position without that king yields `false`; a validated position always has one.
pub fn is_in_check(color: Color, position: &Position) -> bool {
    let Some(king_sq) = position.king_square(color) else {
        return false;
    };
    let occupancy = position.occupancy();
    position.pieces_of(color.opponent())
        .any(|attacker| pseudo_legal_with(attacker, &occupancy, None).contains(&king_sq))
}

/// Whether moving `piece` to `target` would leave its own king in check. The simulation removes
/// whatever stands on `target` and relocates the piece; nothing else about the move (rook
/// relocation, en-passant removal) is simulated.
pub fn is_in_check_after_move(piece: &Piece, target: Square, position: &Position) -> bool {
    let simulated = position.with_relocation(piece.square, target);
    is_in_check(piece.color, &simulated)
}

/// Like [`is_in_check_after_move`] for an en-passant capture: the pawn taken on `captured` is
/// removed from the simulated position too.
pub fn is_in_check_after_en_passant(pawn: &Piece, target: Square, captured: Square, position: &Position) -> bool {
    let mut simulated = position.with_relocation(pawn.square, target);
    simulated.remove_at(captured);
    is_in_check(pawn.color, &simulated)
}

/// Whether any piece of `attacker` attacks `sq`, empty or not.
pub fn is_square_attacked(sq: Square, attacker: Color, position: &Position) -> bool {
    let occupancy = position.occupancy();
    position.pieces_of(attacker)
        .any(|piece| attacked_squares(piece, &occupancy).contains(&sq))
}

// --- Terminal States ---

fn has_no_legal_moves(color: Color, position: &Position, en_passant: Option<Square>, rules: MoveRules) -> bool {
    !position.pieces_of(color).any(|piece| has_legal_move(piece, position, en_passant, rules))
}

/// `color` is in check and none of its pieces has a legal move.
pub fn is_checkmate(color: Color, position: &Position, en_passant: Option<Square>, rules: MoveRules) -> bool {
    is_in_check(color, position) && has_no_legal_moves(color, position, en_passant, rules)
}

/// `color` is not in check but none of its pieces has a legal move.
pub fn is_stalemate(color: Color, position: &Position, en_passant: Option<Square>, rules: MoveRules) -> bool {
    !is_in_check(color, position) && has_no_legal_moves(color, position, en_passant, rules)
}
