//! Move generation.
//!
//! Generation runs in two layers. [`pseudo_legal_moves`] follows each piece's movement pattern
//! and occupancy rules only. [`legal_moves`] is built on top of it and drops every target that
//! would leave the mover's own king in check. Check detection itself only ever calls the
//! pseudo-legal layer, so the two never recurse into each other.

use crate::check::{is_in_check, is_in_check_after_en_passant, is_in_check_after_move, is_square_attacked};
use crate::config::{CastlingRule, EnPassantRule, MoveRules};
use crate::position::{Occupancy, Position};
use crate::types::{Color, Piece, PieceType, Square};

const ORTHOGONALS: &[(i8, i8)] = &[(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONALS: &[(i8, i8)] = &[(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ALL_DIRECTIONS: &[(i8, i8)] = &[
    (-1, 0), (1, 0), (0, -1), (0, 1), // Orthogonal
    (-1, -1), (-1, 1), (1, -1), (1, 1), // Diagonal
];
const KNIGHT_JUMPS: &[(i8, i8)] = &[
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

/// Column the king starts on and castles from.
pub const KING_START_COL: u8 = 4;

// --- Pseudo-Legal Generation ---

/// Target squares reachable by `piece` according to its movement pattern, without regard to
/// the safety of its own king. Castling is included when king and rook are unmoved and the
/// squares between them are empty.
pub fn pseudo_legal_moves(piece: &Piece, position: &Position, en_passant: Option<Square>) -> Vec<Square> {
    pseudo_legal_with(piece, &position.occupancy(), en_passant)
}

/// Same as [`pseudo_legal_moves`] against an occupancy table the caller already built.
pub fn pseudo_legal_with(piece: &Piece, occupancy: &Occupancy, en_passant: Option<Square>) -> Vec<Square> {
    let mut moves = Vec::with_capacity(28);
    match piece.kind {
        PieceType::Pawn => pawn_moves(piece, occupancy, en_passant, &mut moves),
        PieceType::Knight => step_moves(piece, occupancy, KNIGHT_JUMPS, &mut moves),
        PieceType::Bishop => sliding_moves(piece, occupancy, DIAGONALS, &mut moves),
        PieceType::Rook => sliding_moves(piece, occupancy, ORTHOGONALS, &mut moves),
        PieceType::Queen => sliding_moves(piece, occupancy, ALL_DIRECTIONS, &mut moves),
        PieceType::King => {
            step_moves(piece, occupancy, ALL_DIRECTIONS, &mut moves);
            castling_moves(piece, occupancy, &mut moves);
        }
    }
    moves
}

fn pawn_moves(piece: &Piece, occupancy: &Occupancy, en_passant: Option<Square>, moves: &mut Vec<Square>) {
    let dir = piece.color.pawn_direction();

    // Pushes: one square, then two from the start row if both squares are free
    if let Some(one) = piece.square.offset(dir, 0) {
        if occupancy.is_empty(one) {
            moves.push(one);
            if piece.square.row == piece.color.pawn_start_row() {
                if let Some(two) = piece.square.offset(2 * dir, 0) {
                    if occupancy.is_empty(two) { moves.push(two); }
                }
            }
        }
    }

    // Captures, including onto the live en-passant square
    for dc in [-1, 1] {
        if let Some(target) = piece.square.offset(dir, dc) {
            if occupancy.is_enemy(target, piece.color) || en_passant == Some(target) {
                moves.push(target);
            }
        }
    }
}

fn step_moves(piece: &Piece, occupancy: &Occupancy, offsets: &[(i8, i8)], moves: &mut Vec<Square>) {
    for &(dr, dc) in offsets {
        if let Some(target) = piece.square.offset(dr, dc) {
            match occupancy.get(target) {
                Some(other) if other.color == piece.color => {}
                _ => moves.push(target),
            }
        }
    }
}

fn sliding_moves(piece: &Piece, occupancy: &Occupancy, directions: &[(i8, i8)], moves: &mut Vec<Square>) {
    for &(dr, dc) in directions {
        let mut current = piece.square;
        while let Some(next) = current.offset(dr, dc) {
            match occupancy.get(next) {
                None => moves.push(next),
                Some(other) => {
                    if other.color != piece.color { moves.push(next); } // Capture ends the ray
                    break;
                }
            }
            current = next;
        }
    }
}

fn castling_moves(king: &Piece, occupancy: &Occupancy, moves: &mut Vec<Square>) {
    if king.has_moved || king.square != Square::new(king.color.back_row(), KING_START_COL) {
        return;
    }
    let row = king.square.row;
    // (rook column, squares that must be empty, king destination column)
    let sides: [(u8, &[u8], u8); 2] = [(7, &[5, 6], 6), (0, &[1, 2, 3], 2)];

    for (rook_col, between, dest_col) in sides {
        let rook_ready = occupancy.get(Square::new(row, rook_col)).is_some_and(|rook| {
            rook.kind == PieceType::Rook && rook.color == king.color && !rook.has_moved
        });
        let path_clear = between.iter().all(|&col| occupancy.is_empty(Square::new(row, col)));
        if rook_ready && path_clear {
            moves.push(Square::new(row, dest_col));
        }
    }
}

/// Squares `piece` attacks, whether empty or occupied. Differs from the pseudo-legal set only
/// for pawns (diagonals count even when empty, pushes never do) and kings (no castling).
pub fn attacked_squares(piece: &Piece, occupancy: &Occupancy) -> Vec<Square> {
    let mut squares = Vec::with_capacity(28);
    match piece.kind {
        PieceType::Pawn => {
            let dir = piece.color.pawn_direction();
            squares.extend([-1, 1].iter().filter_map(|&dc| piece.square.offset(dir, dc)));
        }
        PieceType::King => step_moves(piece, occupancy, ALL_DIRECTIONS, &mut squares),
        _ => squares = pseudo_legal_with(piece, occupancy, None),
    }
    squares
}

// --- Legality Filter ---

/// Pseudo-legal targets of `piece` that do not leave its own king in check.
///
/// With [`CastlingRule::Strict`], castling additionally requires the king not to be in check
/// and the squares it crosses and lands on not to be attacked. With [`EnPassantRule::Strict`],
/// the pawn taken en passant is removed before the king-safety test.
pub fn legal_moves(piece: &Piece, position: &Position, en_passant: Option<Square>, rules: MoveRules) -> Vec<Square> {
    let mut candidates = pseudo_legal_moves(piece, position, en_passant);
    candidates.retain(|&target| {
        if rules.en_passant == EnPassantRule::Strict && is_en_passant_capture(piece, target, en_passant, position) {
            let captured = Square::new(piece.square.row, target.col);
            !is_in_check_after_en_passant(piece, target, captured, position)
        } else {
            !is_in_check_after_move(piece, target, position)
        }
    });

    if rules.castling == CastlingRule::Strict && piece.kind == PieceType::King {
        candidates.retain(|&target| !is_castle(piece, target) || castle_path_is_safe(piece, target, position));
    }
    candidates
}

/// True if the piece has at least one legal move.
pub fn has_legal_move(piece: &Piece, position: &Position, en_passant: Option<Square>, rules: MoveRules) -> bool {
    !legal_moves(piece, position, en_passant, rules).is_empty()
}

/// Legal targets for every piece of `color`, keyed by origin square. Pieces without a legal
/// move are left out.
pub fn all_legal_moves(color: Color, position: &Position, en_passant: Option<Square>, rules: MoveRules) -> Vec<(Square, Vec<Square>)> {
    position.pieces_of(color)
        .map(|piece| (piece.square, legal_moves(piece, position, en_passant, rules)))
        .filter(|(_, targets)| !targets.is_empty())
        .collect()
}

/// A pawn moving diagonally onto the empty en-passant target captures en passant. The captured
/// pawn stands beside the mover's origin, on the target's column.
pub fn is_en_passant_capture(piece: &Piece, target: Square, en_passant: Option<Square>, position: &Position) -> bool {
    piece.kind == PieceType::Pawn
        && en_passant == Some(target)
        && piece.square.col != target.col
        && position.piece_at(target).is_none()
}

/// A king move spanning two columns is a castle.
pub fn is_castle(piece: &Piece, target: Square) -> bool {
    piece.kind == PieceType::King && piece.square.row == target.row && piece.square.col.abs_diff(target.col) == 2
}

fn castle_path_is_safe(king: &Piece, target: Square, position: &Position) -> bool {
    if is_in_check(king.color, position) { return false; }
    let step: i8 = if target.col > king.square.col { 1 } else { -1 };
    let attacker = king.color.opponent();
    (1..=2).all(|n| {
        king.square.offset(0, step * n)
            .is_some_and(|sq| !is_square_attacked(sq, attacker, position))
    })
}
