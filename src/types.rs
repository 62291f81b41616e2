use serde::{Deserialize, Serialize};
use std::fmt;

// --- Enums and Basic Structs ---

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Color { White, Black }

impl Color {
    pub fn opponent(&self) -> Color {
        match self { Color::White => Color::Black, Color::Black => Color::White }
    }

    pub fn index(&self) -> usize {
        match self { Color::White => 0, Color::Black => 1 }
    }

    /// Row delta a pawn of this color advances by. White starts on the high-index rows.
    pub fn pawn_direction(&self) -> i8 {
        match self { Color::White => -1, Color::Black => 1 }
    }

    pub fn pawn_start_row(&self) -> u8 {
        match self { Color::White => 6, Color::Black => 1 }
    }

    /// The farthest row for this color's pawns, where they promote.
    pub fn promotion_row(&self) -> u8 {
        match self { Color::White => 0, Color::Black => 7 }
    }

    pub fn back_row(&self) -> u8 {
        match self { Color::White => 7, Color::Black => 0 }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PieceType { Pawn, Rook, Knight, Bishop, Queen, King }

impl PieceType {
    /// Single-letter code used by the canonical position key and text diagrams.
    pub fn letter(&self) -> char {
        match self {
            PieceType::Pawn => 'p', PieceType::Knight => 'n', PieceType::Bishop => 'b',
            PieceType::Rook => 'r', PieceType::Queen => 'q', PieceType::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn), 'n' => Some(PieceType::Knight), 'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook), 'q' => Some(PieceType::Queen), 'k' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Pieces a pawn may be promoted to.
    pub fn is_promotion_choice(&self) -> bool {
        matches!(self, PieceType::Queen | PieceType::Rook | PieceType::Bishop | PieceType::Knight)
    }

    pub fn value(&self) -> u32 {
        match self {
            PieceType::Pawn => 1, PieceType::Knight => 3, PieceType::Bishop => 3,
            PieceType::Rook => 5, PieceType::Queen => 9, PieceType::King => 0,
        }
    }
}

// --- Squares ---

/// A board square addressed by row and column, both `0..8`.
/// Row 0 is black's back rank, row 7 is white's.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    /// Callers must pass coordinates inside the board; use [`Square::offset`] or
    /// [`Square::try_new`] when they are computed.
    pub const fn new(row: u8, col: u8) -> Self { Square { row, col } }

    pub fn try_new(row: i8, col: i8) -> Option<Square> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    pub fn is_on_board(&self) -> bool { self.row < 8 && self.col < 8 }

    pub fn offset(&self, dr: i8, dc: i8) -> Option<Square> {
        Square::try_new(self.row as i8 + dr, self.col as i8 + dc)
    }

    /// Light squares are those where row + col is even (a8 and h1 are light).
    pub fn is_light(&self) -> bool { (self.row + self.col) % 2 == 0 }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

// --- Pieces ---

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    pub square: Square,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceType, color: Color, square: Square) -> Self {
        Piece { kind, color, square, has_moved: false }
    }

    pub fn symbol(&self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pawn_geometry_matches_orientation() {
        assert_eq!(Color::White.pawn_direction(), -1);
        assert_eq!(Color::White.pawn_start_row(), 6);
        assert_eq!(Color::White.promotion_row(), 0);
        assert_eq!(Color::Black.pawn_direction(), 1);
        assert_eq!(Color::Black.pawn_start_row(), 1);
        assert_eq!(Color::Black.promotion_row(), 7);
    }

    #[test]
    fn square_offsets_stay_on_board() {
        let corner = Square::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 2), Some(Square::new(1, 2)));
        assert_eq!(Square::new(7, 7).offset(0, 1), None);
    }

    #[test]
    fn square_colors() {
        assert!(Square::new(0, 0).is_light());
        assert!(Square::new(7, 7).is_light());
        assert!(!Square::new(7, 0).is_light());
    }

    #[test]
    fn only_minor_and_major_pieces_are_promotion_choices() {
        assert!(PieceType::Queen.is_promotion_choice());
        assert!(PieceType::Knight.is_promotion_choice());
        assert!(!PieceType::King.is_promotion_choice());
        assert!(!PieceType::Pawn.is_promotion_choice());
    }
}
