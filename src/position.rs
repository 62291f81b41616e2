use crate::error::InvariantViolation;
use crate::types::{Color, Piece, PieceType, Square};
use lazy_static::lazy_static;
use serde::Serialize;
use std::fmt;

const BACK_ROW: [PieceType; 8] = [
    PieceType::Rook, PieceType::Knight, PieceType::Bishop, PieceType::Queen,
    PieceType::King, PieceType::Bishop, PieceType::Knight, PieceType::Rook,
];

lazy_static! {
    static ref STARTING_POSITION: Position = build_starting_position();
}

fn build_starting_position() -> Position {
    let mut pieces = Vec::with_capacity(32);
    for color in [Color::White, Color::Black] {
        for (col, kind) in BACK_ROW.iter().enumerate() {
            pieces.push(Piece::new(*kind, color, Square::new(color.back_row(), col as u8)));
        }
        for col in 0..8 {
            pieces.push(Piece::new(PieceType::Pawn, color, Square::new(color.pawn_start_row(), col)));
        }
    }
    Position { pieces }
}

// --- Position ---

/// The set of pieces on the board. Empty squares are not represented; no two pieces share a
/// square and each color has exactly one king.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pieces: Vec<Piece>,
}

/// Square to piece lookup, rebuilt from a [`Position`] whenever a query needs occupancy.
#[derive(Debug, Clone)]
pub struct Occupancy {
    grid: [[Option<Piece>; 8]; 8],
}

impl Occupancy {
    #[inline]
    pub fn get(&self, sq: Square) -> Option<&Piece> {
        self.grid[sq.row as usize][sq.col as usize].as_ref()
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool { self.get(sq).is_none() }

    #[inline]
    pub fn is_enemy(&self, sq: Square, of: Color) -> bool {
        self.get(sq).is_some_and(|p| p.color != of)
    }
}

impl Position {
    /// The standard 32-piece starting setup.
    pub fn standard() -> Self { STARTING_POSITION.clone() }

    /// Builds a position, rejecting overlapping pieces and a missing or doubled king.
    pub fn from_pieces(pieces: Vec<Piece>) -> Result<Self, InvariantViolation> {
        let position = Position { pieces };
        position.validate()?;
        Ok(position)
    }

    /// Parses eight text rows, row 0 first. `.` is an empty square, uppercase letters are white
    /// and lowercase black (`k q r b n p`). Whitespace inside a row is ignored.
    ///
    /// Kings on their home square, rooks in the corners of their back row and pawns on their
    /// start row are unmoved; every other piece is marked as having moved.
    pub fn from_diagram(diagram: &str) -> Result<Self, InvariantViolation> {
        let rows: Vec<&str> = diagram.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != 8 {
            return Err(InvariantViolation::InvalidDiagram(format!("expected 8 rows, found {}", rows.len())));
        }

        let mut pieces = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != 8 {
                return Err(InvariantViolation::InvalidDiagram(format!("row {} has {} squares", row, cells.len())));
            }
            for (col, c) in cells.into_iter().enumerate() {
                if c == '.' { continue; }
                let kind = PieceType::from_letter(c)
                    .ok_or_else(|| InvariantViolation::InvalidDiagram(format!("unknown piece '{}'", c)))?;
                let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
                let square = Square::new(row as u8, col as u8);
                let mut piece = Piece::new(kind, color, square);
                piece.has_moved = !is_home_square(kind, color, square);
                pieces.push(piece);
            }
        }
        Position::from_pieces(pieces)
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut seen = [[false; 8]; 8];
        let mut kings = [0u8; 2];
        for piece in &self.pieces {
            let sq = piece.square;
            if !sq.is_on_board() { return Err(InvariantViolation::OffBoard(sq)); }
            if seen[sq.row as usize][sq.col as usize] {
                return Err(InvariantViolation::SquareOccupiedTwice(sq));
            }
            seen[sq.row as usize][sq.col as usize] = true;
            if piece.kind == PieceType::King { kings[piece.color.index()] += 1; }
        }
        for color in [Color::White, Color::Black] {
            match kings[color.index()] {
                0 => return Err(InvariantViolation::MissingKing(color)),
                1 => {}
                _ => return Err(InvariantViolation::ExtraKing(color)),
            }
        }
        Ok(())
    }

    pub fn pieces(&self) -> &[Piece] { &self.pieces }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |p| p.color == color)
    }

    pub fn occupancy(&self) -> Occupancy {
        let mut grid = [[None; 8]; 8];
        for piece in &self.pieces {
            grid[piece.square.row as usize][piece.square.col as usize] = Some(*piece);
        }
        Occupancy { grid }
    }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.square == sq)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces.iter()
            .find(|p| p.kind == PieceType::King && p.color == color)
            .map(|p| p.square)
    }

    /// Removes and returns the piece on `sq`, if any.
    pub fn remove_at(&mut self, sq: Square) -> Option<Piece> {
        let idx = self.pieces.iter().position(|p| p.square == sq)?;
        Some(self.pieces.remove(idx))
    }

    /// Moves the piece on `from` to `to` and flags it as moved. The caller clears `to` first.
    /// Returns the relocated piece.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.pieces.iter_mut().find(|p| p.square == from)?;
        piece.square = to;
        piece.has_moved = true;
        Some(*piece)
    }

    /// Replaces the kind of the piece on `sq`.
    pub fn set_kind(&mut self, sq: Square, kind: PieceType) -> Option<Piece> {
        let piece = self.pieces.iter_mut().find(|p| p.square == sq)?;
        piece.kind = kind;
        Some(*piece)
    }

    /// A copy of this position with whatever stood on `to` removed and the piece on `from`
    /// placed on `to`. Used only to test king safety; special-move side effects are ignored.
    pub fn with_relocation(&self, from: Square, to: Square) -> Position {
        let pieces = self.pieces.iter()
            .filter(|p| p.square != to)
            .map(|p| if p.square == from { Piece { square: to, ..*p } } else { *p })
            .collect();
        Position { pieces }
    }

    /// Canonical text form used for repetition detection: one `<kind><color><row><col>` token per
    /// piece, sorted. Castling and en-passant rights are not part of the key.
    pub fn canonical_key(&self) -> String {
        let mut tokens: Vec<String> = self.pieces.iter()
            .map(|p| {
                let color = match p.color { Color::White => 'w', Color::Black => 'b' };
                format!("{}{}{}{}", p.kind.letter(), color, p.square.row, p.square.col)
            })
            .collect();
        tokens.sort();
        tokens.concat()
    }
}

fn is_home_square(kind: PieceType, color: Color, sq: Square) -> bool {
    match kind {
        PieceType::King => sq == Square::new(color.back_row(), 4),
        PieceType::Rook => sq.row == color.back_row() && (sq.col == 0 || sq.col == 7),
        PieceType::Pawn => sq.row == color.pawn_start_row(),
        _ => false,
    }
}

impl Default for Position {
    fn default() -> Self { Position::standard() }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupancy = self.occupancy();
        writeln!(f, "    0 1 2 3 4 5 6 7")?;
        writeln!(f, "  +-----------------+")?;
        for row in 0..8u8 {
            write!(f, "{} | ", row)?;
            for col in 0..8u8 {
                match occupancy.get(Square::new(row, col)) {
                    Some(piece) => write!(f, "{} ", piece)?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "  +-----------------+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_setup_is_valid() {
        let pos = Position::standard();
        assert_eq!(pos.pieces().len(), 32);
        assert!(pos.validate().is_ok());
        assert_eq!(pos.king_square(Color::White), Some(Square::new(7, 4)));
        assert_eq!(pos.king_square(Color::Black), Some(Square::new(0, 4)));
        assert!(pos.pieces().iter().all(|p| !p.has_moved));
    }

    #[test]
    fn overlapping_pieces_are_rejected() {
        let sq = Square::new(4, 4);
        let result = Position::from_pieces(vec![
            Piece::new(PieceType::King, Color::White, Square::new(7, 4)),
            Piece::new(PieceType::King, Color::Black, Square::new(0, 4)),
            Piece::new(PieceType::Rook, Color::White, sq),
            Piece::new(PieceType::Knight, Color::Black, sq),
        ]);
        assert_eq!(result, Err(InvariantViolation::SquareOccupiedTwice(sq)));
    }

    #[test]
    fn missing_king_is_rejected() {
        let result = Position::from_pieces(vec![
            Piece::new(PieceType::King, Color::White, Square::new(7, 4)),
        ]);
        assert_eq!(result, Err(InvariantViolation::MissingKing(Color::Black)));
    }

    #[test]
    fn diagram_parsing_marks_displaced_pieces_as_moved() {
        let pos = Position::from_diagram(
            "....k...
             ........
             ........
             ........
             ...R....
             ........
             P.......
             R...K..R",
        ).unwrap();
        assert!(!pos.piece_at(Square::new(7, 0)).unwrap().has_moved);
        assert!(!pos.piece_at(Square::new(7, 4)).unwrap().has_moved);
        assert!(!pos.piece_at(Square::new(6, 0)).unwrap().has_moved);
        assert!(pos.piece_at(Square::new(4, 3)).unwrap().has_moved);
    }

    #[test]
    fn canonical_key_ignores_piece_order() {
        let a = Position::from_diagram(
            "....k...\n........\n........\n........\n........\n........\n........\n....K..R",
        ).unwrap();
        let mut pieces: Vec<Piece> = a.pieces().to_vec();
        pieces.reverse();
        let b = Position::from_pieces(pieces).unwrap();
        assert_eq!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn canonical_key_distinguishes_knight_from_king() {
        let with_knight = Position::from_diagram(
            "....k...\n........\n........\n........\n........\n.....N..\n........\n....K...",
        ).unwrap();
        assert!(with_knight.canonical_key().contains("nw55"));
        assert!(with_knight.canonical_key().contains("kw74"));
    }

    #[test]
    fn relocation_copy_does_not_touch_original() {
        let pos = Position::standard();
        let moved = pos.with_relocation(Square::new(6, 4), Square::new(4, 4));
        assert!(pos.piece_at(Square::new(6, 4)).is_some());
        assert!(moved.piece_at(Square::new(6, 4)).is_none());
        assert_eq!(moved.piece_at(Square::new(4, 4)).map(|p| p.kind), Some(PieceType::Pawn));
    }
}
