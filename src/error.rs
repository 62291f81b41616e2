use crate::types::{Color, PieceType, Square};
use std::io;
use thiserror::Error;

/// Broken board invariants. These never arise through the public game interface; seeing one
/// means a position was built or mutated incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("square {0} is occupied by more than one piece")]
    SquareOccupiedTwice(Square),

    #[error("{0} has no king on the board")]
    MissingKing(Color),

    #[error("{0} has more than one king on the board")]
    ExtraKing(Color),

    #[error("piece placed off the board at {0}")]
    OffBoard(Square),

    #[error("invalid diagram: {0}")]
    InvalidDiagram(String),
}

/// A request the state machine refused. Apart from an illegal move target clearing the current
/// selection, a rejected request leaves the game untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no piece is selected")]
    NothingSelected,

    #[error("there is no piece on {0}")]
    EmptySquare(Square),

    #[error("it is {active}'s turn, the piece on {square} belongs to {piece_color}")]
    NotYourTurn { active: Color, piece_color: Color, square: Square },

    #[error("the selected piece on {from} cannot move to {to}")]
    IllegalTarget { from: Square, to: Square },

    #[error("no promotion is pending")]
    NoPromotionPending,

    #[error("a promotion choice for the pawn on {0} is pending")]
    PromotionPending(Square),

    #[error("a pawn cannot promote to {0:?}")]
    InvalidPromotionPiece(PieceType),

    #[error("a draw can only be offered by the side to move before selecting a piece")]
    DrawOfferNotAllowed,

    #[error("waiting for {0} to answer the draw offer")]
    DrawResponsePending(Color),

    #[error("there is no draw offer to answer")]
    NoDrawOffer,

    #[error("{0} cannot answer their own draw offer")]
    NotAddressedPlayer(Color),

    #[error("the game is over")]
    GameAlreadyOver,

    #[error("board invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error with config file '{0}': {1}")]
    Io(String, #[source] io::Error),

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
