//! Rules engine for chess: move generation, check detection, draw rules and the turn-based
//! state machine that applies moves.
//!
//! Rows run 0..8 from black's back rank to white's, so white pawns advance toward row 0.

pub mod check;
pub mod clock;
pub mod config;
pub mod draw;
pub mod error;
pub mod game;
pub mod movegen;
pub mod position;
pub mod types;

pub use check::{is_checkmate, is_in_check, is_in_check_after_move, is_stalemate};
pub use clock::{Clock, GameMode};
pub use config::{AutoDrawRules, CastlingRule, EnPassantRule, GameConfig, MoveRules};
pub use draw::HistoryEntry;
pub use error::{ConfigError, GameError, InvariantViolation};
pub use game::{
    transition, CaptureRecord, Command, DrawReason, GameEvent, GameResult, GameState, Phase,
    Snapshot, WinReason,
};
pub use movegen::{legal_moves, pseudo_legal_moves};
pub use position::Position;
pub use types::{Color, Piece, PieceType, Square};
