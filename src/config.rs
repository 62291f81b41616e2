use crate::clock::GameMode;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How castling legality is judged.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CastlingRule {
    /// King and rook unmoved and the squares between them empty. Whether the king is in check
    /// or crosses an attacked square is not considered.
    #[default]
    Permissive,
    /// Additionally requires the king not to be in check and the two squares it crosses and
    /// lands on not to be attacked.
    Strict,
}

/// How the king-safety check treats an en-passant capture.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnPassantRule {
    /// Only the capturing pawn is relocated when testing king safety; the captured pawn stays on
    /// the board, so a capture that opens a row onto the mover's king is allowed.
    #[default]
    Permissive,
    /// The captured pawn is removed as well before testing king safety.
    Strict,
}

/// The rule switches move generation and the terminal classifier need.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MoveRules {
    pub castling: CastlingRule,
    pub en_passant: EnPassantRule,
}

impl MoveRules {
    pub const STRICT: MoveRules = MoveRules { castling: CastlingRule::Strict, en_passant: EnPassantRule::Strict };
}

/// Draw rules that end the game automatically after a ply. The fifty-move rule always does;
/// these are off unless switched on.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AutoDrawRules {
    pub insufficient_material: bool,
    pub threefold_repetition: bool,
    pub perpetual_check: bool,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub mode: GameMode,
    pub castling: CastlingRule,
    pub en_passant: EnPassantRule,
    pub draw_rules: AutoDrawRules,
    /// When false, elapsed time reported to the game is ignored.
    pub clock_enabled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            mode: GameMode::default(),
            castling: CastlingRule::default(),
            en_passant: EnPassantRule::default(),
            draw_rules: AutoDrawRules::default(),
            clock_enabled: true,
        }
    }
}

impl GameConfig {
    pub fn move_rules(&self) -> MoveRules {
        MoveRules { castling: self.castling, en_passant: self.en_passant }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        GameConfig::from_json_str(&json)
    }
}
