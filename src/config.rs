//! Engine tunables.
//!
//! Built once, validated, then owned by the [`Engine`](crate::search::Engine).
//! Can be loaded from TOML; missing keys fall back to the defaults:
//!
//! ```toml
//! max_depth = 4
//!
//! [piece_values]
//! queen = 10
//! ```

use crate::error::ConfigError;
use crate::piece::{Piece, PieceKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceValues {
    pub king: i32,
    pub queen: i32,
    pub rook: i32,
    pub bishop: i32,
    pub knight: i32,
    pub pawn: i32,
}

impl Default for PieceValues {
    fn default() -> Self {
        Self {
            king: 1000,
            queen: 9,
            rook: 5,
            bishop: 3,
            knight: 3,
            pawn: 1,
        }
    }
}

impl PieceValues {
    pub fn of_kind(&self, kind: PieceKind) -> i32 {
        match kind {
            PieceKind::King => self.king,
            PieceKind::Queen => self.queen,
            PieceKind::Rook => self.rook,
            PieceKind::Bishop => self.bishop,
            PieceKind::Knight => self.knight,
            PieceKind::Pawn => self.pawn,
        }
    }

    /// Largest material lead one side can reach: its queen, two rooks, two
    /// bishops, two knights and eight pawns each promoted to the most valuable
    /// kind. Kings cancel out.
    fn max_side_material(&self) -> i32 {
        let best_pawn = self
            .pawn
            .max(self.queen)
            .max(self.rook)
            .max(self.bishop)
            .max(self.knight);
        self.queen + 2 * (self.rook + self.bishop + self.knight) + 8 * best_pawn
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub piece_values: PieceValues,
    /// Score of a mate on the board (mate in 0 plies)
    pub mate: i32,
    /// Scores at or beyond this magnitude mean forced mate, not material
    pub mate_threshold: i32,
    /// Shallow search depth used for self-play and quick checks
    pub min_depth: i32,
    /// Deepest search used while reinforcing a puzzle
    pub max_depth: i32,
    /// Self-play games longer than this many plies are restarted
    pub restart_after_plies: usize,
    /// Self-play restarts before puzzle generation gives up
    pub max_restarts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            piece_values: PieceValues::default(),
            mate: 1_000_000,
            mate_threshold: 2000,
            min_depth: 2,
            max_depth: 5,
            restart_after_plies: 150,
            max_restarts: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let material = self.piece_values.max_side_material();
        if self.mate_threshold <= material {
            return Err(ConfigError::Invalid(format!(
                "mate_threshold {} must exceed the largest material sum {}",
                self.mate_threshold, material
            )));
        }
        if self.mate <= self.mate_threshold {
            return Err(ConfigError::Invalid(format!(
                "mate {} must exceed mate_threshold {}",
                self.mate, self.mate_threshold
            )));
        }
        if self.min_depth < 1 {
            return Err(ConfigError::Invalid("min_depth must be at least 1".into()));
        }
        if self.max_depth < self.min_depth {
            return Err(ConfigError::Invalid(format!(
                "max_depth {} is below min_depth {}",
                self.max_depth, self.min_depth
            )));
        }
        Ok(())
    }

    /// Material value of `piece`, positive for white, negative for black.
    pub fn piece_value(&self, piece: Piece) -> i32 {
        piece.color().sign() * self.piece_values.of_kind(piece.kind())
    }

    pub fn is_mate_score(&self, score: i32) -> bool {
        score.abs() >= self.mate_threshold
    }

    /// Moves one ply of mate distance off a score: mate scores shrink toward
    /// zero by one, material scores are unchanged.
    pub fn age_score(&self, score: i32) -> i32 {
        if score.abs() < self.mate_threshold {
            score
        } else if score > 0 {
            score - 1
        } else {
            score + 1
        }
    }

    /// Full moves until mate for a mate score.
    pub fn moves_to_mate(&self, score: i32) -> i32 {
        (self.mate - score.abs() + 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.piece_value(Piece::BQ), -9);
        assert_eq!(config.piece_value(Piece::WK), 1000);
    }

    #[test]
    fn toml_overrides_some_fields() {
        let config = EngineConfig::from_toml_str(
            "max_depth = 4\n\n[piece_values]\nqueen = 10\n",
        )
        .unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.min_depth, 2);
        assert_eq!(config.piece_values.queen, 10);
        assert_eq!(config.piece_values.rook, 5);
    }

    #[test]
    fn rejects_inconsistent_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("mate_threshold = 100"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("min_depth = 3\nmax_depth = 2"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("max_depth = \"deep\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn threshold_covers_promoted_material() {
        // ten rooks of 200 reach 2000
        assert!(matches!(
            EngineConfig::from_toml_str("[piece_values]\nrook = 200"),
            Err(ConfigError::Invalid(_))
        ));
        let config = EngineConfig::default();
        assert_eq!(config.piece_values.max_side_material(), 103);
        // a huge king alone does not push the bound
        assert!(EngineConfig::from_toml_str("[piece_values]\nking = 5000").is_ok());
    }

    #[test]
    fn mate_scores_age_toward_zero() {
        let config = EngineConfig::default();
        assert_eq!(config.age_score(1_000_000), 999_999);
        assert_eq!(config.age_score(-1_000_000), -999_999);
        assert_eq!(config.age_score(14), 14);
        assert_eq!(config.age_score(-1999), -1999);
        assert_eq!(config.moves_to_mate(999_999), 1);
        assert_eq!(config.moves_to_mate(-999_998), 1);
        assert_eq!(config.moves_to_mate(999_995), 3);
    }
}
