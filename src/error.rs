//! Error types for malformed input.
//!
//! Only recoverable failures live here. Broken internal invariants (undoing
//! with an empty history, a move whose piece is not where it claims to be)
//! panic at the point of detection instead.

/// Malformed square, FEN or piece-list text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// Column or row outside `0..8`
    #[error("invalid square coordinates ({col}, {row})")]
    InvalidCoordinates { col: i32, row: i32 },

    /// Text that does not follow the expected notation
    #[error("invalid notation `{input}`: {reason}")]
    InvalidNotation { input: String, reason: String },
}

impl PositionError {
    pub(crate) fn notation(input: &str, reason: impl Into<String>) -> Self {
        PositionError::InvalidNotation {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Rejected engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid engine config: {0}")]
    Invalid(String),
}

/// Puzzle generation gave up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PuzzleError {
    /// Self-play restarted `restarts` times without a forced mate coming into view
    #[error("no forced mate found after {restarts} self-play restarts")]
    NoMateFound { restarts: u32 },

    /// Requested mate distance below one move
    #[error("puzzle target must be at least one move, got {target_moves}")]
    InvalidTarget { target_moves: i32 },
}

/// Result type alias for position construction
pub type PositionResult<T> = Result<T, PositionError>;
