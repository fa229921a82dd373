//! Chess engine core for generating and checking mate puzzles.
//!
//! - [`Position`]: board state with reversible moves, FEN in and out
//! - [`Position::get_possible_moves`]: legal move generation (no castling)
//! - [`Engine`]: alpha-beta search over a transposition cache
//! - [`generate_puzzle_by_playing`]: self-play puzzle generator
//!
//! ```no_run
//! use mate_puzzles::{Engine, generate_puzzle_by_playing};
//!
//! let mut engine = Engine::default();
//! let mut puzzle = generate_puzzle_by_playing(&mut engine, 2, Some("demo")).unwrap();
//! println!("{puzzle}");
//! for mv in puzzle.get_possible_moves() {
//!     if engine.is_solution(&mut puzzle, mv) {
//!         println!("solution: {}", mv.long());
//!     }
//! }
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod puzzle;
pub mod search;
pub mod square;
pub mod transposition;
pub mod zobrist;

pub use board::{Played, Position, START_FEN};
pub use config::{EngineConfig, PieceValues};
pub use error::{ConfigError, PositionError, PuzzleError};
pub use moves::{Move, Special};
pub use piece::{Color, Piece, PieceKind};
pub use puzzle::{generate_puzzle_by_playing, generate_puzzle_from};
pub use search::{Engine, MateSearch};
pub use square::{Square, SquareSet};
pub use transposition::TranspositionTable;
