//! Mate puzzle generation by self-play.
//!
//! The engine plays against itself at `min_depth` until a forced mate comes
//! into view, then walks the game backwards while deeper searches still
//! confirm the mate, and finally steps forward again to the requested mate
//! distance. The puzzle is returned with the mating side to move.

use crate::board::Position;
use crate::error::PuzzleError;
use crate::moves::Move;
use crate::search::Engine;
use tracing::{debug, info};

/// Generates a mate-in-`target_moves` puzzle (or the longest mate found,
/// if shorter) from the standard starting position.
///
/// With `Some(seed)` the engine cache is cleared and the random source
/// reseeded first, so the same seed always yields the same puzzle.
pub fn generate_puzzle_by_playing(
    engine: &mut Engine,
    target_moves: i32,
    seed: Option<&str>,
) -> Result<Position, PuzzleError> {
    generate_puzzle_from(engine, &Position::start(), target_moves, seed)
}

/// Same as [`generate_puzzle_by_playing`] but self-play starts (and
/// restarts) from `start`. Moves already in `start`'s history can be taken
/// back while reinforcing.
pub fn generate_puzzle_from(
    engine: &mut Engine,
    start: &Position,
    target_moves: i32,
    seed: Option<&str>,
) -> Result<Position, PuzzleError> {
    if target_moves < 1 {
        return Err(PuzzleError::InvalidTarget { target_moves });
    }
    if let Some(seed) = seed {
        engine.reseed(seed);
    }
    info!(target_moves, seed, start = %start.fen(), "generating puzzle");

    let mut pos = self_play(engine, start)?;
    let longest = reinforce(engine, &mut pos, target_moves);

    let min_depth = engine.config().min_depth;
    let eval = engine.evaluate(&mut pos, min_depth);
    // even distance: the side being mated is to move
    if eval.abs() % 2 == 0 {
        engine.play_random_best(&mut pos, min_depth);
    }

    let eval = engine.evaluate(&mut pos, min_depth);
    info!(
        fen = %pos.fen(),
        mate_in = engine.config().moves_to_mate(eval),
        longest,
        "puzzle generated"
    );
    Ok(pos)
}

/// Plays best moves until a shallow search sees a forced mate.
fn self_play(engine: &mut Engine, start: &Position) -> Result<Position, PuzzleError> {
    let config = engine.config().clone();
    let mut pos = start.clone();
    let mut plies = 0usize;
    let mut restarts = 0u32;

    while engine.evaluate(&mut pos, config.min_depth).abs() < config.mate_threshold {
        if plies > config.restart_after_plies || pos.get_possible_moves().is_empty() {
            restarts += 1;
            if restarts > config.max_restarts {
                return Err(PuzzleError::NoMateFound {
                    restarts: config.max_restarts,
                });
            }
            debug!(plies, restarts, "self-play stalled, restarting");
            pos = start.clone();
            plies = 0;
            continue;
        }
        engine.play_random_best(&mut pos, config.min_depth);
        plies += 1;
    }
    debug!(plies, restarts, fen = %pos.fen(), "forced mate in view");
    Ok(pos)
}

/// Takes moves back while the mate still holds, then replays them until the
/// mate distance is `target_moves` or the longest confirmed one. Returns the
/// longest confirmed distance.
fn reinforce(engine: &mut Engine, pos: &mut Position, target_moves: i32) -> i32 {
    let config = engine.config().clone();
    let mut longest = 0;
    let mut undone: Vec<Move> = Vec::new();
    let mut depth = config.min_depth;

    while engine.iter_evaluate(pos, depth).abs() > config.mate_threshold {
        let to_mate = config.moves_to_mate(engine.evaluate(pos, config.min_depth));
        longest = longest.max(to_mate);
        if to_mate == target_moves {
            break;
        }
        if pos.history().is_empty() {
            break;
        }
        undone.push(pos.undo_move());
        if depth < config.max_depth {
            depth += 1;
        }
        debug!(to_mate, depth, undone = undone.len(), "took back a move");
    }

    // the horizon ran out, not the mate
    if engine.evaluate(pos, config.min_depth).abs() < config.mate_threshold {
        if let Some(mv) = undone.pop() {
            pos.perform_move(mv);
        }
    }

    let goal = target_moves.min(longest);
    while config.moves_to_mate(engine.evaluate(pos, config.min_depth)) > goal {
        let Some(mv) = undone.pop() else {
            break;
        };
        pos.perform_move(mv);
    }
    longest
}
