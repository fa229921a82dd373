//! Alpha-beta search with a transposition cache.
//!
//! Scores are always from white's point of view: positive favours white.
//! A position where the side to move is mated scores `-side * mate`, and
//! every ply between the root and that mate moves the score one step toward
//! zero, so `mate - |score|` is the number of plies to mate. Material scores
//! stay well below `mate_threshold` and are never adjusted.

use crate::board::Position;
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::moves::Move;
use crate::piece::Color;
use crate::transposition::{EXACT_DEPTH, ProbeResult, TranspositionTable};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::trace;

/// Outcome of [`Engine::find_fastest_mate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MateSearch {
    Mate { winner: Color, moves: i32 },
    Unknown,
}

impl MateSearch {
    pub fn moves(&self) -> Option<i32> {
        match self {
            MateSearch::Mate { moves, .. } => Some(*moves),
            MateSearch::Unknown => None,
        }
    }
}

impl fmt::Display for MateSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MateSearch::Mate { winner, moves } => write!(f, "{winner} mates in {moves}"),
            MateSearch::Unknown => f.write_str("Unknown result"),
        }
    }
}

/// Search state: tunables, the transposition cache and the random source
/// used to break ties between equally good moves.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    cache: TranspositionTable,
    rng: StdRng,
}

impl Default for Engine {
    fn default() -> Self {
        Engine {
            config: EngineConfig::default(),
            cache: TranspositionTable::new(),
            rng: StdRng::from_entropy(),
        }
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Engine, ConfigError> {
        config.validate()?;
        Ok(Engine {
            config,
            ..Engine::default()
        })
    }

    /// Default engine with a fixed random seed.
    pub fn with_seed(seed: u64) -> Engine {
        Engine {
            rng: StdRng::seed_from_u64(seed),
            ..Engine::default()
        }
    }

    /// Clears the cache and reseeds the random source from `seed`, so the
    /// same text always replays the same choices.
    pub fn reseed(&mut self, seed: &str) {
        self.cache.clear();
        self.rng = StdRng::seed_from_u64(seed_from_text(seed));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &TranspositionTable {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TranspositionTable {
        &mut self.cache
    }

    /// Signed material sum of every piece on the board.
    pub fn material(&self, pos: &Position) -> i32 {
        pos.pieces().map(|(piece, _)| self.config.piece_value(piece)).sum()
    }

    /// Evaluates `pos` searching `depth` plies with a full window.
    pub fn evaluate(&mut self, pos: &mut Position, depth: i32) -> i32 {
        let mate = self.config.mate;
        self.evaluate_window(pos, depth, -mate, mate)
    }

    /// Negamax with alpha-beta pruning. `alpha` and `beta` are from the
    /// point of view of the side to move; the result is from white's.
    ///
    /// Only fully searched nodes are cached. A node cut off by `beta`
    /// returns a bound that is never stored.
    pub fn evaluate_window(
        &mut self,
        pos: &mut Position,
        depth: i32,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        let key = pos.hash();
        if let ProbeResult::Usable(score) = self.cache.probe(key, depth) {
            return score;
        }

        let moves = pos.get_possible_moves();
        let side = pos.side_to_move().sign();
        if moves.is_empty() {
            let score = if pos.in_check() { -side * self.config.mate } else { 0 };
            self.cache.store(key, EXACT_DEPTH, score);
            return score;
        }
        // bare kings
        if pos.piece_count() <= 2 {
            self.cache.store(key, EXACT_DEPTH, 0);
            return 0;
        }
        if depth <= 0 {
            let score = self.material(pos);
            self.cache.store(key, depth, score);
            return score;
        }

        // Order by what the cache already knows about each child, best first
        // for the side to move. Stable, so unknown children keep generation order.
        let mut ordered: Vec<(i32, Move)> = moves
            .into_iter()
            .map(|mv| {
                let child = pos.play(mv);
                (self.cache.guess(child.hash()) * side, mv)
            })
            .collect();
        ordered.sort_by(|a, b| b.0.cmp(&a.0));

        let mut best = -self.config.mate;
        for (_, mv) in ordered {
            let score = {
                let mut child = pos.play(mv);
                self.evaluate_window(&mut child, depth - 1, -beta, -alpha) * side
            };
            if score > best {
                best = score;
                if best > alpha {
                    alpha = best;
                }
            }
            let aged = self.config.age_score(best);
            if aged >= beta {
                return aged * side;
            }
        }

        let stored_depth = if self.config.is_mate_score(best) {
            EXACT_DEPTH
        } else {
            depth
        };
        let score = self.config.age_score(best) * side;
        self.cache.store(key, stored_depth, score);
        score
    }

    /// Evaluates at depths `1..=depth` in turn, seeding move ordering for
    /// each pass with the one before, then returns the `depth` result.
    pub fn iter_evaluate(&mut self, pos: &mut Position, depth: i32) -> i32 {
        for d in 1..=depth {
            self.evaluate(pos, d);
        }
        self.evaluate(pos, depth)
    }

    /// Looks for a forced mate within `max_moves` full moves, trying the
    /// shallowest depth first.
    pub fn find_fastest_mate(&mut self, pos: &mut Position, max_moves: i32) -> MateSearch {
        for round in 0..max_moves {
            let score = self.evaluate(pos, 2 * round);
            if score.abs() > self.config.mate_threshold {
                let winner = if score > 0 { Color::White } else { Color::Black };
                return MateSearch::Mate {
                    winner,
                    moves: self.config.moves_to_mate(score),
                };
            }
        }
        MateSearch::Unknown
    }

    /// Plays one of the best moves at `depth`, picked at random among equals.
    /// Returns `None` without touching the position when there is no legal
    /// move.
    ///
    /// Panics if no move reproduces the root evaluation, which would mean
    /// the cache is inconsistent.
    pub fn play_random_best(&mut self, pos: &mut Position, depth: i32) -> Option<Move> {
        let mut moves = pos.get_possible_moves();
        if moves.is_empty() {
            return None;
        }
        moves.shuffle(&mut self.rng);

        // the root may hold a deeper score from an earlier search
        self.cache.remove(pos.hash());
        let target = self.iter_evaluate(pos, depth);

        for mv in moves {
            let mut child = pos.play(mv);
            let score = self.iter_evaluate(&mut child, depth - 1);
            if self.config.age_score(score) == target {
                child.keep();
                trace!(%mv, target, depth, "played best move");
                return Some(mv);
            }
        }
        panic!(
            "no move reproduces evaluation {target} at depth {depth} in {}",
            pos.fen()
        );
    }

    /// Whether `mv`, a legal move in `pos`, keeps the evaluation of `pos`.
    /// For a forced mate that means it mates as fast as possible.
    pub fn is_solution(&mut self, pos: &mut Position, mv: Move) -> bool {
        let eval = self.evaluate(pos, self.config.min_depth);
        let depth = if self.config.is_mate_score(eval) {
            self.config.mate - eval.abs() - 1
        } else {
            self.config.max_depth - 1
        };
        let mut child = pos.play(mv);
        let score = self.iter_evaluate(&mut child, depth);
        self.config.age_score(score) == eval
    }
}

fn seed_from_text(seed: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATE: i32 = 1_000_000;

    fn fen(s: &str) -> Position {
        Position::from_fen(s).unwrap()
    }

    #[test]
    fn mated_side_scores_full_mate() {
        let mut engine = Engine::with_seed(1);
        let mut black_mated = fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert_eq!(engine.evaluate(&mut black_mated, 3), MATE);

        let mut white_mated = fen("6k1/8/8/8/8/8/5PPP/r5K1 w - - 0 1");
        assert_eq!(engine.evaluate(&mut white_mated, 0), -MATE);
    }

    #[test]
    fn stalemate_and_bare_kings_are_draws() {
        let mut engine = Engine::with_seed(1);
        let mut stalemate = fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(engine.evaluate(&mut stalemate, 4), 0);

        let mut kings = fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        for depth in 0..4 {
            assert_eq!(engine.evaluate(&mut kings, depth), 0, "depth {depth}");
        }
    }

    #[test]
    fn depth_zero_counts_material() {
        let mut engine = Engine::with_seed(1);
        let mut pos = fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        assert_eq!(engine.evaluate(&mut pos, 0), 2);
        assert_eq!(engine.material(&pos), 2);
    }

    #[test]
    fn finds_mate_in_one() {
        let mut engine = Engine::with_seed(1);
        let mut pos = fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        assert_eq!(engine.evaluate(&mut pos, 1), MATE - 1);
        assert_eq!(
            engine.find_fastest_mate(&mut pos, 3),
            MateSearch::Mate { winner: Color::White, moves: 1 }
        );
        assert_eq!(engine.find_fastest_mate(&mut pos, 3).to_string(), "White mates in 1");

        let mut black = fen("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1");
        assert_eq!(
            engine.find_fastest_mate(&mut black, 2).to_string(),
            "Black mates in 1"
        );
    }

    #[test]
    fn no_mate_in_start_position() {
        let mut engine = Engine::with_seed(1);
        let mut pos = Position::start();
        assert_eq!(engine.find_fastest_mate(&mut pos, 1), MateSearch::Unknown);
        assert_eq!(MateSearch::Unknown.to_string(), "Unknown result");
    }

    #[test]
    fn search_leaves_position_untouched() {
        let mut engine = Engine::with_seed(1);
        let mut pos = fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w - - 0 1");
        let before = pos.clone();
        engine.iter_evaluate(&mut pos, 2);
        assert_eq!(pos, before);
        assert!(engine.cache().len() > 1);
    }

    #[test]
    fn random_best_plays_the_mate() {
        let mut engine = Engine::with_seed(7);
        let mut pos = fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let mv = engine.play_random_best(&mut pos, 2).unwrap();
        assert_eq!(mv.long(), "Ra1-a8");
        assert_eq!(pos.history().len(), 1);
        assert!(pos.get_possible_moves().is_empty());
        assert!(pos.in_check());

        assert_eq!(engine.play_random_best(&mut pos, 2), None);
        assert_eq!(pos.history().len(), 1);
    }

    #[test]
    fn same_seed_same_choice() {
        let mut a = Engine::default();
        let mut b = Engine::default();
        a.reseed("opening");
        b.reseed("opening");
        let mut pos_a = Position::start();
        let mut pos_b = Position::start();
        for _ in 0..4 {
            let ma = a.play_random_best(&mut pos_a, 1);
            let mb = b.play_random_best(&mut pos_b, 1);
            assert_eq!(ma, mb);
        }
        assert_eq!(pos_a.fen(), pos_b.fen());
    }

    #[test]
    fn solution_check_accepts_only_fastest_mate() {
        let mut engine = Engine::with_seed(1);
        let mut pos = fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let mate = pos.find_long_move("Ra1-a8").unwrap();
        let quiet = pos.find_long_move("Ra1-b1").unwrap();
        assert!(engine.is_solution(&mut pos, mate));
        assert!(!engine.is_solution(&mut pos, quiet));
        assert!(pos.history().is_empty());
    }

    #[test]
    fn reseed_clears_cache() {
        let mut engine = Engine::with_seed(1);
        let mut pos = Position::start();
        engine.evaluate(&mut pos, 1);
        assert!(!engine.cache().is_empty());
        engine.reseed("x");
        assert!(engine.cache().is_empty());
        assert_eq!(seed_from_text("x"), seed_from_text("x"));
        assert_ne!(seed_from_text("x"), seed_from_text("y"));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            min_depth: 0,
            ..EngineConfig::default()
        };
        assert!(Engine::new(config).is_err());
    }
}
