// Zobrist keys for the position hash
//
// - One key per (square, piece), per en-passant square, and for side to move
// - Keys come from a seeded StdRng so hashes are stable within a build
// - Process-wide instance behind a OnceLock (see `Zobrist::global`)
// - The placement part is updated incrementally by the board; side and
//   en-passant keys are folded in when the hash is read

use crate::board::Position;
use crate::piece::{Color, Piece};
use crate::square::Square;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

const DEFAULT_SEED: u64 = 2024;

#[derive(Clone, Debug)]
pub struct Zobrist {
    // Piece placement keys: [square][piece index]
    pub pieces: [[u64; 12]; 64],

    // XOR-ed in when black is to move
    pub side: u64,

    pub ep_square: [u64; 64],

    seed: u64,
}

impl Zobrist {
    /// Create a new Zobrist instance with the default seed
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut pieces = [[0u64; 12]; 64];
        for square in pieces.iter_mut() {
            for key in square.iter_mut() {
                *key = rng.r#gen();
            }
        }

        let mut ep_square = [0u64; 64];
        for key in ep_square.iter_mut() {
            *key = rng.r#gen();
        }

        let side = rng.r#gen();

        Self {
            pieces,
            side,
            ep_square,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn piece_key(&self, piece: Piece, sq: Square) -> u64 {
        self.pieces[sq.index()][piece.index()]
    }

    /// Side and en-passant contribution, combined with the placement hash.
    #[inline]
    pub fn state_key(&self, side: Color, ep: Option<Square>) -> u64 {
        let mut h = 0u64;
        if side == Color::Black {
            h ^= self.side;
        }
        if let Some(ep) = ep {
            h ^= self.ep_square[ep.index()];
        }
        h
    }

    /// Full hash from scratch. Must agree with `Position::hash`.
    pub fn hash_position(&self, pos: &Position) -> u64 {
        let mut h = 0u64;
        for (piece, sq) in pos.pieces() {
            h ^= self.piece_key(piece, sq);
        }
        h ^ self.state_key(pos.side_to_move(), pos.en_passant())
    }
}

impl Default for Zobrist {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_ZOBRIST: OnceLock<Zobrist> = OnceLock::new();

impl Zobrist {
    /// Keys shared by every position in the process.
    pub fn global() -> &'static Zobrist {
        GLOBAL_ZOBRIST.get_or_init(Zobrist::new)
    }
}
