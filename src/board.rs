// =====================
// Board State
// =====================
//
// Position = placement (square -> piece, piece -> squares, placement hash)
// + side to move + en-passant target + history of applied moves.
//
// perform_move / undo_move are exact inverses for every move produced by
// the move generator on the current position.

use crate::error::{PositionError, PositionResult};
use crate::moves::{Move, Special};
use crate::piece::{Color, Piece, PieceKind};
use crate::square::{Square, SquareSet};
use crate::zobrist::Zobrist;
use std::fmt;
use std::ops::{Deref, DerefMut};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";

/// Both views of the piece placement plus their hash. Every change goes
/// through `put`/`take`, which update all three together.
#[derive(Clone, PartialEq, Eq, Debug)]
struct Placement {
    cells: [Option<Piece>; 64],
    locations: [SquareSet; 12],
    hash: u64,
}

impl Placement {
    fn empty() -> Placement {
        Placement {
            cells: [None; 64],
            locations: [SquareSet::EMPTY; 12],
            hash: 0,
        }
    }

    fn put(&mut self, sq: Square, piece: Piece) {
        if let Some(existing) = self.cells[sq.index()] {
            panic!("cannot place {piece} on {sq}: already occupied by {existing}");
        }
        self.cells[sq.index()] = Some(piece);
        self.locations[piece.index()].insert(sq);
        self.hash ^= Zobrist::global().piece_key(piece, sq);
    }

    fn take(&mut self, sq: Square, expected: Piece) -> Piece {
        if self.cells[sq.index()] != Some(expected) {
            panic!(
                "{expected} not found on {sq} (found {:?}): position and move are out of sync",
                self.cells[sq.index()]
            );
        }
        self.cells[sq.index()] = None;
        self.locations[expected.index()].remove(sq);
        self.hash ^= Zobrist::global().piece_key(expected, sq);
        expected
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Position {
    placement: Placement,
    side_to_move: Color,
    en_passant: Option<Square>,
    history: Vec<Move>,
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl Position {
    /// The standard starting position.
    pub fn start() -> Position {
        let mut pos = Position {
            placement: Placement::empty(),
            side_to_move: Color::White,
            en_passant: None,
            history: Vec::new(),
        };
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (col, kind) in BACK_RANK.iter().enumerate() {
            let col = col as i32;
            for (color, back, pawns) in [(Color::Black, 0, 1), (Color::White, 7, 6)] {
                pos.placement
                    .put(Square::from_index((col + 8 * back) as usize), Piece::new(color, *kind));
                pos.placement.put(
                    Square::from_index((col + 8 * pawns) as usize),
                    Piece::new(color, PieceKind::Pawn),
                );
            }
        }
        pos
    }

    /// Parses FEN. Board, side to move and en-passant fields are used;
    /// castling and move counters are accepted and ignored.
    pub fn from_fen(fen: &str) -> PositionResult<Position> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(PositionError::notation(
                fen,
                "expected at least piece placement and side to move",
            ));
        }

        let mut cells = [None; 64];
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(PositionError::notation(fen, "expected 8 ranks"));
        }
        for (row, rank_str) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(PositionError::notation(fen, "bad empty-square count"));
                    }
                    col += skip as usize;
                } else {
                    let Some(piece) = Piece::from_char(ch) else {
                        return Err(PositionError::notation(fen, format!("unknown piece `{ch}`")));
                    };
                    if col >= 8 {
                        return Err(PositionError::notation(fen, "rank longer than 8 squares"));
                    }
                    cells[col + 8 * row] = Some(piece);
                    col += 1;
                }
                if col > 8 {
                    return Err(PositionError::notation(fen, "rank longer than 8 squares"));
                }
            }
            if col != 8 {
                return Err(PositionError::notation(fen, "rank shorter than 8 squares"));
            }
        }

        let side = match parts[1].chars().collect::<Vec<_>>().as_slice() {
            [c] => Color::from_fen_char(*c),
            _ => None,
        };
        let Some(side) = side else {
            return Err(PositionError::notation(fen, "side to move must be `w` or `b`"));
        };

        // parts[2] is castling availability (not modeled)
        let ep = match parts.get(3) {
            None | Some(&"-") => None,
            Some(text) => Some(text.parse::<Square>()?),
        };

        let pieces = Square::all().filter_map(|sq| cells[sq.index()].map(|p| (p, sq)));
        Position::from_parts(pieces, side, ep, fen)
    }

    /// Builds a position from piece lists such as `["Re7", "Kf5", "e4"]`.
    /// A two-character entry is a pawn; otherwise the first letter names
    /// the piece (case ignored, color comes from the list).
    pub fn from_pieces(
        white: &[&str],
        black: &[&str],
        to_move: Color,
        en_passant: Option<&str>,
    ) -> PositionResult<Position> {
        let mut pieces = Vec::with_capacity(white.len() + black.len());
        for (color, list) in [(Color::White, white), (Color::Black, black)] {
            for entry in list.iter() {
                pieces.push(parse_piece_entry(entry, color)?);
            }
        }
        let ep = en_passant.map(str::parse::<Square>).transpose()?;
        let label = format!("{white:?} / {black:?}");
        Position::from_parts(pieces.into_iter(), to_move, ep, &label)
    }

    fn from_parts(
        pieces: impl Iterator<Item = (Piece, Square)>,
        side_to_move: Color,
        en_passant: Option<Square>,
        input: &str,
    ) -> PositionResult<Position> {
        let mut placement = Placement::empty();
        for (piece, sq) in pieces {
            if placement.cells[sq.index()].is_some() {
                return Err(PositionError::notation(input, format!("{sq} occupied twice")));
            }
            if piece.kind() == PieceKind::Pawn && (sq.row() == 0 || sq.row() == 7) {
                return Err(PositionError::notation(input, format!("pawn on back rank {sq}")));
            }
            placement.put(sq, piece);
        }

        if let Some(ep) = en_passant {
            // white to move: black just pushed two squares, target on rank 6
            let expected_row = match side_to_move {
                Color::White => 2,
                Color::Black => 5,
            };
            let pusher = Piece::new(side_to_move.opponent(), PieceKind::Pawn);
            let pushed_to = ep.offset(0, -side_to_move.pawn_direction());
            let valid = ep.row() == expected_row
                && placement.cells[ep.index()].is_none()
                && pushed_to.is_some_and(|s| placement.cells[s.index()] == Some(pusher));
            if !valid {
                return Err(PositionError::notation(
                    input,
                    format!("en-passant square {ep} does not follow a double pawn push"),
                ));
            }
        }

        Ok(Position {
            placement,
            side_to_move,
            en_passant,
            history: Vec::new(),
        })
    }

    /// FEN of the current position. Castling is always `-` and the move
    /// counters are always `0 1`.
    pub fn fen(&self) -> String {
        let mut s = String::new();
        for row in 0..8 {
            let mut empty = 0;
            for col in 0..8 {
                match self.placement.cells[col + 8 * row] {
                    None => empty += 1,
                    Some(p) => {
                        if empty > 0 {
                            s.push_str(&empty.to_string());
                            empty = 0;
                        }
                        s.push(p.to_char());
                    }
                }
            }
            if empty > 0 {
                s.push_str(&empty.to_string());
            }
            if row < 7 {
                s.push('/');
            }
        }
        s.push(' ');
        s.push(self.side_to_move.fen_char());
        s.push_str(" - ");
        match self.en_passant {
            Some(ep) => s.push_str(&ep.to_string()),
            None => s.push('-'),
        }
        s.push_str(" 0 1");
        s
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.placement.cells[sq.index()]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Moves applied since construction, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Squares currently holding `piece`.
    pub fn squares_of(&self, piece: Piece) -> SquareSet {
        self.placement.locations[piece.index()]
    }

    /// Every piece on the board with its square, grouped by piece.
    pub fn pieces(&self) -> impl Iterator<Item = (Piece, Square)> + '_ {
        Piece::ALL
            .iter()
            .flat_map(move |&p| self.squares_of(p).map(move |sq| (p, sq)))
    }

    pub fn piece_count(&self) -> usize {
        self.placement.locations.iter().map(|set| set.len()).sum()
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.squares_of(Piece::new(color, PieceKind::King)).first()
    }

    /// 64-bit hash of placement, side to move and en-passant target.
    pub fn hash(&self) -> u64 {
        self.placement.hash ^ Zobrist::global().state_key(self.side_to_move, self.en_passant)
    }

    /// Applies a move produced by the move generator for this position.
    ///
    /// Panics when the move does not match the board (moving or captured
    /// piece missing, special flag of the wrong color).
    pub fn perform_move(&mut self, mv: Move) {
        let piece = self.placement.take(mv.from, mv.piece);
        if let Some(captured) = mv.captured {
            self.placement.take(mv.to, captured);
        }
        match mv.special {
            None => self.placement.put(mv.to, piece),
            Some(Special::Promotion(target)) => {
                if target.color() != piece.color() {
                    panic!("promotion of {piece} to {target}: colors differ");
                }
                self.placement.put(mv.to, target);
            }
            Some(Special::EnPassant(color)) => {
                if color != piece.color() {
                    panic!("en-passant marker for {color} on a {piece} move");
                }
                let Some(victim) = mv.en_passant_victim() else {
                    panic!("en-passant capture onto {} has no victim square", mv.to);
                };
                self.placement
                    .take(victim, Piece::new(color.opponent(), PieceKind::Pawn));
                self.placement.put(mv.to, piece);
            }
        }

        self.en_passant = None;
        if piece.kind() == PieceKind::Pawn && (mv.from.row() - mv.to.row()).abs() == 2 {
            self.en_passant = Some(Square::from_index((mv.from.index() + mv.to.index()) / 2));
        }
        self.side_to_move = self.side_to_move.opponent();
        self.history.push(mv);
    }

    /// Reverts the last applied move and returns it.
    ///
    /// Panics on an empty history.
    pub fn undo_move(&mut self) -> Move {
        let Some(mv) = self.history.pop() else {
            panic!("undo_move called with empty history");
        };
        let arrived = mv.promotion().unwrap_or(mv.piece);
        self.placement.take(mv.to, arrived);
        self.placement.put(mv.from, mv.piece);
        if let Some(captured) = mv.captured {
            self.placement.put(mv.to, captured);
        }
        if let Some(Special::EnPassant(color)) = mv.special {
            if color != mv.piece.color() {
                panic!("en-passant marker for {color} on a {} move", mv.piece);
            }
            if let Some(victim) = mv.en_passant_victim() {
                self.placement
                    .put(victim, Piece::new(color.opponent(), PieceKind::Pawn));
            }
        }
        self.side_to_move = self.side_to_move.opponent();
        self.en_passant = mv.prior_en_passant;
        mv
    }

    /// Applies `mv` for the lifetime of the returned guard; dropping the
    /// guard undoes it. While the guard lives the position is reachable
    /// only through it.
    pub fn play(&mut self, mv: Move) -> Played<'_> {
        self.perform_move(mv);
        Played {
            pos: self,
            keep: false,
        }
    }
}

/// A move applied through `Position::play`, undone on drop unless kept.
pub struct Played<'a> {
    pos: &'a mut Position,
    keep: bool,
}

impl Played<'_> {
    /// Leaves the move applied.
    pub fn keep(mut self) {
        self.keep = true;
    }
}

impl Deref for Played<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        &*self.pos
    }
}

impl DerefMut for Played<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        &mut *self.pos
    }
}

impl Drop for Played<'_> {
    fn drop(&mut self) {
        if !self.keep {
            self.pos.undo_move();
        }
    }
}

fn parse_piece_entry(entry: &str, color: Color) -> PositionResult<(Piece, Square)> {
    let entry = entry.trim();
    if entry.len() == 2 {
        return Ok((Piece::new(color, PieceKind::Pawn), entry.parse()?));
    }
    let mut chars = entry.chars();
    let letter = chars.next().map(|c| c.to_ascii_uppercase());
    let Some(white_piece) = letter.and_then(Piece::from_char) else {
        return Err(PositionError::notation(entry, "expected a piece letter"));
    };
    let piece = Piece::new(color, white_piece.kind());
    Ok((piece, chars.as_str().parse()?))
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f, "  +----------------+")?;
        for row in 0..8 {
            write!(f, "{} |", 8 - row)?;
            for col in 0..8 {
                let c = self.placement.cells[col + 8 * row].map_or('.', Piece::to_char);
                write!(f, "{} ", c)?;
            }
            writeln!(f, "| {}", 8 - row)?;
        }
        writeln!(f, "  +----------------+")?;
        writeln!(f, "   a b c d e f g h")?;
        match self.side_to_move {
            Color::White => writeln!(f, "white to move"),
            Color::Black => writeln!(f, "black to move"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn start_matches_start_fen() {
        let start = Position::start();
        let parsed = Position::from_fen(START_FEN).unwrap();
        assert_eq!(start, parsed);
        assert_eq!(start.fen(), START_FEN);
        assert_eq!(start.piece_count(), 32);
        assert_eq!(start.king_square(Color::White), Some(sq("e1")));
        assert_eq!(start.king_square(Color::Black), Some(sq("e8")));
    }

    #[test]
    fn fen_round_trip_keeps_board_side_and_ep() {
        let fens = [
            "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b - e3 0 1",
            "8/8/8/4k3/8/8/1Q6/4K3 w - - 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R b - - 0 1",
        ];
        for fen in fens {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.fen(), fen);
        }
    }

    #[test]
    fn castling_and_counters_are_ignored() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 12 40").unwrap();
        assert_eq!(pos.fen(), "4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        let short = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b").unwrap();
        assert_eq!(short.en_passant(), None);
    }

    #[test]
    fn malformed_fen_is_rejected() {
        let bad = [
            "",
            "8/8/8/8/8/8/8 w - - 0 1",
            "9/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4KX2 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K4 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2 w - - 0 1",
            "P3k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - e3 0 1",
        ];
        for fen in bad {
            assert!(
                matches!(Position::from_fen(fen), Err(PositionError::InvalidNotation { .. })),
                "accepted {fen:?}"
            );
        }
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e9 0 1"),
            Err(PositionError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn from_pieces_builds_position() {
        let pos = Position::from_pieces(&["Re7", "Kf5", "e4"], &["Kh8"], Color::Black, None).unwrap();
        assert_eq!(pos.piece_at(sq("e7")), Some(Piece::WR));
        assert_eq!(pos.piece_at(sq("f5")), Some(Piece::WK));
        assert_eq!(pos.piece_at(sq("e4")), Some(Piece::WP));
        assert_eq!(pos.piece_at(sq("h8")), Some(Piece::BK));
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.fen(), "7k/4R3/8/5K2/4P3/8/8/8 b - - 0 1");

        assert!(Position::from_pieces(&["Ri9"], &["Kh8"], Color::White, None).is_err());
        assert!(Position::from_pieces(&["Xe4"], &["Kh8"], Color::White, None).is_err());
    }

    #[test]
    fn hash_matches_full_recompute() {
        let pos = Position::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b - e3 0 1").unwrap();
        assert_eq!(pos.hash(), Zobrist::global().hash_position(&pos));
        let no_ep = Position::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b - - 0 1").unwrap();
        assert_ne!(pos.hash(), no_ep.hash());
    }

    #[test]
    fn double_push_sets_and_clears_en_passant() {
        let mut pos = Position::start();
        let e4 = Move::new(sq("e2"), sq("e4"), Piece::WP, None, None, None);
        pos.perform_move(e4);
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        assert_eq!(pos.side_to_move(), Color::Black);

        let nf6 = Move::new(sq("g8"), sq("f6"), Piece::BN, None, None, Some(sq("e3")));
        pos.perform_move(nf6);
        assert_eq!(pos.en_passant(), None);

        pos.undo_move();
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        pos.undo_move();
        assert_eq!(pos, Position::start());
    }

    #[test]
    fn played_guard_undoes_on_drop() {
        let mut pos = Position::start();
        let before = pos.clone();
        let mv = Move::new(sq("g1"), sq("f3"), Piece::WN, None, None, None);
        {
            let played = pos.play(mv);
            assert_eq!(played.piece_at(sq("f3")), Some(Piece::WN));
            assert_eq!(played.history().len(), 1);
        }
        assert_eq!(pos, before);

        pos.play(mv).keep();
        assert_eq!(pos.last_move(), Some(&mv));
    }

    #[test]
    #[should_panic(expected = "empty history")]
    fn undo_on_fresh_position_panics() {
        Position::start().undo_move();
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn move_from_empty_square_panics() {
        let mut pos = Position::start();
        pos.perform_move(Move::new(sq("e4"), sq("e5"), Piece::WP, None, None, None));
    }

    #[test]
    #[should_panic(expected = "colors differ")]
    fn promotion_of_wrong_color_panics() {
        let mut pos = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        pos.perform_move(Move::new(
            sq("a7"),
            sq("a8"),
            Piece::WP,
            None,
            Some(Special::Promotion(Piece::BQ)),
            None,
        ));
    }

    #[test]
    fn display_draws_board() {
        let text = Position::start().to_string();
        assert!(text.contains("8 |r n b q k b n r | 8"));
        assert!(text.ends_with("white to move\n"));
    }
}
