// =====================
// Move Generation
// =====================
//
// Pseudo-legal generation per piece, then a legality filter that plays each
// candidate and rejects it if the mover's king is attacked afterwards.
// Castling is not modeled.

use crate::board::Position;
use crate::moves::{Move, Special};
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

// (column, row) deltas
const KNIGHT_DELTAS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (-1, -2),
    (-2, -1),
    (1, -2),
    (2, -1),
];
const KING_DELTAS: [(i32, i32); 8] = [
    (1, -1),
    (-1, 1),
    (1, 1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];
const ROOK_DELTAS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DELTAS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

/// Legal moves for the side to move, in piece order then generation order.
pub fn gen_moves(pos: &mut Position, moves: &mut Vec<Move>) {
    moves.clear();
    let us = pos.side_to_move();
    let mut pseudo = Vec::with_capacity(64);
    for &piece in Piece::of_color(us) {
        for from in pos.squares_of(piece) {
            gen_pseudo_legal(pos, piece, from, &mut pseudo);
        }
    }
    // filter illegal by checking own king after the move
    for mv in pseudo {
        let played = pos.play(mv);
        let exposed = played
            .king_square(us)
            .is_some_and(|k| is_square_attacked(&played, k, us.opponent()));
        drop(played);
        if !exposed {
            moves.push(mv);
        }
    }
}

/// Moves for `piece` standing on `from` that follow its movement rules,
/// ignoring whether the mover's king is left attacked.
pub fn gen_pseudo_legal(pos: &Position, piece: Piece, from: Square, moves: &mut Vec<Move>) {
    match piece.kind() {
        PieceKind::Pawn => gen_pawn_moves(pos, piece, from, moves),
        PieceKind::Knight => gen_leaper_moves(pos, piece, from, &KNIGHT_DELTAS, moves),
        PieceKind::King => gen_leaper_moves(pos, piece, from, &KING_DELTAS, moves),
        PieceKind::Bishop => gen_slider_moves(pos, piece, from, &BISHOP_DELTAS, moves),
        PieceKind::Rook => gen_slider_moves(pos, piece, from, &ROOK_DELTAS, moves),
        PieceKind::Queen => {
            gen_slider_moves(pos, piece, from, &KING_DELTAS, moves);
        }
    }
}

fn is_enemy(piece: Piece, other: Option<Piece>) -> bool {
    other.is_some_and(|o| o.color() != piece.color())
}

fn gen_leaper_moves(
    pos: &Position,
    piece: Piece,
    from: Square,
    deltas: &[(i32, i32)],
    moves: &mut Vec<Move>,
) {
    let ep = pos.en_passant();
    for &(dc, dr) in deltas.iter() {
        let Some(to) = from.offset(dc, dr) else {
            continue;
        };
        let target = pos.piece_at(to);
        if target.is_none() || is_enemy(piece, target) {
            moves.push(Move::new(from, to, piece, target, None, ep));
        }
    }
}

fn gen_slider_moves(
    pos: &Position,
    piece: Piece,
    from: Square,
    deltas: &[(i32, i32)],
    moves: &mut Vec<Move>,
) {
    let ep = pos.en_passant();
    for &(dc, dr) in deltas.iter() {
        let mut cur = from.offset(dc, dr);
        while let Some(to) = cur {
            let target = pos.piece_at(to);
            if target.is_some() && !is_enemy(piece, target) {
                break;
            }
            moves.push(Move::new(from, to, piece, target, None, ep));
            if target.is_some() {
                break;
            }
            cur = to.offset(dc, dr);
        }
    }
}

fn push_pawn_move(
    piece: Piece,
    from: Square,
    to: Square,
    captured: Option<Piece>,
    ep: Option<Square>,
    moves: &mut Vec<Move>,
) {
    let last_row = match piece.color() {
        Color::White => 0,
        Color::Black => 7,
    };
    if to.row() == last_row {
        for kind in Piece::PROMOTIONS {
            let target = Piece::new(piece.color(), kind);
            moves.push(Move::new(
                from,
                to,
                piece,
                captured,
                Some(Special::Promotion(target)),
                ep,
            ));
        }
    } else {
        moves.push(Move::new(from, to, piece, captured, None, ep));
    }
}

fn gen_pawn_moves(pos: &Position, piece: Piece, from: Square, moves: &mut Vec<Move>) {
    let color = piece.color();
    let dir = color.pawn_direction();
    let start_row = match color {
        Color::White => 6,
        Color::Black => 1,
    };
    let ep = pos.en_passant();

    // captures, including en passant
    for dc in [1, -1] {
        let Some(to) = from.offset(dc, dir) else {
            continue;
        };
        let target = pos.piece_at(to);
        if is_enemy(piece, target) {
            push_pawn_move(piece, from, to, target, ep, moves);
        } else if target.is_none() && Some(to) == ep {
            moves.push(Move::new(
                from,
                to,
                piece,
                None,
                Some(Special::EnPassant(color)),
                ep,
            ));
        }
    }

    // pushes
    let Some(one) = from.offset(0, dir) else {
        return;
    };
    if pos.piece_at(one).is_none() {
        push_pawn_move(piece, from, one, None, ep, moves);
        if from.row() == start_row {
            if let Some(two) = from.offset(0, 2 * dir) {
                if pos.piece_at(two).is_none() {
                    moves.push(Move::new(from, two, piece, None, None, ep));
                }
            }
        }
    }
}

// =====================
// Attack Detection
// =====================

/// True if a piece of `by` could capture on `sq` next move.
pub fn is_square_attacked(pos: &Position, sq: Square, by: Color) -> bool {
    let attacker = |kind| Some(Piece::new(by, kind));

    // knights
    for &(dc, dr) in KNIGHT_DELTAS.iter() {
        if let Some(a) = sq.offset(dc, dr) {
            if pos.piece_at(a) == attacker(PieceKind::Knight) {
                return true;
            }
        }
    }
    // pawns: a white pawn attacks upward, so it sits one row below the target
    for dc in [1, -1] {
        if let Some(a) = sq.offset(dc, -by.pawn_direction()) {
            if pos.piece_at(a) == attacker(PieceKind::Pawn) {
                return true;
            }
        }
    }
    // king
    for &(dc, dr) in KING_DELTAS.iter() {
        if let Some(a) = sq.offset(dc, dr) {
            if pos.piece_at(a) == attacker(PieceKind::King) {
                return true;
            }
        }
    }
    // sliders
    let rays = [
        (&ROOK_DELTAS, PieceKind::Rook),
        (&BISHOP_DELTAS, PieceKind::Bishop),
    ];
    for (deltas, kind) in rays {
        for &(dc, dr) in deltas.iter() {
            let mut cur = sq.offset(dc, dr);
            while let Some(a) = cur {
                if let Some(p) = pos.piece_at(a) {
                    if p == Piece::new(by, kind) || p == Piece::new(by, PieceKind::Queen) {
                        return true;
                    }
                    break;
                }
                cur = a.offset(dc, dr);
            }
        }
    }
    false
}

/// Number of leaf nodes `depth` plies below the current position.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = Vec::with_capacity(64);
    gen_moves(pos, &mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        let mut child = pos.play(mv);
        nodes += perft(&mut child, depth - 1);
    }
    nodes
}

impl Position {
    pub fn square_attacked(&self, sq: Square, by: Color) -> bool {
        is_square_attacked(self, sq, by)
    }

    /// True if the side to move has its king attacked.
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move();
        self.king_square(us)
            .is_some_and(|k| is_square_attacked(self, k, us.opponent()))
    }

    pub fn pseudo_legal_moves(&self, piece: Piece, from: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        gen_pseudo_legal(self, piece, from, &mut moves);
        moves
    }

    /// All legal moves for the side to move. Ordering is generation order
    /// and carries no meaning; sort if determinism across equivalent
    /// positions matters.
    pub fn get_possible_moves(&mut self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        gen_moves(self, &mut moves);
        moves
    }

    /// The legal move whose long form equals `text` (e.g. `Ra1-d1`).
    pub fn find_long_move(&mut self, text: &str) -> Option<Move> {
        let text = text.trim();
        self.get_possible_moves()
            .into_iter()
            .find(|m| m.long() == text)
    }
}
