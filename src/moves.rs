// =====================
// Move Representation
// =====================

use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;
use std::fmt;

/// Extra information carried by pawn moves.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Special {
    /// Pawn becomes this piece on arrival
    Promotion(Piece),
    /// En-passant capture made by a pawn of this color
    EnPassant(Color),
}

/// One ply. Built by the move generator, never mutated afterwards.
///
/// `captured` is the piece that stood on `to`; for en passant it is `None`
/// even though a pawn disappears from the neighbouring square.
/// `prior_en_passant` is the position's en-passant target before the move,
/// restored verbatim on undo.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub special: Option<Special>,
    pub prior_en_passant: Option<Square>,
}

impl Move {
    pub fn new(
        from: Square,
        to: Square,
        piece: Piece,
        captured: Option<Piece>,
        special: Option<Special>,
        prior_en_passant: Option<Square>,
    ) -> Move {
        Move {
            from,
            to,
            piece,
            captured,
            special,
            prior_en_passant,
        }
    }

    pub fn is_en_passant(&self) -> bool {
        matches!(self.special, Some(Special::EnPassant(_)))
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some() || self.is_en_passant()
    }

    pub fn promotion(&self) -> Option<Piece> {
        match self.special {
            Some(Special::Promotion(p)) => Some(p),
            _ => None,
        }
    }

    /// Square of the pawn removed by an en-passant capture.
    pub fn en_passant_victim(&self) -> Option<Square> {
        match self.special {
            Some(Special::EnPassant(color)) => self.to.offset(0, -color.pawn_direction()),
            _ => None,
        }
    }

    /// Long form: `Rc2xc6`, `e6-e7`, `d5xe6`, `g7-g8=Q`.
    pub fn long(&self) -> String {
        let mut s = String::new();
        if self.piece.kind() != PieceKind::Pawn {
            s.push(self.piece.to_char().to_ascii_uppercase());
        }
        s.push_str(&self.from.to_string());
        s.push(if self.is_capture() { 'x' } else { '-' });
        s.push_str(&self.to.to_string());
        if let Some(p) = self.promotion() {
            s.push('=');
            s.push(p.to_char());
        }
        s
    }
}

/// Short form: `Rxc6`, `e7`, `dxe6`, `g8=Q`. Does not disambiguate two
/// pieces of the same type reaching the same square.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.piece.kind() == PieceKind::Pawn {
            if self.is_capture() {
                let file = self.from.to_string();
                write!(f, "{}x", &file[..1])?;
            }
            write!(f, "{}", self.to)?;
            if let Some(p) = self.promotion() {
                write!(f, "={}", p.to_char())?;
            }
            return Ok(());
        }
        let letter = self.piece.to_char().to_ascii_uppercase();
        if self.captured.is_some() {
            write!(f, "{}x{}", letter, self.to)
        } else {
            write!(f, "{}{}", letter, self.to)
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
    fn piece_capture_notation() {
        let m = Move::new(sq("c2"), sq("c6"), Piece::WR, Some(Piece::BN), None, None);
        assert_eq!(m.to_string(), "Rxc6");
        assert_eq!(m.long(), "Rc2xc6");
    }

    #[test]
    fn pawn_notation() {
        let push = Move::new(sq("e6"), sq("e7"), Piece::WP, None, None, None);
        assert_eq!(push.to_string(), "e7");
        assert_eq!(push.long(), "e6-e7");

        let promo = Move::new(
            sq("g7"),
            sq("g8"),
            Piece::WP,
            None,
            Some(Special::Promotion(Piece::WQ)),
            None,
        );
        assert_eq!(promo.to_string(), "g8=Q");
        assert_eq!(promo.long(), "g7-g8=Q");
    }

    #[test]
    fn en_passant_is_written_as_capture() {
        let ep = Move::new(
            sq("d5"),
            sq("e6"),
            Piece::WP,
            None,
            Some(Special::EnPassant(Color::White)),
            Some(sq("e6")),
        );
        assert_eq!(ep.to_string(), "dxe6");
        assert_eq!(ep.long(), "d5xe6");
        assert_eq!(ep.en_passant_victim(), Some(sq("e5")));

        let black = Move::new(
            sq("e4"),
            sq("d3"),
            Piece::BP,
            None,
            Some(Special::EnPassant(Color::Black)),
            Some(sq("d3")),
        );
        assert_eq!(black.en_passant_victim(), Some(sq("d4")));
    }

    #[test]
    fn quiet_king_move() {
        let m = Move::new(sq("e1"), sq("e2"), Piece::WK, None, None, None);
        assert_eq!(m.to_string(), "Ke2");
        assert_eq!(m.long(), "Ke1-e2");
    }
}
