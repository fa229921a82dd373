// Pieces and colors
//
// Uppercase letters are white, lowercase black: K Q R N B P / k q r n b p.

use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// +1 for white, -1 for black. Scores are from white's point of view.
    pub fn sign(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row delta of a pawn push.
    pub fn pawn_direction(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Piece {
    WP,
    WN,
    WB,
    WR,
    WQ,
    WK,
    BP,
    BN,
    BB,
    BR,
    BQ,
    BK,
}

impl Piece {
    pub const ALL: [Piece; 12] = [
        Piece::WP,
        Piece::WN,
        Piece::WB,
        Piece::WR,
        Piece::WQ,
        Piece::WK,
        Piece::BP,
        Piece::BN,
        Piece::BB,
        Piece::BR,
        Piece::BQ,
        Piece::BK,
    ];

    /// Promotion targets in generation order.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
    ];

    pub fn new(color: Color, kind: PieceKind) -> Piece {
        use PieceKind::*;
        match (color, kind) {
            (Color::White, Pawn) => Piece::WP,
            (Color::White, Knight) => Piece::WN,
            (Color::White, Bishop) => Piece::WB,
            (Color::White, Rook) => Piece::WR,
            (Color::White, Queen) => Piece::WQ,
            (Color::White, King) => Piece::WK,
            (Color::Black, Pawn) => Piece::BP,
            (Color::Black, Knight) => Piece::BN,
            (Color::Black, Bishop) => Piece::BB,
            (Color::Black, Rook) => Piece::BR,
            (Color::Black, Queen) => Piece::BQ,
            (Color::Black, King) => Piece::BK,
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        match c {
            'P' => Some(Piece::WP),
            'N' => Some(Piece::WN),
            'B' => Some(Piece::WB),
            'R' => Some(Piece::WR),
            'Q' => Some(Piece::WQ),
            'K' => Some(Piece::WK),
            'p' => Some(Piece::BP),
            'n' => Some(Piece::BN),
            'b' => Some(Piece::BB),
            'r' => Some(Piece::BR),
            'q' => Some(Piece::BQ),
            'k' => Some(Piece::BK),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Piece::WP => 'P',
            Piece::WN => 'N',
            Piece::WB => 'B',
            Piece::WR => 'R',
            Piece::WQ => 'Q',
            Piece::WK => 'K',
            Piece::BP => 'p',
            Piece::BN => 'n',
            Piece::BB => 'b',
            Piece::BR => 'r',
            Piece::BQ => 'q',
            Piece::BK => 'k',
        }
    }

    /// Index 0..12, white pieces first.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn color(self) -> Color {
        if self.index() < 6 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn kind(self) -> PieceKind {
        match self {
            Piece::WP | Piece::BP => PieceKind::Pawn,
            Piece::WN | Piece::BN => PieceKind::Knight,
            Piece::WB | Piece::BB => PieceKind::Bishop,
            Piece::WR | Piece::BR => PieceKind::Rook,
            Piece::WQ | Piece::BQ => PieceKind::Queen,
            Piece::WK | Piece::BK => PieceKind::King,
        }
    }

    pub fn is_white(self) -> bool {
        self.color() == Color::White
    }

    /// The six pieces of one color.
    pub fn of_color(color: Color) -> &'static [Piece] {
        match color {
            Color::White => &Piece::ALL[..6],
            Color::Black => &Piece::ALL[6..],
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_round_trip() {
        for p in Piece::ALL {
            assert_eq!(Piece::from_char(p.to_char()), Some(p));
        }
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Piece::from_char('.'), None);
    }

    #[test]
    fn color_and_kind() {
        assert_eq!(Piece::BQ.color(), Color::Black);
        assert_eq!(Piece::BQ.kind(), PieceKind::Queen);
        assert_eq!(Piece::new(Color::White, PieceKind::Knight), Piece::WN);
        assert!(Piece::of_color(Color::Black).iter().all(|p| !p.is_white()));
    }
}
