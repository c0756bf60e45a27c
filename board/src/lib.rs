//! Board-level building blocks: a generic grid and the vocabulary shared by chess pieces

use core::fmt;

mod algebraic;
mod grid;
mod move_matrix;
mod position;

pub use crate::algebraic::{
    AlgebraicPosition, AlgebraicPositionError, LongAlgebraicMove, LongAlgebraicMoveParseError,
};
pub use crate::grid::{Grid, GridError, Occupant};
pub use crate::move_matrix::MoveMatrix;
pub use crate::position::Position;

/// The number of rows and columns on a chess board
pub const BOARD_SIZE: i32 = 8;

/// The types of pieces there are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}
impl PieceKind {
    /// All the kinds of pieces there are
    pub const KINDS: [PieceKind; 6] = [
        Self::Pawn,
        Self::Rook,
        Self::Knight,
        Self::Bishop,
        Self::Queen,
        Self::King,
    ];

    /// The capitalized letter used for this piece in FEN
    pub const fn fen_letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// Whether a pawn can promote into this kind of piece
    pub const fn is_promotable(self) -> bool {
        match self {
            PieceKind::Pawn | PieceKind::King => false,
            PieceKind::Rook | PieceKind::Queen | PieceKind::Knight | PieceKind::Bishop => true,
        }
    }

    /// Parse a promotion choice (`"B"`, `"N"`, `"R"` or `"Q"`)
    ///
    /// ```
    /// use board::PieceKind;
    /// assert_eq!(PieceKind::from_promotion_code("N"), Some(PieceKind::Knight));
    /// assert_eq!(PieceKind::from_promotion_code("K"), None);
    /// assert_eq!(PieceKind::from_promotion_code("q"), None);
    /// ```
    pub fn from_promotion_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let (Some(letter), None) = (chars.next(), chars.next()) else {
            return None;
        };
        Self::KINDS
            .into_iter()
            .find(|kind| kind.is_promotable() && kind.fen_letter() == letter)
    }
}

/// The colors a piece can have
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}
impl Color {
    pub const fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The row direction this color's pawns advance in
    ///
    /// White starts at the bottom of the grid (high rows) and moves toward row 0.
    pub const fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// The grid row on which this color's pawns promote
    pub const fn promotion_row(self) -> i32 {
        match self {
            Color::White => 0,
            Color::Black => BOARD_SIZE - 1,
        }
    }
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

/// A piece, as seen from the outside: just what it is and whose it is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}
impl Piece {
    pub const fn fen_letter(self) -> char {
        match self.color {
            Color::White => self.kind.fen_letter().to_ascii_uppercase(),
            Color::Black => self.kind.fen_letter().to_ascii_lowercase(),
        }
    }
}

/// Whether a side is in check, checkmate, or neither
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CheckStatus {
    None,
    Check,
    Checkmate,
}
/// Returns the status as appended to a move in algebraic notation
impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "",
            Self::Check => "+",
            Self::Checkmate => "#",
        })
    }
}
