//! Chess-facing square names, and their mapping onto grid positions

use core::{fmt, str::FromStr};

use crate::{Position, BOARD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid algebraic position: valid values are from a1 to h8")]
pub struct AlgebraicPositionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid move notation: expected a source and target square such as `e2e4`")]
pub struct LongAlgebraicMoveParseError;

/// A square named by its file letter and rank number, such as `e4`
///
/// Rank 1 is the bottom of the board (grid row 7) and rank 8 the top (grid row 0). File `a` is
/// grid column 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AlgebraicPosition {
    file: char,
    rank: u8,
}

impl AlgebraicPosition {
    /// Create a position, failing unless the file is in `'a'..='h'` and the rank in `1..=8`
    pub fn new(file: char, rank: u8) -> Result<Self, AlgebraicPositionError> {
        if !('a'..='h').contains(&file) || !(1..=8).contains(&rank) {
            return Err(AlgebraicPositionError);
        }
        Ok(Self { file, rank })
    }

    pub const fn file(self) -> char {
        self.file
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// The grid position for this square
    ///
    /// ```
    /// use board::{AlgebraicPosition, Position};
    /// let a1 = AlgebraicPosition::new('a', 1).unwrap();
    /// assert_eq!(a1.to_position(), Position::new(7, 0));
    /// let h8 = AlgebraicPosition::new('h', 8).unwrap();
    /// assert_eq!(h8.to_position(), Position::new(0, 7));
    /// ```
    pub const fn to_position(self) -> Position {
        Position::new(
            BOARD_SIZE - self.rank as i32,
            self.file as i32 - 'a' as i32,
        )
    }

    /// The square at the given grid position, if it is on an 8x8 board
    pub fn from_position(position: Position) -> Result<Self, AlgebraicPositionError> {
        if !(0..BOARD_SIZE).contains(&position.row) || !(0..BOARD_SIZE).contains(&position.column)
        {
            return Err(AlgebraicPositionError);
        }
        let file = char::from(b'a' + position.column as u8);
        Self::new(file, (BOARD_SIZE - position.row) as u8)
    }
}

impl fmt::Display for AlgebraicPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file, self.rank)
    }
}

impl FromStr for AlgebraicPosition {
    type Err = AlgebraicPositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let &[file, rank] = s.as_bytes() else {
            return Err(AlgebraicPositionError);
        };
        if !rank.is_ascii_digit() {
            return Err(AlgebraicPositionError);
        }
        Self::new(char::from(file), rank - b'0')
    }
}

/// A move written as its source and target squares, such as `e2e4`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LongAlgebraicMove {
    pub source: AlgebraicPosition,
    pub target: AlgebraicPosition,
}

impl fmt::Display for LongAlgebraicMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source, self.target)
    }
}

impl FromStr for LongAlgebraicMove {
    type Err = LongAlgebraicMoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) = match s.len() {
            4 => (s.get(..2), s.get(2..)),
            // Allow a separator, as in `e2-e4` or `e2 e4`
            5 if matches!(s.get(2..3), Some("-" | " ")) => (s.get(..2), s.get(3..)),
            _ => return Err(LongAlgebraicMoveParseError),
        };
        let (Some(source), Some(target)) = (source, target) else {
            return Err(LongAlgebraicMoveParseError);
        };
        Ok(Self {
            source: source.parse().map_err(|_| LongAlgebraicMoveParseError)?,
            target: target.parse().map_err(|_| LongAlgebraicMoveParseError)?,
        })
    }
}
