use core::fmt;

/// A (row, column) address on a [`Grid`](crate::Grid)
///
/// Positions carry no bounds of their own, so move generation can freely step off the edge of the
/// grid and ask [`Grid::position_exists`](crate::Grid::position_exists) afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

impl Position {
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Overwrite both coordinates in place
    pub fn set_values(&mut self, row: i32, column: i32) {
        self.row = row;
        self.column = column;
    }

    /// The position shifted by the given number of rows and columns
    ///
    /// ```
    /// use board::Position;
    /// assert_eq!(Position::new(3, 4).offset(-1, 2), Position::new(2, 6));
    /// assert_eq!(Position::new(0, 0).offset(-1, 0), Position::new(-1, 0));
    /// ```
    pub const fn offset(self, rows: i32, columns: i32) -> Self {
        Self {
            row: self.row + rows,
            column: self.column + columns,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.row, self.column)
    }
}
