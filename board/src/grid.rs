//! A rectangular grid of optional occupants, with no knowledge of any particular game

use crate::{MoveMatrix, Position};

pub type Result<T, E = GridError> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("error creating grid: there must be at least 1 row and 1 column (got {rows}x{columns})")]
    InvalidDimensions { rows: i32, columns: i32 },
    #[error("position ({0}) is not on the grid")]
    OutOfBounds(Position),
    #[error("there is already an occupant on position ({0})")]
    CellOccupied(Position),
}

/// Something which can sit in a cell of a [`Grid`]
///
/// The grid stamps the location onto the occupant when it is placed and clears it when the
/// occupant is removed, so an occupant's recorded position always matches the cell holding it.
pub trait Occupant {
    /// Where this occupant currently is, or `None` if it isn't on a grid
    fn position(&self) -> Option<Position>;

    /// Record where this occupant now is
    fn set_position(&mut self, position: Option<Position>);
}

/// A fixed-size grid, addressed by [`Position`]
///
/// The grid owns whatever is placed in it. Cells are stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    rows: i32,
    columns: i32,
    cells: Vec<Option<T>>,
}

impl<T: Occupant> Grid<T> {
    /// Create an empty grid of the given dimensions
    ///
    /// ```
    /// # use board::{Grid, GridError, Occupant, Position};
    /// # struct Token;
    /// # impl Occupant for Token {
    /// #     fn position(&self) -> Option<Position> { None }
    /// #     fn set_position(&mut self, _: Option<Position>) {}
    /// # }
    /// assert!(Grid::<Token>::new(8, 8).is_ok());
    /// assert!(matches!(
    ///     Grid::<Token>::new(0, 8),
    ///     Err(GridError::InvalidDimensions { .. })
    /// ));
    /// ```
    pub fn new(rows: i32, columns: i32) -> Result<Self> {
        let cell_count = match rows.checked_mul(columns) {
            Some(count) if rows >= 1 && columns >= 1 => count as usize,
            _ => return Err(GridError::InvalidDimensions { rows, columns }),
        };
        let mut cells = Vec::with_capacity(cell_count);
        cells.resize_with(cell_count, || None);
        Ok(Self {
            rows,
            columns,
            cells,
        })
    }

    pub const fn rows(&self) -> i32 {
        self.rows
    }

    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Returns if the position lies inside the grid
    pub const fn position_exists(&self, position: Position) -> bool {
        position.row >= 0
            && position.row < self.rows
            && position.column >= 0
            && position.column < self.columns
    }

    fn index(&self, position: Position) -> Result<usize> {
        if !self.position_exists(position) {
            return Err(GridError::OutOfBounds(position));
        }
        Ok((position.row * self.columns + position.column) as usize)
    }

    /// The occupant at the given position, if any
    pub fn occupant_at(&self, position: Position) -> Result<Option<&T>> {
        let idx = self.index(position)?;
        Ok(self.cells[idx].as_ref())
    }

    /// Returns if the given position holds an occupant
    pub fn is_occupied(&self, position: Position) -> Result<bool> {
        Ok(self.occupant_at(position)?.is_some())
    }

    /// Put the occupant on the given position, stamping its location
    ///
    /// Fails without modifying the grid if the cell is already taken.
    pub fn place(&mut self, mut occupant: T, position: Position) -> Result<()> {
        let idx = self.index(position)?;
        let cell = &mut self.cells[idx];
        if cell.is_some() {
            return Err(GridError::CellOccupied(position));
        }
        occupant.set_position(Some(position));
        *cell = Some(occupant);
        Ok(())
    }

    /// Take the occupant (if any) off the given position, clearing its location
    pub fn remove(&mut self, position: Position) -> Result<Option<T>> {
        let idx = self.index(position)?;
        Ok(self.cells[idx].take().map(|mut occupant| {
            occupant.set_position(None);
            occupant
        }))
    }

    /// All occupants on the grid, in row-major order
    pub fn occupants(&self) -> impl Iterator<Item = &T> {
        self.cells.iter().flatten()
    }

    /// The grid contents, one `Vec` per row
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Option<T>]> {
        self.cells.chunks(self.columns as usize)
    }

    /// A move matrix with nothing marked, sized to match this grid
    pub fn move_matrix(&self) -> MoveMatrix {
        MoveMatrix::new(self.rows, self.columns)
    }
}
