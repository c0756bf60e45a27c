use core::fmt::{self, Write};

use crate::Position;

/// Which cells of a grid a piece may move to
///
/// Built with [`Grid::move_matrix`](crate::Grid::move_matrix) so it always has the same shape as
/// the grid it describes. Positions outside the matrix are never reachable.
#[derive(Clone, PartialEq, Eq)]
pub struct MoveMatrix {
    rows: i32,
    columns: i32,
    cells: Vec<bool>,
}

impl MoveMatrix {
    /// A matrix of the given shape with nothing reachable
    pub fn new(rows: i32, columns: i32) -> Self {
        let rows = rows.max(0);
        let columns = columns.max(0);
        Self {
            rows,
            columns,
            cells: vec![false; (rows * columns) as usize],
        }
    }

    pub const fn rows(&self) -> i32 {
        self.rows
    }

    pub const fn columns(&self) -> i32 {
        self.columns
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.row >= 0
            && position.row < self.rows
            && position.column >= 0
            && position.column < self.columns
        {
            Some((position.row * self.columns + position.column) as usize)
        } else {
            None
        }
    }

    /// Mark the position as reachable
    ///
    /// Positions outside the matrix are ignored.
    pub fn mark(&mut self, position: Position) {
        if let Some(idx) = self.index(position) {
            self.cells[idx] = true;
        }
    }

    /// Returns if the position is marked reachable
    pub fn get(&self, position: Position) -> bool {
        self.index(position).is_some_and(|idx| self.cells[idx])
    }

    /// Returns if any cell at all is reachable
    pub fn any(&self) -> bool {
        self.cells.iter().any(|&cell| cell)
    }

    /// Every reachable position, in row-major order
    pub fn marked(&self) -> impl Iterator<Item = Position> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell)
            .map(move |(idx, _)| Position::new(idx as i32 / columns, idx as i32 % columns))
    }
}

impl fmt::Debug for MoveMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('\n')?;
        for row in self.cells.chunks(self.columns.max(1) as usize) {
            for &cell in row {
                f.write_char(if cell { 'X' } else { '.' })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
