use board::{AlgebraicPosition, Color, Grid, MoveMatrix, Occupant, Piece, PieceKind, Position};

use crate::movegen;

/// Identifies one piece for the lifetime of a match
///
/// Two pieces of the same kind and color are still different pieces; the match uses this to track
/// which pawn may be taken en passant and which piece is awaiting promotion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) u16);

/// A chess piece as it lives on the grid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChessPiece {
    id: PieceId,
    kind: PieceKind,
    color: Color,
    /// How many times this piece has moved, used for castling and pawn double steps
    move_count: u32,
    position: Option<Position>,
}

impl ChessPiece {
    pub(crate) const fn new(id: PieceId, kind: PieceKind, color: Color) -> Self {
        Self {
            id,
            kind,
            color,
            move_count: 0,
            position: None,
        }
    }

    pub const fn id(&self) -> PieceId {
        self.id
    }

    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn move_count(&self) -> u32 {
        self.move_count
    }

    /// The kind and color of this piece
    pub const fn piece(&self) -> Piece {
        Piece {
            kind: self.kind,
            color: self.color,
        }
    }

    /// The square this piece stands on, or `None` if it is off the board
    pub fn chess_position(&self) -> Option<AlgebraicPosition> {
        self.position
            .and_then(|position| AlgebraicPosition::from_position(position).ok())
    }

    pub(crate) fn increase_move_count(&mut self) {
        self.move_count += 1;
    }

    pub(crate) fn decrease_move_count(&mut self) {
        debug_assert!(self.move_count > 0, "taking back a move that never happened");
        self.move_count = self.move_count.saturating_sub(1);
    }

    /// Every cell this piece could move to, ignoring whether doing so exposes its own king
    ///
    /// `en_passant_vulnerable` is the pawn (if any) which just advanced two squares and so may be
    /// captured en passant.
    pub fn possible_moves(
        &self,
        grid: &Grid<ChessPiece>,
        en_passant_vulnerable: Option<PieceId>,
    ) -> MoveMatrix {
        movegen::possible_moves(self, grid, en_passant_vulnerable)
    }

    /// Returns if this piece could move to `target`
    pub fn possible_move(
        &self,
        grid: &Grid<ChessPiece>,
        en_passant_vulnerable: Option<PieceId>,
        target: Position,
    ) -> bool {
        self.possible_moves(grid, en_passant_vulnerable).get(target)
    }

    /// Returns if this piece has anywhere at all to move
    pub fn has_any_possible_move(
        &self,
        grid: &Grid<ChessPiece>,
        en_passant_vulnerable: Option<PieceId>,
    ) -> bool {
        self.possible_moves(grid, en_passant_vulnerable).any()
    }

    /// Returns if the given cell holds a piece of the other color
    pub(crate) fn is_opponent_at(&self, grid: &Grid<ChessPiece>, position: Position) -> bool {
        matches!(grid.occupant_at(position), Ok(Some(other)) if other.color != self.color)
    }
}

impl Occupant for ChessPiece {
    fn position(&self) -> Option<Position> {
        self.position
    }

    fn set_position(&mut self, position: Option<Position>) {
        self.position = position;
    }
}
