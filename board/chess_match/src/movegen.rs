//! Per-kind move generation
//!
//! Everything here answers "where could this piece go?" from the grid alone. Whether a move
//! leaves the mover's king attacked is the match's concern, not ours.

use board::{Grid, MoveMatrix, Occupant, PieceKind, Position};

use crate::{ChessPiece, PieceId};

/// North, east, south, west
const ORTHOGONALS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// North-west, north-east, south-east, south-west
const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, 1), (1, -1)];

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub(crate) fn possible_moves(
    piece: &ChessPiece,
    grid: &Grid<ChessPiece>,
    en_passant_vulnerable: Option<PieceId>,
) -> MoveMatrix {
    let mut moves = grid.move_matrix();
    let Some(origin) = piece.position() else {
        return moves;
    };
    match piece.kind() {
        PieceKind::Pawn => pawn_moves(piece, origin, grid, en_passant_vulnerable, &mut moves),
        PieceKind::Rook => slide(piece, origin, grid, &ORTHOGONALS, &mut moves),
        PieceKind::Bishop => slide(piece, origin, grid, &DIAGONALS, &mut moves),
        PieceKind::Queen => {
            slide(piece, origin, grid, &ORTHOGONALS, &mut moves);
            slide(piece, origin, grid, &DIAGONALS, &mut moves);
        }
        PieceKind::Knight => step(piece, origin, grid, &KNIGHT_OFFSETS, &mut moves),
        PieceKind::King => {
            step(piece, origin, grid, &KING_OFFSETS, &mut moves);
            castling_moves(piece, origin, grid, &mut moves);
        }
    }
    moves
}

fn is_empty(grid: &Grid<ChessPiece>, position: Position) -> bool {
    matches!(grid.occupant_at(position), Ok(None))
}

/// Walk each direction until something is in the way, which may be captured if it's an enemy
fn slide(
    piece: &ChessPiece,
    origin: Position,
    grid: &Grid<ChessPiece>,
    directions: &[(i32, i32)],
    moves: &mut MoveMatrix,
) {
    for &(rows, columns) in directions {
        let mut cursor = origin.offset(rows, columns);
        while is_empty(grid, cursor) {
            moves.mark(cursor);
            cursor.set_values(cursor.row + rows, cursor.column + columns);
        }
        if piece.is_opponent_at(grid, cursor) {
            moves.mark(cursor);
        }
    }
}

/// Jump to each of the fixed offsets which is empty or holds an enemy
fn step(
    piece: &ChessPiece,
    origin: Position,
    grid: &Grid<ChessPiece>,
    offsets: &[(i32, i32)],
    moves: &mut MoveMatrix,
) {
    for &(rows, columns) in offsets {
        let target = origin.offset(rows, columns);
        if is_empty(grid, target) || piece.is_opponent_at(grid, target) {
            moves.mark(target);
        }
    }
}

fn pawn_moves(
    pawn: &ChessPiece,
    origin: Position,
    grid: &Grid<ChessPiece>,
    en_passant_vulnerable: Option<PieceId>,
    moves: &mut MoveMatrix,
) {
    let forward = pawn.color().forward();

    let single = origin.offset(forward, 0);
    if is_empty(grid, single) {
        moves.mark(single);
        let double = origin.offset(2 * forward, 0);
        if pawn.move_count() == 0 && is_empty(grid, double) {
            moves.mark(double);
        }
    }

    for side in [-1, 1] {
        let diagonal = origin.offset(forward, side);
        if pawn.is_opponent_at(grid, diagonal) {
            moves.mark(diagonal);
        }

        // En passant: the pawn which just double-stepped sits right beside us
        let beside = origin.offset(0, side);
        if let Some(vulnerable) = en_passant_vulnerable {
            if matches!(
                grid.occupant_at(beside),
                Ok(Some(other)) if other.id() == vulnerable && other.color() != pawn.color()
            ) && grid.position_exists(diagonal)
            {
                moves.mark(diagonal);
            }
        }
    }
}

/// Castling targets two columns either side of an unmoved king
///
/// Only the move counters and the emptiness of the cells between king and rook are checked. The
/// squares the king passes through may be attacked.
fn castling_moves(
    king: &ChessPiece,
    origin: Position,
    grid: &Grid<ChessPiece>,
    moves: &mut MoveMatrix,
) {
    if king.move_count() != 0 {
        return;
    }
    let can_castle_with = |rook_position: Position| {
        matches!(
            grid.occupant_at(rook_position),
            Ok(Some(rook)) if rook.kind() == PieceKind::Rook
                && rook.color() == king.color()
                && rook.move_count() == 0
        )
    };

    if can_castle_with(origin.offset(0, 3))
        && (1..=2).all(|columns| is_empty(grid, origin.offset(0, columns)))
    {
        moves.mark(origin.offset(0, 2));
    }
    if can_castle_with(origin.offset(0, -4))
        && (1..=3).all(|columns| is_empty(grid, origin.offset(0, -columns)))
    {
        moves.mark(origin.offset(0, -2));
    }
}
