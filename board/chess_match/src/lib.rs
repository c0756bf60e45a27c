//! The rules of a chess match: move generation per piece, move validation, special moves, and
//! check/checkmate detection

use board::{AlgebraicPositionError, Color, GridError, Position};

mod game;
mod movegen;
mod piece;

pub use crate::game::ChessMatch;
pub use crate::piece::{ChessPiece, PieceId};

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("board error: {0}")]
    Grid(#[from] GridError),
    #[error("{0}")]
    InvalidAlgebraicPosition(#[from] AlgebraicPositionError),
    #[error("there is no piece on the source position")]
    NoPieceAtSource,
    #[error("the chosen piece is not yours")]
    NotYourPiece,
    #[error("there are no possible moves for the chosen piece")]
    NoLegalMoves,
    #[error("the chosen piece can't move to the target position")]
    IllegalTarget,
    #[error("you can't put yourself in check")]
    SelfCheck,
    #[error("there is no piece to be promoted")]
    NoPendingPromotion,
    #[error("the match is over")]
    MatchOver,
    #[error("there is no {0} king on the board")]
    MissingKing(Color),
    #[error("expected a piece at ({0}) but the cell is empty")]
    EmptyCell(Position),
    #[error("captured piece {0:?} is not in the captured list")]
    UnknownCapture(PieceId),
}
