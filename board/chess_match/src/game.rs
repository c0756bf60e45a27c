use board::{
    AlgebraicPosition, CheckStatus, Color, Grid, LongAlgebraicMove, MoveMatrix, Occupant, Piece,
    PieceKind, Position, BOARD_SIZE,
};
use log::{debug, trace};

use crate::{ChessPiece, Error, PieceId, Result};

/// The pieces on the back rank, from file `a` to file `h`
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// A capture made by [`ChessMatch::make_move`]
#[derive(Clone, Copy, Debug)]
struct Capture {
    id: PieceId,
    /// Where the captured piece stood, which differs from the move target for en passant
    square: Position,
    /// Where the captured piece was in the list of pieces on the board
    board_index: usize,
}

/// Everything [`ChessMatch::undo_move`] needs to take a move back exactly
#[derive(Clone, Copy, Debug)]
struct AppliedMove {
    source: Position,
    target: Position,
    capture: Option<Capture>,
    en_passant: bool,
}

/// A single game of chess between two players
///
/// Holds all state of the match. Every operation either completes or fails without changing
/// anything, so callers can simply report the error and ask for another move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChessMatch {
    board: Grid<ChessPiece>,
    /// Starts at 1 and goes up by one every half-move
    turn: u32,
    current_player: Color,
    /// Whether the last move put its opponent in check
    check: bool,
    checkmate: bool,
    /// The pawn which just advanced two squares, if any
    en_passant_vulnerable: Option<PieceId>,
    /// The piece which just replaced a promoting pawn, while the choice is still open
    promoted: Option<PieceId>,
    pieces_on_the_board: Vec<PieceId>,
    captured_pieces: Vec<ChessPiece>,
    next_id: u16,
}

impl ChessMatch {
    /// A match with no pieces on the board, white to move
    ///
    /// Use [`Self::place_new_piece`] to set up a position. Both kings must be placed before any
    /// move can be made.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            board: Grid::new(BOARD_SIZE, BOARD_SIZE)?,
            turn: 1,
            current_player: Color::White,
            check: false,
            checkmate: false,
            en_passant_vulnerable: None,
            promoted: None,
            pieces_on_the_board: Vec::with_capacity(32),
            captured_pieces: Vec::new(),
            next_id: 0,
        })
    }

    /// A match at the standard starting position
    pub fn new() -> Result<Self> {
        let mut game = Self::empty()?;
        for (color, back_rank, pawn_rank) in [(Color::White, 1, 2), (Color::Black, 8, 7)] {
            for (file, kind) in ('a'..='h').zip(BACK_RANK) {
                game.place_new_piece(file, back_rank, kind, color)?;
            }
            for file in 'a'..='h' {
                game.place_new_piece(file, pawn_rank, PieceKind::Pawn, color)?;
            }
        }
        Ok(game)
    }

    /// Play the given moves from the starting position, stopping at the first illegal one
    pub fn from_move_sequence(moves: impl IntoIterator<Item = LongAlgebraicMove>) -> Result<Self> {
        let mut game = Self::new()?;
        for mv in moves {
            game.perform_long_move(mv)?;
        }
        Ok(game)
    }

    /// Put a brand new piece on the given square
    pub fn place_new_piece(
        &mut self,
        file: char,
        rank: u8,
        kind: PieceKind,
        color: Color,
    ) -> Result<()> {
        let position = AlgebraicPosition::new(file, rank)?.to_position();
        let piece = self.new_piece(kind, color);
        let id = piece.id();
        self.board.place(piece, position)?;
        self.pieces_on_the_board.push(id);
        Ok(())
    }

    fn new_piece(&mut self, kind: PieceKind, color: Color) -> ChessPiece {
        let piece = ChessPiece::new(PieceId(self.next_id), kind, color);
        self.next_id += 1;
        piece
    }

    pub const fn turn(&self) -> u32 {
        self.turn
    }

    pub const fn current_player(&self) -> Color {
        self.current_player
    }

    /// Whether the last move put its opponent in check
    pub const fn is_check(&self) -> bool {
        self.check
    }

    pub const fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    pub const fn check_status(&self) -> CheckStatus {
        match (self.check, self.checkmate) {
            (_, true) => CheckStatus::Checkmate,
            (true, false) => CheckStatus::Check,
            (false, false) => CheckStatus::None,
        }
    }

    /// The grid the pieces stand on
    pub const fn grid(&self) -> &Grid<ChessPiece> {
        &self.board
    }

    /// What stands on every cell, one `Vec` per row from rank 8 down to rank 1
    pub fn board(&self) -> Vec<Vec<Option<Piece>>> {
        self.board
            .rows_iter()
            .map(|row| row.iter().map(|cell| cell.as_ref().map(ChessPiece::piece)).collect())
            .collect()
    }

    pub fn piece_at(&self, square: AlgebraicPosition) -> Option<&ChessPiece> {
        self.board.occupant_at(square.to_position()).ok().flatten()
    }

    fn piece(&self, id: PieceId) -> Option<&ChessPiece> {
        self.board.occupants().find(|piece| piece.id() == id)
    }

    /// The pawn which may currently be captured en passant
    pub fn en_passant_vulnerable(&self) -> Option<&ChessPiece> {
        self.en_passant_vulnerable.and_then(|id| self.piece(id))
    }

    /// The piece awaiting a promotion choice, if the last move promoted a pawn
    pub fn promoted(&self) -> Option<&ChessPiece> {
        self.promoted.and_then(|id| self.piece(id))
    }

    /// All pieces captured so far, in the order they were taken
    pub fn captured_pieces(&self) -> &[ChessPiece] {
        &self.captured_pieces
    }

    /// All pieces still in play, in the order they entered the board
    pub fn pieces_on_the_board(&self) -> impl Iterator<Item = &ChessPiece> {
        self.pieces_on_the_board
            .iter()
            .filter_map(|&id| self.piece(id))
    }

    /// Where the piece on `source` may move, ignoring moves that would expose its king
    ///
    /// Fails the same way [`Self::perform_move`] does if the source is not a movable piece of the
    /// current player.
    pub fn legal_moves(&self, source: AlgebraicPosition) -> Result<MoveMatrix> {
        let position = source.to_position();
        self.validate_source_position(position)?;
        let piece = self
            .board
            .occupant_at(position)?
            .ok_or(Error::NoPieceAtSource)?;
        Ok(piece.possible_moves(&self.board, self.en_passant_vulnerable))
    }

    pub fn perform_long_move(&mut self, mv: LongAlgebraicMove) -> Result<Option<ChessPiece>> {
        self.perform_move(mv.source, mv.target)
    }

    /// Move the current player's piece from `source` to `target`
    ///
    /// Returns the captured piece, if any. On error nothing about the match changes.
    pub fn perform_move(
        &mut self,
        source_square: AlgebraicPosition,
        target_square: AlgebraicPosition,
    ) -> Result<Option<ChessPiece>> {
        if self.checkmate {
            return Err(Error::MatchOver);
        }
        let source = source_square.to_position();
        let target = target_square.to_position();
        self.validate_source_position(source)?;
        self.validate_target_position(source, target)?;
        let mover = self.current_player;
        let opponent = mover.other();
        self.king(mover)?;
        self.king(opponent)?;

        let applied = self.make_move(source, target)?;
        let exposed = self.test_check(mover);
        if !matches!(exposed, Ok(false)) {
            self.undo_move(applied)?;
            trace!("{mover} {source_square}{target_square} rolled back: own king exposed");
            exposed?;
            return Err(Error::SelfCheck);
        }

        let moved = self.board.occupant_at(target)?.ok_or(Error::EmptyCell(target))?;
        let (moved_id, moved_kind) = (moved.id(), moved.kind());

        self.promoted = None;
        if moved_kind == PieceKind::Pawn && target.row == mover.promotion_row() {
            self.promoted = Some(moved_id);
            self.replace_promoted_piece(PieceKind::Queen)?;
            debug!("{mover} pawn promoted on {target_square}");
        }

        self.check = self.test_check(opponent)?;
        if self.test_checkmate(opponent)? {
            self.checkmate = true;
            debug!("{opponent} is checkmated after {source_square}{target_square}");
        } else {
            self.next_turn();
        }

        self.en_passant_vulnerable = (moved_kind == PieceKind::Pawn
            && (target.row - source.row).abs() == 2)
            .then_some(moved_id);

        let captured = applied.capture.and_then(|capture| {
            self.captured_pieces
                .iter()
                .rfind(|piece| piece.id() == capture.id)
                .cloned()
        });
        debug!(
            "{mover} played {source_square}{target_square}{}{}",
            if captured.is_some() { " (capture)" } else { "" },
            self.check_status(),
        );
        Ok(captured)
    }

    /// Resolve the pending promotion into the piece named by `code` (`B`, `N`, `R` or `Q`)
    ///
    /// Any other code leaves the promotion pending and returns the piece currently standing in
    /// for the pawn.
    pub fn choose_promotion(&mut self, code: &str) -> Result<ChessPiece> {
        let pending = self.promoted.ok_or(Error::NoPendingPromotion)?;
        let Some(kind) = PieceKind::from_promotion_code(code) else {
            return self.piece(pending).cloned().ok_or(Error::NoPendingPromotion);
        };
        let piece = self.replace_promoted_piece(kind)?;
        self.promoted = None;
        debug!("promotion resolved to {kind:?}");
        Ok(piece)
    }

    fn replace_promoted_piece(&mut self, kind: PieceKind) -> Result<ChessPiece> {
        let pending = self.promoted.ok_or(Error::NoPendingPromotion)?;
        let position = self
            .piece(pending)
            .and_then(|piece| piece.position())
            .ok_or(Error::NoPendingPromotion)?;
        let old = self
            .board
            .remove(position)?
            .ok_or(Error::EmptyCell(position))?;
        self.pieces_on_the_board.retain(|&id| id != pending);

        let replacement = self.new_piece(kind, old.color());
        let replacement_id = replacement.id();
        self.board.place(replacement, position)?;
        self.pieces_on_the_board.push(replacement_id);
        self.promoted = Some(replacement_id);
        self.piece(replacement_id)
            .cloned()
            .ok_or(Error::EmptyCell(position))
    }

    fn next_turn(&mut self) {
        self.turn += 1;
        self.current_player = self.current_player.other();
    }

    fn validate_source_position(&self, position: Position) -> Result<()> {
        let piece = self
            .board
            .occupant_at(position)?
            .ok_or(Error::NoPieceAtSource)?;
        if piece.color() != self.current_player {
            return Err(Error::NotYourPiece);
        }
        if !piece.has_any_possible_move(&self.board, self.en_passant_vulnerable) {
            return Err(Error::NoLegalMoves);
        }
        Ok(())
    }

    fn validate_target_position(&self, source: Position, target: Position) -> Result<()> {
        let piece = self
            .board
            .occupant_at(source)?
            .ok_or(Error::NoPieceAtSource)?;
        if !piece.possible_move(&self.board, self.en_passant_vulnerable, target) {
            return Err(Error::IllegalTarget);
        }
        Ok(())
    }

    /// Take `piece` off the board for good, remembering enough to put it back
    fn capture(&mut self, piece: ChessPiece, square: Position) -> Capture {
        let id = piece.id();
        let board_index = match self.pieces_on_the_board.iter().position(|&on| on == id) {
            Some(idx) => {
                self.pieces_on_the_board.remove(idx);
                idx
            }
            None => self.pieces_on_the_board.len(),
        };
        self.captured_pieces.push(piece);
        Capture {
            id,
            square,
            board_index,
        }
    }

    /// Where a castling rook starts and ends, if moving a king from `source` to `target` castles
    fn castling_rook(source: Position, target: Position) -> Option<(Position, Position)> {
        if target.column == source.column + 2 {
            Some((source.offset(0, 3), source.offset(0, 1)))
        } else if target.column == source.column - 2 {
            Some((source.offset(0, -4), source.offset(0, -1)))
        } else {
            None
        }
    }

    fn shift_piece(&mut self, from: Position, to: Position, forward: bool) -> Result<()> {
        let mut piece = self.board.remove(from)?.ok_or(Error::EmptyCell(from))?;
        if forward {
            piece.increase_move_count();
        } else {
            piece.decrease_move_count();
        }
        self.board.place(piece, to)?;
        Ok(())
    }

    /// Move without any legality checks, including castling and en passant side effects
    fn make_move(&mut self, source: Position, target: Position) -> Result<AppliedMove> {
        let mut piece = self.board.remove(source)?.ok_or(Error::EmptyCell(source))?;
        piece.increase_move_count();
        let (kind, moved_id) = (piece.kind(), piece.id());
        let mut capture = self
            .board
            .remove(target)?
            .map(|captured| self.capture(captured, target));
        self.board.place(piece, target)?;

        if kind == PieceKind::King {
            if let Some((home, castled)) = Self::castling_rook(source, target) {
                self.shift_piece(home, castled, true)?;
            }
        }

        let en_passant =
            kind == PieceKind::Pawn && source.column != target.column && capture.is_none();
        if en_passant {
            let pawn_square = Position::new(source.row, target.column);
            capture = self
                .board
                .remove(pawn_square)?
                .map(|captured| self.capture(captured, pawn_square));
        }

        trace!("applied {moved_id:?} ({source}) -> ({target})");
        Ok(AppliedMove {
            source,
            target,
            capture,
            en_passant,
        })
    }

    /// The exact inverse of [`Self::make_move`]
    fn undo_move(&mut self, applied: AppliedMove) -> Result<()> {
        let AppliedMove {
            source,
            target,
            capture,
            en_passant,
        } = applied;
        let mut piece = self.board.remove(target)?.ok_or(Error::EmptyCell(target))?;
        piece.decrease_move_count();
        let kind = piece.kind();
        self.board.place(piece, source)?;

        if let Some(capture) = capture {
            if en_passant {
                debug_assert_eq!(Some(capture.id), self.en_passant_vulnerable);
            }
            let idx = self
                .captured_pieces
                .iter()
                .rposition(|piece| piece.id() == capture.id)
                .ok_or(Error::UnknownCapture(capture.id))?;
            let captured = self.captured_pieces.remove(idx);
            self.board.place(captured, capture.square)?;
            let board_index = capture.board_index.min(self.pieces_on_the_board.len());
            self.pieces_on_the_board.insert(board_index, capture.id);
        }

        if kind == PieceKind::King {
            if let Some((home, castled)) = Self::castling_rook(source, target) {
                self.shift_piece(castled, home, false)?;
            }
        }
        Ok(())
    }

    fn king(&self, color: Color) -> Result<&ChessPiece> {
        self.board
            .occupants()
            .find(|piece| piece.color() == color && piece.kind() == PieceKind::King)
            .ok_or(Error::MissingKing(color))
    }

    /// Returns if any opposing piece could move onto `color`'s king
    fn test_check(&self, color: Color) -> Result<bool> {
        let king = self.king(color)?;
        let king_position = king.position().ok_or(Error::MissingKing(color))?;
        Ok(self
            .board
            .occupants()
            .filter(|piece| piece.color() == color.other())
            .any(|piece| piece.possible_move(&self.board, self.en_passant_vulnerable, king_position)))
    }

    /// Returns if `color` is in check and every one of its moves leaves it in check
    fn test_checkmate(&mut self, color: Color) -> Result<bool> {
        if !self.test_check(color)? {
            return Ok(false);
        }
        let candidates: Vec<(Position, MoveMatrix)> = self
            .pieces_on_the_board()
            .filter(|piece| piece.color() == color)
            .filter_map(|piece| {
                Some((
                    piece.position()?,
                    piece.possible_moves(&self.board, self.en_passant_vulnerable),
                ))
            })
            .collect();
        for (source, moves) in candidates {
            for target in moves.marked() {
                let applied = self.make_move(source, target)?;
                let still_in_check = self.test_check(color);
                self.undo_move(applied)?;
                if !still_in_check? {
                    trace!("{color} escapes check with ({source}) -> ({target})");
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::{quickcheck, TestResult};
    use rand::{rngs::SmallRng, seq::IteratorRandom, SeedableRng};

    fn square(name: &str) -> AlgebraicPosition {
        name.parse().unwrap()
    }

    #[track_caller]
    fn play(game: &mut ChessMatch, moves: &[&str]) {
        for mv in moves {
            let parsed: LongAlgebraicMove = mv.parse().unwrap();
            if let Err(e) = game.perform_long_move(parsed) {
                panic!("{mv} rejected: {e}");
            }
        }
    }

    fn piece_on(game: &ChessMatch, name: &str) -> Option<Piece> {
        game.piece_at(square(name)).map(ChessPiece::piece)
    }

    fn white(kind: PieceKind) -> Option<Piece> {
        Some(Piece {
            kind,
            color: Color::White,
        })
    }

    fn black(kind: PieceKind) -> Option<Piece> {
        Some(Piece {
            kind,
            color: Color::Black,
        })
    }

    /// The piece list and the grid agree, and every piece knows where it is
    #[track_caller]
    fn assert_consistent(game: &ChessMatch) {
        let mut listed = game.pieces_on_the_board.clone();
        let mut on_grid: Vec<PieceId> = game.board.occupants().map(ChessPiece::id).collect();
        listed.sort();
        on_grid.sort();
        assert_eq!(listed, on_grid);
        for (row, cells) in game.board.rows_iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                if let Some(piece) = cell {
                    assert_eq!(
                        piece.position(),
                        Some(Position::new(row as i32, column as i32))
                    );
                }
            }
        }
        assert!(game
            .captured_pieces
            .iter()
            .all(|piece| piece.position().is_none()));
    }

    /// Every move the current player's pieces could make, ignoring self-check
    fn candidate_moves(game: &ChessMatch) -> Vec<(Position, Position)> {
        game.pieces_on_the_board()
            .filter(|piece| piece.color() == game.current_player())
            .flat_map(|piece| {
                let source = piece.position().unwrap();
                let moves = piece.possible_moves(&game.board, game.en_passant_vulnerable);
                assert!(!moves.get(source), "{:?} targets its own square", piece);
                moves
                    .marked()
                    .map(move |target| (source, target))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_initial_setup() {
        let game = ChessMatch::new().unwrap();
        assert_eq!(game.turn(), 1);
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(game.pieces_on_the_board().count(), 32);
        assert_eq!(game.check_status(), CheckStatus::None);
        assert_eq!(piece_on(&game, "e1"), white(PieceKind::King));
        assert_eq!(piece_on(&game, "d8"), black(PieceKind::Queen));
        assert_eq!(piece_on(&game, "g7"), black(PieceKind::Pawn));
        assert_eq!(piece_on(&game, "e4"), None);
        let board = game.board();
        assert_eq!(board.len(), 8);
        assert_eq!(board[0][0], black(PieceKind::Rook));
        assert_eq!(board[7][4], white(PieceKind::King));
        assert_consistent(&game);
    }

    #[test]
    fn test_pawn_double_step() {
        let mut game = ChessMatch::new().unwrap();
        let captured = game.perform_move(square("e2"), square("e4")).unwrap();
        assert_eq!(captured, None);
        assert_eq!(game.turn(), 2);
        assert_eq!(game.current_player(), Color::Black);
        assert_eq!(piece_on(&game, "e4"), white(PieceKind::Pawn));
        assert_eq!(piece_on(&game, "e2"), None);
        let vulnerable = game.en_passant_vulnerable().unwrap();
        assert_eq!(vulnerable.chess_position(), Some(square("e4")));
        assert_eq!(vulnerable.move_count(), 1);
    }

    #[test]
    fn test_en_passant_marker_lasts_one_ply() {
        let mut game = ChessMatch::new().unwrap();
        play(&mut game, &["e2e4"]);
        assert!(game.en_passant_vulnerable().is_some());
        play(&mut game, &["a7a6"]);
        assert!(game.en_passant_vulnerable().is_none());
        play(&mut game, &["e4e5", "d7d5", "h2h3", "h7h6"]);
        assert!(game.en_passant_vulnerable().is_none());
        assert_eq!(
            game.perform_move(square("e5"), square("d6")),
            Err(Error::IllegalTarget)
        );
    }

    #[test]
    fn test_en_passant_capture() {
        let mut game = ChessMatch::new().unwrap();
        play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(
            game.en_passant_vulnerable().and_then(ChessPiece::chess_position),
            Some(square("d5"))
        );
        assert!(game.legal_moves(square("e5")).unwrap().get(square("d6").to_position()));

        let captured = game.perform_move(square("e5"), square("d6")).unwrap().unwrap();
        assert_eq!(captured.piece(), black(PieceKind::Pawn).unwrap());
        assert_eq!(captured.chess_position(), None);
        assert_eq!(piece_on(&game, "d6"), white(PieceKind::Pawn));
        assert_eq!(piece_on(&game, "d5"), None);
        assert_eq!(piece_on(&game, "e5"), None);
        assert_eq!(game.captured_pieces(), [captured]);
        assert_eq!(game.pieces_on_the_board().count(), 31);
        assert_consistent(&game);
    }

    #[test]
    fn test_checkmate_search_ignores_fresh_en_passant() {
        let mut game = ChessMatch::empty().unwrap();
        game.place_new_piece('h', 1, PieceKind::King, Color::White).unwrap();
        game.place_new_piece('b', 2, PieceKind::Pawn, Color::White).unwrap();
        game.place_new_piece('b', 8, PieceKind::Rook, Color::White).unwrap();
        game.place_new_piece('c', 8, PieceKind::Bishop, Color::White).unwrap();
        game.place_new_piece('c', 2, PieceKind::Bishop, Color::White).unwrap();
        game.place_new_piece('d', 3, PieceKind::Knight, Color::White).unwrap();
        game.place_new_piece('a', 5, PieceKind::King, Color::Black).unwrap();
        game.place_new_piece('c', 4, PieceKind::Pawn, Color::Black).unwrap();

        // Capturing b4 en passant is the only way out, but the double step has not yet opened it
        // when the checkmate search runs
        play(&mut game, &["b2b4"]);
        assert!(game.is_check());
        assert!(game.is_checkmate());
        assert_eq!(game.turn(), 1);
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(
            game.perform_move(square("c4"), square("b3")),
            Err(Error::MatchOver)
        );
        assert_consistent(&game);
    }

    #[test]
    fn test_opponent_piece_rejected() {
        let mut game = ChessMatch::new().unwrap();
        let before = game.clone();
        assert_eq!(
            game.perform_move(square("e7"), square("e5")),
            Err(Error::NotYourPiece)
        );
        assert_eq!(game.legal_moves(square("e7")), Err(Error::NotYourPiece));
        assert_eq!(game, before);
    }

    #[test]
    fn test_source_validation() {
        let mut game = ChessMatch::new().unwrap();
        assert_eq!(
            game.perform_move(square("e4"), square("e5")),
            Err(Error::NoPieceAtSource)
        );
        assert_eq!(
            game.perform_move(square("a1"), square("a3")),
            Err(Error::NoLegalMoves)
        );
        assert_eq!(
            game.perform_move(square("e2"), square("e5")),
            Err(Error::IllegalTarget)
        );
        assert_eq!(game.turn(), 1);
    }

    #[test]
    fn test_self_check_rolls_back() {
        let mut game = ChessMatch::empty().unwrap();
        game.place_new_piece('e', 1, PieceKind::King, Color::White).unwrap();
        game.place_new_piece('e', 2, PieceKind::Bishop, Color::White).unwrap();
        game.place_new_piece('e', 8, PieceKind::Rook, Color::Black).unwrap();
        game.place_new_piece('a', 8, PieceKind::King, Color::Black).unwrap();
        let before = game.clone();

        assert_eq!(
            game.perform_move(square("e2"), square("d3")),
            Err(Error::SelfCheck)
        );
        assert_eq!(game, before);

        game.perform_move(square("e1"), square("d1")).unwrap();
        assert_eq!(game.current_player(), Color::Black);
    }

    #[test]
    fn test_must_answer_check() {
        let mut game = ChessMatch::new().unwrap();
        play(&mut game, &["e2e4", "d7d6", "f1b5"]);
        assert!(game.is_check());
        assert!(!game.is_checkmate());
        assert_eq!(game.check_status(), CheckStatus::Check);
        assert_eq!(game.turn(), 4);

        let before = game.clone();
        assert_eq!(
            game.perform_move(square("a7"), square("a6")),
            Err(Error::SelfCheck)
        );
        assert_eq!(game, before);

        play(&mut game, &["c7c6"]);
        assert!(!game.is_check());
    }

    #[test]
    fn test_checkmate_stops_the_match() {
        let mut game = ChessMatch::new().unwrap();
        play(&mut game, &["e2e4", "g7g5", "d2d4", "f7f6", "d1h5"]);
        assert!(game.is_check());
        assert!(game.is_checkmate());
        assert_eq!(game.check_status(), CheckStatus::Checkmate);
        assert_eq!(game.turn(), 5);
        assert_eq!(game.current_player(), Color::White);
        assert_consistent(&game);

        let before = game.clone();
        assert_eq!(
            game.perform_move(square("e8"), square("f7")),
            Err(Error::MatchOver)
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_kingside_castling() {
        let mut game = ChessMatch::new().unwrap();
        play(
            &mut game,
            &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"],
        );
        assert!(game.legal_moves(square("e1")).unwrap().get(square("g1").to_position()));

        game.perform_move(square("e1"), square("g1")).unwrap();
        assert_eq!(piece_on(&game, "g1"), white(PieceKind::King));
        assert_eq!(piece_on(&game, "f1"), white(PieceKind::Rook));
        assert_eq!(piece_on(&game, "h1"), None);
        assert_eq!(piece_on(&game, "e1"), None);
        assert_eq!(game.piece_at(square("f1")).unwrap().move_count(), 1);
        assert_eq!(game.piece_at(square("g1")).unwrap().move_count(), 1);
        assert_consistent(&game);
    }

    #[test]
    fn test_queenside_castling() {
        let mut game = ChessMatch::new().unwrap();
        play(
            &mut game,
            &["d2d4", "d7d5", "b1c3", "b8c6", "c1f4", "c8f5", "d1d2", "d8d7"],
        );
        game.perform_move(square("e1"), square("c1")).unwrap();
        assert_eq!(piece_on(&game, "c1"), white(PieceKind::King));
        assert_eq!(piece_on(&game, "d1"), white(PieceKind::Rook));
        assert_eq!(piece_on(&game, "a1"), None);

        game.perform_move(square("e8"), square("c8")).unwrap();
        assert_eq!(piece_on(&game, "c8"), black(PieceKind::King));
        assert_eq!(piece_on(&game, "d8"), black(PieceKind::Rook));
        assert_eq!(piece_on(&game, "a8"), None);
        assert_consistent(&game);
    }

    #[test]
    fn test_castling_lost_after_rook_moves() {
        let mut game = ChessMatch::new().unwrap();
        play(
            &mut game,
            &[
                "e2e4", "e7e5", "g1f3", "g8f6", "f1c4", "f8c5", "h1g1", "b8c6", "g1h1", "c6b8",
            ],
        );
        let moves = game.legal_moves(square("e1")).unwrap();
        assert!(moves.get(square("f1").to_position()));
        assert!(!moves.get(square("g1").to_position()));
        assert_eq!(
            game.perform_move(square("e1"), square("g1")),
            Err(Error::IllegalTarget)
        );
    }

    #[test]
    fn test_make_undo_restores_special_moves() {
        let mut game = ChessMatch::new().unwrap();
        play(
            &mut game,
            &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"],
        );
        let before = game.clone();
        let applied = game
            .make_move(square("e1").to_position(), square("g1").to_position())
            .unwrap();
        assert_eq!(piece_on(&game, "f1"), white(PieceKind::Rook));
        game.undo_move(applied).unwrap();
        assert_eq!(game, before);

        let mut game = ChessMatch::new().unwrap();
        play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        let before = game.clone();
        let applied = game
            .make_move(square("e5").to_position(), square("d6").to_position())
            .unwrap();
        assert!(applied.en_passant);
        assert_eq!(piece_on(&game, "d5"), None);
        game.undo_move(applied).unwrap();
        assert_eq!(game, before);
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let mut game = ChessMatch::empty().unwrap();
        game.place_new_piece('e', 1, PieceKind::King, Color::White).unwrap();
        game.place_new_piece('h', 6, PieceKind::King, Color::Black).unwrap();
        game.place_new_piece('b', 7, PieceKind::Pawn, Color::White).unwrap();

        game.perform_move(square("b7"), square("b8")).unwrap();
        assert_eq!(piece_on(&game, "b8"), white(PieceKind::Queen));
        let pending = game.promoted().unwrap();
        assert_eq!(pending.kind(), PieceKind::Queen);
        assert_eq!(pending.chess_position(), Some(square("b8")));
        assert_eq!(game.current_player(), Color::Black);

        // Anything but B, N, R or Q leaves the choice open
        let unchanged = game.choose_promotion("K").unwrap();
        assert_eq!(unchanged.kind(), PieceKind::Queen);
        assert!(game.promoted().is_some());

        let knight = game.choose_promotion("N").unwrap();
        assert_eq!(knight.kind(), PieceKind::Knight);
        assert_eq!(piece_on(&game, "b8"), white(PieceKind::Knight));
        assert!(game.promoted().is_none());
        assert_eq!(game.pieces_on_the_board().count(), 3);
        assert_eq!(game.choose_promotion("Q"), Err(Error::NoPendingPromotion));
        assert_consistent(&game);
    }

    #[test]
    fn test_promotion_cleared_by_next_move() {
        let mut game = ChessMatch::empty().unwrap();
        game.place_new_piece('e', 1, PieceKind::King, Color::White).unwrap();
        game.place_new_piece('h', 6, PieceKind::King, Color::Black).unwrap();
        game.place_new_piece('a', 2, PieceKind::Pawn, Color::Black).unwrap();
        game.place_new_piece('h', 2, PieceKind::Pawn, Color::White).unwrap();

        play(&mut game, &["h2h3", "a2a1"]);
        assert_eq!(piece_on(&game, "a1"), black(PieceKind::Queen));
        assert!(game.promoted().is_some());
        play(&mut game, &["e1d2"]);
        assert!(game.promoted().is_none());
    }

    #[test]
    fn test_no_pending_promotion() {
        let mut game = ChessMatch::new().unwrap();
        assert_eq!(game.choose_promotion("Q"), Err(Error::NoPendingPromotion));
    }

    #[test]
    fn test_missing_king() {
        let mut game = ChessMatch::empty().unwrap();
        game.place_new_piece('e', 1, PieceKind::King, Color::White).unwrap();
        let before = game.clone();
        assert_eq!(
            game.perform_move(square("e1"), square("e2")),
            Err(Error::MissingKing(Color::Black))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_place_on_occupied_square() {
        let mut game = ChessMatch::new().unwrap();
        assert!(matches!(
            game.place_new_piece('e', 1, PieceKind::Queen, Color::White),
            Err(Error::Grid(_))
        ));
        assert!(matches!(
            game.place_new_piece('z', 1, PieceKind::Queen, Color::White),
            Err(Error::InvalidAlgebraicPosition(_))
        ));
    }

    #[test]
    fn test_from_move_sequence() {
        let moves = ["e2e4", "e7e5", "g1f3"].map(|mv| mv.parse::<LongAlgebraicMove>().unwrap());
        let game = ChessMatch::from_move_sequence(moves).unwrap();
        assert_eq!(game.turn(), 4);
        assert_eq!(piece_on(&game, "f3"), white(PieceKind::Knight));

        let moves = ["e2e4", "e4e5"].map(|mv| mv.parse::<LongAlgebraicMove>().unwrap());
        assert_eq!(
            ChessMatch::from_move_sequence(moves),
            Err(Error::NotYourPiece)
        );
    }

    /// Play random games, checking every move can be taken back exactly
    #[test]
    fn test_seeded_random_games() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..20 {
            let mut game = ChessMatch::new().unwrap();
            for _ in 0..150 {
                if game.is_checkmate() {
                    break;
                }
                let Some((source, target)) = candidate_moves(&game).into_iter().choose(&mut rng)
                else {
                    break;
                };
                let before = game.clone();
                let applied = game.make_move(source, target).unwrap();
                game.undo_move(applied).unwrap();
                assert_eq!(game, before);

                let result = game.perform_move(
                    AlgebraicPosition::from_position(source).unwrap(),
                    AlgebraicPosition::from_position(target).unwrap(),
                );
                match result {
                    Ok(_) => assert!(game.turn() > before.turn() || game.is_checkmate()),
                    Err(Error::SelfCheck) => assert_eq!(game, before),
                    Err(e) => panic!("unexpected error {e}"),
                }
                assert_consistent(&game);
            }
        }
    }

    quickcheck! {
        fn test_rejected_moves_change_nothing(choices: Vec<u8>) -> TestResult {
            let mut game = ChessMatch::new().unwrap();
            for choice in choices {
                if game.is_checkmate() {
                    break;
                }
                let candidates = candidate_moves(&game);
                if candidates.is_empty() {
                    break;
                }
                let (source, target) = candidates[choice as usize % candidates.len()];
                let before = game.clone();
                let result = game.perform_move(
                    AlgebraicPosition::from_position(source).unwrap(),
                    AlgebraicPosition::from_position(target).unwrap(),
                );
                match result {
                    Ok(_) => {}
                    Err(Error::SelfCheck) if game == before => {}
                    Err(_) => return TestResult::failed(),
                }
            }
            TestResult::passed()
        }
    }
}
