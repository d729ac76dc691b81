// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::castling::CastleSide;
use super::material::{Kind, Piece};
use super::moves::{Move, MoveError};
use super::square::{Square, ROWS};
use super::Board;

use MoveError::*;

/// How a move is being applied.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// A move actually played.
    #[default]
    Live,
    /// A move played on a scratch board while testing for check. No
    /// capture sound is requested and a castling king moves alone.
    Testing,
}

/// Side effects of an applied move for the presentation layer.
///
/// Ordinary captures are not listed separately: `applied.captured()` gives
/// the piece that stood on the target when the move was generated.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub applied: Move,
    /// The passed pawn's square, as it was before the pawn was removed.
    pub en_passant: Option<Square>,
    pub promotion: Option<Piece>,
    /// The rook half of a castling move.
    pub castle: Option<Move>,
    pub capture_sound: bool,
}

impl MoveReport {
    fn new(applied: Move) -> Self {
        Self {
            applied,
            en_passant: None,
            promotion: None,
            castle: None,
            capture_sound: false,
        }
    }
}

impl Board {
    /// Applies `mv` if it is in the cached move list of its origin square.
    ///
    /// The stored move, with its generation-time snapshots, is the one
    /// applied and reported. Moves nobody asked `calc_moves` for are
    /// rejected with `MoveError::InvalidMove`.
    pub fn move_piece(&mut self, mv: &Move, mode: Mode) -> Result<MoveReport> {
        let (row, col) = mv.from().coords();
        let Some(mv) = self.cached_moves(row, col).and_then(|list| list.get(mv)) else {
            return Err(InvalidMove.into());
        };
        Ok(self.apply(&mv, mode))
    }

    pub(super) fn apply(&mut self, mv: &Move, mode: Mode) -> MoveReport {
        let mut report = MoveReport::new(*mv);
        let (from, to) = (mv.from(), mv.to());
        let vacant_target = self.squares[to.row()][to.col()].is_empty();
        let Some(mut piece) = self.squares[from.row()][from.col()].take() else {
            return report;
        };
        piece.set_moved();
        self.squares[to.row()][to.col()].set_piece(Some(piece));

        match piece.kind() {
            Kind::Pawn { .. } if from.col() != to.col() && vacant_target => {
                let passed = &mut self.squares[from.row()][to.col()];
                let taken = *passed;
                passed.set_piece(None);
                report.en_passant = Some(taken);
                if mode == Mode::Live {
                    report.capture_sound = true;
                    debug!(%mv, %taken, "en passant");
                }
            }
            Kind::Pawn { .. } if to.row() == 0 || to.row() == ROWS - 1 => {
                let queen = Piece::queen(piece.color());
                self.squares[to.row()][to.col()].set_piece(Some(queen));
                report.promotion = Some(queen);
                if mode == Mode::Live {
                    debug!(%mv, "promotion");
                }
            }
            Kind::King if mode == Mode::Live => {
                let side = CastleSide::from_cols((to - from).cols);
                if let Some(rook_move) = side.and_then(|side| self.castle_rook_move(from.row(), side)) {
                    debug!(%mv, rook = %rook_move, "castling");
                    self.apply(&rook_move, mode);
                    report.castle = Some(rook_move);
                }
            }
            _ => {}
        }

        self.clear_moves();
        self.last_move = Some(*mv);
        if mode == Mode::Live {
            debug!(%mv, "applied");
        } else {
            trace!(%mv, "applied on scratch board");
        }
        report
    }

    /// Marks the pawn on `(row, col)` as capturable en passant and clears
    /// the mark from every other pawn. Squares without a pawn are ignored.
    pub fn set_true_en_passant(&mut self, row: usize, col: usize) {
        if !self.piece(row, col).is_some_and(|piece| piece.is_pawn()) {
            return;
        }
        self.clear_en_passant();
        if let Some(pawn) = self.squares[row][col].piece_mut() {
            pawn.set_en_passant(true);
        }
        debug!(square = %self.squares[row][col], "en passant allowed");
    }

    pub fn clear_en_passant(&mut self) {
        for square in self.squares.iter_mut().flatten() {
            if let Some(piece) = square.piece_mut() {
                piece.set_en_passant(false);
            }
        }
        self.clear_moves();
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn en_passant_ready() -> Board {
        Board::empty()
            .set_contents(7, 4, Some(Piece::WK))
            .set_contents(0, 4, Some(Piece::BK))
            .set_contents(3, 4, Some(Piece::WP.as_moved()))
            .set_contents(3, 3, Some(Piece::BP.as_moved().with_en_passant()))
    }

    #[test]
    fn test_double_advance_sets_en_passant() {
        let mut board = Board::new().set_contents(3, 0, Some(Piece::BP.as_moved().with_en_passant()));
        let mv = board.calc_moves(6, 4, true).find(4, 4).unwrap();
        board.move_piece(&mv, Mode::Live).unwrap();
        board.set_true_en_passant(4, 4);

        assert!(board.piece(4, 4).unwrap().en_passant());
        assert!(!board.piece(3, 0).unwrap().en_passant());
        let flagged: Vec<_> = board.en_passant_pawns().map(|square| square.coords()).collect();
        assert_eq!(flagged, vec![(4, 4)]);
    }
    #[test]
    fn test_set_en_passant_ignores_other_pieces() {
        let mut board = en_passant_ready();
        board.set_true_en_passant(7, 4);
        board.set_true_en_passant(5, 5);
        assert!(board.piece(3, 3).unwrap().en_passant());
        board.clear_en_passant();
        assert_eq!(board.en_passant_pawns().count(), 0);
    }
    #[test]
    fn test_en_passant_capture() {
        let mut board = en_passant_ready();
        let mv = board.calc_moves(3, 4, true).find(2, 3).unwrap();
        assert_eq!(mv.captured().map(|piece| piece.color()), Some(Color::Black));
        assert!(mv.captured().unwrap().is_pawn());

        let report = board.move_piece(&mv, Mode::Live).unwrap();
        assert_eq!(board.piece(2, 3), Some(Piece::WP.as_moved()));
        assert_eq!(board.piece(3, 3), None);
        assert_eq!(board.piece(3, 4), None);
        assert_eq!(report.en_passant.map(|square| square.coords()), Some((3, 3)));
        assert!(report.capture_sound);
        assert_eq!(report.promotion, None);
    }
    #[test]
    fn test_en_passant_needs_flag() {
        let board = en_passant_ready().set_contents(3, 3, Some(Piece::BP.as_moved()));
        assert!(board.legal_moves(3, 4).find(2, 3).is_none());
    }
    #[test]
    fn test_en_passant_cannot_expose_king_on_the_rank() {
        let board = Board::empty()
            .set_contents(3, 0, Some(Piece::WK.as_moved()))
            .set_contents(0, 4, Some(Piece::BK))
            .set_contents(3, 4, Some(Piece::WP.as_moved()))
            .set_contents(3, 3, Some(Piece::BP.as_moved().with_en_passant()))
            .set_contents(3, 7, Some(Piece::BR));
        assert!(board.pseudo_legal_moves(3, 4).find(2, 3).is_some());
        let moves = board.legal_moves(3, 4);
        assert!(moves.find(2, 3).is_none());
        assert!(moves.find(2, 4).is_some());
    }
    #[test]
    fn test_en_passant_on_scratch_board_is_silent() {
        let mut board = en_passant_ready();
        let mv = board.calc_moves(3, 4, true).find(2, 3).unwrap();
        let report = board.move_piece(&mv, Mode::Testing).unwrap();
        assert_eq!(board.piece(3, 3), None);
        assert!(report.en_passant.is_some());
        assert!(!report.capture_sound);
    }
    #[test]
    fn test_promotion() {
        let mut board = Board::empty()
            .set_contents(7, 4, Some(Piece::WK))
            .set_contents(0, 7, Some(Piece::BK))
            .set_contents(1, 0, Some(Piece::WP.as_moved()));
        let mv = board.calc_moves(1, 0, true).find(0, 0).unwrap();
        let report = board.move_piece(&mv, Mode::Live).unwrap();
        assert_eq!(board.piece(0, 0), Some(Piece::WQ));
        assert_eq!(report.promotion, Some(Piece::WQ));
        assert!(board.cached_moves(0, 0).is_none());
    }
    #[test]
    fn test_promotion_on_capture() {
        let mut board = Board::empty()
            .set_contents(0, 4, Some(Piece::BK))
            .set_contents(7, 4, Some(Piece::WK))
            .set_contents(6, 6, Some(Piece::BP.as_moved()))
            .set_contents(7, 7, Some(Piece::WR));
        let mv = board.calc_moves(6, 6, true).find(7, 7).unwrap();
        assert_eq!(mv.captured(), Some(Piece::WR));
        let report = board.move_piece(&mv, Mode::Live).unwrap();
        assert_eq!(board.piece(7, 7), Some(Piece::BQ));
        assert_eq!(report.promotion, Some(Piece::BQ));
        assert!(!report.capture_sound);
    }
    #[test]
    fn test_scratch_castle_moves_king_only() {
        let mut board = Board::empty()
            .set_contents(7, 4, Some(Piece::WK))
            .set_contents(7, 7, Some(Piece::WR));
        let mv = board.calc_moves(7, 4, true).find(7, 6).unwrap();
        let report = board.move_piece(&mv, Mode::Testing).unwrap();
        assert_eq!(board.piece(7, 7), Some(Piece::WR));
        assert_eq!(report.castle, None);
    }
    #[test]
    fn test_move_must_be_calculated() {
        let mut board = Board::new();
        let mv = Move::new(*board.square(6, 4), *board.square(4, 4));
        let err = board.move_piece(&mv, Mode::Live).unwrap_err();
        assert_eq!(err.downcast_ref::<MoveError>(), Some(&MoveError::InvalidMove));

        board.calc_moves(6, 4, true);
        let err = board
            .move_piece(&Move::new(Square::empty(6, 4), Square::empty(3, 4)), Mode::Live)
            .unwrap_err();
        assert_eq!(err.downcast_ref::<MoveError>(), Some(&MoveError::InvalidMove));
        assert!(board.move_piece(&mv, Mode::Live).is_ok());
    }
    #[test]
    fn test_move_updates_board() {
        let mut board = Board::new();
        board.calc_moves(7, 6, true);
        board.calc_moves(6, 4, true);
        let mv = board.cached_moves(6, 4).unwrap().find(5, 4).unwrap();
        let report = board.move_piece(&mv, Mode::Live).unwrap();

        assert_eq!(report.applied, mv);
        assert_eq!(board.last_move(), Some(&mv));
        assert_eq!(board.piece(6, 4), None);
        assert!(board.piece(5, 4).unwrap().has_moved());
        assert!(board.cached_moves(7, 6).is_none());
        assert!(board.cached_moves(6, 4).is_none());
    }
    #[test]
    fn test_applied_move_keeps_generated_snapshots() {
        let mut board = Board::new().set_contents(5, 3, Some(Piece::BN));
        board.calc_moves(6, 4, true);
        let bare = Move::new(Square::empty(6, 4), Square::empty(5, 3));
        let report = board.move_piece(&bare, Mode::Live).unwrap();
        assert_eq!(report.applied.captured(), Some(Piece::BN));
    }
}
