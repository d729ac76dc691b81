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

use tracing::trace;

use super::apply::Mode;
use super::material::Color;
use super::moves::Move;
use super::square::Square;
use super::Board;

impl Board {
    /// Would playing `mv` leave the mover's king attacked?
    ///
    /// The move is played on a scratch copy of the grid in testing mode, and
    /// every rival piece's pseudo-legal moves are then searched for one that
    /// lands on that king. The live board is never touched.
    ///
    /// Each call costs a full pseudo-legal generation for every rival
    /// piece, and legal generation makes one call per candidate move.
    ///
    /// A move with either end off the board is never reported as check.
    pub fn in_check(&self, mv: &Move) -> bool {
        let on_board = |square: Square| Square::in_range(square.row() as isize, square.col() as isize);
        if !on_board(mv.from()) || !on_board(mv.to()) {
            return false;
        }
        let (row, col) = mv.from().coords();
        let Some(piece) = self.piece(row, col).or(mv.mover()) else {
            return false;
        };
        let exposed = self.exposes_king(piece.color(), &[*mv]);
        trace!(%mv, exposed, "check test");
        exposed
    }

    /// Is the `color` king attacked right now?
    pub fn king_in_check(&self, color: Color) -> bool {
        self.occupied_by(!color).any(|square| {
            self.pseudo_legal_moves(square.row(), square.col())
                .iter()
                .any(|mv| {
                    mv.to()
                        .piece()
                        .is_some_and(|piece| piece.is_king() && piece.color() == color)
                })
        })
    }

    /// Plays `moves` in order on a scratch copy and reports whether the
    /// `color` king ends up attacked.
    pub(super) fn exposes_king(&self, color: Color, moves: &[Move]) -> bool {
        let mut trial = self.trial();
        for mv in moves {
            trial.apply(mv, Mode::Testing);
        }
        trial.king_in_check(color)
    }
}
