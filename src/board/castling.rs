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

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tracing::trace;

use super::material::Color;
use super::moves::{Generator, Move};
use super::square::{Mask, COLS};
use super::Board;

use CastleSide::*;

/// Column the king starts the game on.
pub const KING_COL: usize = 4;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CastleSide {
    /// Toward column 0.
    Long,
    /// Toward column 7.
    Short,
}

impl CastleSide {
    /// The side a king move of `cols` columns castles to, if any.
    pub const fn from_cols(cols: isize) -> Option<Self> {
        match cols {
            -2 => Some(Long),
            2 => Some(Short),
            _ => None,
        }
    }
    pub fn of(mv: &Move) -> Option<Self> {
        if !mv.is_castling() {
            return None;
        }
        Self::from_cols(mv.offset().cols)
    }
    #[inline]
    pub const fn rook_col(&self) -> usize {
        match self {
            Long => 0,
            Short => COLS - 1,
        }
    }
    #[inline]
    pub const fn king_dest_col(&self) -> usize {
        match self {
            Long => 2,
            Short => 6,
        }
    }
    /// Also the square the king crosses on its way.
    #[inline]
    pub const fn rook_dest_col(&self) -> usize {
        match self {
            Long => 3,
            Short => 5,
        }
    }
    /// Squares strictly between the king's home square and the rook.
    pub fn blocking_lane(&self, row: usize) -> Mask {
        let cols = match self {
            Long => 1..KING_COL,
            Short => KING_COL + 1..COLS - 1,
        };
        Mask::from_coords(cols.map(|col| (row, col)))
    }
}

impl Board {
    /// The rook half of castling to `side` on `row`, read off the current
    /// grid. `None` when that corner holds no rook.
    pub fn castle_rook_move(&self, row: usize, side: CastleSide) -> Option<Move> {
        let from = self.squares[row][side.rook_col()];
        if !from.piece()?.is_rook() {
            return None;
        }
        Some(Move::new(from, self.squares[row][side.rook_dest_col()]))
    }

    fn castle_is_safe(&self, color: Color, side: CastleSide, king_move: &Move, rook_move: &Move) -> bool {
        if self.king_in_check(color) {
            return false;
        }
        let (row, _) = king_move.from().coords();
        let transit = Move::new(king_move.from(), self.squares[row][side.rook_dest_col()]);
        if self.in_check(&transit) {
            return false;
        }
        !self.exposes_king(color, &[*rook_move, *king_move])
    }
}

impl Generator<'_> {
    pub(super) fn castle_moves(&mut self) {
        let color = self.piece.color();
        let (row, col) = self.from.coords();
        if self.piece.has_moved() || row != color.back_row() || col != KING_COL {
            return;
        }
        for side in CastleSide::iter() {
            let Some(rook_move) = self.board.castle_rook_move(row, side) else {
                continue;
            };
            let Some(rook) = rook_move.mover() else {
                continue;
            };
            if rook.color() != color || rook.has_moved() {
                continue;
            }
            if side
                .blocking_lane(row)
                .iter()
                .any(|(r, c)| self.square(r, c).has_piece())
            {
                continue;
            }
            let king_move = Move::new(self.from, self.square(row, side.king_dest_col()));
            if self.filter_checks && !self.board.castle_is_safe(color, side, &king_move, &rook_move) {
                trace!(%king_move, "castling through or into check");
                continue;
            }
            self.push(king_move);
        }
    }
}
