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
use tracing::debug;

use super::apply::{Mode, MoveReport};
use super::material::Color;
use super::moves::{Move, MoveError, MoveList};
use super::square::{COLS, ROWS};
use super::Board;

pub trait Turn {
    fn turn(&self) -> Color;
}

/// A board played from the starting position, one side at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    turn: Color,
    history: Vec<Move>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Turn for Game {
    #[inline]
    fn turn(&self) -> Color {
        self.turn
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_board(Board::new(), Color::White)
    }

    /// Continue from an arbitrary position with `turn` to move.
    pub fn from_board(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            history: Vec::new(),
        }
    }

    /// Reconstruct a game by replaying a sequence of moves from the start.
    pub fn replay(moves: &[Move]) -> Result<Self> {
        let mut game = Self::new();
        for mv in moves {
            game.submit_move(*mv)?;
        }
        Ok(game)
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn history(&self) -> &[Move] {
        &self.history
    }
    /// Is the side to move in check?
    pub fn in_check(&self) -> bool {
        self.board.king_in_check(self.turn)
    }

    /// Legal moves of the piece on `(row, col)`, which must belong to the
    /// side to move. The result is cached so a following `submit_move`
    /// can find it.
    pub fn select(&mut self, row: usize, col: usize) -> Result<&MoveList> {
        self.check_turn(row, col)?;
        Ok(self.board.calc_moves(row, col, true))
    }

    pub fn submit_move(&mut self, mv: Move) -> Result<MoveReport> {
        let (row, col) = mv.from().coords();
        self.check_turn(row, col)?;
        if !self.board.valid_move(&mv) {
            self.board.calc_moves(row, col, true);
        }
        let report = self.board.move_piece(&mv, Mode::Live)?;
        let applied = report.applied;

        let (row, col) = applied.to().coords();
        let double_advance = applied.offset().rows.abs() == 2
            && self.board.piece(row, col).is_some_and(|piece| piece.is_pawn());
        if double_advance {
            self.board.set_true_en_passant(row, col);
        } else {
            self.board.clear_en_passant();
        }

        self.history.push(applied);
        self.turn = !self.turn;
        debug!(mv = %applied, turn = %self.turn, "move submitted");
        Ok(report)
    }

    fn check_turn(&self, row: usize, col: usize) -> Result<()> {
        if row >= ROWS || col >= COLS {
            return Err(MoveError::OutOfRange(row, col).into());
        }
        let square = self.board[(row, col)];
        let piece = square.piece().ok_or(MoveError::Vacant(square))?;
        if piece.color() != self.turn {
            return Err(MoveError::OutOfTurn(piece.color()).into());
        }
        Ok(())
    }
}
