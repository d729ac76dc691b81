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

//! Chess board with move generation and move application
//!
//! A _board_ holds the contents of an 8-by-8 grid and knows enough of
//! the rules of chess to list the moves of any piece and to apply one.
//! The following features are supported:
//!
//! [x] Standard piece movement and captures
//! [x] Castling on either side
//! [x] En passant
//! [x] Promotion (always to a queen)
//! [x] Filtering out moves that leave the king in check
//! [x] Turn order and move history (see `Game`)
//! [ ] Checkmate, stalemate and draw detection
//! [ ] Underpromotion
//! [ ] Move notation
//!
//! Some of the key abstractions include:
//!
//! * A `Square` is a snapshot of one cell of the grid: its row, its
//!   column and the `Piece` on it, if any. Row 0 is the black back
//!   rank and column 0 is the a-file, so `(7, 4)` is named `e1`.
//!   Copying a square copies its contents, which is how moves keep
//!   a record of what they capture.
//!
//! * A `Mask` is a 64-bit (u64) value in which each bit maps to a
//!   square on the board. A `MoveList` uses one to answer "can this
//!   piece land there?" without walking its moves.
//!
//! * A `Piece` is a `Kind` of a specific `Color` plus whether it has
//!   moved. Pawns also carry their direction of travel and whether
//!   they may currently be taken en passant.
//!
//! * A `Move` pairs an origin and a target square. `calc_moves`
//!   generates the moves of one piece and caches them on the board;
//!   `move_piece` only accepts a move found in that cache. Applying
//!   any move clears the cache, so move lists are always rebuilt
//!   against the current grid.
//!
//! * Check detection plays a candidate move on a scratch copy of the
//!   grid in `Mode::Testing` and asks whether any rival piece could
//!   then land on the king. This is simple rather than fast.
//!
//! * A `Game` wraps a board with whose turn it is and the moves
//!   played so far, and takes care of en passant bookkeeping after
//!   each move.
//!

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

mod apply;
mod castling;
mod check;
mod material;
mod moves;
mod play;
mod square;

pub use apply::*;
pub use castling::*;
pub use material::*;
pub use moves::*;
pub use play::*;
pub use square::*;

/// A board set up for a new game.
pub fn initialize_board() -> Board {
    Board::new()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    squares: [[Square; COLS]; ROWS],
    last_move: Option<Move>,
    #[serde(skip)]
    moves: HashMap<(usize, usize), MoveList>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self::empty().init(Color::White).init(Color::Black)
    }

    pub fn empty() -> Self {
        Self {
            squares: std::array::from_fn(|row| std::array::from_fn(|col| Square::empty(row, col))),
            last_move: None,
            moves: HashMap::new(),
        }
    }

    fn init(mut self, color: Color) -> Self {
        const BACK_RANK: [Kind; COLS] = [
            Kind::Rook,
            Kind::Knight,
            Kind::Bishop,
            Kind::Queen,
            Kind::King,
            Kind::Bishop,
            Kind::Knight,
            Kind::Rook,
        ];
        for (col, kind) in BACK_RANK.into_iter().enumerate() {
            self.squares[color.back_row()][col].set_piece(Some(Piece::new(color, kind)));
            self.squares[color.pawn_row()][col].set_piece(Some(Piece::pawn(color)));
        }
        self
    }

    /// Places `piece` on `(row, col)`, or empties it with `None`. Meant for
    /// setting up positions; any cached moves are dropped.
    ///
    /// # Panics
    ///
    /// If `row` or `col` is off the board.
    pub fn set_contents(mut self, row: usize, col: usize, piece: Option<Piece>) -> Self {
        self.squares[row][col].set_piece(piece);
        self.moves.clear();
        self
    }

    /// # Panics
    ///
    /// If `row` or `col` is off the board.
    #[inline]
    pub fn square(&self, row: usize, col: usize) -> &Square {
        &self.squares[row][col]
    }
    pub fn piece(&self, row: usize, col: usize) -> Option<Piece> {
        self.squares.get(row)?.get(col)?.piece()
    }
    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }
    /// All 64 squares, row by row.
    pub fn squares(&self) -> impl Iterator<Item = &Square> {
        self.squares.iter().flatten()
    }
    pub fn occupied_by(&self, color: Color) -> impl Iterator<Item = Square> + '_ {
        self.squares()
            .filter(move |square| square.has_team_piece(color))
            .copied()
    }
    pub fn en_passant_pawns(&self) -> impl Iterator<Item = Square> + '_ {
        self.squares()
            .filter(|square| square.piece().is_some_and(|piece| piece.en_passant()))
            .copied()
    }

    fn trial(&self) -> Self {
        Self {
            squares: self.squares,
            last_move: self.last_move,
            moves: HashMap::new(),
        }
    }
}

impl Index<(usize, usize)> for Board {
    type Output = Square;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.squares[row][col]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.squares {
            for square in row {
                write!(f, "{}", square.piece().map_or('.', |piece| piece.symbol()))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
