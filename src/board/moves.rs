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

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::trace;

use super::material::{Color, Kind, Piece};
use super::square::{Direction, Mask, Occupancy, Offset, Square, COLS, ROWS};
use super::Board;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Not a legal move")]
    InvalidMove,
    #[error("No piece on {0}")]
    Vacant(Square),
    #[error("Not {0}'s turn")]
    OutOfTurn(Color),
    #[error("Square ({0}, {1}) is off the board")]
    OutOfRange(usize, usize),
}

/// A move from one square to another.
///
/// Both squares are snapshots taken when the move was generated, so the
/// target keeps the piece that stood there even after the grid changes.
/// For en passant the target snapshot holds the passed pawn rather than
/// the (empty) landing square's contents.
///
/// Two moves are equal when their coordinates match; the snapshots are
/// informational only.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Move {
    from: Square,
    to: Square,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
    #[inline]
    pub const fn from(&self) -> Square {
        self.from
    }
    #[inline]
    pub const fn to(&self) -> Square {
        self.to
    }
    #[inline]
    pub fn offset(&self) -> Offset {
        self.to - self.from
    }
    #[inline]
    pub fn mover(&self) -> Option<Piece> {
        self.from.piece()
    }

    /// The rival piece taken by this move, as recorded at generation time.
    pub fn captured(&self) -> Option<Piece> {
        let target = self.to.piece()?;
        match self.mover() {
            Some(mover) if mover.color() == target.color() => None,
            _ => Some(target),
        }
    }

    pub fn is_castling(&self) -> bool {
        self.mover().is_some_and(|piece| piece.is_king()) && self.offset().cols.abs() == 2
    }

    pub fn is_double_advance(&self) -> bool {
        self.mover().is_some_and(|piece| piece.is_pawn()) && self.offset().rows.abs() == 2
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from.coords() == other.from.coords() && self.to.coords() == other.to.coords()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.coords().hash(state);
        self.to.coords().hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// The moves of a single piece, in generation order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    moves: Vec<Move>,
    destinations: Mask,
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, mv: Move) {
        self.destinations |= mv.to.to_mask();
        self.moves.push(mv);
    }
    pub fn destinations(&self) -> Mask {
        self.destinations
    }
    pub fn contains(&self, mv: &Move) -> bool {
        self.get(mv).is_some()
    }
    /// The stored move equal to `mv`, carrying its generation-time snapshots.
    pub fn get(&self, mv: &Move) -> Option<Move> {
        let (row, col) = mv.to.coords();
        if !self.destinations.contains(row, col) {
            return None;
        }
        self.moves.iter().find(|m| *m == mv).copied()
    }
    /// The move landing on `(row, col)`, if any.
    pub fn find(&self, row: usize, col: usize) -> Option<Move> {
        if row >= ROWS || col >= COLS || !self.destinations.contains(row, col) {
            return None;
        }
        self.moves.iter().find(|m| m.to.coords() == (row, col)).copied()
    }
    pub fn len(&self) -> usize {
        self.moves.len()
    }
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl Board {
    /// Recomputes the moves of the piece on `(row, col)`, caches them for
    /// `valid_move` and returns them.
    ///
    /// With `filter_checks` off the result is pseudo-legal: moves that
    /// would leave the mover's own king attacked are kept. An empty or
    /// off-board square yields an empty list.
    pub fn calc_moves(&mut self, row: usize, col: usize, filter_checks: bool) -> &MoveList {
        let list = self.generate(row, col, filter_checks);
        trace!(row, col, filter_checks, count = list.len(), "calculated moves");
        let slot = self.moves.entry((row, col)).or_default();
        *slot = list;
        slot
    }

    /// Legal moves of the piece on `(row, col)`, without touching the cache.
    pub fn legal_moves(&self, row: usize, col: usize) -> MoveList {
        self.generate(row, col, true)
    }

    pub fn pseudo_legal_moves(&self, row: usize, col: usize) -> MoveList {
        self.generate(row, col, false)
    }

    /// The list last produced by `calc_moves` for `(row, col)`, unless a
    /// move has been applied since.
    pub fn cached_moves(&self, row: usize, col: usize) -> Option<&MoveList> {
        self.moves.get(&(row, col))
    }

    pub fn valid_move(&self, mv: &Move) -> bool {
        let (row, col) = mv.from.coords();
        self.cached_moves(row, col)
            .is_some_and(|list| list.contains(mv))
    }

    pub(super) fn clear_moves(&mut self) {
        self.moves.clear();
    }

    fn generate(&self, row: usize, col: usize, filter_checks: bool) -> MoveList {
        if row >= ROWS || col >= COLS {
            return MoveList::new();
        }
        let from = self.squares[row][col];
        let Some(piece) = from.piece() else {
            return MoveList::new();
        };
        let mut generator = Generator::new(self, from, piece, filter_checks);
        match piece.kind() {
            Kind::Pawn { direction, .. } => generator.pawn_moves(direction),
            Kind::Knight => generator.leaper_moves(&KNIGHT_MOVES),
            Kind::Bishop => generator.line_moves(Direction::diagonals()),
            Kind::Rook => generator.line_moves(Direction::horizontals()),
            Kind::Queen => generator.line_moves(Direction::iter()),
            Kind::King => {
                generator.leaper_moves(&KING_MOVES);
                generator.castle_moves();
            }
        }
        generator.moves
    }
}

pub(super) struct Generator<'a> {
    pub(super) board: &'a Board,
    pub(super) from: Square,
    pub(super) piece: Piece,
    pub(super) filter_checks: bool,
    moves: MoveList,
}

impl<'a> Generator<'a> {
    fn new(board: &'a Board, from: Square, piece: Piece, filter_checks: bool) -> Self {
        Self {
            board,
            from,
            piece,
            filter_checks,
            moves: MoveList::new(),
        }
    }

    #[inline]
    pub(super) fn square(&self, row: usize, col: usize) -> Square {
        self.board.squares[row][col]
    }

    #[inline]
    fn color(&self) -> Color {
        self.piece.color()
    }

    /// Adds the move onto `to` unless filtering is on and it would expose
    /// the mover's king. A rejected square does not end the scan.
    fn offer(&mut self, to: Square) {
        let mv = Move::new(self.from, to);
        if self.filter_checks && self.board.in_check(&mv) {
            return;
        }
        self.moves.push(mv);
    }

    pub(super) fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    fn leaper_moves(&mut self, table: &[Mask; ROWS * COLS]) {
        for (row, col) in table[self.from.to_index()].iter() {
            let to = self.square(row, col);
            if to.is_empty_or_rival(self.color()) {
                self.offer(to);
            }
        }
    }

    fn line_moves(&mut self, directions: impl Iterator<Item = Direction>) {
        for direction in directions {
            let offset: Offset = direction.into();
            let mut next = offset.step(self.from.row(), self.from.col());
            while let Some((row, col)) = next {
                let to = self.square(row, col);
                match to.occupancy(self.color()) {
                    Occupancy::Empty => self.offer(to),
                    Occupancy::Rival => {
                        self.offer(to);
                        break;
                    }
                    Occupancy::Team => break,
                }
                next = offset.step(row, col);
            }
        }
    }

    fn pawn_moves(&mut self, direction: isize) {
        let (row, col) = self.from.coords();

        let steps = if self.piece.has_moved() { 1 } else { 2 };
        let advance = Offset::new(direction, 0);
        let mut next = advance.step(row, col);
        for _ in 0..steps {
            let Some((r, c)) = next else {
                break;
            };
            let to = self.square(r, c);
            if to.has_piece() {
                break;
            }
            self.offer(to);
            next = advance.step(r, c);
        }

        for side in [-1, 1] {
            if let Some((r, c)) = Offset::new(direction, side).step(row, col) {
                let to = self.square(r, c);
                if to.has_rival_piece(self.color()) {
                    self.offer(to);
                }
            }
        }

        if row != self.color().en_passant_row() {
            return;
        }
        for side in [-1, 1] {
            let Some((r, c)) = Offset::new(0, side).step(row, col) else {
                continue;
            };
            let Some(passed) = self.square(r, c).piece() else {
                continue;
            };
            if passed.color() == self.color() || !passed.en_passant() {
                continue;
            }
            if let Some((r, c)) = Offset::new(direction, side).step(row, col) {
                // the landing square is empty; record the passed pawn instead
                self.offer(Square::new(r, c, Some(passed)));
            }
        }
    }
}

static KNIGHT_MOVES: Lazy<[Mask; ROWS * COLS]> = Lazy::new(|| {
    const OFFSETS: [Offset; 8] = [
        Offset::new(-2, 1),
        Offset::new(-1, 2),
        Offset::new(1, 2),
        Offset::new(2, 1),
        Offset::new(2, -1),
        Offset::new(1, -2),
        Offset::new(-1, -2),
        Offset::new(-2, -1),
    ];
    targets(&OFFSETS)
});

static KING_MOVES: Lazy<[Mask; ROWS * COLS]> = Lazy::new(|| {
    let offsets: Vec<Offset> = Direction::iter().map(Offset::from).collect();
    targets(&offsets)
});

fn targets(offsets: &[Offset]) -> [Mask; ROWS * COLS] {
    let mut array = [Mask::empty(); ROWS * COLS];
    for row in 0..ROWS {
        for col in 0..COLS {
            array[row * COLS + col] =
                Mask::from_coords(offsets.iter().filter_map(|offset| offset.step(row, col)));
        }
    }
    array
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn destinations(list: &MoveList) -> Vec<(usize, usize)> {
        list.iter().map(|mv| mv.to().coords()).collect()
    }

    #[test]
    fn test_white_pawn_advance() {
        let mut board = Board::new();
        let moves = board.calc_moves(6, 4, true);
        assert_eq!(destinations(moves), vec![(5, 4), (4, 4)]);
    }
    #[test]
    fn test_black_pawn_advance() {
        let board = Board::new();
        let moves = board.legal_moves(1, 3);
        assert_eq!(destinations(&moves), vec![(2, 3), (3, 3)]);
    }
    #[test]
    fn test_moved_pawn_advances_one_square() {
        let board = Board::empty().set_contents(5, 0, Some(Piece::WP.as_moved()));
        let moves = board.legal_moves(5, 0);
        assert_eq!(destinations(&moves), vec![(4, 0)]);
    }
    #[test]
    fn test_white_pawn_advance_blocked() {
        let board = Board::new().set_contents(5, 4, Some(Piece::BB));
        let moves = board.legal_moves(6, 4);
        assert!(moves.find(5, 4).is_none());
        assert!(moves.find(4, 4).is_none());
    }
    #[test]
    fn test_white_pawn_double_advance_blocked() {
        let board = Board::new().set_contents(4, 4, Some(Piece::BB));
        let moves = board.legal_moves(6, 4);
        assert!(moves.find(5, 4).is_some());
        assert!(moves.find(4, 4).is_none());
    }
    #[test]
    fn test_pawn_captures_rivals_only() {
        let board = Board::new()
            .set_contents(5, 3, Some(Piece::BB))
            .set_contents(5, 5, Some(Piece::WN));
        let moves = board.legal_moves(6, 4);
        let capture = moves.find(5, 3).unwrap();
        assert_eq!(capture.captured(), Some(Piece::BB));
        assert!(moves.find(5, 5).is_none());
    }
    #[test]
    fn test_pawn_on_last_row_has_no_advance() {
        let board = Board::empty().set_contents(0, 0, Some(Piece::WP.as_moved()));
        assert!(board.legal_moves(0, 0).is_empty());
    }
    #[test]
    fn test_knight_destinations() {
        let board = Board::new();
        let moves = board.legal_moves(7, 6);
        assert_eq!(destinations(&moves), vec![(5, 5), (5, 7)]);
    }
    #[test]
    fn test_knight_blocked() {
        let board = Board::new()
            .set_contents(5, 5, Some(Piece::WP))
            .set_contents(5, 7, Some(Piece::WP));
        assert!(board.legal_moves(7, 6).is_empty());
    }
    #[test]
    fn test_knight_in_corner() {
        let board = Board::empty().set_contents(0, 0, Some(Piece::BN));
        let moves = board.legal_moves(0, 0);
        assert_eq!(destinations(&moves), vec![(1, 2), (2, 1)]);
    }
    #[test]
    fn test_rook_destinations() {
        let board = Board::new()
            .set_contents(6, 0, None)
            .set_contents(7, 1, None);
        let moves = board.legal_moves(7, 0);
        assert_eq!(moves.len(), 7);
        assert!(moves.find(7, 1).is_some());
        assert!(moves.find(7, 2).is_none());
        assert!(moves.find(5, 0).is_some());
        assert_eq!(moves.find(1, 0).unwrap().captured(), Some(Piece::BP));
        assert!(moves.find(0, 0).is_none());
    }
    #[test]
    fn test_bishop_destinations() {
        let board = Board::new().set_contents(6, 3, None);
        let moves = board.legal_moves(7, 2);
        assert_eq!(destinations(&moves), vec![(6, 3), (5, 4), (4, 5), (3, 6), (2, 7)]);
    }
    #[test]
    fn test_queen_on_open_board() {
        let board = Board::empty()
            .set_contents(7, 4, Some(Piece::WK))
            .set_contents(4, 3, Some(Piece::WQ));
        assert_eq!(board.legal_moves(4, 3).len(), 27);
    }
    #[test]
    fn test_blocked_at_start() {
        let board = Board::new();
        assert!(board.legal_moves(7, 0).is_empty());
        assert!(board.legal_moves(7, 2).is_empty());
        assert!(board.legal_moves(7, 3).is_empty());
        assert!(board.legal_moves(7, 4).is_empty());
    }
    #[test]
    fn test_king_moves_one_square() {
        let board = Board::new().set_contents(6, 4, None);
        let moves = board.legal_moves(7, 4);
        assert_eq!(destinations(&moves), vec![(6, 4)]);
    }
    #[test]
    fn test_pinned_rook_stays_on_the_line() {
        let board = Board::empty()
            .set_contents(7, 4, Some(Piece::WK))
            .set_contents(5, 4, Some(Piece::WR))
            .set_contents(2, 4, Some(Piece::BR));
        let legal = board.legal_moves(5, 4);
        let mut found = destinations(&legal);
        found.sort();
        assert_eq!(found, vec![(2, 4), (3, 4), (4, 4), (6, 4)]);
        assert_eq!(board.pseudo_legal_moves(5, 4).len(), 11);
    }
    #[test]
    fn test_destinations_never_hold_team_pieces() {
        let board = Board::new()
            .set_contents(6, 3, None)
            .set_contents(6, 4, None)
            .set_contents(4, 4, Some(Piece::WN))
            .set_contents(3, 3, Some(Piece::BQ))
            .set_contents(5, 2, Some(Piece::WP.as_moved()));
        for square in board.squares() {
            let Some(piece) = square.piece() else {
                continue;
            };
            for mv in &board.pseudo_legal_moves(square.row(), square.col()) {
                let (row, col) = mv.to().coords();
                assert!(Square::in_range(row as isize, col as isize));
                assert!(!board.square(row, col).has_team_piece(piece.color()), "{mv}");
            }
        }
    }
    #[test]
    fn test_calc_moves_off_board_or_empty() {
        let mut board = Board::new();
        assert!(board.calc_moves(8, 0, true).is_empty());
        assert!(board.calc_moves(4, 4, true).is_empty());
    }
    #[test]
    fn test_valid_move_ignores_snapshots() {
        let mut board = Board::new();
        assert!(!board.valid_move(&Move::new(Square::empty(6, 4), Square::empty(4, 4))));
        board.calc_moves(6, 4, true);
        assert!(board.valid_move(&Move::new(Square::empty(6, 4), Square::empty(4, 4))));
        assert!(!board.valid_move(&Move::new(Square::empty(6, 4), Square::empty(3, 4))));
    }
    #[test]
    fn test_move_list_destinations() {
        let board = Board::new();
        let moves = board.legal_moves(7, 1);
        assert_eq!(moves.destinations(), Mask::from_coords([(5, 0), (5, 2)]));
        assert_eq!(moves.destinations().len(), moves.len());
    }
    #[test]
    fn test_move_helpers() {
        let board = Board::new();
        let double = board.legal_moves(6, 4).find(4, 4).unwrap();
        assert!(double.is_double_advance());
        assert!(!double.is_castling());
        assert_eq!(double.captured(), None);
        assert_eq!(double.to_string(), "e2e4");
    }
}
