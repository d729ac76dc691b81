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
use std::fmt;
use std::ops::{BitOr, BitOrAssign, Sub};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use super::material::{Color, Piece};

pub const ROWS: usize = 8;
pub const COLS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupancy {
    Empty,
    Team,
    Rival,
}

/// One cell of the board grid.
///
/// The coordinates of a square never change once the board is built; only
/// its occupant does. Squares are plain data, so copying one out of the grid
/// takes a snapshot of whatever piece stands on it at that moment.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    row: usize,
    col: usize,
    piece: Option<Piece>,
}

impl Square {
    #[inline]
    pub const fn new(row: usize, col: usize, piece: Option<Piece>) -> Self {
        debug_assert!(row < ROWS && col < COLS);
        Self { row, col, piece }
    }
    #[inline]
    pub const fn empty(row: usize, col: usize) -> Self {
        Self::new(row, col, None)
    }

    /// Range check performed before any signed coordinate is turned into
    /// a grid access.
    #[inline]
    pub const fn in_range(row: isize, col: isize) -> bool {
        row >= 0 && row < ROWS as isize && col >= 0 && col < COLS as isize
    }

    #[inline]
    pub const fn row(&self) -> usize {
        self.row
    }
    #[inline]
    pub const fn col(&self) -> usize {
        self.col
    }
    #[inline]
    pub const fn coords(&self) -> (usize, usize) {
        (self.row, self.col)
    }
    #[inline]
    pub const fn to_index(&self) -> usize {
        self.row * COLS + self.col
    }
    #[inline]
    pub const fn to_mask(&self) -> Mask {
        Mask::square(self.row, self.col)
    }
    #[inline]
    pub const fn file(&self) -> File {
        File::from_index(self.col)
    }
    #[inline]
    pub const fn rank(&self) -> Rank {
        Rank::from_index(self.row)
    }

    #[inline]
    pub const fn piece(&self) -> Option<Piece> {
        self.piece
    }
    #[inline]
    pub(crate) fn piece_mut(&mut self) -> Option<&mut Piece> {
        self.piece.as_mut()
    }
    #[inline]
    pub(crate) fn set_piece(&mut self, piece: Option<Piece>) {
        self.piece = piece;
    }
    #[inline]
    pub(crate) fn take(&mut self) -> Option<Piece> {
        self.piece.take()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.piece.is_none()
    }
    #[inline]
    pub const fn has_piece(&self) -> bool {
        self.piece.is_some()
    }
    #[inline]
    pub fn has_team_piece(&self, color: Color) -> bool {
        self.occupancy(color) == Occupancy::Team
    }
    #[inline]
    pub fn has_rival_piece(&self, color: Color) -> bool {
        self.occupancy(color) == Occupancy::Rival
    }
    #[inline]
    pub fn is_empty_or_rival(&self, color: Color) -> bool {
        self.occupancy(color) != Occupancy::Team
    }

    pub fn occupancy(&self, color: Color) -> Occupancy {
        match self.piece {
            None => Occupancy::Empty,
            Some(piece) if piece.color() == color => Occupancy::Team,
            Some(_) => Occupancy::Rival,
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl Sub for Square {
    type Output = Offset;
    fn sub(self, rhs: Self) -> Self::Output {
        Offset::new(
            self.row as isize - rhs.row as isize,
            self.col as isize - rhs.col as isize,
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum File {
    FileA, FileB, FileC, FileD, FileE, FileF, FileG, FileH,
}

use File::{
    FileA, FileB, FileC, FileD, FileE, FileF, FileG, FileH,
};

impl File {
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        const VALUES: [File; 8] = [
            FileA, FileB, FileC, FileD, FileE, FileF, FileG, FileH,
        ];
        debug_assert!(index < 8);
        VALUES[index]
    }
    #[inline]
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const VALUES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
        write!(f, "{}", VALUES[self.to_index()])
    }
}

/// Ranks are indexed from the far side of the board, so a rank's index
/// is also the grid row it covers (`Rank8` is row 0).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Rank {
    Rank8, Rank7, Rank6, Rank5, Rank4, Rank3, Rank2, Rank1,
}

use Rank::{
    Rank8, Rank7, Rank6, Rank5, Rank4, Rank3, Rank2, Rank1,
};

impl Rank {
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        const VALUES: [Rank; 8] = [
            Rank8, Rank7, Rank6, Rank5, Rank4, Rank3, Rank2, Rank1,
        ];
        debug_assert!(index < 8);
        VALUES[index]
    }
    #[inline]
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", 8 - self.to_index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub rows: isize,
    pub cols: isize,
}

impl Offset {
    pub const fn new(rows: isize, cols: isize) -> Self {
        Self { rows, cols }
    }

    /// The coordinates one step away from `(row, col)`, or `None` when the
    /// step leaves the board.
    #[inline]
    pub fn step(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        let row = row as isize + self.rows;
        let col = col as isize + self.cols;
        if !Square::in_range(row, col) {
            return None;
        }
        Some((row as usize, col as usize))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Left,
    Right,
    DownLeft,
    Down,
    DownRight,
}

use Direction::{
    UpLeft,
    Up,
    UpRight,
    Left,
    Right,
    DownLeft,
    Down,
    DownRight,
};

impl Direction {
    pub fn horizontals() -> impl Iterator<Item=Self> {
        [Up, Right, Down, Left].into_iter()
    }
    pub fn diagonals() -> impl Iterator<Item=Self> {
        [UpRight, UpLeft, DownRight, DownLeft].into_iter()
    }
}

impl From<Direction> for Offset {
    fn from(value: Direction) -> Self {
        match value {
            UpLeft => Self::new(-1, -1),
            Up => Self::new(-1, 0),
            UpRight => Self::new(-1, 1),
            Left => Self::new(0, -1),
            Right => Self::new(0, 1),
            DownLeft => Self::new(1, -1),
            Down => Self::new(1, 0),
            DownRight => Self::new(1, 1),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask(u64);

impl Mask {
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn square(row: usize, col: usize) -> Self {
        debug_assert!(row < ROWS && col < COLS);
        Self(0x1 << (63 - (row * COLS + col)))
    }

    pub fn from_coords<I>(coords: I) -> Self
    where
        I: IntoIterator<Item=(usize, usize)>,
    {
        coords.into_iter()
            .map(|(row, col)| Self::square(row, col))
            .fold(Self::empty(), |m1, m2| m1 | m2)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        (self.0 & Self::square(row, col).0) != 0
    }

    pub fn iter(&self) -> MaskIter {
        MaskIter(self.0)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter() {
            for file in File::iter() {
                let set = self.contains(rank.to_index(), file.to_index());
                write!(f, "{}", if set { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl BitOr for Mask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Yields `(row, col)` pairs in grid order, row 0 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskIter(u64);

impl Iterator for MaskIter {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            let index = self.0.leading_zeros() as usize;
            self.0 &= !(1u64 << (63 - index));
            return Some((index / COLS, index % COLS));
        }
        None
    }
}
