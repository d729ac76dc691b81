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
use std::ops::Not;
use strum_macros::Display;
use strum_macros::EnumIter;

use Color::{Black, White};

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Row delta of a pawn advance toward the opponent.
    #[inline]
    pub const fn pawn_direction(&self) -> isize {
        match self {
            White => -1,
            Black => 1,
        }
    }
    #[inline]
    pub const fn back_row(&self) -> usize {
        match self {
            White => 7,
            Black => 0,
        }
    }
    #[inline]
    pub const fn pawn_row(&self) -> usize {
        match self {
            White => 6,
            Black => 1,
        }
    }
    /// The row a pawn of this color must stand on to capture en passant.
    #[inline]
    pub const fn en_passant_row(&self) -> usize {
        match self {
            White => 3,
            Black => 4,
        }
    }
}

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            White => Black,
            Black => White,
        }
    }
}

/// The six kinds of chess piece. Pawns carry the extra state the rules
/// need: which way they advance and whether they may be taken en passant.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Pawn { direction: isize, en_passant: bool },
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Kind {
    pub const fn symbol(&self) -> char {
        match self {
            Kind::Pawn { .. } => 'P',
            Kind::Knight => 'N',
            Kind::Bishop => 'B',
            Kind::Rook => 'R',
            Kind::Queen => 'Q',
            Kind::King => 'K',
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
    kind: Kind,
    moved: bool,
}

impl Piece {
    pub const WK: Self = Self::king(White);
    pub const WQ: Self = Self::queen(White);
    pub const WR: Self = Self::rook(White);
    pub const WB: Self = Self::bishop(White);
    pub const WN: Self = Self::knight(White);
    pub const WP: Self = Self::pawn(White);

    pub const BK: Self = Self::king(Black);
    pub const BQ: Self = Self::queen(Black);
    pub const BR: Self = Self::rook(Black);
    pub const BB: Self = Self::bishop(Black);
    pub const BN: Self = Self::knight(Black);
    pub const BP: Self = Self::pawn(Black);

    /// A fresh, unmoved piece. A pawn's direction always follows its color.
    #[inline]
    pub const fn new(color: Color, kind: Kind) -> Self {
        let kind = match kind {
            Kind::Pawn { en_passant, .. } => Kind::Pawn {
                direction: color.pawn_direction(),
                en_passant,
            },
            other => other,
        };
        Self {
            color,
            kind,
            moved: false,
        }
    }

    #[inline]
    pub const fn pawn(color: Color) -> Self {
        Self::new(
            color,
            Kind::Pawn {
                direction: color.pawn_direction(),
                en_passant: false,
            },
        )
    }
    #[inline]
    pub const fn knight(color: Color) -> Self {
        Self::new(color, Kind::Knight)
    }
    #[inline]
    pub const fn bishop(color: Color) -> Self {
        Self::new(color, Kind::Bishop)
    }
    #[inline]
    pub const fn rook(color: Color) -> Self {
        Self::new(color, Kind::Rook)
    }
    #[inline]
    pub const fn queen(color: Color) -> Self {
        Self::new(color, Kind::Queen)
    }
    #[inline]
    pub const fn king(color: Color) -> Self {
        Self::new(color, Kind::King)
    }

    /// Same piece, flagged as having moved already.
    pub fn as_moved(mut self) -> Self {
        self.moved = true;
        self
    }

    /// Same pawn, flagged as capturable en passant. Other kinds are
    /// returned unchanged.
    pub fn with_en_passant(mut self) -> Self {
        self.set_en_passant(true);
        self
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }
    #[inline]
    pub fn has_moved(&self) -> bool {
        self.moved
    }
    #[inline]
    pub fn direction(&self) -> Option<isize> {
        match self.kind {
            Kind::Pawn { direction, .. } => Some(direction),
            _ => None,
        }
    }
    #[inline]
    pub fn en_passant(&self) -> bool {
        matches!(self.kind, Kind::Pawn { en_passant: true, .. })
    }

    pub fn is_pawn(&self) -> bool {
        matches!(self.kind, Kind::Pawn { .. })
    }
    pub fn is_rook(&self) -> bool {
        matches!(self.kind, Kind::Rook)
    }
    pub fn is_king(&self) -> bool {
        matches!(self.kind, Kind::King)
    }

    /// Upper case for white, lower case for black.
    pub fn symbol(&self) -> char {
        match self.color {
            White => self.kind.symbol(),
            Black => self.kind.symbol().to_ascii_lowercase(),
        }
    }

    #[inline]
    pub(crate) fn set_moved(&mut self) {
        self.moved = true;
    }

    pub(crate) fn set_en_passant(&mut self, value: bool) {
        if let Kind::Pawn { en_passant, .. } = &mut self.kind {
            *en_passant = value;
        }
    }
}
