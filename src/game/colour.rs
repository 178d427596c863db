//! Sides of the game.

use super::square::Rank;

/// Number of sides (2), used to size per-colour arrays.
pub const NUM_COLOURS: usize = 2;

/// Side a piece belongs to. White always moves first.
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub enum Colour {
    White = 0,
    Black = 1,
}
impl Colour {
    /// Passes the turn to the other side.
    #[inline]
    pub fn invert(&mut self) {
        *self = self.inverse()
    }

    /// The opponent of this side.
    #[inline]
    pub const fn inverse(&self) -> Self {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }

    #[inline]
    pub const fn is_white(&self) -> bool {
        matches!(self, Colour::White)
    }

    /// Rank the king and rooks of this side start on.
    #[inline]
    pub const fn back_rank(&self) -> Rank {
        match self {
            Colour::White => Rank::One,
            Colour::Black => Rank::Eight,
        }
    }

    /// Both colours, white first.
    pub fn iter() -> impl Iterator<Item = Self> {
        [Colour::White, Colour::Black].into_iter()
    }
}
/// `true` stands for Black, as lowercase letters do in FEN.
impl From<bool> for Colour {
    fn from(black: bool) -> Self {
        if black {
            Self::Black
        } else {
            Self::White
        }
    }
}
impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colour::White => write!(f, "white"),
            Colour::Black => write!(f, "black"),
        }
    }
}
