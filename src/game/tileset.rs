//! Sets of tiles, stored as one bit per tile.

use std::iter::FusedIterator;

use super::square::Tile;

#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
/// A set of up to 64 tiles.
///
/// Bit `n` is set when the tile of index `n` (see [`Tile::index`]) is in the set.
pub struct TileSet(u64);
impl std::fmt::Debug for TileSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
impl TileSet {
    /// Returns an empty set.
    #[inline(always)]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Checks if the set is empty.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Checks if a given tile is in the set.
    #[inline(always)]
    pub const fn contains(self, tile: Tile) -> bool {
        self.0 & (1u64 << tile.index()) != 0
    }

    /// Adds a tile to the set.
    #[inline(always)]
    pub fn insert(&mut self, tile: Tile) {
        self.0 |= 1u64 << tile.index()
    }

    /// Removes a tile from the set.
    #[inline(always)]
    pub fn remove(&mut self, tile: Tile) {
        self.0 &= !(1u64 << tile.index())
    }

    /// Returns the cardinality of the set.
    #[inline(always)]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Checks if every tile of `self` is also in `other`.
    #[inline(always)]
    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterates over the tiles of the set, by ascending index.
    pub fn iter(self) -> TileSetIter {
        TileSetIter(self.0)
    }
}
impl std::ops::BitOr for TileSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}
impl std::ops::BitOrAssign for TileSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}
impl std::ops::BitAnd for TileSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}
impl std::ops::Sub for TileSet {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 & !rhs.0)
    }
}
impl FromIterator<Tile> for TileSet {
    fn from_iter<T: IntoIterator<Item = Tile>>(iter: T) -> Self {
        let mut set = Self::empty();
        for tile in iter {
            set.insert(tile)
        }
        set
    }
}
impl Extend<Tile> for TileSet {
    fn extend<T: IntoIterator<Item = Tile>>(&mut self, iter: T) {
        for tile in iter {
            self.insert(tile)
        }
    }
}
impl IntoIterator for TileSet {
    type Item = Tile;
    type IntoIter = TileSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the tiles of a [`TileSet`].
pub struct TileSetIter(u64);
impl Iterator for TileSetIter {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Tile::from_index(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}
impl ExactSizeIterator for TileSetIter {}
impl FusedIterator for TileSetIter {}
