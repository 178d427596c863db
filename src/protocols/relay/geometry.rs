//! Mapping between click pixels and board tiles.
//!
//! Coordinate frames carry the pixel position of a click on the sender's
//! board, drawn White at the bottom below a header and right of a margin.

use crate::game::square::{File, Rank, Tile};

use super::frame::MAX_COORDINATE;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct BoardGeometry {
    /// Side of a tile, in pixels.
    side: u16,
    /// Space left of the board.
    margin: u16,
    /// Space above the board.
    header: u16,
}
impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            side: 100,
            margin: 25,
            header: 66,
        }
    }
}
impl BoardGeometry {
    /// Creates a geometry, as long as tiles are not empty and the whole board
    /// fits in the coordinates a frame can carry.
    pub fn new(side: u16, margin: u16, header: u16) -> Option<Self> {
        let board = 8 * u32::from(side);
        let fits = |offset: u16| u32::from(offset) + board <= u32::from(MAX_COORDINATE);
        (side > 0 && fits(margin) && fits(header)).then_some(Self {
            side,
            margin,
            header,
        })
    }

    /// Tile under the pixel `(x, y)`, if the pixel is on the board.
    pub fn tile_at(&self, x: u16, y: u16) -> Option<Tile> {
        let column = x.checked_sub(self.margin)? / self.side;
        let row = y.checked_sub(self.header)? / self.side;
        if row > 7 {
            return None;
        }
        let file = File::from_index(u8::try_from(column).ok()?)?;
        let rank = Rank::from_index(7 - row as u8)?;
        Some(Tile::new(file, rank))
    }

    /// Centre pixel of a tile.
    pub fn centre_of(&self, tile: Tile) -> (u16, u16) {
        let column = tile.file() as u16;
        let row = 7 - tile.rank() as u16;
        (
            self.margin + column * self.side + self.side / 2,
            self.header + row * self.side + self.side / 2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(name: &str) -> Tile {
        name.parse().unwrap()
    }

    #[test]
    fn corners() {
        let geometry = BoardGeometry::default();
        assert_eq!(geometry.tile_at(25, 66), Some(tile("a8")));
        assert_eq!(geometry.tile_at(824, 865), Some(tile("h1")));
        assert_eq!(geometry.tile_at(24, 100), None);
        assert_eq!(geometry.tile_at(100, 65), None);
        assert_eq!(geometry.tile_at(825, 100), None);
        assert_eq!(geometry.tile_at(100, 866), None);
    }

    #[test]
    fn centres_map_back_to_their_tile() {
        let geometry = BoardGeometry::default();
        assert_eq!(geometry.centre_of(tile("e2")), (475, 716));
        for t in Tile::tiles_iter() {
            let (x, y) = geometry.centre_of(t);
            assert_eq!(geometry.tile_at(x, y), Some(t));
        }
    }

    #[test]
    fn degenerate_geometries_are_rejected() {
        assert_eq!(BoardGeometry::new(0, 25, 66), None);
        assert_eq!(BoardGeometry::new(1250, 0, 0), None);
        assert_eq!(BoardGeometry::new(100, 9200, 66), None);
        assert_eq!(BoardGeometry::new(100, 25, 66), Some(BoardGeometry::default()));

        let small = BoardGeometry::new(1, 0, 0).unwrap();
        assert_eq!(small.tile_at(0, 0), Some(tile("a8")));
        assert_eq!(small.tile_at(7, 7), Some(tile("h1")));
        assert_eq!(small.tile_at(8, 0), None);
    }
}
