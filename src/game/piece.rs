//! Pieces and their per-ply bookkeeping.

use super::{colour::Colour, square::Tile, tileset::TileSet};

/// Total number of different piece kinds (6).
pub const NUM_PIECES: usize = 6;

const PIECE_SYMBOLS: [char; 12] = ['P', 'N', 'B', 'R', 'Q', 'K', 'p', 'n', 'b', 'r', 'q', 'k'];

/// The kind of a piece, one of Pawn, Knight, Bishop, Rook, Queen or King.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}
impl PieceKind {
    /// Material value of the piece kind. Kings are worth nothing since they
    /// cannot be captured.
    #[inline]
    pub const fn value(self) -> u8 {
        match self {
            Self::Pawn => 1,
            Self::Knight | Self::Bishop => 3,
            Self::Rook => 5,
            Self::Queen => 9,
            Self::King => 0,
        }
    }

    /// Display symbol of the piece kind, empty for pawns.
    #[inline]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Pawn => "",
            Self::Knight => "N",
            Self::Bishop => "B",
            Self::Rook => "R",
            Self::Queen => "Q",
            Self::King => "K",
        }
    }

    /// Iterator over all piece kinds.
    pub fn iter() -> impl Iterator<Item = Self> {
        [
            PieceKind::Pawn,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ]
        .into_iter()
    }
}
impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", PIECE_SYMBOLS[NUM_PIECES + *self as usize])
    }
}

/// A piece on the board.
///
/// `legal` and `defended` are derived from the rest of the board and are
/// refreshed after every ply, see [`Board::refresh`](super::board::Board::refresh).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub colour: Colour,
    pub tile: Tile,
    pub moved: bool,
    pub last_move: Tile,
    pub legal: TileSet,
    pub defended: TileSet,
}
impl Piece {
    /// Creates an unmoved piece.
    pub const fn new(kind: PieceKind, colour: Colour, tile: Tile) -> Self {
        Self {
            kind,
            colour,
            tile,
            moved: false,
            last_move: tile,
            legal: TileSet::empty(),
            defended: TileSet::empty(),
        }
    }

    /// Returns this piece once moved to `target`.
    ///
    /// The derived sets are cleared, they are only meaningful once the board
    /// has been refreshed.
    #[must_use]
    pub const fn moved_to(self, target: Tile) -> Self {
        Self {
            tile: target,
            moved: true,
            last_move: self.tile,
            legal: TileSet::empty(),
            defended: TileSet::empty(),
            ..self
        }
    }

    /// Material value of the piece.
    #[inline]
    pub const fn value(&self) -> u8 {
        self.kind.value()
    }

    /// Checks if the last move of this piece was a two-rank advance.
    pub fn just_double_stepped(&self) -> bool {
        self.kind == PieceKind::Pawn
            && self.last_move.file() == self.tile.file()
            && (self.last_move.rank() as i8 - self.tile.rank() as i8).abs() == 2
    }
}
impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            PIECE_SYMBOLS[self.colour as usize * NUM_PIECES + self.kind as usize]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_keeps_identity_and_records_origin() {
        let e2: Tile = "e2".parse().unwrap();
        let e4: Tile = "e4".parse().unwrap();
        let pawn = Piece::new(PieceKind::Pawn, Colour::White, e2);
        assert!(!pawn.moved);
        assert_eq!(pawn.last_move, e2);

        let moved = pawn.moved_to(e4);
        assert_eq!(moved.kind, PieceKind::Pawn);
        assert_eq!(moved.colour, Colour::White);
        assert_eq!(moved.tile, e4);
        assert_eq!(moved.last_move, e2);
        assert!(moved.moved);
        assert!(moved.just_double_stepped());
        // Copy semantics: the source piece keeps its tile.
        assert_eq!(pawn.tile, e2);
    }

    #[test]
    fn symbols() {
        let d1: Tile = "d1".parse().unwrap();
        assert_eq!(Piece::new(PieceKind::Queen, Colour::White, d1).to_string(), "Q");
        assert_eq!(Piece::new(PieceKind::Knight, Colour::Black, d1).to_string(), "n");
        assert_eq!(PieceKind::Pawn.symbol(), "");
        assert_eq!(PieceKind::Queen.value(), 9);
        assert_eq!(PieceKind::King.value(), 0);
    }
}
