//! # Move patterns
//! Pseudo-legal move generation, piece kind by piece kind.
//!
//! Patterns are pure functions of a piece kind, its colour and its tile. They
//! ignore occupancy entirely: [`block_tiles`] then trims them against the
//! actual occupancy of the board.
//!
//! Queens do not have a generator of their own, their rays are the union of the
//! bishop and rook rays.

use super::{
    colour::Colour,
    piece::{Piece, PieceKind},
    square::{Delta, Rank, Tile},
    tileset::TileSet,
};

/// Tiles reached along a single direction, closest first.
pub type Ray = heapless::Vec<Tile, 7>;
/// Rays of a sliding piece, one per direction.
pub type Rays = heapless::Vec<Ray, 8>;

/// Traces a ray from (excluding) `origin` to the edge of the board.
fn trace(origin: Tile, delta: Delta) -> Ray {
    let mut ray = Ray::new();
    let mut current = origin;
    while let Some(next) = current.translate(delta) {
        if ray.push(next).is_err() {
            break;
        }
        current = next;
    }
    ray
}

fn trace_all(origin: Tile, deltas: &[Delta]) -> Rays {
    let mut rays = Rays::new();
    for &delta in deltas {
        if rays.push(trace(origin, delta)).is_err() {
            break;
        }
    }
    rays
}

/// Diagonal rays of a bishop standing on `origin`.
pub fn bishop_rays(origin: Tile) -> Rays {
    trace_all(origin, &Delta::DIAGONAL_DELTAS)
}

/// Orthogonal rays of a rook standing on `origin`.
pub fn rook_rays(origin: Tile) -> Rays {
    trace_all(origin, &Delta::ORTHOGONAL_DELTAS)
}

/// Rays of a queen standing on `origin`: the bishop rays, then the rook rays.
pub fn queen_rays(origin: Tile) -> Rays {
    let mut rays = bishop_rays(origin);
    for ray in rook_rays(origin) {
        if rays.push(ray).is_err() {
            break;
        }
    }
    rays
}

/// Rays of any piece kind. Only sliders have any.
pub fn rays(kind: PieceKind, origin: Tile) -> Rays {
    match kind {
        PieceKind::Bishop => bishop_rays(origin),
        PieceKind::Rook => rook_rays(origin),
        PieceKind::Queen => queen_rays(origin),
        _ => Rays::new(),
    }
}

fn leaps(origin: Tile, deltas: &[Delta]) -> TileSet {
    deltas.iter().filter_map(|&d| origin.translate(d)).collect()
}

/// Direction pawns of the given colour walk in.
#[inline]
pub const fn pawn_push(colour: Colour) -> Delta {
    if colour.is_white() {
        Delta::North
    } else {
        Delta::South
    }
}

/// Rank from which pawns of the given colour may advance two tiles.
#[inline]
pub const fn pawn_home_rank(colour: Colour) -> Rank {
    if colour.is_white() {
        Rank::Two
    } else {
        Rank::Seven
    }
}

/// Rank on which pawns of the given colour promote.
#[inline]
pub const fn pawn_promotion_rank(colour: Colour) -> Rank {
    colour.inverse().back_rank()
}

/// Forward tiles of a pawn, closest first.
fn pawn_pushes(colour: Colour, origin: Tile) -> heapless::Vec<Tile, 2> {
    let mut pushes = heapless::Vec::new();
    let delta = pawn_push(colour);
    if let Some(single) = origin.translate(delta) {
        let _ = pushes.push(single);
        if origin.rank() == pawn_home_rank(colour) {
            if let Some(double) = single.translate(delta) {
                let _ = pushes.push(double);
            }
        }
    }
    pushes
}

/// Forward diagonals of a pawn.
pub fn pawn_attacks(colour: Colour, origin: Tile) -> TileSet {
    let dr = pawn_push(colour).offsets().1;
    [origin.offset(-1, dr), origin.offset(1, dr)]
        .into_iter()
        .flatten()
        .collect()
}

/// Every tile a piece could geometrically reach, ignoring all other pieces.
pub fn moving_pattern(kind: PieceKind, colour: Colour, origin: Tile) -> TileSet {
    match kind {
        PieceKind::Pawn => pawn_pushes(colour, origin).into_iter().collect(),
        PieceKind::Knight => leaps(origin, &Delta::KNIGHT_DELTAS),
        PieceKind::King => leaps(origin, &Delta::KING_DELTAS),
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            rays(kind, origin).into_iter().flatten().collect()
        }
    }
}

/// Tiles a piece threatens, ignoring all other pieces. Identical to
/// [`moving_pattern`] for everything but pawns.
pub fn attack(kind: PieceKind, colour: Colour, origin: Tile) -> TileSet {
    match kind {
        PieceKind::Pawn => pawn_attacks(colour, origin),
        _ => moving_pattern(kind, colour, origin),
    }
}

/// Which piece stands on each tile of the board.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Occupancy {
    tiles: [Option<(PieceKind, Colour)>; 64],
}
impl Occupancy {
    /// Builds the occupancy of a set of pieces.
    pub fn from_pieces<'a>(pieces: impl IntoIterator<Item = &'a Piece>) -> Self {
        let mut tiles = [None; 64];
        for piece in pieces {
            tiles[piece.tile.index() as usize] = Some((piece.kind, piece.colour));
        }
        Self { tiles }
    }

    /// Returns the piece kind and colour on a given tile, if any.
    #[inline]
    pub fn piece_on(&self, tile: Tile) -> Option<(PieceKind, Colour)> {
        self.tiles[tile.index() as usize]
    }

    /// Checks if any piece stands on the tile.
    #[inline]
    pub fn is_occupied(&self, tile: Tile) -> bool {
        self.piece_on(tile).is_some()
    }

    /// Colour of the piece on `tile`, if any.
    #[inline]
    pub fn colour_on(&self, tile: Tile) -> Option<Colour> {
        self.piece_on(tile).map(|(_, colour)| colour)
    }
}

/// Reach of a piece once blocked by the board occupancy.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Reach {
    /// Tiles the piece may move to (empty tiles and captures).
    pub legal: TileSet,
    /// Tiles holding a friendly piece that this piece guards.
    pub defended: TileSet,
}

/// Trims the pattern of a piece against the board occupancy.
pub fn block_tiles(piece: &Piece, occupancy: &Occupancy) -> Reach {
    let mut reach = Reach::default();
    let colour = piece.colour;

    match piece.kind {
        PieceKind::Pawn => {
            for push in pawn_pushes(colour, piece.tile) {
                if occupancy.is_occupied(push) {
                    break;
                }
                reach.legal.insert(push)
            }
            for target in pawn_attacks(colour, piece.tile) {
                match occupancy.colour_on(target) {
                    Some(c) if c == colour => reach.defended.insert(target),
                    Some(_) => reach.legal.insert(target),
                    None => (),
                }
            }
        }
        PieceKind::Knight | PieceKind::King => {
            for target in moving_pattern(piece.kind, colour, piece.tile) {
                match occupancy.colour_on(target) {
                    Some(c) if c == colour => reach.defended.insert(target),
                    _ => reach.legal.insert(target),
                }
            }
        }
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            for ray in rays(piece.kind, piece.tile) {
                for target in ray {
                    match occupancy.colour_on(target) {
                        None => reach.legal.insert(target),
                        Some(c) => {
                            if c == colour {
                                reach.defended.insert(target)
                            } else {
                                reach.legal.insert(target)
                            }
                            break;
                        }
                    }
                }
            }
        }
    }

    reach
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(name: &str) -> Tile {
        name.parse().unwrap()
    }

    fn tiles(names: &[&str]) -> TileSet {
        names.iter().map(|n| tile(n)).collect()
    }

    fn piece(kind: PieceKind, colour: Colour, on: &str) -> Piece {
        Piece::new(kind, colour, tile(on))
    }

    #[test]
    fn pawn_patterns() {
        assert_eq!(
            moving_pattern(PieceKind::Pawn, Colour::White, tile("e2")),
            tiles(&["e3", "e4"])
        );
        assert_eq!(
            moving_pattern(PieceKind::Pawn, Colour::White, tile("e3")),
            tiles(&["e4"])
        );
        assert_eq!(
            moving_pattern(PieceKind::Pawn, Colour::Black, tile("d7")),
            tiles(&["d6", "d5"])
        );
        assert_eq!(
            attack(PieceKind::Pawn, Colour::White, tile("a2")),
            tiles(&["b3"])
        );
        assert_eq!(
            attack(PieceKind::Pawn, Colour::Black, tile("e5")),
            tiles(&["d4", "f4"])
        );
    }

    #[test]
    fn leaper_patterns() {
        assert_eq!(
            moving_pattern(PieceKind::Knight, Colour::White, tile("a1")),
            tiles(&["b3", "c2"])
        );
        assert_eq!(moving_pattern(PieceKind::Knight, Colour::White, tile("d4")).len(), 8);
        assert_eq!(
            moving_pattern(PieceKind::King, Colour::Black, tile("h8")),
            tiles(&["g8", "g7", "h7"])
        );
    }

    #[test]
    fn queen_is_bishop_and_rook() {
        for origin in Tile::tiles_iter() {
            let queen = moving_pattern(PieceKind::Queen, Colour::White, origin);
            let bishop = moving_pattern(PieceKind::Bishop, Colour::White, origin);
            let rook = moving_pattern(PieceKind::Rook, Colour::White, origin);
            assert_eq!(queen, bishop | rook);
            assert_eq!(rook.len(), 14);
        }
    }

    #[test]
    fn slider_rays_stop_at_first_occupant() {
        let rook = piece(PieceKind::Rook, Colour::White, "d4");
        let pieces = [
            rook,
            piece(PieceKind::Pawn, Colour::White, "d6"),
            piece(PieceKind::Knight, Colour::Black, "f4"),
        ];
        let reach = block_tiles(&rook, &Occupancy::from_pieces(&pieces));
        assert_eq!(reach.defended, tiles(&["d6"]));
        assert_eq!(
            reach.legal,
            tiles(&["d5", "e4", "f4", "c4", "b4", "a4", "d3", "d2", "d1"])
        );
    }

    #[test]
    fn shielded_tiles_are_not_defended() {
        let bishop = piece(PieceKind::Bishop, Colour::Black, "a1");
        let pieces = [
            bishop,
            piece(PieceKind::Pawn, Colour::Black, "c3"),
            piece(PieceKind::Pawn, Colour::Black, "e5"),
        ];
        let reach = block_tiles(&bishop, &Occupancy::from_pieces(&pieces));
        assert_eq!(reach.legal, tiles(&["b2"]));
        assert_eq!(reach.defended, tiles(&["c3"]));
    }

    #[test]
    fn opposing_king_stops_the_ray() {
        let rook = piece(PieceKind::Rook, Colour::White, "a8");
        let pieces = [rook, piece(PieceKind::King, Colour::Black, "e8")];
        let reach = block_tiles(&rook, &Occupancy::from_pieces(&pieces));
        assert_eq!(
            reach.legal,
            tiles(&["b8", "c8", "d8", "e8", "a7", "a6", "a5", "a4", "a3", "a2", "a1"])
        );
        assert!(!reach.legal.contains(tile("f8")));
        assert!(reach.defended.is_empty());
    }

    #[test]
    fn pawn_blocking() {
        let pawn = piece(PieceKind::Pawn, Colour::White, "e2");
        let blocked = [
            pawn,
            piece(PieceKind::Knight, Colour::Black, "e3"),
            piece(PieceKind::Bishop, Colour::Black, "d3"),
            piece(PieceKind::Bishop, Colour::White, "f3"),
        ];
        let reach = block_tiles(&pawn, &Occupancy::from_pieces(&blocked));
        assert_eq!(reach.legal, tiles(&["d3"]));
        assert_eq!(reach.defended, tiles(&["f3"]));

        let far_blocked = [pawn, piece(PieceKind::Knight, Colour::White, "e4")];
        let reach = block_tiles(&pawn, &Occupancy::from_pieces(&far_blocked));
        assert_eq!(reach.legal, tiles(&["e3"]));

        // Pushing into the opposing king is never possible.
        let king_ahead = [pawn, piece(PieceKind::King, Colour::Black, "e3")];
        let reach = block_tiles(&pawn, &Occupancy::from_pieces(&king_ahead));
        assert!(reach.legal.is_empty());
    }

    #[test]
    fn leapers_defend_friends_and_capture_foes() {
        let knight = piece(PieceKind::Knight, Colour::White, "g1");
        let pieces = [
            knight,
            piece(PieceKind::Pawn, Colour::White, "e2"),
            piece(PieceKind::Pawn, Colour::Black, "f3"),
        ];
        let reach = block_tiles(&knight, &Occupancy::from_pieces(&pieces));
        assert_eq!(reach.legal, tiles(&["f3", "h3"]));
        assert_eq!(reach.defended, tiles(&["e2"]));
    }

    #[test]
    fn blocked_reach_stays_within_pattern() {
        // Scatter a few pieces and check every piece kind from every tile.
        let blockers = [
            piece(PieceKind::Pawn, Colour::White, "c3"),
            piece(PieceKind::Pawn, Colour::Black, "f6"),
            piece(PieceKind::Knight, Colour::Black, "d5"),
            piece(PieceKind::Rook, Colour::White, "g2"),
            piece(PieceKind::King, Colour::Black, "b7"),
        ];
        for kind in PieceKind::iter() {
            for colour in [Colour::White, Colour::Black] {
                for origin in Tile::tiles_iter() {
                    if blockers.iter().any(|p| p.tile == origin) {
                        continue;
                    }
                    let moving = Piece::new(kind, colour, origin);
                    let occupancy =
                        Occupancy::from_pieces(blockers.iter().chain(std::iter::once(&moving)));
                    let reach = block_tiles(&moving, &occupancy);
                    let pattern = moving_pattern(kind, colour, origin) | attack(kind, colour, origin);
                    assert!(reach.legal.is_subset(pattern), "{kind:?} on {origin}");
                    assert!(reach.defended.is_subset(pattern), "{kind:?} on {origin}");
                    assert!((reach.legal & reach.defended).is_empty());
                }
            }
        }
    }
}
