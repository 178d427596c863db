//! # FEN string utilities
//!
//! Only the placement, side to move, castling and en passant sections are
//! meaningful to the board. Clocks are accepted and ignored.

use thiserror::Error;

use super::{
    board::{Board, PlaceError},
    colour::Colour,
    pattern,
    piece::{Piece, PieceKind},
    square::{File, Rank, Tile, TileParseError},
};

/// FEN parsing errors.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Error)]
pub enum FenError {
    #[error("Unexpected character at index {index}: {val}")]
    UnexpectedToken { index: usize, val: char },
    #[error("FEN string missing the {0} section")]
    Incomplete(&'static str),
    #[error("Found a non-ASCII character")]
    NonAscii,
    #[error("Piece section leaves {0} tiles undefined")]
    MissingTiles(usize),
    #[error("The piece section defines too many tiles")]
    TooManyTiles,
    #[error("Invalid en passant tile: {0}")]
    InvalidTile(#[from] TileParseError),
    #[error("No pawn can be captured en passant on {0}")]
    NoEnPassantPawn(Tile),
    #[error(transparent)]
    Placement(#[from] PlaceError),
}

/// The FEN string of the standard starting position.
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn piece_kind(c: char) -> Option<PieceKind> {
    match c.to_ascii_lowercase() {
        'p' => Some(PieceKind::Pawn),
        'n' => Some(PieceKind::Knight),
        'b' => Some(PieceKind::Bishop),
        'r' => Some(PieceKind::Rook),
        'q' => Some(PieceKind::Queen),
        'k' => Some(PieceKind::King),
        _ => None,
    }
}

/// Castling right symbol, rook file and colour, in FEN order.
const CASTLING_RIGHTS: [(char, File, Colour); 4] = [
    ('K', File::H, Colour::White),
    ('Q', File::A, Colour::White),
    ('k', File::H, Colour::Black),
    ('q', File::A, Colour::Black),
];

impl Board {
    /// Sets up a board from a FEN string.
    ///
    /// The castling section decides which kings and rooks count as unmoved,
    /// and the en passant section which pawn just advanced two tiles.
    /// # Errors
    /// Fails on any malformed section, or when the placement is impossible
    /// to set up (two kings of the same colour).
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        if !fen.is_ascii() {
            return Err(FenError::NonAscii);
        }
        let sections = fen.split_ascii_whitespace().collect::<Vec<_>>();
        let placement = sections.first().ok_or(FenError::Incomplete("pieces"))?;

        let side_to_move = match sections.get(1).copied().unwrap_or("w") {
            "w" => Colour::White,
            "b" => Colour::Black,
            other => {
                return Err(FenError::UnexpectedToken {
                    index: placement.len() + 1,
                    val: other.chars().next().unwrap_or(' '),
                })
            }
        };

        let castling = sections.get(2).copied().unwrap_or("-");
        if let Some((index, val)) = castling
            .char_indices()
            .find(|&(_, c)| c != '-' && !CASTLING_RIGHTS.iter().any(|&(r, _, _)| r == c))
        {
            return Err(FenError::UnexpectedToken { index, val });
        }

        let mut board = Board::empty();
        let mut tiles = Tile::tiles_display_iter();
        for (index, c) in placement.char_indices() {
            match c {
                '/' => continue,
                '1'..='8' => {
                    for _ in 0..c.to_digit(10).unwrap_or(0) {
                        tiles.next().ok_or(FenError::TooManyTiles)?;
                    }
                }
                c => {
                    let kind = piece_kind(c).ok_or(FenError::UnexpectedToken { index, val: c })?;
                    let colour = Colour::from(c.is_ascii_lowercase());
                    let tile = tiles.next().ok_or(FenError::TooManyTiles)?;
                    let mut piece = Piece::new(kind, colour, tile);
                    piece.moved = match kind {
                        PieceKind::Pawn => tile.rank() != pattern::pawn_home_rank(colour),
                        PieceKind::King => {
                            tile != Tile::new(File::E, colour.back_rank())
                                || !CASTLING_RIGHTS
                                    .iter()
                                    .any(|&(r, _, c)| c == colour && castling.contains(r))
                        }
                        PieceKind::Rook => !CASTLING_RIGHTS.iter().any(|&(r, file, c)| {
                            c == colour
                                && tile == Tile::new(file, colour.back_rank())
                                && castling.contains(r)
                        }),
                        _ => false,
                    };
                    board.add_piece(piece)?;
                }
            }
        }
        let remaining = tiles.count();
        if remaining != 0 {
            return Err(FenError::MissingTiles(remaining));
        }

        board.set_turn(side_to_move);

        match sections.get(3).copied().unwrap_or("-") {
            "-" => (),
            ep => {
                let passed: Tile = ep.parse()?;
                let advanced = side_to_move.inverse();
                let origin = passed.translate(pattern::pawn_push(side_to_move));
                let landed = passed.translate(pattern::pawn_push(advanced));
                let Some(index) = landed.and_then(|tile| {
                    board
                        .pieces
                        .iter()
                        .position(|p| p.tile == tile && p.kind == PieceKind::Pawn && p.colour == advanced)
                }) else {
                    return Err(FenError::NoEnPassantPawn(passed));
                };
                if let Some(origin) = origin {
                    board.pieces[index].last_move = origin;
                    board.pieces[index].moved = true;
                }
                board.set_last_piece(landed);
            }
        }

        board.update();
        Ok(board)
    }

    /// FEN string of the board. Clocks are always reported as `0 1`.
    pub fn fen(&self) -> String {
        let mut fen = String::new();
        let mut skip = 0;
        for (i, tile) in Tile::tiles_display_iter().enumerate() {
            match self.piece_on(tile) {
                Some(piece) => {
                    if skip != 0 {
                        fen.push_str(&skip.to_string());
                        skip = 0
                    }
                    fen.push_str(&piece.to_string())
                }
                None => skip += 1,
            }
            if i % 8 == 7 {
                if skip != 0 {
                    fen.push_str(&skip.to_string());
                    skip = 0
                }
                if tile.rank() != Rank::One {
                    fen.push('/')
                }
            }
        }

        fen.push_str(if self.turn.is_white() { " w " } else { " b " });

        let rights: String = CASTLING_RIGHTS
            .iter()
            .filter(|&&(_, file, colour)| {
                let rank = colour.back_rank();
                let king_ready = self.piece_on(Tile::new(File::E, rank)).is_some_and(|k| {
                    k.kind == PieceKind::King && k.colour == colour && !k.moved
                });
                let rook_ready = self.piece_on(Tile::new(file, rank)).is_some_and(|r| {
                    r.kind == PieceKind::Rook && r.colour == colour && !r.moved
                });
                king_ready && rook_ready
            })
            .map(|&(symbol, _, _)| symbol)
            .collect();
        fen.push_str(if rights.is_empty() { "-" } else { &rights });

        let en_passant = self
            .last_piece()
            .filter(|p| p.just_double_stepped())
            .and_then(|p| p.tile.translate(pattern::pawn_push(p.colour.inverse())));
        match en_passant {
            Some(tile) => fen.push_str(&format!(" {tile} 0 1")),
            None => fen.push_str(" - 0 1"),
        }
        fen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(name: &str) -> Tile {
        name.parse().unwrap()
    }

    #[test]
    fn initial_fen_matches_initial_board() {
        let board = Board::from_fen(INITIAL_FEN).unwrap();
        let initial = Board::initial();
        for t in Tile::tiles_iter() {
            assert_eq!(
                board.piece_on(t).map(|p| (p.kind, p.colour, p.legal)),
                initial.piece_on(t).map(|p| (p.kind, p.colour, p.legal)),
                "{t}"
            );
        }
        assert_eq!(board.fen(), INITIAL_FEN);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(board.turn(), Colour::White);
        assert_eq!(board.pieces().len(), 2);
        assert_eq!(board.fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn castling_rights_decide_moved_flags() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").unwrap();
        assert!(!board.piece_on(tile("h1")).unwrap().moved);
        assert!(board.piece_on(tile("a1")).unwrap().moved);
        assert!(!board.piece_on(tile("a8")).unwrap().moved);
        assert!(board.piece_on(tile("h8")).unwrap().moved);
        assert!(board.legal_moves(tile("e1")).contains(tile("g1")));
        assert!(!board.legal_moves(tile("e1")).contains(tile("c1")));
        assert_eq!(board.fen(), "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1");
    }

    #[test]
    fn pawns_off_their_home_rank_have_moved() {
        let board = Board::from_fen("4k3/p7/1p6/8/8/6P1/7P/4K3 w - - 0 1").unwrap();
        assert!(!board.piece_on(tile("h2")).unwrap().moved);
        assert!(!board.piece_on(tile("a7")).unwrap().moved);
        assert!(board.piece_on(tile("g3")).unwrap().moved);
        assert!(board.piece_on(tile("b6")).unwrap().moved);
        assert!(board.legal_moves(tile("h2")).contains(tile("h4")));
        assert!(!board.legal_moves(tile("g3")).contains(tile("g5")));
    }

    #[test]
    fn en_passant_section() {
        let board =
            Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        assert_eq!(board.last_piece().map(|p| p.tile), Some(tile("f5")));
        assert!(board.legal_moves(tile("e5")).contains(tile("f6")));
        assert!(!board.legal_moves(tile("e5")).contains(tile("d6")));
        assert_eq!(
            board.fen(),
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 1"
        );

        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - e6"),
            Err(FenError::NoEnPassantPawn(tile("e6")))
        );
    }

    #[test]
    fn malformed_fens() {
        assert_eq!(Board::from_fen(""), Err(FenError::Incomplete("pieces")));
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3x w"),
            Err(FenError::UnexpectedToken { index: 19, val: 'x' })
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K2"),
            Err(FenError::MissingTiles(1))
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3/p"),
            Err(FenError::TooManyTiles)
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4KK2"),
            Err(FenError::Placement(PlaceError::TooManyKings(Colour::White)))
        );
        assert_eq!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 é"), Err(FenError::NonAscii));
    }
}
