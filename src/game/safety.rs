//! King safety.
//!
//! A destination is safe when playing it does not leave the own king
//! attacked. Every candidate is tried on a scratch copy of the board, so the
//! live board is never touched while searching.

use super::{
    board::{Board, Termination},
    square::Tile,
    tileset::TileSet,
};

impl Board {
    /// Destinations of the piece on `tile` that keep its king out of check.
    pub fn safe_destinations(&self, tile: Tile) -> TileSet {
        let Some(piece) = self.piece_on(tile) else {
            return TileSet::empty();
        };

        let mut safe = TileSet::empty();
        for target in piece.legal {
            let mut scratch = self.clone();
            scratch.execute(tile, target, false);
            scratch.refresh();
            if !scratch.is_checked(piece.colour) {
                safe.insert(target)
            }
        }
        safe
    }

    /// Drops every unsafe destination of the pieces of the side to move.
    pub(super) fn restrict_to_safe_moves(&mut self) {
        let restricted: Vec<(usize, TileSet)> = self
            .pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.colour == self.turn)
            .map(|(i, p)| (i, self.safe_destinations(p.tile)))
            .collect();
        for (index, safe) in restricted {
            self.pieces[index].legal = safe
        }
    }

    /// Number of legal moves available to the side to move.
    pub fn count_legal_moves(&self) -> usize {
        self.pieces
            .iter()
            .filter(|p| p.colour == self.turn)
            .map(|p| p.legal.len())
            .sum()
    }

    /// Every legal move of the side to move, as (origin, target) pairs.
    pub fn legal_move_list(&self) -> Vec<(Tile, Tile)> {
        self.pieces
            .iter()
            .filter(|p| p.colour == self.turn)
            .flat_map(|p| p.legal.iter().map(move |target| (p.tile, target)))
            .collect()
    }

    /// Checkmate or stalemate, once the side to move has no legal move left.
    pub fn termination(&self) -> Option<Termination> {
        if self.count_legal_moves() > 0 {
            return None;
        }
        if self.is_checked(self.turn) {
            Some(Termination::Checkmate(self.turn))
        } else {
            Some(Termination::Stalemate)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::game::{
        board::{Board, Termination},
        colour::Colour,
        piece::{Piece, PieceKind},
        square::Tile,
    };

    fn tile(name: &str) -> Tile {
        name.parse().unwrap()
    }

    fn board_with(pieces: &[(PieceKind, Colour, &str)], turn: Colour) -> Board {
        let mut board = Board::empty();
        for &(kind, colour, on) in pieces {
            board.add_piece(Piece::new(kind, colour, tile(on))).unwrap();
        }
        board.set_turn(turn);
        board.update();
        board
    }

    #[test]
    fn searching_leaves_the_board_identical() {
        let mut board = Board::initial();
        for (from, to) in [("e2", "e4"), ("d7", "d5"), ("f1", "b5")] {
            board.make(tile(from), tile(to)).unwrap();
        }
        let before = board.clone();
        for origin in Tile::tiles_iter() {
            let _ = board.safe_destinations(origin);
        }
        assert_eq!(board, before);
    }

    #[test]
    fn check_must_be_parried() {
        let mut board = Board::initial();
        for (from, to) in [("e2", "e4"), ("d7", "d5"), ("f1", "b5"), ("c8", "d7")] {
            board.make(tile(from), tile(to)).unwrap();
        }
        board.make(tile("b5"), tile("a4")).unwrap();
        board.make(tile("d7"), tile("c6")).unwrap();
        board.make(tile("a4"), tile("c6")).unwrap();

        // Black is checked by the bishop on c6 and may only parry.
        assert!(board.is_checked(Colour::Black));
        for piece in board.pieces().iter().filter(|p| p.colour == Colour::Black) {
            for target in piece.legal {
                let mut scratch = board.clone();
                scratch.make(piece.tile, target).unwrap();
                assert!(!scratch.is_checked(Colour::Black));
            }
        }
        let parries = board.legal_moves(tile("b7")) | board.legal_moves(tile("b8"));
        assert!(parries.contains(tile("c6")));
    }

    #[test]
    fn absolute_pin() {
        let board = board_with(
            &[
                (PieceKind::King, Colour::White, "e1"),
                (PieceKind::Knight, Colour::White, "e2"),
                (PieceKind::Rook, Colour::Black, "e8"),
                (PieceKind::King, Colour::Black, "a8"),
            ],
            Colour::White,
        );
        assert!(board.legal_moves(tile("e2")).is_empty());
        assert!(!board.legal_moves(tile("e1")).is_empty());
    }

    #[test]
    fn king_does_not_retreat_along_the_checking_ray() {
        let board = board_with(
            &[
                (PieceKind::King, Colour::White, "e4"),
                (PieceKind::Rook, Colour::Black, "a4"),
                (PieceKind::King, Colour::Black, "h8"),
            ],
            Colour::White,
        );
        assert!(board.is_checked(Colour::White));
        let moves = board.legal_moves(tile("e4"));
        assert!(!moves.contains(tile("f4")));
        assert!(!moves.contains(tile("d4")));
        assert!(moves.contains(tile("e5")));
    }

    #[test]
    fn fools_mate() {
        let mut board = Board::initial();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            board.make(tile(from), tile(to)).unwrap();
        }
        assert!(board.is_checked(Colour::White));
        assert_eq!(board.count_legal_moves(), 0);
        assert_eq!(board.termination(), Some(Termination::Checkmate(Colour::White)));
        assert_eq!(
            board.termination().and_then(Termination::winner),
            Some(Colour::Black)
        );
    }

    #[test]
    fn stalemate_is_not_checkmate() {
        let board = board_with(
            &[
                (PieceKind::King, Colour::Black, "h8"),
                (PieceKind::Queen, Colour::White, "g6"),
                (PieceKind::King, Colour::White, "a1"),
            ],
            Colour::Black,
        );
        assert!(!board.is_checked(Colour::Black));
        assert_eq!(board.termination(), Some(Termination::Stalemate));
        assert_eq!(Termination::Stalemate.winner(), None);
    }

    #[test]
    fn ongoing_game_has_no_termination() {
        let board = Board::initial();
        assert_eq!(board.termination(), None);
        assert_eq!(board.legal_move_list().len(), 20);
    }
}
