//! Main API to represent and interact with a chess board.
//!
//! The board owns every live piece in insertion order, the side to move, the
//! pieces eaten by each side and the derived move sets of every piece.
use thiserror::Error;

use super::{
    action::{Action, ActionKind},
    colour::{Colour, NUM_COLOURS},
    pattern::{self, Occupancy},
    piece::{Piece, PieceKind},
    square::{File, Rank, Tile},
    tileset::TileSet,
};

/// Errors for actions rejected by the rules. None of them modify the board.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Error)]
pub enum GameError {
    #[error("No piece of the side to move on {0}")]
    InvalidSelection(Tile),
    #[error("{0} is not a legal destination")]
    IllegalDestination(Tile),
    #[error("No piece is selected")]
    NoSelection,
    #[error("The game is over")]
    GameOver,
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Error)]
pub enum PlaceError {
    #[error("{0} is already occupied")]
    TileOccupied(Tile),
    #[error("The {0} side already has a king")]
    TooManyKings(Colour),
}

/// How a game ended.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Termination {
    /// The given colour has been checkmated.
    Checkmate(Colour),
    /// The side to move has no legal move but is not in check.
    Stalemate,
    /// The given colour resigned.
    Resignation(Colour),
    /// Both players agreed to a draw.
    DrawAgreed,
}
impl Termination {
    /// Winner of the game, if it was not drawn.
    pub fn winner(self) -> Option<Colour> {
        match self {
            Self::Checkmate(loser) | Self::Resignation(loser) => Some(loser.inverse()),
            Self::Stalemate | Self::DrawAgreed => None,
        }
    }
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// A chess board and every piece on it.
///
/// Pieces of the side to move carry their *legal* destinations, already
/// filtered for king safety. Pieces of the other side carry pseudo-legal ones.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    pub(super) pieces: Vec<Piece>,
    pub(super) turn: Colour,
    pub(super) eaten: [Vec<Piece>; NUM_COLOURS],
    pub(super) last_piece: Option<Tile>,
    pub(super) checked: [bool; NUM_COLOURS],
}
impl Default for Board {
    /// A board with no pieces.
    fn default() -> Self {
        Self {
            pieces: Vec::new(),
            turn: Colour::White,
            eaten: [Vec::new(), Vec::new()],
            last_piece: None,
            checked: [false; NUM_COLOURS],
        }
    }
}
impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard 32 pieces setup, black pieces first.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for (colour, back, front) in [
            (Colour::Black, Rank::Eight, Rank::Seven),
            (Colour::White, Rank::One, Rank::Two),
        ] {
            for (file, kind) in File::iter().zip(BACK_RANK) {
                board
                    .pieces
                    .push(Piece::new(kind, colour, Tile::new(file, back)))
            }
            for file in File::iter() {
                board
                    .pieces
                    .push(Piece::new(PieceKind::Pawn, colour, Tile::new(file, front)))
            }
        }
        board.update();
        board
    }

    /// Adds a piece on the board on the given tile.
    ///
    /// The derived move sets are stale until [`Board::update`] is called.
    /// # Errors
    /// Returns an error if the tile is not empty, or when trying to place a
    /// second king for any side.
    pub fn add_piece(&mut self, piece: Piece) -> Result<(), PlaceError> {
        if self.piece_on(piece.tile).is_some() {
            return Err(PlaceError::TileOccupied(piece.tile));
        }
        if piece.kind == PieceKind::King && self.king(piece.colour).is_some() {
            return Err(PlaceError::TooManyKings(piece.colour));
        }
        self.pieces.push(piece);
        Ok(())
    }

    /// Sets the side to move.
    ///
    /// The derived move sets are stale until [`Board::update`] is called.
    pub fn set_turn(&mut self, colour: Colour) {
        self.turn = colour
    }

    /// Marks the piece on `tile` as the one that played the last move.
    pub(super) fn set_last_piece(&mut self, tile: Option<Tile>) {
        self.last_piece = tile
    }

    /// All live pieces, in insertion order.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Returns the piece standing on the given tile, if any.
    pub fn piece_on(&self, tile: Tile) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.tile == tile)
    }

    pub(super) fn index_of(&self, tile: Tile) -> Option<usize> {
        self.pieces.iter().position(|p| p.tile == tile)
    }

    /// Returns the side to move.
    #[inline]
    pub fn turn(&self) -> Colour {
        self.turn
    }

    /// Pieces of the given colour that have been captured, most valuable first.
    #[inline]
    pub fn eaten(&self, colour: Colour) -> &[Piece] {
        &self.eaten[colour as usize]
    }

    /// The piece that played the last move.
    pub fn last_piece(&self) -> Option<&Piece> {
        self.last_piece.and_then(|tile| self.piece_on(tile))
    }

    /// The king of the given colour.
    pub fn king(&self, colour: Colour) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| p.kind == PieceKind::King && p.colour == colour)
    }

    /// Checks if the king of the given colour is attacked.
    #[inline]
    pub fn is_checked(&self, colour: Colour) -> bool {
        self.checked[colour as usize]
    }

    /// Current occupancy of the board.
    pub fn occupancy(&self) -> Occupancy {
        Occupancy::from_pieces(&self.pieces)
    }

    /// Legal destinations of the piece on `tile`, empty when there is no
    /// piece of the side to move there.
    pub fn legal_moves(&self, tile: Tile) -> TileSet {
        self.piece_on(tile)
            .filter(|p| p.colour == self.turn)
            .map(|p| p.legal)
            .unwrap_or_default()
    }

    /// Tiles attacked by the pieces of `colour`.
    ///
    /// Pawns threaten their forward diagonals and kings their whole pattern;
    /// every other piece threatens its blocked destinations.
    pub fn attacked_by(&self, colour: Colour) -> TileSet {
        let mut attacked = TileSet::empty();
        for piece in self.pieces.iter().filter(|p| p.colour == colour) {
            attacked |= match piece.kind {
                PieceKind::Pawn => pattern::attack(piece.kind, colour, piece.tile),
                PieceKind::King => pattern::moving_pattern(piece.kind, colour, piece.tile),
                _ => piece.legal,
            }
        }
        attacked
    }

    /// Friendly pieces guarded by the pieces of `colour`.
    pub fn defended_by(&self, colour: Colour) -> TileSet {
        let mut defended = TileSet::empty();
        for piece in self.pieces.iter().filter(|p| p.colour == colour) {
            defended |= piece.defended
        }
        defended
    }

    /// Recomputes the pseudo-legal sets of every piece, en passant and castling
    /// opportunities, and check flags.
    pub fn refresh(&mut self) {
        let occupancy = self.occupancy();
        for piece in self.pieces.iter_mut() {
            let reach = pattern::block_tiles(piece, &occupancy);
            piece.legal = reach.legal;
            piece.defended = reach.defended;
        }

        self.add_en_passant_targets();

        for colour in Colour::iter() {
            let attacked = self.attacked_by(colour.inverse());
            let forbidden = attacked | self.defended_by(colour.inverse());
            let Some(index) = self
                .pieces
                .iter()
                .position(|p| p.kind == PieceKind::King && p.colour == colour)
            else {
                self.checked[colour as usize] = false;
                continue;
            };
            let king = &mut self.pieces[index];
            king.legal = king.legal - forbidden;
            self.checked[colour as usize] = attacked.contains(king.tile);
            if !self.checked[colour as usize] {
                let castles = self.castling_targets(index, attacked, &occupancy);
                self.pieces[index].legal |= castles;
            }
        }
    }

    /// Recomputes every derived set, then restricts the side to move to the
    /// moves that keep its king safe.
    pub fn update(&mut self) {
        self.refresh();
        self.restrict_to_safe_moves();
    }

    /// Moves the piece on `origin` to `target`, if this is a legal move for the
    /// side to move, and passes the turn.
    /// # Errors
    /// The board is left untouched when the move is rejected.
    pub fn make(&mut self, origin: Tile, target: Tile) -> Result<Action, GameError> {
        let piece = self
            .piece_on(origin)
            .filter(|p| p.colour == self.turn)
            .ok_or(GameError::InvalidSelection(origin))?;
        if !piece.legal.contains(target) {
            return Err(GameError::IllegalDestination(target));
        }

        let action = self.execute(origin, target, true);
        self.turn.invert();
        self.update();
        log::debug!("played {action:?}");
        Ok(action)
    }

    /// Moves pieces around for a move from `origin` to `target`, capturing and
    /// castling as needed. Promotes only when `promote` is set.
    ///
    /// Does not validate the move, pass the turn or refresh derived sets.
    pub(super) fn execute(&mut self, origin: Tile, target: Tile, promote: bool) -> Action {
        let Some(mover) = self.piece_on(origin).copied() else {
            unreachable!("no piece on {origin}")
        };
        let mut kind = ActionKind::Quiet;

        if let Some(captured) = self.piece_on(target).filter(|p| p.colour != mover.colour) {
            kind = ActionKind::Capture(captured.kind);
            self.capture(target);
        } else if let Some(captured) = self.en_passant_capture(&mover, target) {
            kind = ActionKind::EnPassant { captured };
            self.capture(captured);
        } else if let Some((rook_origin, rook_target)) = self.castling_rook(&mover, target) {
            kind = ActionKind::Castle {
                rook_origin,
                rook_target,
            };
            if let Some(rook) = self.index_of(rook_origin) {
                self.pieces[rook] = self.pieces[rook].moved_to(rook_target);
            }
        }

        let Some(index) = self.index_of(origin) else {
            unreachable!("mover vanished from {origin}")
        };
        self.pieces[index] = mover.moved_to(target);

        if promote && self.promotes(&self.pieces[index]) {
            self.pieces[index] = self.promote(index);
            kind = ActionKind::Promotion {
                captured: match kind {
                    ActionKind::Capture(captured) => Some(captured),
                    _ => None,
                },
            };
        }

        self.last_piece = Some(target);
        Action {
            piece: mover.kind,
            colour: mover.colour,
            origin,
            target,
            kind,
        }
    }

    /// Removes the piece on `tile` and files it in the eaten pieces of its colour.
    fn capture(&mut self, tile: Tile) {
        let Some(index) = self.index_of(tile) else {
            return;
        };
        let piece = self.pieces.remove(index);
        let eaten = &mut self.eaten[piece.colour as usize];
        eaten.push(piece);
        eaten.sort_by(|a, b| {
            b.value()
                .cmp(&a.value())
                .then_with(|| a.kind.symbol().cmp(b.kind.symbol()))
        });
    }
}
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, tile) in Tile::tiles_display_iter().enumerate() {
            if i % 8 == 0 {
                if i != 0 {
                    writeln!(f)?
                }
                write!(f, "{} ", tile.rank())?
            }
            match self.piece_on(tile) {
                Some(piece) => write!(f, "{piece} ")?,
                None => write!(f, ". ")?,
            }
        }
        writeln!(f, "\n  a b c d e f g h")?;
        write!(f, "{} to move", self.turn)?;
        for colour in Colour::iter() {
            if self.is_checked(colour) {
                write!(f, ", {colour} is in check")?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(name: &str) -> Tile {
        name.parse().unwrap()
    }

    #[test]
    fn initial_setup() {
        let board = Board::initial();
        assert_eq!(board.pieces().len(), 32);
        assert_eq!(board.turn(), Colour::White);
        assert_eq!(board.piece_on(tile("e1")).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(board.piece_on(tile("d8")).map(|p| p.kind), Some(PieceKind::Queen));
        assert_eq!(board.pieces()[0].tile, tile("a8"));

        let moves: usize = board
            .pieces()
            .iter()
            .filter(|p| p.colour == Colour::White)
            .map(|p| p.legal.len())
            .sum();
        assert_eq!(moves, 20);
    }

    #[test]
    fn rejected_moves_leave_board_untouched() {
        let mut board = Board::initial();
        let before = board.clone();
        assert_eq!(
            board.make(tile("e7"), tile("e5")),
            Err(GameError::InvalidSelection(tile("e7")))
        );
        assert_eq!(
            board.make(tile("e4"), tile("e5")),
            Err(GameError::InvalidSelection(tile("e4")))
        );
        assert_eq!(
            board.make(tile("e2"), tile("e5")),
            Err(GameError::IllegalDestination(tile("e5")))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn making_a_move_passes_the_turn() {
        let mut board = Board::initial();
        let action = board.make(tile("g1"), tile("f3")).unwrap();
        assert_eq!(action.kind, ActionKind::Quiet);
        assert_eq!(board.turn(), Colour::Black);
        assert_eq!(board.last_piece().map(|p| p.tile), Some(tile("f3")));
        assert!(board.piece_on(tile("g1")).is_none());
    }

    #[test]
    fn captures_are_eaten_and_sorted() {
        let mut board = Board::initial();
        for (from, to) in [
            ("e2", "e4"),
            ("d7", "d5"),
            ("e4", "d5"),
            ("d8", "d5"),
            ("b1", "c3"),
            ("d5", "a2"),
            ("c3", "b5"),
            ("a2", "a1"),
        ] {
            board.make(tile(from), tile(to)).unwrap();
        }
        assert_eq!(board.pieces().len(), 28);
        let eaten: Vec<PieceKind> = board.eaten(Colour::White).iter().map(|p| p.kind).collect();
        assert_eq!(
            eaten,
            [PieceKind::Rook, PieceKind::Pawn, PieceKind::Pawn]
        );
        assert_eq!(board.eaten(Colour::Black).len(), 1);
    }

    #[test]
    fn place_errors() {
        let mut board = Board::empty();
        board
            .add_piece(Piece::new(PieceKind::King, Colour::White, tile("e1")))
            .unwrap();
        assert_eq!(
            board.add_piece(Piece::new(PieceKind::Rook, Colour::White, tile("e1"))),
            Err(PlaceError::TileOccupied(tile("e1")))
        );
        assert_eq!(
            board.add_piece(Piece::new(PieceKind::King, Colour::White, tile("e2"))),
            Err(PlaceError::TooManyKings(Colour::White))
        );
    }

    #[test]
    fn king_cannot_take_defended_piece() {
        let mut board = Board::empty();
        for piece in [
            Piece::new(PieceKind::King, Colour::White, tile("e1")),
            Piece::new(PieceKind::King, Colour::Black, tile("e8")),
            Piece::new(PieceKind::Knight, Colour::Black, tile("e2")),
            Piece::new(PieceKind::Rook, Colour::Black, tile("e7")),
        ] {
            board.add_piece(piece).unwrap();
        }
        board.update();
        let king_moves = board.legal_moves(tile("e1"));
        assert!(!king_moves.contains(tile("e2")));
        assert!(king_moves.contains(tile("d1")));
    }
}
