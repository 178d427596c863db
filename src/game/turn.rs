//! # Turn handling
//!
//! [`Game`] wraps a [`Board`] with the selection flow of an interactive game:
//! pick one of your pieces, then one of its legal destinations.

use super::{
    action::Action,
    board::{Board, GameError, Termination},
    colour::Colour,
    piece::Piece,
    square::Tile,
    tileset::TileSet,
};

/// Where the game currently stands.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TurnState {
    /// Waiting for the given side to pick one of its pieces.
    AwaitingSelection(Colour),
    /// A piece of the side to move is selected.
    PieceSelected(Tile),
    Finished(Termination),
}

/// A game in progress, from the initial position to its termination.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    state: TurnState,
    played: Vec<Action>,
}
impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
impl Game {
    /// Starts a game from the initial position.
    pub fn new() -> Self {
        Self::from_board(Board::initial())
    }

    /// Starts a game from an arbitrary board.
    pub fn from_board(board: Board) -> Self {
        let state = match board.termination() {
            Some(termination) => TurnState::Finished(termination),
            None => TurnState::AwaitingSelection(board.turn()),
        };
        Self {
            board,
            state,
            played: Vec::new(),
        }
    }

    /// Starts over from the initial position, for a rematch.
    pub fn reset(&mut self) {
        *self = Self::new()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// The side to move.
    #[inline]
    pub fn turn(&self) -> Colour {
        self.board.turn()
    }

    /// Actions played so far, oldest first.
    #[inline]
    pub fn played(&self) -> &[Action] {
        &self.played
    }

    /// Currently selected piece, if any.
    pub fn selected(&self) -> Option<&Piece> {
        match self.state {
            TurnState::PieceSelected(tile) => self.board.piece_on(tile),
            _ => None,
        }
    }

    /// Selects the piece on `tile`.
    /// # Errors
    /// Fails if the game is over or if `tile` does not hold a piece of the
    /// side to move. The previous selection is kept in that case.
    pub fn select(&mut self, tile: Tile) -> Result<TileSet, GameError> {
        if let TurnState::Finished(_) = self.state {
            return Err(GameError::GameOver);
        }
        match self.board.piece_on(tile) {
            Some(piece) if piece.colour == self.board.turn() => {
                self.state = TurnState::PieceSelected(tile);
                Ok(piece.legal)
            }
            _ => Err(GameError::InvalidSelection(tile)),
        }
    }

    /// Moves the selected piece to `target` and passes the turn.
    /// # Errors
    /// Fails without changing anything if no piece is selected, if `target`
    /// is not one of its legal destinations, or if the game is over.
    pub fn apply_move(&mut self, target: Tile) -> Result<Action, GameError> {
        let origin = match self.state {
            TurnState::PieceSelected(origin) => origin,
            TurnState::AwaitingSelection(_) => return Err(GameError::NoSelection),
            TurnState::Finished(_) => return Err(GameError::GameOver),
        };
        let action = self.board.make(origin, target)?;
        self.played.push(action);
        self.state = match self.board.termination() {
            Some(termination) => {
                log::info!("game over: {termination:?}");
                TurnState::Finished(termination)
            }
            None => TurnState::AwaitingSelection(self.board.turn()),
        };
        Ok(action)
    }

    /// Handles a click on `tile`: moves the selected piece there when legal,
    /// (re)selects otherwise.
    ///
    /// Returns the played action, if any.
    /// # Errors
    /// Fails when the click neither moves nor selects anything.
    pub fn click(&mut self, tile: Tile) -> Result<Option<Action>, GameError> {
        if self.selected().is_some_and(|p| p.legal.contains(tile)) {
            return self.apply_move(tile).map(Some);
        }
        self.select(tile).map(|_| None)
    }

    /// Legal destinations of the piece on `tile`, empty if it is not a piece
    /// of the side to move.
    pub fn legal_moves_for(&self, tile: Tile) -> TileSet {
        self.board.legal_moves(tile)
    }

    #[inline]
    pub fn is_check(&self, colour: Colour) -> bool {
        self.board.is_checked(colour)
    }

    /// How the game ended, `None` while it is still going.
    pub fn termination(&self) -> Option<Termination> {
        match self.state {
            TurnState::Finished(termination) => Some(termination),
            _ => None,
        }
    }

    /// Captured pieces of the given colour, most valuable first.
    pub fn eaten_pieces(&self, colour: Colour) -> &[Piece] {
        self.board.eaten(colour)
    }

    /// Ends the game with `colour` resigning.
    /// # Errors
    /// Fails if the game is already over.
    pub fn surrender(&mut self, colour: Colour) -> Result<Termination, GameError> {
        self.finish(Termination::Resignation(colour))
    }

    /// Ends the game in a draw both players agreed on.
    /// # Errors
    /// Fails if the game is already over.
    pub fn agree_draw(&mut self) -> Result<Termination, GameError> {
        self.finish(Termination::DrawAgreed)
    }

    fn finish(&mut self, termination: Termination) -> Result<Termination, GameError> {
        if let TurnState::Finished(_) = self.state {
            return Err(GameError::GameOver);
        }
        log::info!("game over: {termination:?}");
        self.state = TurnState::Finished(termination);
        Ok(termination)
    }
}
