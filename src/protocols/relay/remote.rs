//! # Remote matches
//! Interprets the frames received from the opponent for a local [`Game`], and
//! produces the frames to send for local actions.
//!
//! This is pure state: frames are fed in and returned, nothing is read from or
//! written to the network here.

use crate::game::{
    action::Action,
    board::{GameError, Termination},
    colour::Colour,
    square::Tile,
    turn::Game,
};

use super::{
    frame::{ControlToken, Frame},
    geometry::BoardGeometry,
};

/// Phase of a remote match.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum MatchPhase {
    /// No opponent, or the opponent left.
    Idle,
    /// Connected, waiting for the opponent to join.
    WaitingForOpponent,
    Playing,
    Finished(Termination),
}

/// What an inbound frame did to the match.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum MatchEvent {
    ColourAssigned(Colour),
    Started,
    OpponentSelected(Tile),
    OpponentMoved(Action),
    OpponentLeft,
    OpponentResigned,
    DrawOffered,
    DrawAgreed,
    DrawDeclined,
    RematchOffered,
    /// A new game started, playing the given colour.
    RematchStarted(Colour),
    /// The frame had no effect.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct RemoteMatch {
    game: Game,
    colour: Colour,
    geometry: BoardGeometry,
    phase: MatchPhase,
    draw_requested: bool,
    draw_offered: bool,
    rematch_requested: bool,
    rematch_offered: bool,
}
impl RemoteMatch {
    /// Creates a match playing `colour`, waiting for the opponent.
    pub fn new(colour: Colour, geometry: BoardGeometry) -> Self {
        Self {
            game: Game::new(),
            colour,
            geometry,
            phase: MatchPhase::WaitingForOpponent,
            draw_requested: false,
            draw_offered: false,
            rematch_requested: false,
            rematch_offered: false,
        }
    }

    #[inline]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Colour played locally.
    #[inline]
    pub fn colour(&self) -> Colour {
        self.colour
    }

    #[inline]
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    #[inline]
    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    /// Checks if the opponent offered a draw we have not answered.
    #[inline]
    pub fn draw_offered(&self) -> bool {
        self.draw_offered
    }

    /// Checks if the opponent asked for a rematch we have not answered.
    #[inline]
    pub fn rematch_offered(&self) -> bool {
        self.rematch_offered
    }

    /// Marks both players as present.
    pub fn start(&mut self) {
        self.phase = MatchPhase::Playing
    }

    /// Applies a frame received from the opponent.
    pub fn handle(&mut self, frame: Frame) -> MatchEvent {
        match frame {
            Frame::Control(token) => self.handle_control(token),
            Frame::Coordinates { x, y } => self.handle_click(x, y),
        }
    }

    fn handle_control(&mut self, token: ControlToken) -> MatchEvent {
        match token {
            ControlToken::White | ControlToken::Black => {
                if self.phase != MatchPhase::WaitingForOpponent {
                    return MatchEvent::Ignored;
                }
                self.colour = token.assigned_colour().unwrap_or(self.colour);
                MatchEvent::ColourAssigned(self.colour)
            }
            ControlToken::Ready => {
                self.start();
                MatchEvent::Started
            }
            ControlToken::Disconnect => {
                log::info!("opponent left, cancelling the match");
                self.game.reset();
                self.clear_requests();
                self.phase = MatchPhase::Idle;
                MatchEvent::OpponentLeft
            }
            ControlToken::Surrender => match self.game.surrender(self.colour.inverse()) {
                Ok(termination) => {
                    self.phase = MatchPhase::Finished(termination);
                    MatchEvent::OpponentResigned
                }
                Err(_) => MatchEvent::Ignored,
            },
            ControlToken::DrawAsk => {
                if self.draw_requested {
                    self.draw_requested = false;
                    self.conclude_draw()
                } else if self.phase == MatchPhase::Playing {
                    self.draw_offered = true;
                    MatchEvent::DrawOffered
                } else {
                    MatchEvent::Ignored
                }
            }
            ControlToken::Decline => {
                self.draw_requested = false;
                MatchEvent::DrawDeclined
            }
            ControlToken::Rematch => {
                if self.rematch_requested {
                    self.start_rematch();
                    MatchEvent::RematchStarted(self.colour)
                } else {
                    self.rematch_offered = true;
                    MatchEvent::RematchOffered
                }
            }
        }
    }

    /// Replays a click of the opponent on our board.
    fn handle_click(&mut self, x: u16, y: u16) -> MatchEvent {
        if self.phase != MatchPhase::Playing || self.game.turn() == self.colour {
            log::warn!("ignoring opponent click out of turn");
            return MatchEvent::Ignored;
        }
        let Some(tile) = self.geometry.tile_at(x, y) else {
            return MatchEvent::Ignored;
        };
        match self.game.click(tile) {
            Ok(Some(action)) => {
                self.update_phase();
                MatchEvent::OpponentMoved(action)
            }
            Ok(None) => MatchEvent::OpponentSelected(tile),
            Err(e) => {
                log::warn!("opponent click on {tile} rejected: {e}");
                MatchEvent::Ignored
            }
        }
    }

    /// Clicks on `tile` locally, returning the played action and the frame to
    /// send to the opponent.
    /// # Errors
    /// Fails if it is not our turn, or if the click neither moves nor selects.
    pub fn click(&mut self, tile: Tile) -> Result<(Option<Action>, Frame), GameError> {
        if let MatchPhase::Finished(_) = self.phase {
            return Err(GameError::GameOver);
        }
        if self.phase != MatchPhase::Playing || self.game.turn() != self.colour {
            return Err(GameError::InvalidSelection(tile));
        }
        let action = self.game.click(tile)?;
        self.update_phase();
        let (x, y) = self.geometry.centre_of(tile);
        Ok((action, Frame::Coordinates { x, y }))
    }

    /// Offers a draw, or accepts the one offered by the opponent.
    pub fn offer_draw(&mut self) -> Frame {
        if self.draw_offered {
            self.draw_offered = false;
            self.conclude_draw();
        } else {
            self.draw_requested = true;
        }
        Frame::Control(ControlToken::DrawAsk)
    }

    /// Declines the draw offered by the opponent.
    pub fn decline_draw(&mut self) -> Frame {
        self.draw_offered = false;
        Frame::Control(ControlToken::Decline)
    }

    /// Resigns the game.
    /// # Errors
    /// Fails if the game is already over.
    pub fn surrender(&mut self) -> Result<Frame, GameError> {
        let termination = self.game.surrender(self.colour)?;
        self.phase = MatchPhase::Finished(termination);
        Ok(Frame::Control(ControlToken::Surrender))
    }

    /// Asks for a rematch, or accepts the one the opponent asked for.
    pub fn request_rematch(&mut self) -> Frame {
        if self.rematch_offered {
            self.start_rematch()
        } else {
            self.rematch_requested = true;
        }
        Frame::Control(ControlToken::Rematch)
    }

    fn conclude_draw(&mut self) -> MatchEvent {
        match self.game.agree_draw() {
            Ok(termination) => {
                self.phase = MatchPhase::Finished(termination);
                MatchEvent::DrawAgreed
            }
            Err(_) => MatchEvent::Ignored,
        }
    }

    fn start_rematch(&mut self) {
        self.game.reset();
        self.colour = self.colour.inverse();
        self.clear_requests();
        self.phase = MatchPhase::Playing;
        log::info!("rematch started, now playing {}", self.colour);
    }

    fn clear_requests(&mut self) {
        self.draw_requested = false;
        self.draw_offered = false;
        self.rematch_requested = false;
        self.rematch_offered = false;
    }

    fn update_phase(&mut self) {
        if let Some(termination) = self.game.termination() {
            self.phase = MatchPhase::Finished(termination)
        }
    }
}
