//! # Chess API
//! This module contains everything Chess related: tiles, pieces, the board
//! state, legal move generation and the turn flow of a game.

pub mod action;
pub mod board;
pub mod colour;
pub mod fen;
pub mod pattern;
#[cfg(feature = "perft")]
pub mod perft;
pub mod piece;
pub mod playout;
mod safety;
mod special;
pub mod square;
pub mod tileset;
pub mod turn;
