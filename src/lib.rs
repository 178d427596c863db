//! # Relay-chess
//! A chess rules engine, and a relay letting two remote players share a game
//! over TCP.
//!
//! It is usable as both a library to embed into your own projects and a standalone
//! binary running the relay, a terminal client, or move generation checks.

pub mod game;
pub mod protocols;
