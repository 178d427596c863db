//! Protocols are used to communicate with the rules engine from other programs.
//!
//! relay-chess implements a single one:
//! - Relay, a plain TCP protocol letting two players share a game through a
//!   relay server
pub mod relay;
