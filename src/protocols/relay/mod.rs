//! # Relay protocol
//! Two engine instances play against each other through a relay server that
//! forwards every frame one session sends to the other session.
//!
//! ## Constraints and guarantees
//! - all communication goes **through TCP**, one connection per player
//! - every frame is **exactly 8 ASCII bytes**, there is no length prefix
//! - the relay hosts **at most two sessions**, a third connection receives
//!   `!DISCONN` and is closed
//! - the first session plays White and the second Black, a session joining
//!   later gets whichever colour is free
//! - once both sessions are present, both receive `ready000`
//! - frames are **relayed verbatim**, control tokens additionally drive the
//!   move history kept by the relay
//! - the implementation is **fault tolerant**, malformed frames are logged and
//!   dropped
//!
//! ## Frame format
//! Control tokens are the literals `!DISCONN`, `!REMATCH`, `!DRAWASK`,
//! `!DECLINE`, `!SURREND`, `ready000`, `w0000000` and `b0000000`. Any other
//! frame is the pixel position of a click, as two zero-padded 4-digit numbers
//! (`XXXXYYYY`).

use std::{
    net::ToSocketAddrs,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    time::Duration,
};

use thiserror::Error;

use crate::game::square::Tile;

pub mod client;
pub mod endpoint;
pub mod frame;
pub mod geometry;
pub mod history;
pub mod remote;
pub mod server;

use client::RelayClient;
use frame::FrameError;
use geometry::BoardGeometry;
use remote::{MatchEvent, MatchPhase, RemoteMatch};

/// Port the relay listens on by default.
pub const DEFAULT_PORT: u16 = 55555;
/// File games are appended to by default.
pub const DEFAULT_LOG_FILE: &str = "serverlog.txt";
/// Number of coordinate frames kept in the relay cache by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 2;
/// Time after which a peer that does not accept a frame is dropped.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);
/// Maximum number of simultaneous sessions.
pub const MAX_SESSIONS: usize = 2;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Connection lost: {0}")]
    ConnectionLost(#[from] std::io::Error),
    #[error("The relay already hosts two sessions")]
    SessionFull,
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),
}

/// Commands typed by the local player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalCommand {
    Click(Tile),
    Draw,
    Decline,
    Surrender,
    Rematch,
    Board,
    Quit,
}
impl std::str::FromStr for TerminalCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "draw" => Self::Draw,
            "decline" => Self::Decline,
            "surrender" | "resign" => Self::Surrender,
            "rematch" => Self::Rematch,
            "board" => Self::Board,
            "quit" | "exit" => Self::Quit,
            tile => Self::Click(tile.parse().map_err(|_| ())?),
        })
    }
}

/// Plays a game from the terminal against whoever joins the relay at
/// `address`.
///
/// Tiles typed on standard input are clicks on the board: the first one
/// selects a piece, the second one moves it.
pub fn relay_client(address: impl ToSocketAddrs) -> Result<(), RelayError> {
    let mut client = RelayClient::connect(address)?;
    let mut remote = RemoteMatch::new(client.colour(), BoardGeometry::default());
    println!("Playing {}, waiting for an opponent", remote.colour());

    let commands = read_commands();
    loop {
        if remote.phase() == MatchPhase::WaitingForOpponent && client.is_ready() {
            remote.start();
            println!("Opponent joined\n{}", remote.game().board());
        }
        if let Some(frame) = client.take_frame() {
            let event = remote.handle(frame);
            log::debug!("{frame} -> {event:?}");
            if report(&remote, event) {
                break;
            }
        } else if !client.is_connected() {
            println!("Connection to the relay lost");
            return Ok(());
        }

        let command = match commands.recv_timeout(Duration::from_millis(50)) {
            Ok(command) => command,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => TerminalCommand::Quit,
        };
        match command {
            TerminalCommand::Click(tile) => match remote.click(tile) {
                Ok((action, frame)) => {
                    client.send(frame)?;
                    if action.is_some() {
                        println!("{}", remote.game().board());
                        if let MatchPhase::Finished(termination) = remote.phase() {
                            println!("Game over: {termination:?}");
                        }
                    }
                }
                Err(e) => println!("{e}"),
            },
            TerminalCommand::Draw => client.send(remote.offer_draw())?,
            TerminalCommand::Decline => client.send(remote.decline_draw())?,
            TerminalCommand::Surrender => match remote.surrender() {
                Ok(frame) => client.send(frame)?,
                Err(e) => println!("{e}"),
            },
            TerminalCommand::Rematch => {
                client.send(remote.request_rematch())?;
                if remote.phase() == MatchPhase::Playing {
                    println!("Rematch, playing {}\n{}", remote.colour(), remote.game().board());
                }
            }
            TerminalCommand::Board => println!("{}", remote.game().board()),
            TerminalCommand::Quit => break,
        }
    }

    client.disconnect();
    Ok(())
}

/// Prints what the opponent did, returning true if the session is over.
fn report(remote: &RemoteMatch, event: MatchEvent) -> bool {
    match event {
        MatchEvent::OpponentMoved(action) => {
            match action.captured() {
                Some(kind) => println!("Opponent played {}{}, taking {kind:?}", action.origin, action.target),
                None => println!("Opponent played {}{}", action.origin, action.target),
            }
            println!("{}", remote.game().board());
            if let MatchPhase::Finished(termination) = remote.phase() {
                println!("Game over: {termination:?}");
            }
        }
        MatchEvent::OpponentLeft => {
            println!("Opponent left");
            return true;
        }
        MatchEvent::OpponentResigned => println!("Opponent resigned"),
        MatchEvent::DrawOffered => println!("Opponent offers a draw (draw/decline)"),
        MatchEvent::DrawAgreed => println!("Draw agreed"),
        MatchEvent::DrawDeclined => println!("Draw declined"),
        MatchEvent::RematchOffered => println!("Opponent asks for a rematch (rematch)"),
        MatchEvent::RematchStarted(colour) => {
            println!("Rematch, playing {colour}\n{}", remote.game().board())
        }
        MatchEvent::ColourAssigned(_)
        | MatchEvent::Started
        | MatchEvent::OpponentSelected(_)
        | MatchEvent::Ignored => (),
    }
    false
}

/// Parses standard input lines on a background thread.
fn read_commands() -> Receiver<TerminalCommand> {
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            match line.parse() {
                Ok(command) => {
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                Err(()) => println!("Unknown command: {}", line.trim()),
            }
        }
    });
    receiver
}
