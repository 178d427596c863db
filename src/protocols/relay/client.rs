//! # Relay client
//! Connects to a relay and receives frames on a background thread. The
//! foreground only ever sees the latest frame received: a frame that is not
//! taken before the next one arrives is overwritten.

use std::{
    net::{Shutdown, TcpStream, ToSocketAddrs},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::JoinHandle,
};

use crate::game::colour::Colour;

use super::{
    endpoint::{FrameReader, FrameWriter},
    frame::{ControlToken, Frame},
    RelayError,
};

/// What the receiver thread learned from the relay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inbox {
    /// Latest frame not taken yet.
    pub latest: Option<Frame>,
    pub ready: bool,
    pub connected: bool,
}

fn lock(inbox: &Mutex<Inbox>) -> MutexGuard<'_, Inbox> {
    inbox.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct RelayClient {
    colour: Colour,
    writer: FrameWriter<TcpStream>,
    inbox: Arc<Mutex<Inbox>>,
    receiver: Option<JoinHandle<()>>,
}
impl RelayClient {
    /// Connects to a relay and waits for the colour it assigns.
    /// # Errors
    /// Fails if the relay cannot be reached, if it already hosts two
    /// sessions, or if it does not start with a colour assignment.
    pub fn connect(address: impl ToSocketAddrs) -> Result<Self, RelayError> {
        let stream = TcpStream::connect(address)?;
        let mut reader = FrameReader::new(stream.try_clone()?);

        let colour = match reader.read_frame()?? {
            Frame::Control(ControlToken::Disconnect) => return Err(RelayError::SessionFull),
            Frame::Control(token) => match token.assigned_colour() {
                Some(colour) => colour,
                None => return Err(unexpected(Frame::Control(token))),
            },
            frame => return Err(unexpected(frame)),
        };
        log::info!("connected to the relay, playing {colour}");

        let inbox = Arc::new(Mutex::new(Inbox {
            connected: true,
            ..Default::default()
        }));
        let receiver = {
            let inbox = inbox.clone();
            std::thread::spawn(move || receive(reader, inbox))
        };

        Ok(Self {
            colour,
            writer: FrameWriter::new(stream),
            inbox,
            receiver: Some(receiver),
        })
    }

    /// Colour assigned by the relay.
    #[inline]
    pub fn colour(&self) -> Colour {
        self.colour
    }

    /// Checks if both players are connected.
    pub fn is_ready(&self) -> bool {
        lock(&self.inbox).ready
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.inbox).connected
    }

    /// Takes the latest frame received, if any.
    pub fn take_frame(&self) -> Option<Frame> {
        lock(&self.inbox).latest.take()
    }

    /// Snapshot of the inbox, leaving the latest frame in place.
    pub fn inbox(&self) -> Inbox {
        *lock(&self.inbox)
    }

    /// Sends a frame to the opponent.
    /// # Errors
    /// Fails if the connection to the relay is lost.
    pub fn send(&mut self, frame: Frame) -> Result<(), RelayError> {
        log::debug!("sending {frame}");
        self.writer.send_frame(frame).map_err(|e| {
            lock(&self.inbox).connected = false;
            RelayError::ConnectionLost(e)
        })
    }

    /// Sends the position of a click.
    pub fn send_click(&mut self, x: u16, y: u16) -> Result<(), RelayError> {
        self.send(Frame::coordinates(x, y)?)
    }

    pub fn request_rematch(&mut self) -> Result<(), RelayError> {
        self.send(Frame::Control(ControlToken::Rematch))
    }

    pub fn request_draw(&mut self) -> Result<(), RelayError> {
        self.send(Frame::Control(ControlToken::DrawAsk))
    }

    pub fn decline_draw(&mut self) -> Result<(), RelayError> {
        self.send(Frame::Control(ControlToken::Decline))
    }

    pub fn surrender(&mut self) -> Result<(), RelayError> {
        self.send(Frame::Control(ControlToken::Surrender))
    }

    /// Leaves the relay and waits for the receiver thread to stop.
    pub fn disconnect(mut self) {
        if let Err(e) = self.send(Frame::Control(ControlToken::Disconnect)) {
            log::warn!("relay already gone: {e}")
        }
        self.close()
    }

    fn close(&mut self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
        if let Some(receiver) = self.receiver.take() {
            if receiver.join().is_err() {
                log::error!("receiver thread panicked")
            }
        }
        lock(&self.inbox).connected = false;
    }
}
impl Drop for RelayClient {
    fn drop(&mut self) {
        self.close()
    }
}

fn unexpected(frame: Frame) -> RelayError {
    RelayError::MalformedFrame(super::frame::FrameError::Malformed(format!(
        "expected a colour assignment, got {frame}"
    )))
}

/// Stores every frame received until the connection ends.
fn receive(mut reader: FrameReader<TcpStream>, inbox: Arc<Mutex<Inbox>>) {
    loop {
        let frame = match reader.read_frame() {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => {
                log::warn!("dropping frame: {e}");
                continue;
            }
            Err(e) => {
                log::info!("connection to the relay lost: {e}");
                let mut inbox = lock(&inbox);
                if inbox.connected {
                    inbox.latest = Some(Frame::Control(ControlToken::Disconnect));
                }
                inbox.connected = false;
                return;
            }
        };
        log::debug!("received {frame}");

        let mut inbox = lock(&inbox);
        match frame {
            Frame::Control(ControlToken::Ready) => inbox.ready = true,
            Frame::Control(ControlToken::Disconnect) => {
                inbox.latest = Some(frame);
                inbox.ready = false;
                inbox.connected = false;
                return;
            }
            frame => inbox.latest = Some(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::protocols::relay::server::RelayConfig;

    fn start(name: &str) -> (std::net::SocketAddr, PathBuf) {
        let log = std::env::temp_dir().join(format!("relay-chess-{}-{name}", std::process::id()));
        let _ = std::fs::remove_file(&log);
        let server = RelayConfig::new()
            .with_address("127.0.0.1:0")
            .with_log_file(&log)
            .bind()
            .unwrap();
        let address = server.local_addr().unwrap();
        server.spawn();
        (address, log)
    }

    fn wait_for(condition: impl Fn() -> bool) {
        let start = Instant::now();
        while !condition() {
            assert!(start.elapsed() < Duration::from_secs(5), "timed out");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn clients_play_through_the_relay() {
        let (address, log) = start("clients");
        let mut white = RelayClient::connect(address).unwrap();
        assert_eq!(white.colour(), Colour::White);
        assert!(!white.is_ready());

        let black = RelayClient::connect(address).unwrap();
        assert_eq!(black.colour(), Colour::Black);
        wait_for(|| white.is_ready() && black.is_ready());

        assert!(matches!(
            RelayClient::connect(address),
            Err(RelayError::SessionFull)
        ));

        white.send_click(475, 716).unwrap();
        wait_for(|| black.inbox().latest.is_some());
        assert_eq!(black.take_frame(), Some(Frame::Coordinates { x: 475, y: 716 }));
        assert_eq!(black.take_frame(), None);

        white.disconnect();
        wait_for(|| !black.is_connected());
        assert_eq!(
            black.take_frame(),
            Some(Frame::Control(ControlToken::Disconnect))
        );
        drop(black);
        let _ = std::fs::remove_file(log);
    }

    #[test]
    fn only_the_latest_frame_is_kept() {
        let (address, log) = start("latest");
        let mut white = RelayClient::connect(address).unwrap();
        let black = RelayClient::connect(address).unwrap();
        wait_for(|| black.is_ready());

        white.request_draw().unwrap();
        white.send_click(125, 116).unwrap();
        wait_for(|| black.inbox().latest == Some(Frame::Coordinates { x: 125, y: 116 }));
        assert_eq!(black.take_frame(), Some(Frame::Coordinates { x: 125, y: 116 }));

        white.disconnect();
        wait_for(|| !black.is_connected());
        let _ = std::fs::remove_file(log);
    }
}
