//! # Relay server
//! Accepts up to two sessions and forwards the frames of each one to the
//! other. Every session is served by its own thread; the session registry and
//! the move history sit behind a single lock.

use std::{
    net::{Shutdown, SocketAddr, TcpListener, TcpStream},
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::JoinHandle,
    time::Duration,
};

use crate::game::colour::Colour;

use super::{
    endpoint::{FrameReader, FrameWriter},
    frame::{ControlToken, Frame, FRAME_SIZE},
    history::{GameLog, MoveHistory},
    RelayError, DEFAULT_CACHE_CAPACITY, DEFAULT_LOG_FILE, DEFAULT_PORT, DEFAULT_SEND_TIMEOUT,
    MAX_SESSIONS,
};

/// Builder pattern to configure a relay server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    address: String,
    log_file: PathBuf,
    send_timeout: Duration,
    cache_capacity: usize,
}
impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            address: format!("0.0.0.0:{DEFAULT_PORT}"),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
impl RelayConfig {
    /// Creates a configuration listening on every interface, on the default port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address to listen on, `127.0.0.1:0` picking any free port.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the file finished games are appended to.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    /// Sets how long a peer may take to accept a frame before being dropped.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    /// Sets the number of coordinate frames kept in the cache.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }

    /// Binds the listening socket.
    /// # Errors
    /// Fails if the address cannot be bound.
    pub fn bind(self) -> Result<RelayServer, RelayError> {
        let listener = TcpListener::bind(&self.address)?;
        log::info!(
            "relay listening on {}, logging games to {}",
            listener.local_addr()?,
            self.log_file.display()
        );
        let registry = Registry {
            sessions: Vec::with_capacity(MAX_SESSIONS),
            next_id: 0,
            history: MoveHistory::new(self.cache_capacity, GameLog::new(self.log_file)),
        };
        Ok(RelayServer {
            listener,
            registry: Arc::new(Mutex::new(registry)),
            send_timeout: self.send_timeout,
        })
    }
}

struct Session {
    id: u64,
    colour: Colour,
    writer: FrameWriter<TcpStream>,
}

struct Registry {
    sessions: Vec<Session>,
    next_id: u64,
    history: MoveHistory,
}
impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.sessions.iter().any(|s| s.id == id)
    }

    /// White unless a session already plays White.
    fn free_colour(&self) -> Colour {
        if self.sessions.iter().any(|s| s.colour == Colour::White) {
            Colour::Black
        } else {
            Colour::White
        }
    }

    /// Sends raw bytes to every session but `from`, dropping the ones that
    /// fail to accept them.
    fn relay(&mut self, from: Option<u64>, bytes: &[u8; FRAME_SIZE]) {
        let mut failed = vec![];
        for session in self.sessions.iter_mut().filter(|s| Some(s.id) != from) {
            if let Err(e) = session.writer.send_raw(bytes) {
                log::warn!("session {} did not accept a frame: {e}", session.id);
                failed.push(session.id)
            }
        }
        for id in failed {
            self.disconnect(id, true)
        }
    }

    fn broadcast(&mut self, frame: Frame) {
        self.relay(None, &frame.encode())
    }

    /// Updates the move history for a frame sent by `from`.
    fn bookkeep(&mut self, from: u64, frame: Frame, bytes: [u8; FRAME_SIZE]) {
        let saved = match frame {
            Frame::Coordinates { .. } => {
                self.history.observe(from, bytes);
                return;
            }
            Frame::Control(ControlToken::Rematch) => self.history.save_game(),
            Frame::Control(ControlToken::Disconnect) => self.history.flush(),
            Frame::Control(_) => return,
        };
        if let Err(e) = saved {
            log::error!("failed to save game: {e}")
        }
    }

    /// Tears a session down. The remaining session is told about it when
    /// `notify` is set.
    fn disconnect(&mut self, id: u64, notify: bool) {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            return;
        };
        let session = self.sessions.remove(index);
        let _ = session.writer.get_ref().shutdown(Shutdown::Both);
        log::info!("session {id} ({}) disconnected", session.colour);

        if let Err(e) = self.history.flush() {
            log::error!("failed to save game: {e}")
        }
        if notify {
            self.broadcast(Frame::Control(ControlToken::Disconnect))
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read-only view of a running relay.
#[derive(Clone)]
pub struct RelayHandle {
    registry: Arc<Mutex<Registry>>,
}
impl RelayHandle {
    /// Number of connected sessions.
    pub fn session_count(&self) -> usize {
        lock(&self.registry).sessions.len()
    }

    /// Colours of the connected sessions, in connection order.
    pub fn colours(&self) -> Vec<Colour> {
        lock(&self.registry).sessions.iter().map(|s| s.colour).collect()
    }

    /// Number of coordinate frames currently cached.
    pub fn cached_frames(&self) -> usize {
        lock(&self.registry).history.cache().len()
    }
}

pub struct RelayServer {
    listener: TcpListener,
    registry: Arc<Mutex<Registry>>,
    send_timeout: Duration,
}
impl RelayServer {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn handle(&self) -> RelayHandle {
        RelayHandle {
            registry: self.registry.clone(),
        }
    }

    /// Accepts connections forever.
    pub fn run(self) -> Result<(), RelayError> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = self.admit(stream) {
                        log::error!("failed to admit a connection: {e}")
                    }
                }
                Err(e) => log::error!("failed to accept a connection: {e}"),
            }
        }
        Ok(())
    }

    /// Accepts connections on a background thread.
    pub fn spawn(self) -> JoinHandle<Result<(), RelayError>> {
        std::thread::spawn(move || self.run())
    }

    fn admit(&self, stream: TcpStream) -> Result<(), RelayError> {
        let peer = stream.peer_addr()?;
        stream.set_write_timeout(Some(self.send_timeout))?;

        let mut registry = lock(&self.registry);
        if registry.sessions.len() >= MAX_SESSIONS {
            log::warn!("rejecting {peer}: {}", RelayError::SessionFull);
            let mut writer = FrameWriter::new(&stream);
            writer.send_frame(Frame::Control(ControlToken::Disconnect))?;
            let _ = stream.shutdown(Shutdown::Both);
            return Ok(());
        }

        let colour = registry.free_colour();
        let id = registry.next_id;
        registry.next_id += 1;

        let reader = FrameReader::new(stream.try_clone()?);
        let mut writer = FrameWriter::new(stream);
        writer.send_frame(Frame::Control(ControlToken::assigning(colour)))?;
        registry.sessions.push(Session { id, colour, writer });
        log::info!("session {id} ({peer}) joined as {colour}");

        if registry.sessions.len() == MAX_SESSIONS {
            log::info!("both sessions are ready");
            registry.broadcast(Frame::Control(ControlToken::Ready))
        }
        drop(registry);

        let registry = self.registry.clone();
        std::thread::spawn(move || serve_session(registry, id, reader));
        Ok(())
    }
}

/// Reads the frames of one session until it leaves or its connection drops.
fn serve_session(registry: Arc<Mutex<Registry>>, id: u64, mut reader: FrameReader<TcpStream>) {
    let mut notify = true;
    loop {
        let bytes = match reader.read_raw() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::info!("session {id} lost: {e}");
                break;
            }
        };
        let frame = match Frame::decode(&bytes) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("dropping frame of session {id}: {e}");
                continue;
            }
        };
        log::debug!("session {id} sent {frame}");

        let mut registry = lock(&registry);
        if !registry.contains(id) {
            return;
        }
        registry.bookkeep(id, frame, bytes);
        registry.relay(Some(id), &bytes);
        if frame == Frame::Control(ControlToken::Disconnect) {
            notify = false;
            break;
        }
    }
    lock(&registry).disconnect(id, notify)
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        path::Path,
        sync::atomic::{AtomicBool, Ordering},
        time::Instant,
    };

    use super::*;

    fn start(name: &str) -> (SocketAddr, RelayHandle, PathBuf) {
        start_with(name, RelayConfig::new())
    }

    fn start_with(name: &str, config: RelayConfig) -> (SocketAddr, RelayHandle, PathBuf) {
        let log = std::env::temp_dir().join(format!("relay-chess-{}-{name}", std::process::id()));
        let _ = std::fs::remove_file(&log);
        let server = config
            .with_address("127.0.0.1:0")
            .with_log_file(&log)
            .bind()
            .unwrap();
        let address = server.local_addr().unwrap();
        let handle = server.handle();
        server.spawn();
        (address, handle, log)
    }

    fn join(address: SocketAddr) -> TcpStream {
        let stream = TcpStream::connect(address).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream
    }

    fn read(stream: &mut TcpStream) -> String {
        let mut buffer = [0; FRAME_SIZE];
        stream.read_exact(&mut buffer).unwrap();
        String::from_utf8(buffer.to_vec()).unwrap()
    }

    fn wait_for(condition: impl Fn() -> bool) {
        wait_within(Duration::from_secs(5), condition)
    }

    fn wait_within(limit: Duration, condition: impl Fn() -> bool) {
        let start = Instant::now();
        while !condition() {
            assert!(start.elapsed() < limit, "timed out");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn remove(log: &Path) {
        let _ = std::fs::remove_file(log);
    }

    #[test]
    fn third_connection_is_rejected() {
        let (address, handle, log) = start("third");
        let mut white = join(address);
        assert_eq!(read(&mut white), "w0000000");
        let mut black = join(address);
        assert_eq!(read(&mut black), "b0000000");
        assert_eq!(read(&mut white), "ready000");
        assert_eq!(read(&mut black), "ready000");

        let mut third = join(address);
        assert_eq!(read(&mut third), "!DISCONN");
        assert_eq!(handle.session_count(), 2);
        assert_eq!(handle.colours(), [Colour::White, Colour::Black]);
        remove(&log);
    }

    #[test]
    fn frames_are_relayed_verbatim() {
        let (address, _, log) = start("verbatim");
        let mut white = join(address);
        let mut black = join(address);
        assert_eq!(read(&mut white), "w0000000");
        assert_eq!(read(&mut white), "ready000");
        assert_eq!(read(&mut black), "b0000000");
        assert_eq!(read(&mut black), "ready000");

        white.write_all(b"04750716").unwrap();
        assert_eq!(read(&mut black), "04750716");
        // Malformed frames are dropped, the relay keeps going.
        white.write_all(b"garbage!").unwrap();
        white.write_all(b"!DRAWASK").unwrap();
        assert_eq!(read(&mut black), "!DRAWASK");
        black.write_all(b"!DECLINE").unwrap();
        assert_eq!(read(&mut white), "!DECLINE");
        remove(&log);
    }

    #[test]
    fn leaving_frees_the_colour() {
        let (address, handle, log) = start("rejoin");
        let mut white = join(address);
        let mut black = join(address);
        assert_eq!(read(&mut white), "w0000000");
        assert_eq!(read(&mut black), "b0000000");
        assert_eq!(read(&mut black), "ready000");

        white.write_all(b"!DISCONN").unwrap();
        assert_eq!(read(&mut black), "!DISCONN");
        wait_for(|| handle.session_count() == 1);

        let mut newcomer = join(address);
        assert_eq!(read(&mut newcomer), "w0000000");
        assert_eq!(read(&mut newcomer), "ready000");
        assert_eq!(read(&mut black), "ready000");
        remove(&log);
    }

    #[test]
    fn lost_connection_is_reported_to_the_peer() {
        let (address, handle, log) = start("lost");
        let white = join(address);
        let mut black = join(address);
        assert_eq!(read(&mut black), "b0000000");
        assert_eq!(read(&mut black), "ready000");

        drop(white);
        assert_eq!(read(&mut black), "!DISCONN");
        wait_for(|| handle.session_count() == 1);
        remove(&log);
    }

    #[test]
    fn rematch_writes_the_game_to_the_log() {
        let (address, handle, log) = start("rematch");
        let mut white = join(address);
        let mut black = join(address);
        assert_eq!(read(&mut white), "w0000000");
        assert_eq!(read(&mut white), "ready000");
        assert_eq!(read(&mut black), "b0000000");
        assert_eq!(read(&mut black), "ready000");

        for click in [b"04750716", b"04750516"] {
            white.write_all(click).unwrap();
            read(&mut black);
        }
        for click in [b"04750216", b"04750416"] {
            black.write_all(click).unwrap();
            read(&mut white);
        }
        wait_for(|| handle.cached_frames() == 2);

        white.write_all(b"!REMATCH").unwrap();
        assert_eq!(read(&mut black), "!REMATCH");
        assert_eq!(handle.cached_frames(), 0);
        let content = std::fs::read_to_string(&log).unwrap();
        assert_eq!(content, "04750716:04750516,04750216:04750416\n");

        // Nothing new happened, leaving does not write the game twice.
        black.write_all(b"!DISCONN").unwrap();
        assert_eq!(read(&mut white), "!DISCONN");
        wait_for(|| handle.session_count() == 1);
        assert_eq!(std::fs::read_to_string(&log).unwrap(), content);
        remove(&log);
    }

    #[test]
    fn peer_not_reading_is_dropped_after_the_send_timeout() {
        let config = RelayConfig::new().with_send_timeout(Duration::from_millis(100));
        let (address, handle, log) = start_with("stalled", config);
        // Never reads anything, its buffers end up full.
        let stalled = join(address);
        let mut black = join(address);
        assert_eq!(read(&mut black), "b0000000");
        assert_eq!(read(&mut black), "ready000");

        let stop = Arc::new(AtomicBool::new(false));
        let flood = {
            let stop = stop.clone();
            let mut sender = black.try_clone().unwrap();
            sender
                .set_write_timeout(Some(Duration::from_millis(200)))
                .unwrap();
            std::thread::spawn(move || {
                let chunk = b"!DRAWASK".repeat(1024);
                while !stop.load(Ordering::Relaxed) {
                    if sender.write_all(&chunk).is_err() {
                        std::thread::sleep(Duration::from_millis(10));
                    }
                }
            })
        };

        wait_within(Duration::from_secs(60), || handle.session_count() == 1);
        assert_eq!(handle.colours(), [Colour::Black]);
        assert_eq!(read(&mut black), "!DISCONN");

        stop.store(true, Ordering::Relaxed);
        flood.join().unwrap();
        drop(stalled);
        remove(&log);
    }
}
