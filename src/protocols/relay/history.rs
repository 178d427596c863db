//! # Move history
//!
//! The relay keeps the latest coordinate frames in a bounded cache. Frames
//! pushed out of the cache move to the record of the game in progress, which
//! is appended to the log file as a single line on rematch or disconnect.
//!
//! Lines hold comma-separated `from:to` pairs, one pair per turn: the last two
//! clicks a session sent before its opponent clicked. A game abandoned while a
//! player was still choosing a piece logs that player's last two selections.
//! ```text
//! 04750716:04750516,04750216:04750416
//! ```

use std::{
    collections::VecDeque,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use super::frame::FRAME_SIZE;

/// A coordinate frame as received, with the session that sent it.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct CacheEntry {
    pub session: u64,
    pub payload: [u8; FRAME_SIZE],
}

/// Fixed capacity FIFO ring of the latest entries.
#[derive(Clone, Debug)]
pub struct MoveCache {
    entries: VecDeque<CacheEntry>,
    capacity: usize,
}
impl MoveCache {
    /// Creates an empty cache. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes an entry, returning the oldest one if the cache was full.
    pub fn push(&mut self, entry: CacheEntry) -> Option<CacheEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Removes every entry, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = CacheEntry> + '_ {
        self.entries.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Every entry of the game in progress that left the cache.
#[derive(Clone, Debug, Default)]
pub struct GameRecord {
    entries: Vec<CacheEntry>,
}
impl GameRecord {
    pub fn push(&mut self, entry: CacheEntry) {
        self.entries.push(entry)
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs clicks into moves, in the order the moves were completed.
    ///
    /// Players alternate, so the clicks of one turn form a run of entries
    /// from the same session. The last two clicks of a run are the move; any
    /// earlier click was a selection that got replaced. A run of a single
    /// click is dropped.
    pub fn pairs(&self) -> Vec<([u8; FRAME_SIZE], [u8; FRAME_SIZE])> {
        self.entries
            .chunk_by(|a, b| a.session == b.session)
            .filter_map(|run| match run {
                [.., from, to] => Some((from.payload, to.payload)),
                _ => None,
            })
            .collect()
    }

    /// The log line of this record, newline included.
    pub fn line(&self) -> String {
        let mut line = self
            .pairs()
            .iter()
            .map(|(from, to)| {
                format!(
                    "{}:{}",
                    String::from_utf8_lossy(from),
                    String::from_utf8_lossy(to)
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        line.push('\n');
        line
    }
}

/// Append-only text file holding one line per game.
#[derive(Clone, Debug)]
pub struct GameLog {
    path: PathBuf,
}
impl GameLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a line to the log, creating the file as needed.
    pub fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

/// Cache, record and log of the relay.
#[derive(Clone, Debug)]
pub struct MoveHistory {
    cache: MoveCache,
    record: GameRecord,
    log: GameLog,
    saved: bool,
}
impl MoveHistory {
    pub fn new(capacity: usize, log: GameLog) -> Self {
        Self {
            cache: MoveCache::new(capacity),
            record: GameRecord::default(),
            log,
            saved: true,
        }
    }

    #[inline]
    pub fn cache(&self) -> &MoveCache {
        &self.cache
    }

    #[inline]
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Stores a coordinate payload sent by `session`.
    pub fn observe(&mut self, session: u64, payload: [u8; FRAME_SIZE]) {
        self.saved = false;
        if let Some(evicted) = self.cache.push(CacheEntry { session, payload }) {
            self.record.push(evicted)
        }
    }

    /// Writes the game in progress to the log and starts a new one.
    ///
    /// Returns whether a line was written.
    pub fn save_game(&mut self) -> std::io::Result<bool> {
        for entry in self.cache.drain() {
            self.record.push(entry)
        }
        let written = !self.record.is_empty();
        if written {
            self.log.append(&self.record.line())?;
            log::info!("game saved to {}", self.log.path().display());
        }
        self.record.clear();
        self.saved = true;
        Ok(written)
    }

    /// Saves the game in progress unless it already was.
    pub fn flush(&mut self) -> std::io::Result<bool> {
        if self.saved {
            return Ok(false);
        }
        self.save_game()
    }
}
