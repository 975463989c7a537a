//! The play queue ("up next").
//!
//! A queue is an ordered list of file paths with a pointer at the current
//! entry. It is separate from playlists: it is rebuilt freely, never
//! persisted, and carries the shuffle/repeat state plus a history of what
//! was played so "previous" can walk back.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Oldest history entries are dropped past this many.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    #[default]
    None,
    /// Replay the current track when it ends.
    One,
    /// Wrap around to the start.
    All,
}

impl RepeatMode {
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::One,
            Self::One => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "off",
            Self::One => "one",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Default)]
pub struct PlayQueue {
    items: Vec<PathBuf>,
    current: Option<usize>,
    shuffle: bool,
    repeat: RepeatMode,
    history: Vec<PathBuf>,
    // Order to restore when shuffle is turned off. Only maintained while
    // shuffle is on.
    original: Vec<PathBuf>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[PathBuf] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Path> {
        self.current
            .and_then(|i| self.items.get(i))
            .map(PathBuf::as_path)
    }

    /// Entries after the current one, or the whole queue when nothing is current.
    pub fn upcoming(&self) -> &[PathBuf] {
        match self.current {
            Some(i) => self.items.get(i + 1..).unwrap_or(&[]),
            None => &self.items,
        }
    }

    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    pub fn is_shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.shuffle {
            self.original.push(path.clone());
        }
        self.items.push(path);
    }

    pub fn add_multiple<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for p in paths {
            self.add(p);
        }
    }

    /// Insert right after the current entry (at the front when nothing is current).
    pub fn add_next(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.shuffle {
            let at = self
                .current()
                .and_then(|cur| self.original.iter().position(|p| p == cur))
                .map_or(0, |i| i + 1);
            self.original.insert(at, path.clone());
        }
        let at = self.current.map_or(0, |i| i + 1);
        self.items.insert(at, path);
    }

    /// Remove entry `index`. When the current entry is removed the pointer
    /// stays on the entry that followed it (or the new last one).
    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.forget_original(&removed);

        self.current = match self.current {
            _ if self.items.is_empty() => None,
            Some(c) if index < c => Some(c - 1),
            Some(c) if index == c => Some(c.min(self.items.len() - 1)),
            other => other,
        };
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.history.clear();
        self.original.clear();
        self.current = None;
    }

    /// Drop everything after the current entry. Current entry and history
    /// are kept; with nothing current the whole list goes.
    pub fn clear_upcoming(&mut self) {
        let keep = self.current.map_or(0, |i| i + 1);
        let dropped: Vec<PathBuf> = self.items.drain(keep..).collect();
        for p in &dropped {
            self.forget_original(p);
        }
    }

    fn forget_original(&mut self, path: &Path) {
        if let Some(pos) = self.original.iter().position(|p| p == path) {
            self.original.remove(pos);
        }
    }

    fn push_history(&mut self) {
        let Some(cur) = self.current().map(Path::to_path_buf) else {
            return;
        };
        self.history.push(cur);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    fn current_owned(&self) -> Option<PathBuf> {
        self.current().map(Path::to_path_buf)
    }

    /// Manual skip. Wraps with `RepeatMode::All`; ignores `RepeatMode::One`.
    /// Returns `None` (pointer unchanged) at the end of the queue.
    pub fn next(&mut self) -> Option<PathBuf> {
        if self.items.is_empty() {
            return None;
        }
        let target = match self.current {
            None => 0,
            Some(i) if i + 1 < self.items.len() => i + 1,
            Some(_) if self.repeat == RepeatMode::All => 0,
            Some(_) => return None,
        };
        self.push_history();
        self.current = Some(target);
        self.current_owned()
    }

    /// Automatic advance after a track finished playing.
    pub fn on_track_end(&mut self) -> Option<PathBuf> {
        if self.repeat == RepeatMode::One && self.current.is_some() {
            return self.current_owned();
        }
        self.next()
    }

    /// Walk back through history, falling back to the previous entry.
    pub fn previous(&mut self) -> Option<PathBuf> {
        if self.items.is_empty() {
            return None;
        }

        while let Some(path) = self.history.pop() {
            if let Some(i) = self.locate(&path) {
                self.current = Some(i);
                return self.current_owned();
            }
        }

        self.current = match self.current {
            Some(i) if i > 0 => Some(i - 1),
            _ if self.repeat == RepeatMode::All => Some(self.items.len() - 1),
            _ => return None,
        };
        self.current_owned()
    }

    // Prefer the nearest occurrence before the current entry.
    fn locate(&self, path: &Path) -> Option<usize> {
        let before = self.current.unwrap_or(0).min(self.items.len());
        self.items[..before]
            .iter()
            .rposition(|p| p == path)
            .or_else(|| self.items.iter().position(|p| p == path))
    }

    pub fn play_index(&mut self, index: usize) -> Option<PathBuf> {
        if index >= self.items.len() {
            return None;
        }
        self.push_history();
        self.current = Some(index);
        self.current_owned()
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.repeat
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        self.set_shuffle_with(enabled, &mut rand::rng());
    }

    /// Turning shuffle on keeps everything up to the current entry in
    /// place and shuffles the rest. Turning it off restores the order
    /// remembered at shuffle time, with later additions included.
    pub fn set_shuffle_with<R: Rng + ?Sized>(&mut self, enabled: bool, rng: &mut R) {
        if enabled == self.shuffle {
            return;
        }

        if enabled {
            self.original = self.items.clone();
            self.shuffle_upcoming(rng);
        } else {
            let current = self.current_owned();
            self.items = std::mem::take(&mut self.original);
            self.current = current
                .as_deref()
                .and_then(|c| self.items.iter().position(|p| p == c));
        }
        self.shuffle = enabled;
    }

    pub fn shuffle_remaining(&mut self) {
        self.shuffle_remaining_with(&mut rand::rng());
    }

    pub fn shuffle_remaining_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.shuffle_upcoming(rng);
    }

    fn shuffle_upcoming<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let from = self.current.map_or(0, |i| i + 1).min(self.items.len());
        self.items[from..].shuffle(rng);
    }

    /// Move an entry; the current pointer follows the entry it pointed at.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);

        if let Some(c) = self.current {
            self.current = Some(if c == from {
                to
            } else if from < c && c <= to {
                c - 1
            } else if to <= c && c < from {
                c + 1
            } else {
                c
            });
        }
        true
    }
}

#[cfg(test)]
mod tests;
