use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A named, ordered set of track paths. A path appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<PathBuf>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    /// Append `path` unless it is already present. Returns whether it was added.
    pub fn add_track(&mut self, path: &Path) -> bool {
        if self.tracks.iter().any(|p| p == path) {
            return false;
        }
        self.tracks.push(path.to_path_buf());
        true
    }

    pub fn remove_track(&mut self, path: &Path) -> bool {
        match self.tracks.iter().position(|p| p == path) {
            Some(i) => {
                self.tracks.remove(i);
                true
            }
            None => false,
        }
    }

    /// Move the entry at `from` to `to`. Out-of-range indices are ignored.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tracks.len() || to >= self.tracks.len() {
            return false;
        }
        let p = self.tracks.remove(from);
        self.tracks.insert(to, p);
        true
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
