use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// One audio file's metadata record. Two tracks are equal when their paths are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Stored as fractional seconds.
    #[serde(with = "secs_f64")]
    pub duration: Duration,
    /// File creation time in unix seconds; 0 for records written before it existed.
    #[serde(default)]
    pub created: f64,
}

impl Track {
    /// A record with placeholder metadata derived from the file name.
    pub fn placeholder(path: &Path) -> Self {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        Self {
            path: path.to_path_buf(),
            title,
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            duration: Duration::ZERO,
            created: 0.0,
        }
    }

    pub fn has_known_artist(&self) -> bool {
        !self.artist.trim().is_empty() && self.artist != UNKNOWN_ARTIST
    }

    pub fn has_known_album(&self) -> bool {
        !self.album.trim().is_empty() && self.album != UNKNOWN_ALBUM
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Track {}

/// Column used to order the library listing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Title,
    Artist,
    Album,
    Duration,
    Created,
}

/// Flat list, or grouped by containing folder.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    List,
    Folder,
}

mod secs_f64 {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if secs.is_finite() && secs > 0.0 {
            Ok(Duration::from_secs_f64(secs))
        } else {
            Ok(Duration::ZERO)
        }
    }
}
