//! Crate-wide error type.
//!
//! Store and library operations return `Result<T>`; the controller logs the
//! error, shows it on the status line and keeps running.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("tag error on {path}: {source}")]
    Tag {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("config error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("playlist '{0}' not found")]
    PlaylistNotFound(String),

    #[error("playlist '{0}' already exists")]
    PlaylistExists(String),

    #[error("playlist name must not be empty")]
    EmptyPlaylistName,

    #[error("track not in library: {0}")]
    TrackNotFound(PathBuf),

    #[error("audio error: {0}")]
    Audio(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
