//! Log to `groove.log` in the data directory.
//!
//! The terminal belongs to the UI, so nothing is written to stdout/stderr
//! once the subscriber is installed.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

pub const LOG_FILE_NAME: &str = "groove.log";

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init(data_dir: &Path, default_level: &str) -> Result<PathBuf> {
    fs::create_dir_all(data_dir).map_err(|e| Error::io(data_dir, e))?;
    let path = data_dir.join(LOG_FILE_NAME);
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| Error::io(&path, e))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init();

    Ok(path)
}
