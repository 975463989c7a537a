use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level static configuration loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/groove/config.toml` or `~/.config/groove/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `GROOVE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
///
/// User preferences that change while the player runs (volume, theme,
/// favorites...) live in `settings.json`, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub ui: UiConfig,
    pub controls: ControlsConfig,
    pub library: LibraryConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Number of steps used to fade volumes during a crossfade.
    pub crossfade_steps: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            crossfade_steps: 10,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which track fields make up a row in track lists, and in what order.
    ///
    /// Example: ["artist", "title", "album"]
    pub list_fields: Vec<TrackDisplayField>,

    /// Separator used to join `list_fields`.
    pub list_separator: String,

    /// Which time fields to show in the now-playing block, and in what order.
    pub now_playing_time_fields: Vec<TimeField>,

    /// Separator used to join `now_playing_time_fields`.
    pub now_playing_time_separator: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            header_text: " ~ groove ~ ".to_string(),
            list_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            list_separator: " - ".to_string(),
            now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Total],
            now_playing_time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Seconds to seek with Left / Right.
    pub seek_seconds: u64,
    /// Volume change in percent for +/- and Ctrl-Up / Ctrl-Down.
    pub volume_step: u8,
    /// "Previous" restarts the current track when more than this many
    /// seconds have played.
    pub restart_threshold_seconds: u64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            seek_seconds: 5,
            volume_step: 5,
            restart_threshold_seconds: 3,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    Title,
    Artist,
    Album,
    Duration,
    Filename,
    Path,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "flac", "wav", "ogg", "m4a", "wma"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where library/playlists/settings/auth JSON and the log file live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
