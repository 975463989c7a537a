use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::library::{SortColumn, ViewMode};
use crate::queue::RepeatMode;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Neon,
    Retrowave,
    Hacker,
    Lava,
    ElectricLime,
    Bubblegum,
    CommanderKeen,
}

impl Theme {
    pub const ALL: [Theme; 9] = [
        Theme::Light,
        Theme::Dark,
        Theme::Neon,
        Theme::Retrowave,
        Theme::Hacker,
        Theme::Lava,
        Theme::ElectricLime,
        Theme::Bubblegum,
        Theme::CommanderKeen,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::Neon => "Neon",
            Theme::Retrowave => "Retrowave",
            Theme::Hacker => "Hacker",
            Theme::Lava => "Lava",
            Theme::ElectricLime => "Electric Lime",
            Theme::Bubblegum => "Bubblegum",
            Theme::CommanderKeen => "Commander Keen",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// User preferences persisted in `settings.json`.
///
/// Every field has a default so partial or older files load cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    // playback
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub crossfade_seconds: f32,
    pub playback_speed: f32,

    // interface
    pub theme: Theme,
    pub window_width: u16,
    pub window_height: u16,

    // library
    pub library_sort_column: SortColumn,
    pub library_sort_reverse: bool,
    pub library_view_mode: ViewMode,
    pub auto_rescan: bool,
    /// Minutes between automatic rescans.
    pub auto_rescan_interval: u64,

    pub recently_played: Vec<PathBuf>,
    pub recently_played_max: usize,
    pub favorites: Vec<PathBuf>,

    // resume state
    pub last_folder: Option<PathBuf>,
    pub last_track: Option<PathBuf>,
    /// Seconds into `last_track`.
    pub last_position: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            volume: 0.7,
            shuffle: false,
            repeat: RepeatMode::None,
            crossfade_seconds: 0.0,
            playback_speed: 1.0,
            theme: Theme::Light,
            window_width: 1200,
            window_height: 700,
            library_sort_column: SortColumn::Title,
            library_sort_reverse: false,
            library_view_mode: ViewMode::List,
            auto_rescan: false,
            auto_rescan_interval: 60,
            recently_played: Vec::new(),
            recently_played_max: 50,
            favorites: Vec::new(),
            last_folder: None,
            last_track: None,
            last_position: 0.0,
        }
    }
}

const MIN_SPEED: f32 = 0.5;
const MAX_SPEED: f32 = 2.0;

impl AppSettings {
    /// Pull out-of-range values back into range.
    pub fn sanitize(&mut self) {
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.7
        };
        self.playback_speed = if self.playback_speed.is_finite() {
            self.playback_speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            1.0
        };
        if !self.crossfade_seconds.is_finite() || self.crossfade_seconds < 0.0 {
            self.crossfade_seconds = 0.0;
        }
        if !self.last_position.is_finite() || self.last_position < 0.0 {
            self.last_position = 0.0;
        }
        self.recently_played_max = self.recently_played_max.max(1);
        self.auto_rescan_interval = self.auto_rescan_interval.max(1);
        self.recently_played.truncate(self.recently_played_max);

        // Older files stored "" for an unset path.
        for slot in [&mut self.last_folder, &mut self.last_track] {
            if slot.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                *slot = None;
            }
        }
    }
}
