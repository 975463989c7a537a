//! Messages and shared state between the controller and the audio thread.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Open `path` and position it at `start_at`. Starts playing when
    /// `autoplay` is set, otherwise stays paused there.
    Load {
        path: PathBuf,
        start_at: Duration,
        autoplay: bool,
    },
    Pause,
    Resume,
    Stop,
    /// Jump to an absolute position in the current track.
    Seek(Duration),
    /// Output volume, clamped to 0.0..=1.0.
    SetVolume(f32),
    SetSpeed(f32),
    /// Fade length used when switching tracks mid-playback. Zero disables it.
    SetCrossfade(Duration),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// A playing track drained to its end.
    TrackEnded(PathBuf),
    LoadFailed { path: PathBuf, reason: String },
    /// No output device could be opened; the thread has stopped.
    OutputUnavailable(String),
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackInfo {
    pub path: Option<PathBuf>,
    pub elapsed: Duration,
    /// Length reported by the decoder, when it knows.
    pub duration: Option<Duration>,
    pub playing: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// Initial engine parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioOptions {
    pub volume: f32,
    pub speed: f32,
    pub crossfade: Duration,
    pub crossfade_steps: u32,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            volume: 0.7,
            speed: 1.0,
            crossfade: Duration::ZERO,
            crossfade_steps: 10,
        }
    }
}
