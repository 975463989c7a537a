//! Playback engine.
//!
//! A background thread owns the `rodio` output stream. The controller
//! talks to it through [`AudioPlayer`]: commands go in over a channel,
//! end-of-track and load failures come back as [`AudioEvent`]s, and the
//! current position is published into a shared [`PlaybackInfo`].

mod player;
mod sink;
mod sleep;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use sleep::SleepTimer;
pub use types::{AudioCmd, AudioEvent, AudioOptions, PlaybackHandle, PlaybackInfo};
