//! Application controller: the state the UI draws and the operations the
//! keyboard shortcuts trigger.
//!
//! `App` owns the stores and the play queue. Audio is driven through an
//! outbox of `AudioCmd`s that the runtime drains every loop iteration, so
//! the controller itself never touches the output device.

mod actions;
mod filter;
mod model;
mod playback;

pub use filter::fuzzy_match_positions;
pub use model::*;
