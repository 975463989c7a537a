use std::time::Duration;

use crate::app::App;
use crate::audio::AudioOptions;
use crate::config::Config;
use crate::settings::AppSettings;

/// Engine parameters from the saved preferences and static config.
pub fn audio_options(settings: &AppSettings, config: &Config) -> AudioOptions {
    AudioOptions {
        volume: settings.volume,
        speed: settings.playback_speed,
        crossfade: Duration::from_secs_f32(settings.crossfade_seconds.max(0.0)),
        crossfade_steps: config.audio.crossfade_steps.clamp(1, u32::MAX as u64) as u32,
    }
}

/// Put the last session's track back into the queue, cued at its position.
///
/// Returns `true` when something was restored.
pub fn restore_session(app: &mut App) -> bool {
    let s = app.settings.settings();
    let Some(path) = s.last_track.clone() else {
        return false;
    };
    if !path.exists() {
        tracing::info!(path = %path.display(), "last track is gone, not resuming");
        return false;
    }
    let position = Duration::from_secs_f64(s.last_position.max(0.0));

    app.queue.add(path.clone());
    app.queue.play_index(0);
    app.cue(path.clone(), position);
    let label = app.label_for(&path);
    app.set_status(format!("Resume: {label} (space to play)"));
    tracing::info!(path = %path.display(), ?position, "restored last session");
    true
}
