//! Playback flows: what happens on play, skip, seek, volume and the
//! events coming back from the audio thread.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::audio::AudioCmd;

use super::model::{App, PlaybackState, RowKind, View};

impl App {
    /// Start `path` from the top and record it as recently played.
    pub fn load_and_play(&mut self, path: PathBuf) {
        self.send(AudioCmd::Load {
            path: path.clone(),
            start_at: Duration::ZERO,
            autoplay: true,
        });
        self.playback = PlaybackState::Playing;

        let recent = self.settings.add_recently_played(&path);
        self.report("Saving recently played", recent);
        let resume = self.settings.update(|s| {
            s.last_folder = path.parent().map(Path::to_path_buf);
            s.last_track = Some(path.clone());
            s.last_position = 0.0;
        });
        self.report("Saving settings", resume);

        let label = self.label_for(&path);
        tracing::info!(path = %path.display(), "now playing");
        self.set_status(format!("Now playing: {label}"));
    }

    /// Load `path` paused at `position`; used to restore the last session.
    pub fn cue(&mut self, path: PathBuf, position: Duration) {
        self.send(AudioCmd::Load {
            path,
            start_at: position,
            autoplay: false,
        });
        self.playback = PlaybackState::Paused;
    }

    /// Enter on a row: play a track, or open a playlist.
    pub fn activate_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };

        match (self.view, row.kind) {
            (View::Queue, RowKind::Track(_)) => {
                if let Some(path) = self.queue.play_index(row.source) {
                    self.load_and_play(path);
                }
            }
            (View::Playlists, RowKind::Playlist(name)) => {
                self.open_playlist = Some(name);
                self.filter_query.clear();
                self.filter_mode = false;
                self.selected = 0;
            }
            (View::Playlists, RowKind::Track(_)) => {
                let Some(tracks) = self
                    .open_playlist
                    .as_deref()
                    .and_then(|n| self.playlists.get(n))
                    .map(|p| p.tracks.clone())
                else {
                    return;
                };
                self.queue.clear();
                self.queue.add_multiple(tracks);
                if let Some(path) = self.queue.play_index(row.source) {
                    self.load_and_play(path);
                }
            }
            (_, RowKind::Track(path)) => {
                self.queue.add(path);
                if let Some(path) = self.queue.play_index(self.queue.len() - 1) {
                    self.load_and_play(path);
                }
            }
            (_, RowKind::Playlist(_)) => {}
        }
    }

    /// Pause, resume, or start the queue.
    pub fn toggle_play(&mut self) {
        match self.playback {
            PlaybackState::Playing => {
                self.send(AudioCmd::Pause);
                self.playback = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                self.send(AudioCmd::Resume);
                self.playback = PlaybackState::Playing;
            }
            PlaybackState::Stopped => {
                if let Some(path) = self.queue.current().map(Path::to_path_buf) {
                    self.load_and_play(path);
                } else if let Some(path) = self.queue.next() {
                    self.load_and_play(path);
                } else {
                    self.activate_selected();
                }
            }
        }
    }

    pub fn stop(&mut self) {
        self.send(AudioCmd::Stop);
        self.playback = PlaybackState::Stopped;
    }

    /// Restart the current track when past the restart threshold,
    /// otherwise step back in the queue.
    pub fn previous(&mut self) {
        let threshold = Duration::from_secs(self.controls.restart_threshold_seconds);
        if self.playback != PlaybackState::Stopped && self.elapsed() > threshold {
            self.send(AudioCmd::Seek(Duration::ZERO));
            return;
        }
        match self.queue.previous() {
            Some(path) => self.load_and_play(path),
            None => self.set_status("Start of queue"),
        }
    }

    pub fn next_track(&mut self) {
        match self.queue.next() {
            Some(path) => self.load_and_play(path),
            None => {
                self.stop();
                self.set_status("End of queue");
            }
        }
    }

    /// Advance past `path`. An end reported for a track that is no longer
    /// current (a skip raced it) is ignored.
    pub fn on_track_ended(&mut self, path: &Path) {
        if self.queue.current() != Some(path) {
            tracing::debug!(path = %path.display(), "ignoring end of a track no longer current");
            return;
        }
        tracing::debug!(path = %path.display(), "advancing after track end");
        match self.queue.on_track_end() {
            Some(next) => self.load_and_play(next),
            None => {
                self.playback = PlaybackState::Stopped;
                self.set_status("End of queue");
            }
        }
    }

    pub fn on_load_failed(&mut self, path: &Path, reason: &str) {
        self.playback = PlaybackState::Stopped;
        self.set_status(format!("Cannot play {}: {reason}", path.display()));
    }

    pub fn on_output_unavailable(&mut self, reason: &str) {
        self.playback = PlaybackState::Stopped;
        self.set_status(format!("No audio output: {reason}"));
    }

    /// Seek by `delta_secs`, clamped to the track.
    pub fn seek_relative(&mut self, delta_secs: i64) {
        if self.playback == PlaybackState::Stopped {
            return;
        }
        let elapsed = self.elapsed();
        let delta = Duration::from_secs(delta_secs.unsigned_abs());
        let mut target = if delta_secs < 0 {
            elapsed.saturating_sub(delta)
        } else {
            elapsed + delta
        };
        if let Some(total) = self.current_duration() {
            target = target.min(total);
        }
        self.send(AudioCmd::Seek(target));
    }

    pub fn volume(&self) -> f32 {
        if self.muted_from.is_some() {
            0.0
        } else {
            self.settings.settings().volume
        }
    }

    /// Change volume by `delta_percent`; unmutes first.
    pub fn change_volume(&mut self, delta_percent: i32) {
        let base = self
            .muted_from
            .take()
            .unwrap_or(self.settings.settings().volume);
        let volume = (base + delta_percent as f32 / 100.0).clamp(0.0, 1.0);
        // Snap to whole percent so repeated steps land on round numbers.
        let volume = (volume * 100.0).round() / 100.0;
        let saved = self.settings.update(|s| s.volume = volume);
        self.report("Saving volume", saved);
        self.send(AudioCmd::SetVolume(volume));
        self.set_status(format!("Volume {}%", (volume * 100.0).round() as u32));
    }

    pub fn toggle_mute(&mut self) {
        match self.muted_from.take() {
            Some(volume) => {
                self.send(AudioCmd::SetVolume(volume));
                self.set_status("Unmuted");
            }
            None => {
                self.muted_from = Some(self.settings.settings().volume);
                self.send(AudioCmd::SetVolume(0.0));
                self.set_status("Muted");
            }
        }
    }

    pub fn toggle_shuffle(&mut self) {
        let on = !self.queue.is_shuffle();
        self.queue.set_shuffle(on);
        let saved = self.settings.update(|s| s.shuffle = on);
        self.report("Saving shuffle", saved);
        self.set_status(if on { "Shuffle on" } else { "Shuffle off" });
    }

    pub fn cycle_repeat(&mut self) {
        let mode = self.queue.cycle_repeat();
        let saved = self.settings.update(|s| s.repeat = mode);
        self.report("Saving repeat mode", saved);
        self.set_status(format!("Repeat {}", mode.label()));
    }

    /// Step through the sleep-timer presets.
    pub fn cycle_sleep_timer(&mut self) {
        let minutes = self.sleep_timer.next_preset();
        self.sleep_timer.start(minutes);
        if minutes == 0 {
            self.set_status("Sleep timer off");
        } else {
            self.set_status(format!("Sleep timer: {minutes} min"));
        }
    }

    /// Periodic work: sleep-timer expiry and automatic rescans.
    pub fn tick(&mut self, now: Instant) {
        if self.sleep_timer.take_expired_at(now) {
            tracing::info!("sleep timer expired");
            self.stop();
            self.set_status("Sleep timer expired, playback stopped");
        }

        let s = self.settings.settings();
        let interval = Duration::from_secs(s.auto_rescan_interval.saturating_mul(60));
        if s.auto_rescan && now.duration_since(self.last_rescan) >= interval {
            self.last_rescan = now;
            self.rescan_library();
        }
    }

    /// Remember where playback stood so the next start can resume there.
    pub fn save_session(&mut self, terminal_size: Option<(u16, u16)>) {
        let current = self.queue.current().map(Path::to_path_buf);
        let position = if current.is_some() {
            self.elapsed().as_secs_f64()
        } else {
            0.0
        };
        let saved = self.settings.update(|s| {
            if let Some(path) = current {
                s.last_track = Some(path);
                s.last_position = position;
            }
            if let Some((w, h)) = terminal_size {
                s.window_width = w;
                s.window_height = h;
            }
        });
        self.report("Saving session", saved);
    }
}
