use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::sink::create_sink_at;
use super::types::{AudioCmd, AudioEvent, AudioOptions, PlaybackHandle};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const FADE_OUT_STEPS: u64 = 20;

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,
    options: AudioOptions,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "no audio output device");
                let _ = events.send(AudioEvent::OutputUnavailable(e.to_string()));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the terminal UI.
        stream.log_on_drop(false);

        let mut engine = Engine::new(stream, events, playback_info, options);
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    engine.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => engine.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            engine.tick();
        }
        tracing::debug!("audio thread finished");
    })
}

/// Volume pair (outgoing, incoming) at `step` of a `steps`-long crossfade.
pub(super) fn crossfade_levels(step: u32, steps: u32, volume: f32) -> (f32, f32) {
    let t = step.min(steps) as f32 / steps.max(1) as f32;
    (volume * (1.0 - t), volume * t)
}

pub(super) fn clamp_volume(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

struct Engine {
    stream: OutputStream,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,
    options: AudioOptions,

    sink: Option<Sink>,
    path: Option<PathBuf>,
    duration: Option<Duration>,
    paused: bool,
    // Position the current sink started at, plus wall time since resume.
    offset: Duration,
    started_at: Option<Instant>,
}

impl Engine {
    fn new(
        stream: OutputStream,
        events: Sender<AudioEvent>,
        playback_info: PlaybackHandle,
        mut options: AudioOptions,
    ) -> Self {
        options.volume = clamp_volume(options.volume);
        Self {
            stream,
            events,
            playback_info,
            options,
            sink: None,
            path: None,
            duration: None,
            paused: true,
            offset: Duration::ZERO,
            started_at: None,
        }
    }

    fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load {
                path,
                start_at,
                autoplay,
            } => self.load(path, start_at, autoplay),
            AudioCmd::Pause => self.pause(),
            AudioCmd::Resume => self.resume(),
            AudioCmd::Stop => self.stop(),
            AudioCmd::Seek(pos) => self.seek(pos),
            AudioCmd::SetVolume(v) => {
                self.options.volume = clamp_volume(v);
                if let Some(s) = &self.sink {
                    s.set_volume(self.options.volume);
                }
            }
            AudioCmd::SetSpeed(speed) => {
                // Bank the position played at the old speed first.
                let elapsed = self.elapsed();
                self.offset = elapsed;
                self.started_at = (!self.paused).then(Instant::now);
                self.options.speed = speed;
                if let Some(s) = &self.sink {
                    s.set_speed(speed);
                }
            }
            AudioCmd::SetCrossfade(d) => self.options.crossfade = d,
            AudioCmd::Quit { fade_out_ms } => self.quit(fade_out_ms),
        }
    }

    fn elapsed(&self) -> Duration {
        let running = self
            .started_at
            .map_or(Duration::ZERO, |st| st.elapsed().mul_f32(self.options.speed));
        let pos = self.offset + running;
        match self.duration {
            Some(total) => pos.min(total),
            None => pos,
        }
    }

    fn publish(&self) {
        if let Ok(mut info) = self.playback_info.lock() {
            info.path = self.path.clone();
            info.elapsed = self.elapsed();
            info.duration = self.duration;
            info.playing = self.sink.is_some() && !self.paused;
        }
    }

    fn load(&mut self, path: PathBuf, start_at: Duration, autoplay: bool) {
        let (new_sink, total) = match create_sink_at(&self.stream, &path, start_at) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "failed to load track");
                let _ = self.events.send(AudioEvent::LoadFailed {
                    path,
                    reason: e.to_string(),
                });
                return;
            }
        };
        new_sink.set_speed(self.options.speed);

        match self.sink.take() {
            Some(old) if !self.paused && autoplay && !self.options.crossfade.is_zero() => {
                self.crossfade(&old, &new_sink);
                old.stop();
            }
            Some(old) => old.stop(),
            None => {}
        }

        new_sink.set_volume(self.options.volume);
        if autoplay {
            new_sink.play();
        }

        tracing::debug!(path = %path.display(), ?start_at, autoplay, "track loaded");
        self.sink = Some(new_sink);
        self.path = Some(path);
        self.duration = total;
        self.paused = !autoplay;
        self.offset = start_at;
        self.started_at = autoplay.then(Instant::now);
        self.publish();
    }

    // Blocking ramp; audio keeps flowing in rodio's mixer thread.
    fn crossfade(&self, old: &Sink, new: &Sink) {
        let steps = self.options.crossfade_steps.max(1);
        let step_len = (self.options.crossfade / steps).max(Duration::from_millis(1));
        new.set_volume(0.0);
        new.play();
        for step in 1..=steps {
            let (out_level, in_level) = crossfade_levels(step, steps, self.options.volume);
            old.set_volume(out_level);
            new.set_volume(in_level);
            thread::sleep(step_len);
        }
    }

    fn pause(&mut self) {
        let Some(s) = &self.sink else { return };
        if self.paused {
            return;
        }
        s.pause();
        self.offset = self.elapsed();
        self.started_at = None;
        self.paused = true;
        self.publish();
    }

    fn resume(&mut self) {
        let Some(s) = &self.sink else { return };
        if !self.paused {
            return;
        }
        s.play();
        self.started_at = Some(Instant::now());
        self.paused = false;
        self.publish();
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.path = None;
        self.duration = None;
        self.paused = true;
        self.offset = Duration::ZERO;
        self.started_at = None;
        self.publish();
    }

    /// Rebuild the sink and skip into the file.
    fn seek(&mut self, pos: Duration) {
        let Some(path) = self.path.clone() else {
            return;
        };
        if self.sink.is_none() {
            return;
        }
        let pos = match self.duration {
            Some(total) => pos.min(total),
            None => pos,
        };

        let (new_sink, _) = match create_sink_at(&self.stream, &path, pos) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "seek failed");
                return;
            }
        };
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        new_sink.set_volume(self.options.volume);
        new_sink.set_speed(self.options.speed);
        if !self.paused {
            new_sink.play();
        }

        self.sink = Some(new_sink);
        self.offset = pos;
        self.started_at = (!self.paused).then(Instant::now);
        self.publish();
    }

    /// Periodic work: publish the position and report a drained sink.
    fn tick(&mut self) {
        let drained = !self.paused && self.sink.as_ref().is_some_and(Sink::empty);
        if drained {
            let ended = self.path.clone();
            self.stop();
            if let Some(path) = ended {
                tracing::debug!(path = %path.display(), "track ended");
                let _ = self.events.send(AudioEvent::TrackEnded(path));
            }
            return;
        }
        self.publish();
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.take() {
            if !self.paused {
                fade_out_sink(&s, self.options.volume, fade_out_ms);
            }
            s.stop();
        }
        self.paused = true;
        self.started_at = None;
        self.publish();
    }
}

fn fade_out_sink(sink: &Sink, volume: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let step_ms = (fade_out_ms / FADE_OUT_STEPS).max(1);
    for step in 1..=FADE_OUT_STEPS {
        let t = step as f32 / FADE_OUT_STEPS as f32;
        sink.set_volume(volume * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
