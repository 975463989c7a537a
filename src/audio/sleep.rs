//! Sleep timer: stop playback after a set number of minutes.

use std::time::{Duration, Instant};

/// Presets offered by the sleep-timer key, in minutes. Zero cancels.
pub const SLEEP_PRESETS: [u64; 7] = [0, 15, 30, 45, 60, 90, 120];

#[derive(Debug, Default, Clone)]
pub struct SleepTimer {
    deadline: Option<Instant>,
    minutes: u64,
}

impl SleepTimer {
    pub fn start(&mut self, minutes: u64) {
        self.start_at(Instant::now(), minutes);
    }

    pub fn start_at(&mut self, now: Instant, minutes: u64) {
        if minutes == 0 {
            self.cancel();
            return;
        }
        self.minutes = minutes;
        self.deadline = Some(now + Duration::from_secs(minutes * 60));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.minutes = 0;
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Minutes the timer was last started with, 0 when inactive.
    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.remaining_at(Instant::now())
    }

    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// True once, when the deadline has passed. The timer is cleared.
    pub fn take_expired_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.cancel();
                true
            }
            _ => false,
        }
    }

    /// Next preset after the current one, wrapping to "off".
    pub fn next_preset(&self) -> u64 {
        let i = SLEEP_PRESETS
            .iter()
            .position(|&m| m == self.minutes)
            .unwrap_or(0);
        SLEEP_PRESETS[(i + 1) % SLEEP_PRESETS.len()]
    }
}
