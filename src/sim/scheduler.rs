/// Tick scheduler driven by the frame pump.
///
/// The host calls `due(now, interval)` once per frame; a step is owed when
/// at least `interval` has passed since the previous one. The interval is
/// read fresh every frame so speed changes apply to the very next tick.

use std::time::{Duration, Instant};

#[derive(Clone, Debug, Default)]
pub struct TickScheduler {
    running: bool,
    last_step: Option<Instant>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin scheduling from `now`. Returns false if already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.last_step = Some(now);
        true
    }

    /// Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.last_step = None;
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True when a step should run now; the step is then booked at `now`.
    pub fn due(&mut self, now: Instant, interval: Duration) -> bool {
        if !self.running {
            return false;
        }
        match self.last_step {
            Some(last) if now.saturating_duration_since(last) < interval => false,
            _ => {
                self.last_step = Some(now);
                true
            }
        }
    }
}
