//! Frame clock for the host tick.
//!
//! One `update` per display frame yields the elapsed/delta pair the control
//! uniforms carry into the simulation step. Pausing freezes elapsed time and
//! reports a zero delta; resuming excludes the paused span so there is no
//! delta spike on the first frame back.

use std::time::{Duration, Instant};

/// Per-frame timing source.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    paused: bool,
    pause_elapsed: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            paused: false,
            pause_elapsed: Duration::ZERO,
        }
    }

    /// Advance the clock one frame. Returns `(elapsed, delta)` in seconds.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, 0.0);
        }

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = (now.duration_since(self.start) - self.pause_elapsed).as_secs_f32();
        (self.elapsed_secs, self.delta_secs)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_update_advances_time() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = clock.update();
        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
    }

    #[test]
    fn test_paused_clock_is_frozen() {
        let mut clock = FrameClock::new();
        clock.update();
        clock.pause();

        let before = clock.elapsed();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = clock.update();

        assert_eq!(elapsed, before);
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn test_resume_excludes_paused_span() {
        let mut clock = FrameClock::new();
        clock.update();
        clock.pause();
        thread::sleep(Duration::from_millis(50));
        clock.resume();
        let (_, delta) = clock.update();

        // The 50ms paused span must not show up as a delta spike.
        assert!(delta < 0.03, "delta {} includes paused time", delta);
    }
}
