//! Variable-step frame clock.
//!
//! Every animated subsystem reads the same `delta` and `elapsed` for a frame,
//! so the clock is advanced exactly once at the top of each frame. The running
//! total is kept in `f64`; animation reads an `f32` copy taken per frame.

use std::time::{Duration, Instant};
use tracing::warn;

/// Longest frame step the simulation accepts, in seconds. A stall (window
/// drag, breakpoint, suspended laptop) advances the scene by at most this.
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Clock reading for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_TIME`].
    pub delta: f32,
    /// Sum of all clamped deltas.
    pub elapsed: f32,
    /// `elapsed` at full precision.
    pub total: f64,
    pub frame: u64,
}

impl FrameTime {
    /// Elapsed time as a `Duration`, for lifetimes measured in seconds.
    pub fn elapsed_duration(&self) -> Duration {
        Duration::from_secs_f64(self.total.max(0.0))
    }
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    previous: Instant,
    elapsed: f64,
    frame: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous: Instant::now(),
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Measure wall time since the last call and advance.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous).as_secs_f32();
        self.previous = now;
        self.advance(frame_time)
    }

    /// Advance by an explicit frame time in seconds.
    pub fn advance(&mut self, frame_time: f32) -> FrameTime {
        let mut delta = frame_time.max(0.0);
        if delta > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                delta * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            delta = MAX_FRAME_TIME;
        }
        self.elapsed += f64::from(delta);
        self.frame += 1;
        FrameTime {
            delta,
            elapsed: self.elapsed as f32,
            total: self.elapsed,
            frame: self.frame,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_frame_passes_through() {
        let mut clock = FrameClock::new();
        let t = clock.advance(0.016);
        assert!((t.delta - 0.016).abs() < 1e-6);
        assert!((t.elapsed - 0.016).abs() < 1e-6);
        assert_eq!(t.frame, 1);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = FrameClock::new();
        let t = clock.advance(3.0);
        assert_eq!(t.delta, MAX_FRAME_TIME);
        assert_eq!(clock.elapsed(), f64::from(MAX_FRAME_TIME));
    }

    #[test]
    fn test_negative_frame_time_is_zero() {
        let mut clock = FrameClock::new();
        let t = clock.advance(-1.0);
        assert_eq!(t.delta, 0.0);
        assert_eq!(t.elapsed, 0.0);
    }

    #[test]
    fn test_elapsed_accumulates() {
        let mut clock = FrameClock::new();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.elapsed() - 1.0).abs() < 1e-4);
        assert_eq!(clock.frame_count(), 60);
    }

    #[test]
    fn test_long_session_keeps_step_precision() {
        let mut clock = FrameClock::new();
        clock.elapsed = 86_400.0;
        for _ in 0..600 {
            clock.advance(1.0 / 60.0);
        }
        let gained = clock.elapsed() - 86_400.0;
        assert!((gained - 10.0).abs() < 1e-4, "gained {gained}");
    }

    #[test]
    fn test_elapsed_duration() {
        let mut clock = FrameClock::new();
        let t = clock.advance(0.2);
        assert_eq!(t.elapsed_duration().as_millis(), 200);
    }
}
