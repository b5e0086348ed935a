//! Frame pacing utilities for the draw and capture timers.
//!
//! Both timers in the pipeline run at a fixed period derived from a
//! frame rate. They are intentionally uncorrelated: the draw loop
//! repaints the composite surface while the capture bridge samples
//! whatever is currently on it. Pacing is best-effort; timer jitter
//! is not compensated.

use std::time::Duration;

/// The fixed period for a given frame rate (1000/fps milliseconds).
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}

/// Tick gate for callers that poll with their own timestamps instead
/// of sleeping (synthetic sources, tests).
#[derive(Debug)]
pub struct FramePacer {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl FramePacer {
    /// Create a pacer targeting the given frame rate.
    pub fn new(target_fps: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_fps.max(1) as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next frame.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }

    /// How many whole intervals fit in the given elapsed time.
    pub fn ticks_elapsed(&self, elapsed_ns: u64) -> u64 {
        elapsed_ns / self.target_interval_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval() {
        let interval = frame_interval(30);
        // 1000/30 ms, within a microsecond
        assert!((interval.as_secs_f64() - 1.0 / 30.0).abs() < 1e-6);
        // Zero fps is clamped rather than dividing by zero
        assert_eq!(frame_interval(0), Duration::from_secs(1));
    }

    #[test]
    fn test_pacer_gating() {
        let mut pacer = FramePacer::new(30);
        assert!(pacer.should_tick(0)); // first tick always fires
        assert!(!pacer.should_tick(10_000_000)); // 10ms later, too soon
        assert!(pacer.should_tick(34_000_000)); // ~34ms later (30Hz ~ 33.3ms)
    }

    #[test]
    fn test_ticks_elapsed() {
        let pacer = FramePacer::new(30);
        assert_eq!(pacer.ticks_elapsed(0), 0);
        assert_eq!(pacer.ticks_elapsed(1_000_000_000), 30);
    }
}
