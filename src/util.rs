//! Shared utilities: frame clocks and the FPS counter

use std::collections::VecDeque;
use std::time::Instant;

// ============================================================================
// Clocks
// ============================================================================

/// Source of frame time
pub trait Clock {
    /// Seconds elapsed since the previous call
    fn tick(&mut self) -> f32;
}

/// Wall clock time
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

/// Constant step, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedStep(pub f32);

impl Clock for FixedStep {
    fn tick(&mut self) -> f32 {
        self.0
    }
}

// ============================================================================
// FPS Counter
// ============================================================================

/// Seconds between FPS reports
const REPORT_INTERVAL: f32 = 0.5;

/// FPS counter with rolling average and a periodic report
pub struct FpsCounter {
    frame_times: VecDeque<f32>,
    sample_count: usize,
    since_report: f32,
    frames_since_report: u32,
}

impl FpsCounter {
    /// Create a new FPS counter with specified sample window
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            sample_count: sample_count.max(1),
            since_report: 0.0,
            frames_since_report: 0,
        }
    }

    /// Record one frame of `dt` seconds. Returns the frame rate over the
    /// elapsed report window once more than 0.5 s has accumulated.
    pub fn record(&mut self, dt: f32) -> Option<f32> {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }

        self.since_report += dt;
        self.frames_since_report += 1;
        if self.since_report > REPORT_INTERVAL {
            let fps = self.frames_since_report as f32 / self.since_report;
            self.since_report = 0.0;
            self.frames_since_report = 0;
            Some(fps)
        } else {
            None
        }
    }

    /// Average FPS over the sample window
    pub fn average_fps(&self) -> f32 {
        let avg_dt: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }
}
