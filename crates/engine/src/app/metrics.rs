use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub tps: f32,
    /// Simulated seconds per wall-clock second. Headless runs go far above 1.0.
    pub sim_speed: f32,
    pub frame_time_ms: f32,
}

#[derive(Debug, Default)]
struct Window {
    frames: u32,
    ticks: u32,
    simulated: Duration,
    frame_time: Duration,
}

impl Window {
    fn summarize(&self, wall: Duration) -> LoopMetricsSnapshot {
        let wall_seconds = wall.as_secs_f32().max(f32::EPSILON);
        LoopMetricsSnapshot {
            tps: self.ticks as f32 / wall_seconds,
            sim_speed: self.simulated.as_secs_f32() / wall_seconds,
            frame_time_ms: match self.frames {
                0 => 0.0,
                frames => self.frame_time.as_secs_f32() * 1000.0 / frames as f32,
            },
        }
    }
}

/// Rolls loop counters into one snapshot per reporting interval.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    started: Instant,
    interval: Duration,
    window: Window,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            started: Instant::now(),
            interval,
            window: Window::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.window.frames = self.window.frames.saturating_add(1);
        self.window.frame_time = self.window.frame_time.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self, fixed_dt: Duration) {
        self.window.ticks = self.window.ticks.saturating_add(1);
        self.window.simulated = self.window.simulated.saturating_add(fixed_dt);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let wall = now.saturating_duration_since(self.started);
        if wall < self.interval {
            return None;
        }
        let window = std::mem::take(&mut self.window);
        self.started = now;
        Some(window.summarize(wall))
    }
}
