use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

/// Frame/tick rates over simulated time, published once per interval.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval: Duration,
    interval_elapsed: Duration,
    frames: u32,
    ticks: u32,
    frame_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            interval_elapsed: Duration::ZERO,
            frames: 0,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.interval_elapsed = self.interval_elapsed.saturating_add(frame_dt);
    }

    pub(crate) fn maybe_snapshot(&mut self) -> Option<LoopMetricsSnapshot> {
        if self.interval_elapsed < self.interval {
            return None;
        }

        let elapsed_secs = self.interval_elapsed.as_secs_f32();
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_secs,
            tps: self.ticks as f32 / elapsed_secs,
            frame_time_ms: if self.frames == 0 {
                0.0
            } else {
                self.frame_time_sum.as_secs_f32() * 1000.0 / self.frames as f32
            },
        };

        self.interval_elapsed = Duration::ZERO;
        self.frames = 0;
        self.ticks = 0;
        self.frame_time_sum = Duration::ZERO;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_waits_for_full_interval() {
        let mut metrics = MetricsAccumulator::new(Duration::from_secs(1));
        metrics.record_frame(Duration::from_millis(500));
        assert!(metrics.maybe_snapshot().is_none());
    }

    #[test]
    fn snapshot_reports_rates_and_resets() {
        let mut metrics = MetricsAccumulator::new(Duration::from_secs(1));
        for _ in 0..50 {
            metrics.record_tick();
        }
        for _ in 0..4 {
            metrics.record_frame(Duration::from_millis(250));
        }

        let snapshot = metrics.maybe_snapshot().expect("snapshot");
        assert!((snapshot.fps - 4.0).abs() < 1e-4);
        assert!((snapshot.tps - 50.0).abs() < 1e-3);
        assert!((snapshot.frame_time_ms - 250.0).abs() < 1e-3);
        assert!(metrics.maybe_snapshot().is_none());
    }
}
