use std::time::Duration;

use tracing::{info, warn};

use super::metrics::MetricsAccumulator;
use super::{InputSnapshot, Scene, SceneCommand, SceneWorld};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 50,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    pub dt: Duration,
    pub input: InputSnapshot,
}

/// Supplies frames to the headless loop. The source may poke the scene
/// before each frame runs (scripted commands), and ends the run by
/// returning `None`.
pub trait FrameSource<S: Scene> {
    fn next_frame(&mut self, scene: &mut S, world: &mut SceneWorld) -> Option<FrameInput>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopSummary {
    pub frames: u64,
    pub ticks: u64,
    pub simulated_seconds: f64,
    pub dropped_backlog: Duration,
    pub quit_by_scene: bool,
}

pub fn run_headless<S, F>(config: &LoopConfig, scene: &mut S, frames: &mut F) -> LoopSummary
where
    S: Scene,
    F: FrameSource<S>,
{
    let mut world = SceneWorld::default();
    let summary = run_headless_in(config, scene, frames, &mut world);
    scene.unload(&mut world);
    world.apply_pending();
    info!(
        frames = summary.frames,
        ticks = summary.ticks,
        simulated_seconds = summary.simulated_seconds,
        "shutdown"
    );
    summary
}

/// Same as [`run_headless`] but leaves the scene loaded in a caller-owned
/// world, so callers can inspect the final state.
pub fn run_headless_in<S, F>(
    config: &LoopConfig,
    scene: &mut S,
    frames: &mut F,
    world: &mut SceneWorld,
) -> LoopSummary
where
    S: Scene,
    F: FrameSource<S>,
{
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    scene.load(world);
    world.apply_pending();
    info!(node_count = world.node_count(), "scene_loaded");
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut summary = LoopSummary::default();
    let mut accumulator = Duration::ZERO;
    let mut metrics = MetricsAccumulator::new(metrics_log_interval);

    while let Some(frame) = frames.next_frame(scene, world) {
        world.apply_pending();
        let frame_dt = clamp_frame_delta(frame.dt, max_frame_delta);
        accumulator = accumulator.saturating_add(frame_dt);

        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            scene.fixed_update(fixed_dt_seconds, world);
            world.apply_pending();
            metrics.record_tick();
            summary.ticks = summary.ticks.saturating_add(1);
        }
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            summary.dropped_backlog = summary
                .dropped_backlog
                .saturating_add(step_plan.dropped_backlog);
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        let frame_dt_seconds = frame_dt.as_secs_f32();
        let command = scene.update(frame_dt_seconds, &frame.input, world);
        world.tick_effects(frame_dt_seconds);
        world.apply_pending();

        summary.frames = summary.frames.saturating_add(1);
        summary.simulated_seconds += frame_dt.as_secs_f64();
        metrics.record_frame(frame_dt);
        if let Some(snapshot) = metrics.maybe_snapshot() {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                node_count = world.node_count(),
                title = scene.debug_title(world).unwrap_or_default(),
                "loop_metrics"
            );
        }

        if command == SceneCommand::Quit || frame.input.quit_requested() {
            summary.quit_by_scene = command == SceneCommand::Quit;
            info!(reason = "quit_requested", "shutdown_requested");
            break;
        }
    }

    summary
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
