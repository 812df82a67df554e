use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use super::metrics::MetricsAccumulator;
use super::scene::SceneMachine;
use super::{InputSnapshot, Scene, SceneCommand, SceneKey, ScenePayload, SceneWorld};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Pace frames against the wall clock instead of stepping as fast as possible.
    pub realtime: bool,
    pub max_sim_duration: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            realtime: false,
            max_sim_duration: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("scene '{0}' is not registered")]
    UnknownScene(&'static str),
    #[error("scene '{0}' is registered more than once")]
    DuplicateScene(&'static str),
}

/// Supplies one input snapshot per fixed tick.
pub trait InputSource {
    fn snapshot_for_tick(&mut self, scene: SceneKey, world: &SceneWorld) -> InputSnapshot;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    SceneQuit,
    InputQuit,
    SimLimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub simulated: Duration,
    pub exit_reason: ExitReason,
    pub final_scene: SceneKey,
}

pub fn run_app(
    config: LoopConfig,
    scenes: Vec<Box<dyn Scene>>,
    initial_scene: SceneKey,
    initial_payload: ScenePayload,
    input: &mut dyn InputSource,
) -> Result<RunSummary, AppError> {
    let mut scenes = SceneMachine::new(scenes)?;
    scenes.start(initial_scene, &initial_payload)?;
    info!(
        scene = scenes.active_key().name(),
        body_count = scenes.active_world().body_count(),
        "scene_loaded"
    );

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        realtime = config.realtime,
        max_sim_duration_ms = config.max_sim_duration.as_millis() as u64,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut ticks = 0u64;
    let mut simulated = Duration::ZERO;

    let exit_reason = 'run: loop {
        let frame_start = Instant::now();
        let raw_frame_dt = if config.realtime {
            frame_start.saturating_duration_since(last_frame_instant)
        } else {
            // Headless stepping advances exactly one tick per frame.
            fixed_dt
        };
        last_frame_instant = frame_start;

        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
        accumulator = accumulator.saturating_add(clamped_frame_dt);

        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        accumulator = step_plan.remaining_accumulator;
        for _ in 0..step_plan.ticks_to_run {
            let input_snapshot = input.snapshot_for_tick(scenes.active_key(), scenes.active_world());
            if input_snapshot.quit_requested() {
                info!(reason = "input", "shutdown_requested");
                break 'run ExitReason::InputQuit;
            }

            let command = scenes.update_active(fixed_dt_seconds, &input_snapshot);
            scenes.apply_pending_active();
            ticks = ticks.saturating_add(1);
            simulated = simulated.saturating_add(fixed_dt);
            metrics_accumulator.record_tick(fixed_dt);

            match command {
                SceneCommand::None => {}
                SceneCommand::SwitchTo { scene, payload } => {
                    let from = scenes.active_key();
                    scenes.switch_to(scene, &payload)?;
                    info!(
                        from = from.name(),
                        scene = scenes.active_key().name(),
                        body_count = scenes.active_world().body_count(),
                        "scene_switched"
                    );
                }
                SceneCommand::Quit => {
                    info!(reason = "scene", "shutdown_requested");
                    break 'run ExitReason::SceneQuit;
                }
            }

            if simulated >= config.max_sim_duration {
                warn!(
                    simulated_ms = simulated.as_millis() as u64,
                    scene = scenes.active_key().name(),
                    "sim_limit_reached"
                );
                break 'run ExitReason::SimLimitReached;
            }
        }

        if step_plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        metrics_accumulator.record_frame(raw_frame_dt);
        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(Instant::now()) {
            info!(
                tps = snapshot.tps,
                sim_speed = snapshot.sim_speed,
                frame_time_ms = snapshot.frame_time_ms,
                body_count = scenes.active_world().body_count(),
                scene = scenes.active_key().name(),
                hud = %scenes.debug_title_active().unwrap_or_default(),
                "loop_metrics"
            );
        }

        if config.realtime {
            let cap_sleep = compute_cap_sleep(frame_start.elapsed(), fixed_dt);
            if cap_sleep > Duration::ZERO {
                thread::sleep(cap_sleep);
            }
        }
    };

    let summary = RunSummary {
        ticks,
        simulated,
        exit_reason,
        final_scene: scenes.active_key(),
    };
    scenes.shutdown_all();
    info!(
        ticks,
        simulated_ms = simulated.as_millis() as u64,
        exit_reason = ?exit_reason,
        "shutdown"
    );
    Ok(summary)
}

#[derive(Debug, Clone, Copy)]
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
        let dropped_backlog = accumulator;
        accumulator = Duration::ZERO;
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog,
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

fn compute_cap_sleep(elapsed: Duration, frame_target: Duration) -> Duration {
    frame_target.saturating_sub(elapsed)
}
