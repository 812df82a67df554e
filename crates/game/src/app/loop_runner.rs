use std::process::ExitCode;

use engine::{run_app, ExitReason};
use tracing::{error, info, warn};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        scenes,
        initial_scene,
        initial_payload,
        mut input,
    } = app;

    match run_app(config, scenes, initial_scene, initial_payload, &mut input) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                simulated_ms = summary.simulated.as_millis() as u64,
                exit_reason = ?summary.exit_reason,
                final_scene = summary.final_scene.name(),
                "run_finished"
            );
            if summary.exit_reason == ExitReason::SimLimitReached {
                warn!("encounter_not_finished_within_sim_limit");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
