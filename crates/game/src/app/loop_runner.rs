use std::process::ExitCode;

use engine::run_headless;
use tracing::info;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        mut scene,
        mut frames,
    } = app;
    let summary = run_headless(&config, &mut scene, &mut frames);
    info!(
        frames = summary.frames,
        ticks = summary.ticks,
        simulated_seconds = summary.simulated_seconds,
        dropped_backlog_ms = summary.dropped_backlog.as_millis() as u64,
        "run_complete"
    );

    ExitCode::SUCCESS
}
