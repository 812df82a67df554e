mod app;

use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    let app = match app::bootstrap::build_app() {
        Ok(app) => app,
        Err(error) => {
            error!(error = %error, "startup_failed");
            return ExitCode::FAILURE;
        }
    };
    app::loop_runner::run(app)
}
