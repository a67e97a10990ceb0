use std::path::PathBuf;
use std::process::ExitCode;

use pagescope_lib::server::{start_server, AppState};

use crate::cli::{OutputFormat, ServeArgs};
use crate::formatting::render_error;
use crate::settings::{
    apply_serve_overrides, flag_present, format_effective_config, load_config,
};

/// Run the HTTP service until it fails or the process is stopped.
pub async fn run_serve(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    args: ServeArgs,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, OutputFormat::Json, None),
    };
    apply_serve_overrides(&mut config, &args, flag_present(raw_args, "--bind"));
    if let Err(err) = config.validate() {
        return render_error(err, OutputFormat::Json, None);
    }
    log::debug!("{}", format_effective_config(&config, config_path.as_deref()));

    if config.server.capture_local {
        log::info!(
            "Local screenshots enabled in {}",
            config.server.screenshots_dir.display()
        );
    }

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(err) => return render_error(err, OutputFormat::Json, None),
    };

    match start_server(&config.server.bind, state).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_error(err, OutputFormat::Json, None),
    }
}
