mod backend_kind;
mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use clap::Parser;
use log::warn;
use std::process::ExitCode;

use phpswitcher_core::ActiveVersionMarker;
use phpswitcher_platform::{AppPaths, PlatformFamily};

use crate::cli::Cli;
use crate::commands::App;
use crate::error::AppError;
use crate::settings::AppSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            if let Some(hint) = error.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let paths = AppPaths::new()?;
    let settings_path = cli.config.clone().unwrap_or_else(|| paths.settings_file());
    let (settings, load_error) = match AppSettings::load(&settings_path) {
        Ok(settings) => (settings, None),
        Err(error) => (AppSettings::default(), Some(error)),
    };

    logging::init_logging(
        &paths,
        logging::terminal_level(cli.verbose, cli.log_level),
        settings.max_log_size_bytes,
    );
    if let Some(error) = load_error {
        warn!("{error}; using default settings");
    }

    let marker = ActiveVersionMarker::new(settings.marker_path(&paths, cli.marker_file.as_deref()));
    let app = App {
        settings,
        platform: PlatformFamily::detect(),
        marker,
        verbose: cli.verbose,
    };
    app.run(cli.command).await
}
