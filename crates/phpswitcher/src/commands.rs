use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use phpswitcher_backend::{InstalledPackage, PackageBackend, PhpVersion, SystemRunner};
use phpswitcher_core::{
    ActiveVersionMarker, CoreError, DetectedVersion, InstallOutcome, detect_in_dir,
    detect_version, install_version, switch_version,
};
use phpswitcher_platform::PlatformFamily;

use crate::backend_kind::select_backend;
use crate::cli::Command;
use crate::error::AppError;
use crate::settings::AppSettings;

pub struct App {
    pub settings: AppSettings,
    pub platform: PlatformFamily,
    pub marker: ActiveVersionMarker,
    pub verbose: bool,
}

impl App {
    async fn backend(&self) -> Result<Box<dyn PackageBackend>, AppError> {
        let runner = Arc::new(SystemRunner::new(self.settings.command_timeout()));
        Ok(select_backend(self.platform, &self.settings, runner).await?)
    }

    pub async fn run(&self, command: Command) -> Result<ExitCode, AppError> {
        match command {
            Command::Install { version } => self.install(version).await,
            Command::Use { version } => self.switch(version).await,
            Command::List => self.list().await,
            Command::Current => self.current(),
            Command::Detect { dir } => self.detect(dir),
        }
    }

    async fn install(&self, version: Option<String>) -> Result<ExitCode, AppError> {
        let version = requested_version(version, &current_dir()?)?;
        PhpVersion::parse_install(&version).map_err(CoreError::from)?;

        let backend = self.backend().await?;
        match install_version(&version, backend.as_ref()).await? {
            InstallOutcome::Installed(package) => {
                println!("Installed PHP {} ({})", package.full_version(), package.package_name);
            }
            InstallOutcome::AlreadyInstalled(package) => {
                println!(
                    "PHP {} is already installed ({})",
                    package.full_version(),
                    package.package_name
                );
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn switch(&self, version: Option<String>) -> Result<ExitCode, AppError> {
        let version = requested_version(version, &current_dir()?)?;
        PhpVersion::parse_series(&version).map_err(CoreError::from)?;

        let backend = self.backend().await?;
        let report = switch_version(&version, backend.as_ref()).await?;

        let active = report.target.full_version();
        if let Err(e) = self.marker.write(&active) {
            warn!("{e}");
        }
        println!("Now using PHP {active} ({})", report.target.package_name);
        Ok(ExitCode::SUCCESS)
    }

    async fn list(&self) -> Result<ExitCode, AppError> {
        let backend = self.backend().await?;
        let installed = backend.list_installed().await?;

        if installed.is_empty() {
            println!("No PHP versions installed via {}", backend.name());
        } else {
            for line in format_listing(&installed, self.marker.read().as_deref()) {
                println!("{line}");
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn current(&self) -> Result<ExitCode, AppError> {
        let version = self.marker.read().ok_or(AppError::NoActiveVersion)?;
        println!("{version}");
        Ok(ExitCode::SUCCESS)
    }

    fn detect(&self, dir: Option<PathBuf>) -> Result<ExitCode, AppError> {
        let start = match dir {
            Some(dir) => std::path::absolute(&dir)
                .map_err(|e| AppError::operation_failed("Resolve directory", e))?,
            None => current_dir()?,
        };

        match detect_version(&start) {
            Some(detected) => {
                println!("{}", format_detection(&detected, self.verbose));
                Ok(ExitCode::SUCCESS)
            }
            None => Ok(ExitCode::FAILURE),
        }
    }
}

fn current_dir() -> Result<PathBuf, AppError> {
    std::env::current_dir().map_err(|e| AppError::operation_failed("Read current directory", e))
}

/// The explicit argument, else whatever `dir` itself pins.
fn requested_version(explicit: Option<String>, dir: &Path) -> Result<String, CoreError> {
    if let Some(version) = explicit {
        return Ok(version);
    }

    let detected = detect_in_dir(dir).ok_or(CoreError::VersionNotSpecified)?;
    info!("Using PHP {} from {}", detected.version, detected.source);
    Ok(detected.version)
}

fn format_listing(installed: &[InstalledPackage], active: Option<&str>) -> Vec<String> {
    installed
        .iter()
        .map(|package| {
            let version = package.version.to_string();
            let mark = if active == Some(version.as_str()) { '*' } else { ' ' };
            format!("{mark} {version:<6} {}", package.package_name)
        })
        .collect()
}

fn format_detection(detected: &DetectedVersion, verbose: bool) -> String {
    if verbose {
        format!("{} {}", detected.version, detected.source)
    } else {
        detected.version.clone()
    }
}
