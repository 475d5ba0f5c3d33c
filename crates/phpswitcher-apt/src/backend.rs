use async_trait::async_trait;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use phpswitcher_backend::{
    BackendError, BackendInfo, BackendSettings, InstalledPackage, PackageBackend, PhpVersion,
    ProcessCommand, ProcessRunner, ResolvedPackage,
};

use crate::classify;

const CLI_SUFFIX: &str = "-cli";
const INSTALLED_STATUS: &str = "install ok installed";

/// Debian packages `phpX.Y-cli` side by side; `update-alternatives` picks
/// which `/usr/bin/phpX.Y` answers to `php`.
#[derive(Clone)]
pub struct AptBackend {
    info: BackendInfo,
    runner: Arc<dyn ProcessRunner>,
    package_prefix: String,
    alternatives_group: String,
    bin_dir: PathBuf,
    elevation: Option<String>,
    install_timeout: Duration,
    switch_timeout: Duration,
}

impl AptBackend {
    #[must_use]
    pub fn new(path: PathBuf, version: Option<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        let defaults = BackendSettings::default();
        Self {
            info: BackendInfo {
                name: "apt",
                path,
                version,
            },
            runner,
            package_prefix: defaults.package_prefix,
            alternatives_group: defaults.alternatives_group,
            bin_dir: defaults.bin_dir,
            elevation: defaults.elevation,
            install_timeout: defaults.install_timeout,
            switch_timeout: defaults.switch_timeout,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: &BackendSettings) -> Self {
        self.package_prefix.clone_from(&settings.package_prefix);
        self.alternatives_group
            .clone_from(&settings.alternatives_group);
        self.bin_dir.clone_from(&settings.bin_dir);
        self.elevation.clone_from(&settings.elevation);
        self.install_timeout = settings.install_timeout;
        self.switch_timeout = settings.switch_timeout;
        self
    }

    fn elevated(&self, command: ProcessCommand) -> ProcessCommand {
        command.elevated(self.elevation.as_deref())
    }

    fn apt_get(&self, args: &[&str]) -> ProcessCommand {
        self.elevated(ProcessCommand::new(&self.info.path).args(args.iter().copied()))
    }

    /// The `-cli` package is what actually ships `/usr/bin/phpX.Y`.
    fn cli_package(package: &str) -> String {
        if package.ends_with(CLI_SUFFIX) {
            package.to_string()
        } else {
            format!("{package}{CLI_SUFFIX}")
        }
    }

    fn target_binary(&self, target: &ResolvedPackage) -> PathBuf {
        self.bin_dir
            .join(format!("{}{}", self.alternatives_group, target.version))
    }

    /// `php8.2-cli install ok installed` -> `php8.2` at 8.2.
    fn parse_status_line(&self, line: &str) -> Option<InstalledPackage> {
        let (package, status) = line.trim().split_once(' ')?;
        if status.trim() != INSTALLED_STATUS {
            return None;
        }
        let base = package.strip_suffix(CLI_SUFFIX)?;
        let version = PhpVersion::parse_series(base.strip_prefix(self.package_prefix.as_str())?).ok()?;
        Some(InstalledPackage {
            package_name: base.to_string(),
            version,
        })
    }

    async fn refresh_index(&self) -> Result<(), BackendError> {
        info!("apt: refreshing package index");
        let command = self.apt_get(&["update"]);
        let output = self.runner.stream(&command, self.install_timeout).await?;
        if output.success() {
            Ok(())
        } else {
            Err(classify::index_refresh_failure(&output))
        }
    }
}

#[async_trait]
impl PackageBackend for AptBackend {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn backend_info(&self) -> &BackendInfo {
        &self.info
    }

    fn package_name(&self, version: &PhpVersion) -> String {
        format!("{}{}", self.package_prefix, version.series())
    }

    async fn is_installed(&self, package: &str) -> bool {
        let command = ProcessCommand::new("dpkg-query").args([
            "-W".to_string(),
            "-f=${Status}".to_string(),
            Self::cli_package(package),
        ]);
        match self.runner.capture(&command).await {
            Ok(output) => output.success() && output.stdout.contains(INSTALLED_STATUS),
            Err(e) => {
                debug!("dpkg-query probe for {package} failed: {e}");
                false
            }
        }
    }

    async fn install(&self, package: &str) -> Result<(), BackendError> {
        self.refresh_index().await?;

        let cli_package = Self::cli_package(package);
        info!("apt: installing {cli_package}");
        let command = self.apt_get(&["install", "-y", &cli_package]);
        let output = self.runner.stream(&command, self.install_timeout).await?;
        if output.success() {
            Ok(())
        } else {
            Err(classify::install_failure(&cli_package, &output))
        }
    }

    async fn list_installed(&self) -> Result<Vec<InstalledPackage>, BackendError> {
        let command = ProcessCommand::new("dpkg-query").args(["-W", "-f=${Package} ${Status}\\n"]);
        let output = self.runner.capture(&command).await?;
        // dpkg-query exits 1 when some pattern matched nothing; the listing is still usable
        if !output.success() && output.stdout.trim().is_empty() {
            return Err(BackendError::command_failed(&command, output.code, output.stderr));
        }

        let mut installed: Vec<InstalledPackage> = output
            .stdout
            .lines()
            .filter_map(|line| self.parse_status_line(line))
            .collect();
        installed.sort_by(|a, b| a.version.cmp(&b.version));
        installed.dedup_by(|a, b| a.version == b.version);
        Ok(installed)
    }

    async fn switch_target_ready(&self, target: &ResolvedPackage) -> bool {
        let binary = self.target_binary(target);
        let ready = binary.exists();
        if !ready {
            debug!("apt: {} does not exist", binary.display());
        }
        ready
    }

    async fn activate(&self, target: &ResolvedPackage) -> Result<(), BackendError> {
        let binary = self.target_binary(target).to_string_lossy().into_owned();
        info!("apt: selecting {binary} for {}", self.alternatives_group);
        let command = self.elevated(ProcessCommand::new("update-alternatives").args([
            "--set",
            self.alternatives_group.as_str(),
            binary.as_str(),
        ]));
        let output = self.runner.stream(&command, self.switch_timeout).await?;
        if output.success() {
            Ok(())
        } else {
            Err(classify::switch_failure(
                &command,
                &self.alternatives_group,
                &binary,
                output,
            ))
        }
    }
}
