use async_trait::async_trait;
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use phpswitcher_backend::{
    BackendError, BackendInfo, BackendSettings, InstalledPackage, PackageBackend, PhpVersion,
    ProcessCommand, ProcessOutput, ProcessRunner, ResolvedPackage, UnlinkOutcome,
};

/// Homebrew keeps every `php@X.Y` formula in its own keg; exactly one of them
/// is linked into the prefix at a time.
#[derive(Clone)]
pub struct BrewBackend {
    info: BackendInfo,
    runner: Arc<dyn ProcessRunner>,
    formula_prefix: String,
    install_timeout: Duration,
    link_timeout: Duration,
}

impl BrewBackend {
    #[must_use]
    pub fn new(path: PathBuf, version: Option<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        let defaults = BackendSettings::default();
        Self {
            info: BackendInfo {
                name: "homebrew",
                path,
                version,
            },
            runner,
            formula_prefix: defaults.package_prefix,
            install_timeout: defaults.install_timeout,
            link_timeout: defaults.switch_timeout,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: &BackendSettings) -> Self {
        self.formula_prefix.clone_from(&settings.package_prefix);
        self.install_timeout = settings.install_timeout;
        self.link_timeout = settings.switch_timeout;
        self
    }

    fn command(&self, args: &[&str]) -> ProcessCommand {
        ProcessCommand::new(&self.info.path).args(args.iter().copied())
    }

    async fn capture(&self, args: &[&str]) -> Result<ProcessOutput, BackendError> {
        self.runner.capture(&self.command(args)).await
    }

    async fn execute(&self, args: &[&str]) -> Result<String, BackendError> {
        let command = self.command(args);
        let output = self.runner.capture(&command).await?;
        if !output.success() {
            error!("brew command failed: args={args:?}, stderr='{}'", output.stderr.trim());
        }
        Ok(output.into_success(&command)?.stdout)
    }

    /// `php@8.1` -> 8.1; anything outside the versioned formula family is `None`.
    /// `brew list` prints bare formula names, so a tap prefix is ignored here.
    fn formula_version(&self, formula: &str) -> Option<PhpVersion> {
        let short_prefix = self
            .formula_prefix
            .rsplit('/')
            .next()
            .unwrap_or(&self.formula_prefix);
        let version = formula.strip_prefix(short_prefix)?.strip_prefix('@')?;
        PhpVersion::parse_series(version).ok()
    }

    async fn unlink(&self, formula: &str) -> UnlinkOutcome {
        match self.capture(&["unlink", formula]).await {
            Ok(output) if output.success() => {
                if output.stdout.contains("0 symlinks removed") {
                    UnlinkOutcome::AlreadyUnlinked
                } else {
                    UnlinkOutcome::Unlinked
                }
            }
            Ok(output) => UnlinkOutcome::FailedIgnored {
                reason: output.stderr.trim().to_string(),
            },
            Err(e) => UnlinkOutcome::FailedIgnored {
                reason: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl PackageBackend for BrewBackend {
    fn name(&self) -> &'static str {
        "homebrew"
    }

    fn backend_info(&self) -> &BackendInfo {
        &self.info
    }

    fn package_name(&self, version: &PhpVersion) -> String {
        format!("{}@{}", self.formula_prefix, version.series())
    }

    async fn package_available(&self, package: &str) -> Result<bool, BackendError> {
        let output = self.capture(&["info", "--formula", package]).await?;
        debug!("brew info {package}: exit {:?}", output.code);
        Ok(output.success())
    }

    async fn is_installed(&self, package: &str) -> bool {
        match self.capture(&["list", "--versions", package]).await {
            Ok(output) => output.success(),
            Err(e) => {
                debug!("brew list probe for {package} failed: {e}");
                false
            }
        }
    }

    async fn install(&self, package: &str) -> Result<(), BackendError> {
        info!("homebrew: installing {package}");
        let command = self.command(&["install", package]);
        let output = self.runner.stream(&command, self.install_timeout).await?;
        if output.success() {
            Ok(())
        } else {
            Err(BackendError::install_failed(
                package,
                last_line(&output.stderr).unwrap_or("brew install exited with an error"),
            ))
        }
    }

    async fn list_installed(&self) -> Result<Vec<InstalledPackage>, BackendError> {
        let output = self.execute(&["list", "--formula", "-1"]).await?;
        let mut installed: Vec<InstalledPackage> = output
            .lines()
            .map(str::trim)
            .filter_map(|formula| {
                self.formula_version(formula).map(|version| InstalledPackage {
                    package_name: formula.to_string(),
                    version,
                })
            })
            .collect();
        installed.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(installed)
    }

    async fn deactivate_others(
        &self,
        target: &ResolvedPackage,
    ) -> Result<Vec<(String, UnlinkOutcome)>, BackendError> {
        let mut outcomes = Vec::new();
        let target_version = target.version;
        for sibling in self.list_installed().await? {
            if sibling.version == target_version {
                continue;
            }
            let outcome = self.unlink(&sibling.package_name).await;
            info!("homebrew: {}: {outcome}", sibling.package_name);
            outcomes.push((sibling.package_name, outcome));
        }
        Ok(outcomes)
    }

    async fn activate(&self, target: &ResolvedPackage) -> Result<(), BackendError> {
        info!("homebrew: linking {}", target.package_name);
        let command = self.command(&["link", "--force", "--overwrite", &target.package_name]);
        self.runner
            .stream(&command, self.link_timeout)
            .await?
            .into_success(&command)?;
        Ok(())
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use phpswitcher_backend::testing::{RunMode, ScriptedRunner};
    use phpswitcher_backend::{
        BackendError, PackageBackend, PhpVersion, ProcessOutput, ResolvedPackage, UnlinkOutcome,
    };

    use super::BrewBackend;

    fn backend(runner: &Arc<ScriptedRunner>) -> BrewBackend {
        BrewBackend::new(
            PathBuf::from("/opt/homebrew/bin/brew"),
            Some("4.4.0".to_string()),
            runner.clone(),
        )
    }

    #[test]
    fn package_name_uses_at_separator_and_drops_patch() {
        let runner = Arc::new(ScriptedRunner::new());
        let brew = backend(&runner);

        assert_eq!(brew.package_name(&PhpVersion::new(8, 1)), "php@8.1");
        assert_eq!(brew.package_name(&PhpVersion::new(8, 1).with_patch(5)), "php@8.1");
    }

    #[test]
    fn formula_version_only_accepts_versioned_formulae() {
        let runner = Arc::new(ScriptedRunner::new());
        let brew = backend(&runner);

        assert_eq!(brew.formula_version("php@7.4"), Some(PhpVersion::new(7, 4)));
        assert_eq!(brew.formula_version("php"), None);
        assert_eq!(brew.formula_version("phpunit"), None);
        assert_eq!(brew.formula_version("php@8"), None);
        assert_eq!(brew.formula_version("python@3.12"), None);
    }

    #[tokio::test]
    async fn package_available_follows_brew_info_exit_status() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("brew info --formula php@8.3", ProcessOutput::succeeded("==> php@8.3"))
                .on(
                    "brew info --formula php@5.2",
                    ProcessOutput::failed(1, "Error: No available formula with the name \"php@5.2\"."),
                ),
        );
        let brew = backend(&runner);

        assert!(brew.package_available("php@8.3").await.unwrap());
        assert!(!brew.package_available("php@5.2").await.unwrap());
    }

    #[tokio::test]
    async fn is_installed_swallows_probe_errors() {
        let runner = Arc::new(ScriptedRunner::new().on_error(
            "brew list --versions php@8.2",
            BackendError::from(std::io::Error::other("spawn failed")),
        ));
        let brew = backend(&runner);

        assert!(!brew.is_installed("php@8.2").await);
    }

    #[tokio::test]
    async fn install_streams_and_reports_last_stderr_line() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "brew install php@8.0",
            ProcessOutput::failed(1, "==> Fetching php@8.0\nError: php@8.0 has been disabled\n"),
        ));
        let brew = backend(&runner);

        let error = brew.install("php@8.0").await.unwrap_err();

        assert_eq!(
            error,
            BackendError::InstallFailed {
                package: "php@8.0".to_string(),
                details: "Error: php@8.0 has been disabled".to_string(),
            }
        );
        assert_eq!(runner.calls()[0].mode, RunMode::Stream);
    }

    #[tokio::test]
    async fn list_installed_filters_and_sorts_php_formulae() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "brew list --formula -1",
            ProcessOutput::succeeded("php@8.2\ncomposer\nphp@7.4\nphp\nphp@8.10\n"),
        ));
        let brew = backend(&runner);

        let installed = brew.list_installed().await.unwrap();
        let names: Vec<&str> = installed.iter().map(|p| p.package_name.as_str()).collect();

        assert_eq!(names, ["php@7.4", "php@8.2", "php@8.10"]);
    }

    #[tokio::test]
    async fn deactivate_others_classifies_unlink_results() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on(
                    "brew list --formula -1",
                    ProcessOutput::succeeded("php@7.4\nphp@8.0\nphp@8.1\nphp@8.2\n"),
                )
                .on(
                    "brew unlink php@7.4",
                    ProcessOutput::succeeded("Unlinking /opt/homebrew/Cellar/php@7.4/7.4.33... 25 symlinks removed."),
                )
                .on(
                    "brew unlink php@8.0",
                    ProcessOutput::succeeded("Unlinking /opt/homebrew/Cellar/php@8.0/8.0.30... 0 symlinks removed."),
                )
                .on("brew unlink php@8.2", ProcessOutput::failed(1, "Error: Permission denied\n")),
        );
        let brew = backend(&runner);
        let target = ResolvedPackage::new("php@8.1", PhpVersion::new(8, 1));

        let outcomes = brew.deactivate_others(&target).await.unwrap();

        assert_eq!(
            outcomes,
            vec![
                ("php@7.4".to_string(), UnlinkOutcome::Unlinked),
                ("php@8.0".to_string(), UnlinkOutcome::AlreadyUnlinked),
                (
                    "php@8.2".to_string(),
                    UnlinkOutcome::FailedIgnored {
                        reason: "Error: Permission denied".to_string()
                    }
                ),
            ]
        );
        assert_eq!(runner.count("brew unlink php@8.1"), 0);
    }

    #[tokio::test]
    async fn activate_force_links_target() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "brew link --force --overwrite php@8.1",
            ProcessOutput::succeeded("Linking /opt/homebrew/Cellar/php@8.1/8.1.27... 24 symlinks created."),
        ));
        let brew = backend(&runner);
        let target = ResolvedPackage::new("php@8.1", PhpVersion::new(8, 1));

        brew.activate(&target).await.unwrap();

        assert_eq!(runner.calls()[0].mode, RunMode::Stream);
    }

    #[tokio::test]
    async fn activate_failure_is_fatal() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "brew link --force --overwrite php@8.1",
            ProcessOutput::failed(1, "Error: No such keg: /opt/homebrew/Cellar/php@8.1"),
        ));
        let brew = backend(&runner);
        let target = ResolvedPackage::new("php@8.1", PhpVersion::new(8, 1));

        let result = brew.activate(&target).await;

        assert!(matches!(result, Err(BackendError::CommandFailed { code: Some(1), .. })));
    }
}
