use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use phpswitcher_backend::{
    BackendError, BackendInfo, InstalledPackage, PackageBackend, PhpVersion, ResolvedPackage,
    UnlinkOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    PackageAvailable(String),
    IsInstalled(String),
    Install(String),
    ListInstalled,
    SwitchTargetReady(String),
    DeactivateOthers(String),
    Activate(String),
}

/// In-memory backend that names packages like Homebrew or APT and records
/// every trait call.
pub(crate) struct RecordingBackend {
    info: BackendInfo,
    separator: &'static str,
    unavailable: HashSet<String>,
    availability_error: Option<BackendError>,
    installed: Mutex<BTreeSet<String>>,
    switchable: bool,
    install_error: Option<BackendError>,
    activation_error: Option<BackendError>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingBackend {
    fn new(name: &'static str, separator: &'static str) -> Self {
        Self {
            info: BackendInfo {
                name,
                path: PathBuf::from(format!("/tmp/{name}")),
                version: None,
            },
            separator,
            unavailable: HashSet::new(),
            availability_error: None,
            installed: Mutex::new(BTreeSet::new()),
            switchable: true,
            install_error: None,
            activation_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn homebrew() -> Self {
        Self::new("homebrew", "@")
    }

    pub(crate) fn apt() -> Self {
        Self::new("apt", "")
    }

    pub(crate) fn with_installed(self, package: &str) -> Self {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(package.to_string());
        self
    }

    pub(crate) fn without_package(mut self, package: &str) -> Self {
        self.unavailable.insert(package.to_string());
        self
    }

    pub(crate) fn with_availability_error(mut self, error: BackendError) -> Self {
        self.availability_error = Some(error);
        self
    }

    pub(crate) fn with_install_error(mut self, error: BackendError) -> Self {
        self.install_error = Some(error);
        self
    }

    pub(crate) fn with_activation_error(mut self, error: BackendError) -> Self {
        self.activation_error = Some(error);
        self
    }

    pub(crate) fn not_switchable(mut self) -> Self {
        self.switchable = false;
        self
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn availability_checks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::PackageAvailable(package) => Some(package),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn install_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Install(package) => Some(package),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn deactivation_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::DeactivateOthers(_)))
            .count()
    }

    pub(crate) fn activation_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Activate(_)))
            .count()
    }

    fn installed(&self) -> BTreeSet<String> {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PackageBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        self.info.name
    }

    fn backend_info(&self) -> &BackendInfo {
        &self.info
    }

    fn package_name(&self, version: &PhpVersion) -> String {
        format!("php{}{}", self.separator, version.series())
    }

    async fn package_available(&self, package: &str) -> Result<bool, BackendError> {
        self.record(Call::PackageAvailable(package.to_string()));
        if let Some(error) = &self.availability_error {
            return Err(error.clone());
        }
        Ok(!self.unavailable.contains(package))
    }

    async fn is_installed(&self, package: &str) -> bool {
        self.record(Call::IsInstalled(package.to_string()));
        self.installed().contains(package)
    }

    async fn install(&self, package: &str) -> Result<(), BackendError> {
        self.record(Call::Install(package.to_string()));
        if let Some(error) = &self.install_error {
            return Err(error.clone());
        }
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(package.to_string());
        Ok(())
    }

    async fn list_installed(&self) -> Result<Vec<InstalledPackage>, BackendError> {
        self.record(Call::ListInstalled);
        let prefix = format!("php{}", self.separator);
        Ok(self
            .installed()
            .into_iter()
            .filter_map(|package| {
                let version = PhpVersion::parse_series(package.strip_prefix(&prefix)?).ok()?;
                Some(InstalledPackage {
                    package_name: package,
                    version,
                })
            })
            .collect())
    }

    async fn switch_target_ready(&self, target: &ResolvedPackage) -> bool {
        self.record(Call::SwitchTargetReady(target.package_name.clone()));
        self.switchable
    }

    async fn deactivate_others(
        &self,
        target: &ResolvedPackage,
    ) -> Result<Vec<(String, UnlinkOutcome)>, BackendError> {
        self.record(Call::DeactivateOthers(target.package_name.clone()));
        Ok(self
            .installed()
            .into_iter()
            .filter(|package| *package != target.package_name)
            .map(|package| (package, UnlinkOutcome::Unlinked))
            .collect())
    }

    async fn activate(&self, target: &ResolvedPackage) -> Result<(), BackendError> {
        self.record(Call::Activate(target.package_name.clone()));
        match &self.activation_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
