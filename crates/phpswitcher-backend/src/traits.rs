use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::BackendError;
use crate::process::ProcessRunner;
use crate::types::{InstalledPackage, PhpVersion, ResolvedPackage, UnlinkOutcome};

#[derive(Debug, Clone)]
pub struct BackendDetection {
    pub found: bool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub in_path: bool,
}

#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub name: &'static str,
    pub path: PathBuf,
    pub version: Option<String>,
}

/// Knobs shared by every backend, filled in from user settings.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub package_prefix: String,
    pub install_timeout: Duration,
    pub switch_timeout: Duration,
    pub elevation: Option<String>,
    pub bin_dir: PathBuf,
    pub alternatives_group: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            package_prefix: "php".to_string(),
            install_timeout: Duration::from_secs(3600),
            switch_timeout: Duration::from_secs(300),
            elevation: Some("sudo".to_string()),
            bin_dir: PathBuf::from("/usr/bin"),
            alternatives_group: "php".to_string(),
        }
    }
}

#[async_trait]
pub trait BackendProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    async fn detect(&self) -> BackendDetection;
    fn create_backend(
        &self,
        detection: &BackendDetection,
        settings: &BackendSettings,
        runner: Arc<dyn ProcessRunner>,
    ) -> Box<dyn PackageBackend>;
}

#[async_trait]
pub trait PackageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn backend_info(&self) -> &BackendInfo;

    /// Backend-specific package identifier for a release line.
    fn package_name(&self, version: &PhpVersion) -> String;

    /// Whether the package index knows about `package`.
    async fn package_available(&self, _package: &str) -> Result<bool, BackendError> {
        Ok(true)
    }

    /// Install-state probe. Probe failures read as "not installed".
    async fn is_installed(&self, package: &str) -> bool;

    async fn install(&self, package: &str) -> Result<(), BackendError>;

    async fn list_installed(&self) -> Result<Vec<InstalledPackage>, BackendError>;

    /// Backend preconditions for activating an installed target.
    async fn switch_target_ready(&self, _target: &ResolvedPackage) -> bool {
        true
    }

    /// Best-effort deactivation of every sibling release line.
    async fn deactivate_others(
        &self,
        _target: &ResolvedPackage,
    ) -> Result<Vec<(String, UnlinkOutcome)>, BackendError> {
        Ok(Vec::new())
    }

    async fn activate(&self, target: &ResolvedPackage) -> Result<(), BackendError>;
}
