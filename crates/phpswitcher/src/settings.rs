use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use phpswitcher_backend::BackendSettings;
use phpswitcher_platform::AppPaths;

use crate::backend_kind::BackendKind;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_install_timeout")]
    pub install_timeout_secs: u64,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    #[serde(default = "default_package_prefix")]
    pub formula_prefix: String,

    #[serde(default = "default_package_prefix")]
    pub apt_package_prefix: String,

    #[serde(default = "default_alternatives_group")]
    pub alternatives_group: String,

    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,

    /// Prefix for commands that need root. Empty runs them unprefixed.
    #[serde(default = "default_elevation_command")]
    pub elevation_command: String,

    #[serde(default)]
    pub marker_file: Option<PathBuf>,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_install_timeout() -> u64 {
    3600
}

fn default_command_timeout() -> u64 {
    300
}

fn default_package_prefix() -> String {
    "php".to_string()
}

fn default_alternatives_group() -> String {
    "php".to_string()
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("/usr/bin")
}

fn default_elevation_command() -> String {
    "sudo".to_string()
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            install_timeout_secs: default_install_timeout(),
            command_timeout_secs: default_command_timeout(),
            formula_prefix: default_package_prefix(),
            apt_package_prefix: default_package_prefix(),
            alternatives_group: default_alternatives_group(),
            bin_dir: default_bin_dir(),
            elevation_command: default_elevation_command(),
            marker_file: None,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl AppSettings {
    /// Read settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::settings_load_failed(path, e))?;
        serde_json::from_str(&content).map_err(|e| AppError::settings_load_failed(path, e))
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Marker location: explicit override, then the setting, then the data dir.
    #[must_use]
    pub fn marker_path(&self, paths: &AppPaths, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.marker_file.clone())
            .unwrap_or_else(|| paths.marker_file())
    }

    #[must_use]
    pub fn backend_settings(&self, kind: BackendKind) -> BackendSettings {
        let package_prefix = match kind {
            BackendKind::Homebrew => &self.formula_prefix,
            BackendKind::Apt => &self.apt_package_prefix,
        };
        let elevation = self.elevation_command.trim();

        BackendSettings {
            package_prefix: package_prefix.clone(),
            install_timeout: Duration::from_secs(self.install_timeout_secs),
            switch_timeout: self.command_timeout(),
            elevation: (!elevation.is_empty()).then(|| elevation.to_string()),
            bin_dir: self.bin_dir.clone(),
            alternatives_group: self.alternatives_group.clone(),
        }
    }
}
