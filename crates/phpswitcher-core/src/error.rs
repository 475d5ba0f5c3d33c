use std::path::PathBuf;

use phpswitcher_backend::{BackendError, VersionParseError};
use phpswitcher_platform::PlatformFamily;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    InvalidVersionFormat(#[from] VersionParseError),

    #[error("PHP {version} is not available as {package} via {backend}")]
    UnresolvedVersion {
        version: String,
        package: String,
        backend: &'static str,
    },

    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform { platform: PlatformFamily },

    #[error("No supported package manager found on {platform} (looked for {expected})")]
    UnsupportedBackend {
        platform: PlatformFamily,
        expected: &'static str,
    },

    #[error("PHP {version} is not installed ({package})")]
    NotInstalled { version: String, package: String },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Failed to read {}: {message}", .path.display())]
    ManifestRead { path: PathBuf, message: String },

    #[error("Failed to parse {}: {message}", .path.display())]
    ManifestParse { path: PathBuf, message: String },

    #[error("Version not specified and not detectable from .php-version or composer.json")]
    VersionNotSpecified,

    #[error("Failed to record active version in {}: {message}", .path.display())]
    MarkerWrite { path: PathBuf, message: String },
}

impl CoreError {
    /// A follow-up the user can act on, printed below the error itself.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidVersionFormat(VersionParseError::PatchNotAllowed { input }) => {
                let series = input.rsplit_once('.').map_or(input.as_str(), |(series, _)| series);
                Some(format!("Switch by release line instead: phpswitcher use {series}"))
            }
            Self::InvalidVersionFormat(_) => {
                Some("Versions look like 8.2 (or 8.2.10 for install).".to_string())
            }
            Self::UnresolvedVersion { backend, .. } if *backend == "homebrew" => {
                Some("List the formulae Homebrew knows about with: brew search php@".to_string())
            }
            Self::UnresolvedVersion { .. } => None,
            Self::UnsupportedPlatform { .. } => Some(
                "Supported hosts are macOS with Homebrew and Debian-like Linux with APT.".to_string(),
            ),
            Self::UnsupportedBackend { expected, .. } => {
                Some(format!("Install {expected} and make sure it is on PATH."))
            }
            Self::NotInstalled { version, .. } => {
                Some(format!("Install it first: phpswitcher install {version}"))
            }
            Self::Backend(error) => error.hint(),
            Self::VersionNotSpecified => Some(
                "Pass a version, or add a .php-version file to the current directory.".to_string(),
            ),
            Self::ManifestRead { .. } | Self::ManifestParse { .. } | Self::MarkerWrite { .. } => {
                None
            }
        }
    }
}
