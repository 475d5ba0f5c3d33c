use log::debug;
use std::sync::Arc;

use phpswitcher_apt::AptProvider;
use phpswitcher_backend::{BackendProvider, PackageBackend, ProcessRunner};
use phpswitcher_brew::BrewProvider;
use phpswitcher_core::CoreError;
use phpswitcher_platform::PlatformFamily;

use crate::settings::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Homebrew,
    Apt,
}

impl BackendKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Homebrew => "homebrew",
            Self::Apt => "apt",
        }
    }

    /// Executable whose presence on PATH enables this backend.
    pub const fn executable(self) -> &'static str {
        match self {
            Self::Homebrew => "brew",
            Self::Apt => "apt-get",
        }
    }

    /// The backend family served on `platform`.
    pub fn for_platform(platform: PlatformFamily) -> Result<Self, CoreError> {
        match platform {
            PlatformFamily::MacLike => Ok(Self::Homebrew),
            PlatformFamily::LinuxLike => Ok(Self::Apt),
            PlatformFamily::WindowsLike | PlatformFamily::Unknown => {
                Err(CoreError::UnsupportedPlatform { platform })
            }
        }
    }

    pub fn provider(self) -> Box<dyn BackendProvider> {
        match self {
            Self::Homebrew => Box::new(BrewProvider::new()),
            Self::Apt => Box::new(AptProvider::new()),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the package manager for `platform` and build its backend.
pub async fn select_backend(
    platform: PlatformFamily,
    settings: &AppSettings,
    runner: Arc<dyn ProcessRunner>,
) -> Result<Box<dyn PackageBackend>, CoreError> {
    let kind = BackendKind::for_platform(platform)?;
    create_backend(kind, kind.provider().as_ref(), platform, settings, runner).await
}

async fn create_backend(
    kind: BackendKind,
    provider: &dyn BackendProvider,
    platform: PlatformFamily,
    settings: &AppSettings,
    runner: Arc<dyn ProcessRunner>,
) -> Result<Box<dyn PackageBackend>, CoreError> {
    let detection = provider.detect().await;
    if !detection.found {
        return Err(CoreError::UnsupportedBackend {
            platform,
            expected: kind.executable(),
        });
    }

    debug!(
        "Using {} at {:?} (version {:?}, in PATH: {})",
        provider.display_name(),
        detection.path,
        detection.version,
        detection.in_path
    );
    Ok(provider.create_backend(&detection, &settings.backend_settings(kind), runner))
}
