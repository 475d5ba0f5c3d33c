use log::info;

use phpswitcher_backend::{PackageBackend, PhpVersion, ResolvedPackage};

use crate::error::CoreError;
use crate::resolve::resolve;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(ResolvedPackage),
    AlreadyInstalled(ResolvedPackage),
}

impl InstallOutcome {
    #[must_use]
    pub fn package(&self) -> &ResolvedPackage {
        match self {
            Self::Installed(package) | Self::AlreadyInstalled(package) => package,
        }
    }
}

/// Validate `input` (`X.Y` or `X.Y.Z`), resolve it and install the package
/// unless the backend already reports it installed.
///
/// # Errors
/// Returns an error for malformed input, unresolvable versions and backend
/// install failures. Nothing is executed for malformed input.
pub async fn install_version(
    input: &str,
    backend: &dyn PackageBackend,
) -> Result<InstallOutcome, CoreError> {
    let requested = PhpVersion::parse_install(input)?;
    let target = resolve(&requested, backend).await?;

    if backend.is_installed(&target.package_name).await {
        info!("{} is already installed", target.package_name);
        return Ok(InstallOutcome::AlreadyInstalled(target));
    }

    backend.install(&target.package_name).await?;
    info!("installed {}", target.package_name);
    Ok(InstallOutcome::Installed(target))
}
