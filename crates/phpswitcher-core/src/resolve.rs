use log::debug;

use phpswitcher_backend::{PackageBackend, PhpVersion, ResolvedPackage};

use crate::error::CoreError;

/// Map a requested version onto the backend package providing its release
/// line. A patch component is dropped here, so `8.1` and `8.1.5` resolve to
/// the same package.
///
/// # Errors
/// Returns [`CoreError::UnresolvedVersion`] when the backend's package index
/// does not know the package, or when the index lookup itself fails.
pub async fn resolve(
    requested: &PhpVersion,
    backend: &dyn PackageBackend,
) -> Result<ResolvedPackage, CoreError> {
    let series = requested.series();
    let package = backend.package_name(&series);

    let available = match backend.package_available(&package).await {
        Ok(available) => available,
        Err(e) => {
            debug!("{}: availability check for {package} failed: {e}", backend.name());
            false
        }
    };
    if !available {
        return Err(CoreError::UnresolvedVersion {
            version: series.to_string(),
            package,
            backend: backend.name(),
        });
    }

    debug!("resolved {requested} to {package} via {}", backend.name());
    Ok(ResolvedPackage::new(package, series))
}
