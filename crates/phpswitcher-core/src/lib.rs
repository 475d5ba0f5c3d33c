//! Version resolution, install and switch flows, and project auto-detection.
//!
//! Everything here talks to a package manager only through
//! [`phpswitcher_backend::PackageBackend`], so the flows are identical for
//! Homebrew and APT:
//! - [`resolve`] maps a requested version to a backend package.
//! - [`install_version`] validates, resolves and installs idempotently.
//! - [`switch_version`] gates on install state, then deactivates and activates.
//! - [`detect_version`] / [`detect_in_dir`] read `.php-version` and `composer.json`.
//! - [`ActiveVersionMarker`] records the last version switched to.

mod detect;
mod error;
mod install;
mod marker;
mod resolve;
mod switch;

#[cfg(test)]
mod test_support;

pub use detect::{
    COMPOSER_FILE, DetectedVersion, VERSION_FILE, VersionSource, composer_constraint,
    detect_in_dir, detect_version, extract_version,
};
pub use error::CoreError;
pub use install::{InstallOutcome, install_version};
pub use marker::ActiveVersionMarker;
pub use resolve::resolve;
pub use switch::{SwitchReport, SwitchStage, switch_version};
