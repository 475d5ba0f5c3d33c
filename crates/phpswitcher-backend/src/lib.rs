mod error;
mod process;
mod traits;
mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::BackendError;
pub use process::{ProcessCommand, ProcessOutput, ProcessRunner, SystemRunner};
pub use traits::{
    BackendDetection, BackendInfo, BackendProvider, BackendSettings, PackageBackend,
};
pub use types::{
    InstalledPackage, PhpVersion, ResolvedPackage, UnlinkOutcome, VersionComponent,
    VersionParseError,
};
