use log::{debug, info};
use std::fmt;

use phpswitcher_backend::{PackageBackend, PhpVersion, ResolvedPackage, UnlinkOutcome};

use crate::error::CoreError;
use crate::resolve::resolve;

/// Progress of a single switch; stages only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SwitchStage {
    Requested,
    Validated,
    TargetInstalled,
    OthersDeactivated,
    TargetActivated,
    Done,
}

impl fmt::Display for SwitchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Requested => "requested",
            Self::Validated => "validated",
            Self::TargetInstalled => "target installed",
            Self::OthersDeactivated => "others deactivated",
            Self::TargetActivated => "target activated",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    pub target: ResolvedPackage,
    pub deactivated: Vec<(String, UnlinkOutcome)>,
}

fn advance(stage: &mut SwitchStage, next: SwitchStage) {
    debug!("switch: {stage} -> {next}");
    *stage = next;
}

/// Make `input` (strictly `X.Y`) the active PHP.
///
/// Nothing is deactivated until the target is known to be installed and
/// switchable. Sibling deactivation is best effort; activation is not.
///
/// # Errors
/// Returns an error for malformed input, unresolvable or missing targets and
/// failed activation.
pub async fn switch_version(
    input: &str,
    backend: &dyn PackageBackend,
) -> Result<SwitchReport, CoreError> {
    let mut stage = SwitchStage::Requested;

    let requested = PhpVersion::parse_series(input)?;
    advance(&mut stage, SwitchStage::Validated);

    let target = resolve(&requested, backend).await?;
    if !backend.is_installed(&target.package_name).await
        || !backend.switch_target_ready(&target).await
    {
        return Err(CoreError::NotInstalled {
            version: target.full_version(),
            package: target.package_name,
        });
    }
    advance(&mut stage, SwitchStage::TargetInstalled);

    let deactivated = backend.deactivate_others(&target).await?;
    for (package, outcome) in &deactivated {
        info!("{package}: {outcome}");
    }
    advance(&mut stage, SwitchStage::OthersDeactivated);

    backend.activate(&target).await?;
    advance(&mut stage, SwitchStage::TargetActivated);

    info!("switched to {} ({})", target.full_version(), target.package_name);
    advance(&mut stage, SwitchStage::Done);

    Ok(SwitchReport {
        target,
        deactivated,
    })
}
