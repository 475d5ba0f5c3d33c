//! Maps apt-get and update-alternatives failure text onto [`BackendError`].

use phpswitcher_backend::{BackendError, ProcessCommand, ProcessOutput};

const PACKAGE_MISSING_MARKERS: &[&str] = &[
    "Unable to locate package",
    "has no installation candidate",
    "Couldn't find any package",
];

const PRIVILEGE_MARKERS: &[&str] = &[
    "Permission denied",
    "must be root",
    "are you root",
    "is not in the sudoers file",
    "a password is required",
    "a terminal is required",
    "no tty present",
    "incorrect password attempt",
];

fn combined(output: &ProcessOutput) -> String {
    format!("{}\n{}", output.stderr, output.stdout)
}

fn first_matching_line<'a>(text: &'a str, markers: &[&str]) -> Option<&'a str> {
    text.lines()
        .map(str::trim)
        .find(|line| markers.iter().any(|marker| line.contains(marker)))
}

pub(crate) fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}

pub(crate) fn privilege_failure(output: &ProcessOutput) -> Option<BackendError> {
    let text = combined(output);
    first_matching_line(&text, PRIVILEGE_MARKERS).map(|line| BackendError::PrivilegeFailure {
        details: line.to_string(),
    })
}

pub(crate) fn index_refresh_failure(output: &ProcessOutput) -> BackendError {
    privilege_failure(output).unwrap_or_else(|| BackendError::IndexRefreshFailed {
        details: last_line(&output.stderr)
            .unwrap_or("apt-get update exited with an error")
            .to_string(),
    })
}

pub(crate) fn install_failure(package: &str, output: &ProcessOutput) -> BackendError {
    let text = combined(output);
    if first_matching_line(&text, PACKAGE_MISSING_MARKERS).is_some() {
        return BackendError::PackageUnavailable {
            package: package.to_string(),
        };
    }
    privilege_failure(output).unwrap_or_else(|| {
        BackendError::install_failed(
            package,
            last_line(&output.stderr).unwrap_or("apt-get install exited with an error"),
        )
    })
}

pub(crate) fn switch_failure(
    command: &ProcessCommand,
    group: &str,
    path: &str,
    output: ProcessOutput,
) -> BackendError {
    let text = combined(&output);
    if text.contains("not registered") || text.contains("not managed") {
        return BackendError::AlternativeNotRegistered {
            group: group.to_string(),
            path: path.to_string(),
        };
    }
    if text.contains("no alternatives for") {
        return BackendError::NoAlternativesGroup {
            group: group.to_string(),
            path: path.to_string(),
        };
    }
    privilege_failure(&output)
        .unwrap_or_else(|| BackendError::command_failed(command, output.code, output.stderr))
}
