use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::process::ProcessCommand;

const ONDREJ_PPA_HINT: &str = "Additional PHP builds are published in the ondrej/php PPA: \
     sudo add-apt-repository ppa:ondrej/php && sudo apt-get update";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("`{command}` {}: {}", exit_label(.code), .stderr.trim())]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("Refreshing the package index failed: {details}")]
    IndexRefreshFailed { details: String },

    #[error("Installing {package} failed: {details}")]
    InstallFailed { package: String, details: String },

    #[error("Package {package} is not available from the configured repositories")]
    PackageUnavailable { package: String },

    #[error("Insufficient privileges: {details}")]
    PrivilegeFailure { details: String },

    #[error("{path} is not registered as an alternative for {group}")]
    AlternativeNotRegistered { group: String, path: String },

    #[error("No alternatives are registered for {group} yet")]
    NoAlternativesGroup { group: String, path: String },

    #[error("IO error ({kind}): {message}")]
    IoError {
        kind: std::io::ErrorKind,
        message: String,
    },
}

#[allow(clippy::ref_option)]
fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

impl BackendError {
    pub fn command_failed(command: &ProcessCommand, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            code,
            stderr: stderr.into(),
        }
    }

    pub fn timeout(command: &ProcessCommand, limit: Duration) -> Self {
        Self::Timeout {
            command: command.to_string(),
            seconds: limit.as_secs(),
        }
    }

    pub fn install_failed(package: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InstallFailed {
            package: package.into(),
            details: details.into(),
        }
    }

    /// A follow-up command or pointer the user can act on, if one exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::PackageUnavailable { .. } => Some(ONDREJ_PPA_HINT.to_string()),
            Self::AlternativeNotRegistered { group, path }
            | Self::NoAlternativesGroup { group, path } => {
                let link = Path::new(path).with_file_name(group);
                Some(format!(
                    "Register the binary with the alternatives system first: \
                     sudo update-alternatives --install {} {group} {path} <priority>",
                    link.display()
                ))
            }
            Self::PrivilegeFailure { .. } => Some(
                "Run the command as a user allowed to use sudo, or as root.".to_string(),
            ),
            Self::Timeout { .. } => Some(
                "Raise install_timeout_secs (installs) or command_timeout_secs (other \
                 commands) in settings.json."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BackendError;
    use crate::process::ProcessCommand;

    #[test]
    fn io_error_conversion_maps_to_io_variant() {
        let mapped = BackendError::from(std::io::Error::other("permission denied"));
        assert!(
            matches!(mapped, BackendError::IoError { kind, ref message } if kind == std::io::ErrorKind::Other && message.contains("permission denied"))
        );
    }

    #[test]
    fn command_failed_display_includes_command_status_and_stderr() {
        let command = ProcessCommand::new("brew").args(["link", "php@8.1"]);
        let error = BackendError::command_failed(&command, Some(1), "Error: No such keg\n");

        assert_eq!(
            error.to_string(),
            "`brew link php@8.1` exited with status 1: Error: No such keg"
        );
    }

    #[test]
    fn command_failed_without_code_reports_signal() {
        let command = ProcessCommand::new("apt-get").arg("update");
        let error = BackendError::command_failed(&command, None, "");

        assert!(error.to_string().contains("terminated by a signal"));
    }

    #[test]
    fn package_unavailable_points_at_ppa() {
        let error = BackendError::PackageUnavailable {
            package: "php7.0-cli".to_string(),
        };

        let hint = error.hint().expect("unavailable package should carry a hint");
        assert!(hint.contains("ppa:ondrej/php"));
    }

    #[test]
    fn alternatives_errors_share_bootstrap_hint() {
        let missing = BackendError::AlternativeNotRegistered {
            group: "php".to_string(),
            path: "/usr/bin/php8.2".to_string(),
        };
        let empty = BackendError::NoAlternativesGroup {
            group: "php".to_string(),
            path: "/usr/bin/php8.2".to_string(),
        };

        assert_eq!(missing.hint(), empty.hint());
        assert!(
            missing
                .hint()
                .is_some_and(|hint| hint.contains("--install /usr/bin/php php /usr/bin/php8.2"))
        );
    }

    #[test]
    fn bootstrap_hint_links_inside_configured_bin_dir() {
        let error = BackendError::NoAlternativesGroup {
            group: "php".to_string(),
            path: "/opt/php/bin/php8.3".to_string(),
        };

        assert!(
            error
                .hint()
                .is_some_and(|hint| hint.contains("--install /opt/php/bin/php php /opt/php/bin/php8.3"))
        );
    }

    #[test]
    fn timeout_hint_names_both_timeout_settings() {
        let command = ProcessCommand::new("update-alternatives").args(["--set", "php"]);
        let error = BackendError::timeout(&command, std::time::Duration::from_secs(300));

        assert_eq!(error.to_string(), "`update-alternatives --set php` timed out after 300s");
        let hint = error.hint().expect("timeouts should carry a hint");
        assert!(hint.contains("command_timeout_secs"));
        assert!(hint.contains("install_timeout_secs"));
    }

    #[test]
    fn command_failure_has_no_hint() {
        let command = ProcessCommand::new("brew").arg("install");
        assert!(BackendError::command_failed(&command, Some(1), "boom").hint().is_none());
    }
}
