use std::path::{Path, PathBuf};
use which::which;

use phpswitcher_backend::{ProcessCommand, ProcessRunner};

#[derive(Debug, Clone)]
pub struct AptDetection {
    pub found: bool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub in_path: bool,
}

pub(crate) async fn detect_apt(runner: &dyn ProcessRunner) -> AptDetection {
    if let Ok(path) = which("apt-get") {
        let version = get_apt_version(runner, &path).await;
        return AptDetection {
            found: true,
            path: Some(path),
            version,
            in_path: true,
        };
    }

    AptDetection {
        found: false,
        path: None,
        version: None,
        in_path: false,
    }
}

async fn get_apt_version(runner: &dyn ProcessRunner, path: &Path) -> Option<String> {
    let output = runner
        .capture(&ProcessCommand::new(path).arg("--version"))
        .await
        .ok()?;

    if !output.success() {
        return None;
    }

    parse_apt_version(&output.stdout)
}

/// `apt-get --version` starts with `apt 2.6.1 (amd64)`.
fn parse_apt_version(stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?.trim();
    let rest = first.strip_prefix("apt ").unwrap_or(first);
    rest.split_whitespace().next().map(str::to_string)
}
