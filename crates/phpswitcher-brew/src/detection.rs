use std::path::{Path, PathBuf};
use which::which;

use phpswitcher_backend::{ProcessCommand, ProcessRunner};

#[derive(Debug, Clone)]
pub struct BrewDetection {
    pub found: bool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub in_path: bool,
}

pub(crate) async fn detect_brew(runner: &dyn ProcessRunner) -> BrewDetection {
    if let Ok(path) = which("brew") {
        let version = get_brew_version(runner, &path).await;
        return BrewDetection {
            found: true,
            path: Some(path),
            version,
            in_path: true,
        };
    }

    for path in get_common_brew_paths() {
        if path.exists() {
            let version = get_brew_version(runner, &path).await;
            return BrewDetection {
                found: true,
                path: Some(path),
                version,
                in_path: false,
            };
        }
    }

    BrewDetection {
        found: false,
        path: None,
        version: None,
        in_path: false,
    }
}

fn get_common_brew_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/opt/homebrew/bin/brew"));
        paths.push(PathBuf::from("/usr/local/bin/brew"));
    }

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/home/linuxbrew/.linuxbrew/bin/brew"));
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".linuxbrew/bin/brew"));
        }
    }

    paths
}

async fn get_brew_version(runner: &dyn ProcessRunner, path: &Path) -> Option<String> {
    let output = runner
        .capture(&ProcessCommand::new(path).arg("--version"))
        .await
        .ok()?;

    if !output.success() {
        return None;
    }

    parse_brew_version(&output.stdout)
}

/// `brew --version` prints `Homebrew 4.4.0` followed by optional tap lines.
fn parse_brew_version(stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?.trim();
    let version = first.strip_prefix("Homebrew ").unwrap_or(first).trim();
    (!version.is_empty()).then(|| version.to_string())
}
