use log::{debug, warn};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::CoreError;

pub const VERSION_FILE: &str = ".php-version";
pub const COMPOSER_FILE: &str = "composer.json";

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+").expect("version pattern should compile"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    VersionFile(PathBuf),
    ComposerRequire(PathBuf),
    ComposerPlatform(PathBuf),
}

impl VersionSource {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::VersionFile(path) | Self::ComposerRequire(path) | Self::ComposerPlatform(path) => {
                path
            }
        }
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionFile(path) => write!(f, "{}", path.display()),
            Self::ComposerRequire(path) => write!(f, "{} (require.php)", path.display()),
            Self::ComposerPlatform(path) => write!(f, "{} (config.platform.php)", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedVersion {
    /// The `X.Y` release line taken from the pin.
    pub version: String,
    pub source: VersionSource,
}

/// Walk from `start_dir` up to the filesystem root and report the version
/// pinned by the first directory holding `.php-version` or `composer.json`.
///
/// Within a directory `.php-version` is consulted first; `composer.json` is
/// read when the former is missing or holds no `X.Y` version. The walk stops
/// at that directory even when neither file yields a version.
#[must_use]
pub fn detect_version(start_dir: &Path) -> Option<DetectedVersion> {
    start_dir.ancestors().find_map(inspect_dir).flatten()
}

/// Same rule as [`detect_version`], restricted to `dir` itself.
#[must_use]
pub fn detect_in_dir(dir: &Path) -> Option<DetectedVersion> {
    inspect_dir(dir).flatten()
}

/// `None` when `dir` holds neither marker; `Some(None)` when it does but no
/// version could be taken from it.
fn inspect_dir(dir: &Path) -> Option<Option<DetectedVersion>> {
    let version_file = dir.join(VERSION_FILE);
    let composer = dir.join(COMPOSER_FILE);
    let has_version_file = version_file.is_file();
    let has_composer = composer.is_file();
    if !has_version_file && !has_composer {
        return None;
    }

    if has_version_file {
        debug!("found {}", version_file.display());
        if let Some(detected) = read_version_file(&version_file) {
            return Some(Some(detected));
        }
    }

    if has_composer {
        debug!("found {}", composer.display());
        return Some(composer_constraint(&composer).unwrap_or_else(|e| {
            warn!("{e}; ignoring it");
            None
        }));
    }

    Some(None)
}

fn read_version_file(path: &Path) -> Option<DetectedVersion> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            return None;
        }
    };

    let pin = content.lines().next().unwrap_or_default().trim();
    let Some(version) = extract_version(pin) else {
        debug!("no X.Y version in {} ({pin:?})", path.display());
        return None;
    };
    Some(DetectedVersion {
        version,
        source: VersionSource::VersionFile(path.to_path_buf()),
    })
}

/// Read the PHP constraint from a `composer.json`: `require.php`, else
/// `config.platform.php`. The first `X.Y` inside the constraint is the
/// version.
///
/// # Errors
/// Returns [`CoreError::ManifestRead`] or [`CoreError::ManifestParse`] when
/// the file cannot be read or is not valid JSON.
pub fn composer_constraint(path: &Path) -> Result<Option<DetectedVersion>, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::ManifestRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let manifest: Value = serde_json::from_str(&content).map_err(|e| CoreError::ManifestParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let constraint = manifest
        .pointer("/require/php")
        .and_then(Value::as_str)
        .map(|constraint| (constraint, VersionSource::ComposerRequire(path.to_path_buf())))
        .or_else(|| {
            manifest
                .pointer("/config/platform/php")
                .and_then(Value::as_str)
                .map(|constraint| (constraint, VersionSource::ComposerPlatform(path.to_path_buf())))
        });

    Ok(constraint.and_then(|(constraint, source)| {
        extract_version(constraint).map(|version| DetectedVersion { version, source })
    }))
}

/// First `X.Y` substring of a version constraint such as `^8.1 || ^8.2`.
#[must_use]
pub fn extract_version(constraint: &str) -> Option<String> {
    VERSION_PATTERN
        .find(constraint)
        .map(|found| found.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("fixture should be written");
    }

    #[test]
    fn extract_version_takes_first_major_minor() {
        assert_eq!(extract_version("^8.1").as_deref(), Some("8.1"));
        assert_eq!(extract_version(">=7.4 <8.3").as_deref(), Some("7.4"));
        assert_eq!(extract_version("~8.2.1").as_deref(), Some("8.2"));
        assert_eq!(extract_version("^8.1 || ^8.2").as_deref(), Some("8.1"));
        assert_eq!(extract_version("*"), None);
        assert_eq!(extract_version("8"), None);
    }

    #[test]
    fn version_file_first_line_is_trimmed() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(temp_dir.path(), VERSION_FILE, "  8.3  \n7.4\n");

        let detected = detect_in_dir(temp_dir.path()).expect("version should be detected");

        assert_eq!(detected.version, "8.3");
        assert_eq!(
            detected.source,
            VersionSource::VersionFile(temp_dir.path().join(VERSION_FILE))
        );
    }

    #[test]
    fn empty_version_file_yields_nothing() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(temp_dir.path(), VERSION_FILE, "\n");

        assert_eq!(detect_in_dir(temp_dir.path()), None);
    }

    #[test]
    fn patch_pin_is_reduced_to_release_line() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(temp_dir.path(), VERSION_FILE, "8.2.10\n");

        let detected = detect_in_dir(temp_dir.path()).expect("version should be detected");

        assert_eq!(detected.version, "8.2");
    }

    #[test]
    fn empty_version_file_falls_back_to_composer() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(temp_dir.path(), VERSION_FILE, "\n");
        write(temp_dir.path(), COMPOSER_FILE, r#"{"require":{"php":"^8.2"}}"#);

        let detected = detect_in_dir(temp_dir.path()).expect("composer constraint should be used");

        assert_eq!(detected.version, "8.2");
        assert!(matches!(detected.source, VersionSource::ComposerRequire(_)));
    }

    #[test]
    fn unusable_version_file_falls_back_to_composer() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(temp_dir.path(), VERSION_FILE, "latest\n");
        write(
            temp_dir.path(),
            COMPOSER_FILE,
            r#"{"config":{"platform":{"php":"7.4.33"}}}"#,
        );

        let detected = detect_version(temp_dir.path()).expect("composer constraint should be used");

        assert_eq!(detected.version, "7.4");
        assert!(matches!(detected.source, VersionSource::ComposerPlatform(_)));
    }

    #[test]
    fn version_file_beats_composer_in_same_directory() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(temp_dir.path(), VERSION_FILE, "7.4");
        write(temp_dir.path(), COMPOSER_FILE, r#"{"require":{"php":"^8.2"}}"#);

        let detected = detect_in_dir(temp_dir.path()).expect("version should be detected");

        assert_eq!(detected.version, "7.4");
    }

    #[test]
    fn require_beats_platform_config() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(
            temp_dir.path(),
            COMPOSER_FILE,
            r#"{"require":{"php":"^8.1"},"config":{"platform":{"php":"8.2.3"}}}"#,
        );

        let detected = composer_constraint(&temp_dir.path().join(COMPOSER_FILE))
            .expect("manifest should parse")
            .expect("constraint should be found");

        assert_eq!(detected.version, "8.1");
        assert!(matches!(detected.source, VersionSource::ComposerRequire(_)));
    }

    #[test]
    fn platform_config_is_fallback() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(
            temp_dir.path(),
            COMPOSER_FILE,
            r#"{"require":{"laravel/framework":"^11.0"},"config":{"platform":{"php":"8.2.3"}}}"#,
        );

        let detected = detect_in_dir(temp_dir.path()).expect("version should be detected");

        assert_eq!(detected.version, "8.2");
        assert!(matches!(detected.source, VersionSource::ComposerPlatform(_)));
    }

    #[test]
    fn malformed_composer_is_reported_and_ignored() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        write(temp_dir.path(), COMPOSER_FILE, "{ not json");
        let path = temp_dir.path().join(COMPOSER_FILE);

        assert!(matches!(
            composer_constraint(&path),
            Err(CoreError::ManifestParse { .. })
        ));
        assert_eq!(detect_in_dir(temp_dir.path()), None);
    }

    #[test]
    fn walk_finds_marker_in_ancestor() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let nested = temp_dir.path().join("src/Controller");
        fs::create_dir_all(&nested).expect("nested directory should be created");
        write(temp_dir.path(), VERSION_FILE, "8.2\n");

        let detected = detect_version(&nested).expect("version should be detected");

        assert_eq!(detected.version, "8.2");
        assert_eq!(detect_in_dir(&nested), None);
    }

    #[test]
    fn walk_stops_at_first_marker_directory() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let nested = temp_dir.path().join("packages/legacy");
        fs::create_dir_all(&nested).expect("nested directory should be created");
        write(temp_dir.path(), VERSION_FILE, "8.3\n");
        write(&nested, COMPOSER_FILE, r#"{"name":"acme/legacy"}"#);

        assert_eq!(detect_version(&nested), None);
    }

    #[test]
    fn source_display_names_field() {
        let source = VersionSource::ComposerPlatform(Path::new("/srv/app/composer.json").to_path_buf());

        assert_eq!(source.to_string(), "/srv/app/composer.json (config.platform.php)");
        assert_eq!(source.path(), Path::new("/srv/app/composer.json"));
    }
}
