use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// One line of text naming the version last switched to.
///
/// Purely informational: switching never consults it.
#[derive(Debug, Clone)]
pub struct ActiveVersionMarker {
    path: PathBuf,
}

impl ActiveVersionMarker {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The recorded version, or `None` when nothing has been recorded.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read {}: {e}", self.path.display());
                return None;
            }
        };

        let version = content.lines().next().unwrap_or_default().trim();
        (!version.is_empty()).then(|| version.to_string())
    }

    /// Overwrite the marker with `version`.
    ///
    /// # Errors
    /// Returns [`CoreError::MarkerWrite`] if the file or its parent directory
    /// cannot be written.
    pub fn write(&self, version: &str) -> Result<(), CoreError> {
        let to_error = |e: std::io::Error| CoreError::MarkerWrite {
            path: self.path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(to_error)?;
        }
        std::fs::write(&self.path, format!("{version}\n")).map_err(to_error)?;
        debug!("recorded {version} in {}", self.path.display());
        Ok(())
    }
}
