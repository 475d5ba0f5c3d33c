use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use phpswitcher_backend::{
    BackendDetection, BackendProvider, BackendSettings, PackageBackend, ProcessRunner,
    SystemRunner,
};

use crate::backend::BrewBackend;
use crate::detection::detect_brew;

pub struct BrewProvider {
    probe: Arc<dyn ProcessRunner>,
}

impl BrewProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: Arc::new(SystemRunner::default()),
        }
    }

    /// Use `probe` for the `brew --version` check during detection.
    #[must_use]
    pub fn with_probe(probe: Arc<dyn ProcessRunner>) -> Self {
        Self { probe }
    }
}

impl Default for BrewProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendProvider for BrewProvider {
    fn name(&self) -> &'static str {
        "homebrew"
    }

    fn display_name(&self) -> &'static str {
        "Homebrew"
    }

    async fn detect(&self) -> BackendDetection {
        let detection = detect_brew(self.probe.as_ref()).await;
        BackendDetection {
            found: detection.found,
            path: detection.path,
            version: detection.version,
            in_path: detection.in_path,
        }
    }

    fn create_backend(
        &self,
        detection: &BackendDetection,
        settings: &BackendSettings,
        runner: Arc<dyn ProcessRunner>,
    ) -> Box<dyn PackageBackend> {
        let path = detection
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("brew"));
        Box::new(BrewBackend::new(path, detection.version.clone(), runner).with_settings(settings))
    }
}
