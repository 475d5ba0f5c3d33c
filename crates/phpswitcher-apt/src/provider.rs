use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use phpswitcher_backend::{
    BackendDetection, BackendProvider, BackendSettings, PackageBackend, ProcessRunner,
    SystemRunner,
};

use crate::backend::AptBackend;
use crate::detection::detect_apt;

pub struct AptProvider {
    probe: Arc<dyn ProcessRunner>,
}

impl AptProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: Arc::new(SystemRunner::default()),
        }
    }

    #[must_use]
    pub fn with_probe(probe: Arc<dyn ProcessRunner>) -> Self {
        Self { probe }
    }
}

impl Default for AptProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendProvider for AptProvider {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn display_name(&self) -> &'static str {
        "APT (update-alternatives)"
    }

    async fn detect(&self) -> BackendDetection {
        let detection = detect_apt(self.probe.as_ref()).await;
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
            .unwrap_or_else(|| PathBuf::from("apt-get"));
        Box::new(AptBackend::new(path, detection.version.clone(), runner).with_settings(settings))
    }
}
