pub mod costs;
pub mod emergency;
pub mod environments;
pub mod init;
pub mod plan;
pub mod shutdown;
pub mod startup;
pub mod status;
pub mod verify;

use crate::lifecycle::LifecycleController;
use envctl_cloud_azure::AzureProvider;
use envctl_core::{Confirm, CostGate, Environment, Manifest, Preconfirmed};
use std::path::PathBuf;
use std::sync::Arc;

/// Loaded configuration plus global flags, shared by the handlers
pub struct Session {
    pub manifest: Manifest,
    /// `None` when running on the built-in environments
    pub config_path: Option<PathBuf>,
    pub subscription: Option<String>,
    /// Where `azure.yaml` lives for `startup`
    pub project_dir: Option<PathBuf>,
}

impl Session {
    pub fn environment(&self, name: &str) -> anyhow::Result<&Environment> {
        Ok(self.manifest.environment(name)?)
    }

    /// Controller over the Azure CLIs; builds no processes until used
    pub fn controller(&self) -> anyhow::Result<LifecycleController> {
        let mut provider = AzureProvider::new(self.subscription.clone(), &self.manifest.location);
        if let Some(dir) = &self.project_dir {
            provider = provider.with_project_dir(dir.clone());
        }
        LifecycleController::new(Arc::new(provider), &self.manifest)
    }

    pub fn log_source(&self) {
        match &self.config_path {
            Some(path) => tracing::debug!(path = %path.display(), "Using config file"),
            None => tracing::debug!("Using built-in environments"),
        }
    }
}

/// Terminal gate, or an automatic yes under `--force`
pub fn gate(force: bool) -> Box<dyn Confirm> {
    if force {
        Box::new(Preconfirmed)
    } else {
        Box::new(CostGate::stdio())
    }
}
