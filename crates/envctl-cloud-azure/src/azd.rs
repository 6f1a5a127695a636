//! azd (Azure Developer CLI) wrapper
//!
//! Provisioning is delegated wholesale to `azd provision`, which deploys the
//! project's Bicep templates into the environment's resource group.

use crate::error::{AzureError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone, Default)]
pub struct Azd {
    /// Directory holding `azure.yaml`; the current directory when unset
    project_dir: Option<PathBuf>,
    subscription: Option<String>,
}

impl Azd {
    pub fn new(project_dir: Option<PathBuf>, subscription: Option<String>) -> Self {
        Self {
            project_dir,
            subscription,
        }
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    pub async fn is_installed(&self) -> Result<bool> {
        let which = Command::new("which").arg("azd").output().await?;
        Ok(which.status.success())
    }

    /// Environment variables handed to azd
    pub fn provision_env(&self, resource_group: &str, location: &str) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            ("AZURE_RESOURCE_GROUP", resource_group.to_string()),
            ("AZURE_LOCATION", location.to_string()),
        ];
        if let Some(subscription) = &self.subscription {
            vars.push(("AZURE_SUBSCRIPTION_ID", subscription.clone()));
        }
        vars
    }

    /// `azd provision --environment <env> --no-prompt`
    pub async fn provision(&self, environment: &str, resource_group: &str, location: &str) -> Result<()> {
        if !self.is_installed().await? {
            return Err(AzureError::AzdNotFound);
        }

        let args = ["provision", "--environment", environment, "--no-prompt"];
        let mut cmd = Command::new("azd");
        cmd.args(args);
        cmd.envs(self.provision_env(resource_group, location));
        if let Some(dir) = &self.project_dir {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: azd {}", args.join(" "));

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::CommandFailed {
                tool: "azd",
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
