//! az CLI wrapper
//!
//! Every call runs `az ... -o json` and deserializes stdout. A non-zero exit
//! is classified by the ARM error code in stderr.

use crate::error::{AzureError, Result};
use envctl_cloud::CloudResource;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// az CLI wrapper
#[derive(Debug, Clone, Default)]
pub struct AzCli {
    subscription: Option<String>,
}

impl AzCli {
    pub fn new(subscription: Option<String>) -> Self {
        Self { subscription }
    }

    pub fn subscription(&self) -> Option<&str> {
        self.subscription.as_deref()
    }

    /// Check that az is installed and logged in
    pub async fn check_auth(&self) -> Result<AccountInfo> {
        let which = Command::new("which").arg("az").output().await?;
        if !which.status.success() {
            return Err(AzureError::AzNotFound);
        }

        let output = self
            .run_command(&["account", "show", "--output", "json"], "account")
            .await
            .map_err(|e| match e {
                AzureError::CommandFailed { stderr, .. } => AzureError::AuthenticationFailed(stderr),
                other => other,
            })?;

        let account: AccountInfo = serde_json::from_str(&output)?;
        Ok(account)
    }

    /// Arguments for one invocation, with the subscription appended
    pub fn command_args(&self, args: &[&str]) -> Vec<String> {
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        if let Some(subscription) = &self.subscription {
            full.push("--subscription".to_string());
            full.push(subscription.clone());
        }
        full
    }

    /// Run an az command and return stdout
    async fn run_command(&self, args: &[&str], target: &str) -> Result<String> {
        let full = self.command_args(args);
        let mut cmd = Command::new("az");
        cmd.args(&full);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: az {}", full.join(" "));

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::from_stderr("az", &stderr, target));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    pub async fn group_exists(&self, group: &str) -> Result<bool> {
        let output = self
            .run_command(&["group", "exists", "--name", group, "--output", "json"], group)
            .await?;
        parse_bool(&output)
    }

    /// Resources in a group; a missing group yields an empty list
    pub async fn list_resources(&self, group: &str) -> Result<Vec<ResourceInfo>> {
        let result = self
            .run_command(
                &["resource", "list", "--resource-group", group, "--output", "json"],
                group,
            )
            .await;

        let output = match result {
            Ok(output) => output,
            Err(AzureError::ResourceGroupNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        parse_resource_list(&output)
    }

    pub async fn delete_resource(&self, id: &str) -> Result<()> {
        self.run_command(&["resource", "delete", "--ids", id], id)
            .await?;
        Ok(())
    }

    /// Purge a soft-deleted Key Vault
    pub async fn purge_keyvault(&self, name: &str, location: &str) -> Result<()> {
        self.run_command(
            &["keyvault", "purge", "--name", name, "--location", location],
            name,
        )
        .await?;
        Ok(())
    }

    /// Purge a soft-deleted API Management service
    pub async fn purge_apim(&self, name: &str, location: &str) -> Result<()> {
        self.run_command(
            &[
                "apim",
                "deletedservice",
                "purge",
                "--service-name",
                name,
                "--location",
                location,
            ],
            name,
        )
        .await?;
        Ok(())
    }

    /// Delete a resource group and wait for ARM to accept it
    pub async fn delete_group(&self, group: &str) -> Result<()> {
        self.run_command(&["group", "delete", "--name", group, "--yes"], group)
            .await?;
        Ok(())
    }
}

fn parse_bool(output: &str) -> Result<bool> {
    Ok(serde_json::from_str::<bool>(output.trim())?)
}

pub fn parse_resource_list(output: &str) -> Result<Vec<ResourceInfo>> {
    if output.trim().is_empty() || output.trim() == "[]" {
        return Ok(Vec::new());
    }
    let resources: Vec<ResourceInfo> = serde_json::from_str(output)?;
    Ok(resources)
}

/// `az account show`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,

    pub name: String,

    #[serde(rename = "tenantId")]
    pub tenant_id: Option<String>,

    pub user: Option<AccountUser>,
}

impl AccountInfo {
    /// One-line summary for the transcript
    pub fn summary(&self) -> String {
        match &self.user {
            Some(user) => format!("{} ({}) as {}", self.name, self.id, user.name),
            None => format!("{} ({})", self.name, self.id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountUser {
    pub name: String,
}

/// One entry of `az resource list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    pub location: Option<String>,

    #[serde(rename = "resourceGroup")]
    pub resource_group: Option<String>,

    pub kind: Option<String>,
}

impl From<ResourceInfo> for CloudResource {
    fn from(info: ResourceInfo) -> Self {
        let resource = CloudResource::new(info.id, info.name, info.resource_type);
        match info.location {
            Some(location) => resource.with_location(location),
            None => resource,
        }
    }
}
