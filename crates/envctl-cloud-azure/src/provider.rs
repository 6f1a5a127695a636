//! Azure provider implementation

use crate::az::AzCli;
use crate::azd::Azd;
use crate::catalog::{self, PurgeKind};
use crate::error::AzureError;
use async_trait::async_trait;
use envctl_cloud::{
    AuthStatus, CloudProvider, CloudResource, DeletionGraph, ProvisionTarget,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Azure provider over the az and azd CLIs
pub struct AzureProvider {
    az: AzCli,
    azd: Azd,
    default_location: String,
}

impl AzureProvider {
    pub fn new(subscription: Option<String>, default_location: impl Into<String>) -> Self {
        Self {
            az: AzCli::new(subscription.clone()),
            azd: Azd::new(None, subscription),
            default_location: default_location.into(),
        }
    }

    /// Run `azd` from a directory other than the current one
    pub fn with_project_dir(mut self, dir: PathBuf) -> Self {
        self.azd = Azd::new(Some(dir), self.az.subscription().map(str::to_string));
        self
    }

    fn location_of<'a>(&'a self, resource: &'a CloudResource) -> &'a str {
        resource
            .location
            .as_deref()
            .unwrap_or(&self.default_location)
    }
}

#[async_trait]
impl CloudProvider for AzureProvider {
    fn name(&self) -> &str {
        "azure"
    }

    fn display_name(&self) -> &str {
        "Microsoft Azure"
    }

    async fn check_auth(&self) -> envctl_cloud::Result<AuthStatus> {
        match self.az.check_auth().await {
            Ok(account) => Ok(AuthStatus::ok(account.summary())),
            Err(AzureError::AzNotFound) => Ok(AuthStatus::failed(AzureError::AzNotFound.to_string())),
            Err(AzureError::AuthenticationFailed(msg)) => Ok(AuthStatus::failed(msg)),
            Err(e) => Err(e.into()),
        }
    }

    async fn group_exists(&self, group: &str) -> envctl_cloud::Result<bool> {
        Ok(self.az.group_exists(group).await?)
    }

    async fn list_resources(&self, group: &str) -> envctl_cloud::Result<Vec<CloudResource>> {
        let resources = self.az.list_resources(group).await?;
        debug!(resource_group = group, count = resources.len(), "Listed resources");
        Ok(resources.into_iter().map(CloudResource::from).collect())
    }

    async fn delete_resource(&self, resource: &CloudResource) -> envctl_cloud::Result<()> {
        match self.az.delete_resource(&resource.id).await {
            Ok(()) => {
                info!(resource = %resource.name, resource_type = %resource.resource_type, "Deleted resource");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(resource = %resource.name, "Resource already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn purge_resource(&self, resource: &CloudResource) -> envctl_cloud::Result<()> {
        let location = self.location_of(resource);
        let result = match PurgeKind::for_type(&resource.resource_type) {
            Some(PurgeKind::KeyVault) => self.az.purge_keyvault(&resource.name, location).await,
            Some(PurgeKind::ApiManagement) => self.az.purge_apim(&resource.name, location).await,
            None => Err(AzureError::PurgeUnsupported {
                name: resource.name.clone(),
                reason: format!("{} has no purge operation", resource.resource_type),
            }),
        };
        result?;
        info!(resource = %resource.name, "Purged soft-deleted resource");
        Ok(())
    }

    async fn delete_group(&self, group: &str) -> envctl_cloud::Result<()> {
        match self.az.delete_group(group).await {
            Ok(()) => {
                info!(resource_group = group, "Deleted resource group");
                Ok(())
            }
            Err(AzureError::ResourceGroupNotFound(_)) => {
                debug!(resource_group = group, "Resource group already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn provision(&self, target: &ProvisionTarget) -> envctl_cloud::Result<()> {
        info!(
            environment = %target.environment,
            resource_group = %target.resource_group,
            location = %target.location,
            "Provisioning with azd"
        );
        self.azd
            .provision(&target.environment, &target.resource_group, &target.location)
            .await
            .map_err(|e| match e {
                AzureError::CommandFailed { stderr, .. } => {
                    envctl_cloud::CloudError::ProvisionFailed(stderr)
                }
                other => other.into(),
            })
    }

    fn deletion_graph(&self) -> DeletionGraph {
        catalog::deletion_graph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_identity() {
        let provider = AzureProvider::new(None, "eastus");
        assert_eq!(provider.name(), "azure");
        assert!(provider.deletion_graph().contains(catalog::KEY_VAULT));
    }

    #[test]
    fn test_purge_location_falls_back() {
        let provider = AzureProvider::new(None, "eastus");
        let kv = CloudResource::new("/kv", "kv-it", catalog::KEY_VAULT);
        assert_eq!(provider.location_of(&kv), "eastus");

        let kv = kv.with_location("westeurope");
        assert_eq!(provider.location_of(&kv), "westeurope");
    }

    #[test]
    fn test_project_dir_keeps_subscription() {
        let provider = AzureProvider::new(Some("sub-123".to_string()), "eastus")
            .with_project_dir(PathBuf::from("deploy"));
        assert_eq!(provider.azd.project_dir(), Some(std::path::Path::new("deploy")));
        assert!(
            provider
                .azd
                .provision_env("rg-it", "eastus")
                .contains(&("AZURE_SUBSCRIPTION_ID", "sub-123".to_string()))
        );

        assert!(AzureProvider::new(None, "eastus").azd.project_dir().is_none());
    }

    #[tokio::test]
    async fn test_purge_unsupported_type() {
        let provider = AzureProvider::new(None, "eastus");
        let app = CloudResource::new("/app", "ca-web", catalog::CONTAINER_APPS);
        let err = tokio_test::assert_err!(provider.purge_resource(&app).await);
        assert!(matches!(err, envctl_cloud::CloudError::InvalidConfig(_)));
    }
}
