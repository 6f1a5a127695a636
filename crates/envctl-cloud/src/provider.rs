//! Cloud provider trait definition

use crate::error::Result;
use crate::graph::DeletionGraph;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Cloud provider abstraction trait
///
/// The lifecycle controller only talks to the cloud through this trait, so
/// the Azure CLI provider and the in-memory test provider are
/// interchangeable.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "azure")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider CLI is installed and logged in
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Whether the resource group exists
    async fn group_exists(&self, group: &str) -> Result<bool>;

    /// Resources currently in a group
    ///
    /// A missing group is not an error: it has zero resources.
    async fn list_resources(&self, group: &str) -> Result<Vec<CloudResource>>;

    /// Delete a single resource; an already-deleted resource is not an error
    async fn delete_resource(&self, resource: &CloudResource) -> Result<()>;

    /// Hard-delete a resource the provider only soft-deleted
    async fn purge_resource(&self, resource: &CloudResource) -> Result<()>;

    /// Delete the resource group and anything left in it
    ///
    /// Deleting a group that does not exist succeeds.
    async fn delete_group(&self, group: &str) -> Result<()>;

    /// Create or update the environment from its IaC templates
    async fn provision(&self, target: &ProvisionTarget) -> Result<()>;

    /// Resource-type ordering used for teardown
    fn deletion_graph(&self) -> DeletionGraph;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/subscription information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// A resource as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudResource {
    /// Provider-wide identifier (ARM id for Azure)
    pub id: String,

    pub name: String,

    /// Resource type (e.g., "Microsoft.App/containerApps")
    pub resource_type: String,

    pub location: Option<String>,
}

impl CloudResource {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource_type: resource_type.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// What startup asks the provider to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionTarget {
    /// Environment name as the IaC tooling knows it
    pub environment: String,

    pub resource_group: String,

    pub location: String,
}
