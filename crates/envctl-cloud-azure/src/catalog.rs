//! Azure resource-type catalog
//!
//! The deletion graph for Azure: one entry per resource type the web platform
//! deploys, plus the "must delete before" edges between them. Supporting a
//! new resource type means adding it here, nothing else.

use envctl_cloud::{DeletionGraph, ResourceKind, Tier};

pub const CONTAINER_APPS: &str = "Microsoft.App/containerApps";
pub const MANAGED_ENVIRONMENTS: &str = "Microsoft.App/managedEnvironments";
pub const KEY_VAULT: &str = "Microsoft.KeyVault/vaults";
pub const API_MANAGEMENT: &str = "Microsoft.ApiManagement/service";

/// (type, tier, soft-delete) in declaration order
const KINDS: &[(&str, Tier, bool)] = &[
    (API_MANAGEMENT, Tier::Gateway, true),
    ("Microsoft.Network/applicationGateways", Tier::Gateway, false),
    ("Microsoft.Network/frontDoors", Tier::Gateway, false),
    ("Microsoft.Cdn/profiles", Tier::Gateway, false),
    (CONTAINER_APPS, Tier::Compute, false),
    ("Microsoft.App/jobs", Tier::Compute, false),
    ("Microsoft.Web/sites", Tier::Compute, false),
    ("Microsoft.Web/staticSites", Tier::Compute, false),
    ("Microsoft.ContainerService/managedClusters", Tier::Compute, false),
    ("Microsoft.ContainerInstance/containerGroups", Tier::Compute, false),
    ("Microsoft.Compute/virtualMachineScaleSets", Tier::Compute, false),
    ("Microsoft.Compute/virtualMachines", Tier::Compute, false),
    (MANAGED_ENVIRONMENTS, Tier::Hosting, false),
    ("Microsoft.Web/serverFarms", Tier::Hosting, false),
    ("Microsoft.Network/networkInterfaces", Tier::Hosting, false),
    ("Microsoft.Compute/disks", Tier::Hosting, false),
    ("Microsoft.DBforPostgreSQL/flexibleServers", Tier::Data, false),
    ("Microsoft.Sql/servers", Tier::Data, false),
    ("Microsoft.DocumentDB/databaseAccounts", Tier::Data, false),
    ("Microsoft.Cache/Redis", Tier::Data, false),
    ("Microsoft.ServiceBus/namespaces", Tier::Data, false),
    ("Microsoft.EventHub/namespaces", Tier::Data, false),
    ("Microsoft.Storage/storageAccounts", Tier::Data, false),
    (KEY_VAULT, Tier::Security, true),
    ("Microsoft.ContainerRegistry/registries", Tier::Security, false),
    ("Microsoft.Network/privateEndpoints", Tier::Network, false),
    ("Microsoft.Network/loadBalancers", Tier::Network, false),
    ("Microsoft.Network/publicIPAddresses", Tier::Network, false),
    ("Microsoft.Network/networkSecurityGroups", Tier::Network, false),
    ("Microsoft.Network/privateDnsZones", Tier::Network, false),
    ("Microsoft.Network/dnsZones", Tier::Network, false),
    ("Microsoft.Network/virtualNetworks", Tier::Network, false),
    ("Microsoft.Insights/metricAlerts", Tier::Observability, false),
    ("Microsoft.Insights/actionGroups", Tier::Observability, false),
    ("Microsoft.Insights/components", Tier::Observability, false),
    ("Microsoft.OperationalInsights/workspaces", Tier::Observability, false),
    ("Microsoft.ManagedIdentity/userAssignedIdentities", Tier::Identity, false),
];

/// (first, then): every `first` is deleted before any `then`
const EDGES: &[(&str, &str)] = &[
    (CONTAINER_APPS, MANAGED_ENVIRONMENTS),
    ("Microsoft.App/jobs", MANAGED_ENVIRONMENTS),
    ("Microsoft.Web/sites", "Microsoft.Web/serverFarms"),
    ("Microsoft.Compute/virtualMachines", "Microsoft.Network/networkInterfaces"),
    ("Microsoft.Compute/virtualMachines", "Microsoft.Compute/disks"),
    ("Microsoft.Network/networkInterfaces", "Microsoft.Network/networkSecurityGroups"),
    ("Microsoft.Network/networkInterfaces", "Microsoft.Network/publicIPAddresses"),
    ("Microsoft.Network/networkInterfaces", "Microsoft.Network/virtualNetworks"),
    ("Microsoft.Network/applicationGateways", "Microsoft.Network/publicIPAddresses"),
    ("Microsoft.Network/applicationGateways", "Microsoft.Network/virtualNetworks"),
    ("Microsoft.Network/loadBalancers", "Microsoft.Network/publicIPAddresses"),
    ("Microsoft.ContainerService/managedClusters", "Microsoft.Network/virtualNetworks"),
    (MANAGED_ENVIRONMENTS, "Microsoft.Network/virtualNetworks"),
    (MANAGED_ENVIRONMENTS, "Microsoft.OperationalInsights/workspaces"),
    ("Microsoft.Network/privateEndpoints", "Microsoft.Network/virtualNetworks"),
    ("Microsoft.Network/privateEndpoints", "Microsoft.Network/privateDnsZones"),
    ("Microsoft.Insights/metricAlerts", "Microsoft.Insights/actionGroups"),
    ("Microsoft.Insights/components", "Microsoft.OperationalInsights/workspaces"),
];

/// How a soft-deleted type is purged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeKind {
    KeyVault,
    ApiManagement,
}

impl PurgeKind {
    pub fn for_type(resource_type: &str) -> Option<Self> {
        if resource_type.eq_ignore_ascii_case(KEY_VAULT) {
            Some(PurgeKind::KeyVault)
        } else if resource_type.eq_ignore_ascii_case(API_MANAGEMENT) {
            Some(PurgeKind::ApiManagement)
        } else {
            None
        }
    }
}

/// The built-in Azure deletion graph
pub fn deletion_graph() -> DeletionGraph {
    let mut graph = DeletionGraph::new();
    for &(resource_type, tier, soft_delete) in KINDS {
        let kind = ResourceKind::new(resource_type, tier);
        graph.add_kind(if soft_delete { kind.soft_delete() } else { kind });
    }
    for &(first, then) in EDGES {
        graph.delete_before(first, then);
    }
    graph
}
