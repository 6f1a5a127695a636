//! Dependency-ordered teardown
//!
//! [`TeardownPlan::build`] groups a resource group's resources by type and
//! orders the types with the [`DeletionGraph`]. [`execute`] then walks the
//! plan best-effort: a failed deletion is recorded and the run moves on.
//! Soft-deletable types are purged right after deletion and the resource
//! group is always deleted last. A soft-deletable resource whose own delete
//! failed is soft-deleted along with the group, so it is purged after the
//! group is gone.

use crate::action::{ActionType, ApplyResult};
use crate::error::Result;
use crate::graph::{DeletionGraph, Tier};
use crate::provider::{CloudProvider, CloudResource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, warn};

/// One resource type and every instance of it in the group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownStep {
    pub resource_type: String,
    pub tier: Tier,
    /// Purge each instance after deleting it
    pub purge: bool,
    pub resources: Vec<CloudResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownPlan {
    pub resource_group: String,
    pub steps: Vec<TeardownStep>,
}

impl TeardownPlan {
    /// Order `resources` for deletion
    ///
    /// Types missing from the graph are appended after every known type,
    /// sorted by name.
    pub fn build(
        resource_group: impl Into<String>,
        resources: Vec<CloudResource>,
        graph: &DeletionGraph,
    ) -> Result<Self> {
        let resource_group = resource_group.into();
        let order = graph.order()?;

        let mut by_type: HashMap<String, Vec<CloudResource>> = HashMap::new();
        for resource in resources {
            by_type
                .entry(resource.resource_type.to_ascii_lowercase())
                .or_default()
                .push(resource);
        }

        let mut steps = Vec::new();
        for kind in order {
            if let Some(mut group) = by_type.remove(&kind.resource_type.to_ascii_lowercase()) {
                group.sort_by(|a, b| a.name.cmp(&b.name));
                steps.push(TeardownStep {
                    resource_type: kind.resource_type.clone(),
                    tier: kind.tier,
                    purge: kind.soft_delete,
                    resources: group,
                });
            }
        }

        // Leftovers keyed by lowercase type; BTreeMap for a stable order
        let leftovers: BTreeMap<String, Vec<CloudResource>> = by_type.into_iter().collect();
        for (_, mut group) in leftovers {
            group.sort_by(|a, b| a.name.cmp(&b.name));
            let resource_type = group[0].resource_type.clone();
            warn!(
                resource_type = %resource_type,
                count = group.len(),
                "Resource type has no teardown ordering, deleting after known types"
            );
            steps.push(TeardownStep {
                resource_type,
                tier: Tier::Unclassified,
                purge: false,
                resources: group,
            });
        }

        Ok(Self {
            resource_group,
            steps,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn resource_count(&self) -> usize {
        self.steps.iter().map(|s| s.resources.len()).sum()
    }

    /// Index of the step deleting `resource_type`
    pub fn position(&self, resource_type: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.resource_type.eq_ignore_ascii_case(resource_type))
    }

    /// Resources that will need a purge
    pub fn purge_targets(&self) -> impl Iterator<Item = &CloudResource> {
        self.steps
            .iter()
            .filter(|s| s.purge)
            .flat_map(|s| s.resources.iter())
    }
}

/// Progress notifications while a plan runs
#[derive(Debug)]
pub enum TeardownEvent<'a> {
    StepStarted(&'a TeardownStep),
    Deleted(&'a CloudResource),
    DeleteFailed(&'a CloudResource, String),
    Purged(&'a CloudResource),
    PurgeFailed(&'a CloudResource, String),
    GroupDeleting(&'a str),
    GroupDeleted(&'a str),
    GroupDeleteFailed(&'a str, String),
}

/// Outcome of [`execute`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownReport {
    pub resource_group: String,
    pub result: ApplyResult,
    /// Resource-group deletion error, the only failure that fails the run
    pub group_error: Option<String>,
}

impl TeardownReport {
    pub fn deleted(&self) -> usize {
        self.result.count(ActionType::Delete)
    }

    pub fn purged(&self) -> usize {
        self.result.count(ActionType::Purge)
    }

    pub fn group_deleted(&self) -> bool {
        self.group_error.is_none()
    }
}

/// Run a plan against the provider
///
/// Per-resource failures are logged and recorded; only the final
/// resource-group deletion decides [`TeardownReport::group_deleted`].
/// Purge targets whose delete failed are purged once the group is gone.
pub async fn execute(
    provider: &dyn CloudProvider,
    plan: &TeardownPlan,
    on_event: &mut (dyn FnMut(TeardownEvent<'_>) + Send),
) -> TeardownReport {
    let mut result = ApplyResult::new();
    let mut undeleted: HashSet<&str> = HashSet::new();
    info!(
        resource_group = %plan.resource_group,
        resources = plan.resource_count(),
        steps = plan.steps.len(),
        "Starting teardown"
    );

    for step in &plan.steps {
        on_event(TeardownEvent::StepStarted(step));

        for resource in &step.resources {
            match provider.delete_resource(resource).await {
                Ok(()) => {
                    result.add_success(ActionType::Delete, &resource.name, "deleted");
                    on_event(TeardownEvent::Deleted(resource));
                }
                Err(e) => {
                    warn!(resource = %resource.name, error = %e, "Delete failed, continuing");
                    result.add_failure(ActionType::Delete, &resource.name, e.to_string());
                    on_event(TeardownEvent::DeleteFailed(resource, e.to_string()));
                    undeleted.insert(resource.id.as_str());
                    continue;
                }
            }

            if step.purge {
                purge(provider, resource, &mut result, on_event).await;
            }
        }
    }

    let group = plan.resource_group.as_str();
    on_event(TeardownEvent::GroupDeleting(group));
    let group_error = match provider.delete_group(group).await {
        Ok(()) => {
            result.add_success(ActionType::DeleteGroup, group, "resource group deleted");
            on_event(TeardownEvent::GroupDeleted(group));
            for resource in plan
                .purge_targets()
                .filter(|r| undeleted.contains(r.id.as_str()))
            {
                purge(provider, resource, &mut result, on_event).await;
            }
            None
        }
        Err(e) => {
            warn!(resource_group = group, error = %e, "Resource group deletion failed");
            result.add_failure(ActionType::DeleteGroup, group, e.to_string());
            on_event(TeardownEvent::GroupDeleteFailed(group, e.to_string()));
            Some(e.to_string())
        }
    };

    result.finish();
    info!(
        resource_group = group,
        deleted = result.count(ActionType::Delete),
        purged = result.count(ActionType::Purge),
        failed = result.failed.len(),
        "Teardown finished"
    );

    TeardownReport {
        resource_group: plan.resource_group.clone(),
        result,
        group_error,
    }
}

async fn purge(
    provider: &dyn CloudProvider,
    resource: &CloudResource,
    result: &mut ApplyResult,
    on_event: &mut (dyn FnMut(TeardownEvent<'_>) + Send),
) {
    match provider.purge_resource(resource).await {
        Ok(()) => {
            result.add_success(ActionType::Purge, &resource.name, "purged");
            on_event(TeardownEvent::Purged(resource));
        }
        Err(e) => {
            warn!(resource = %resource.name, error = %e, "Purge failed, continuing");
            result.add_failure(ActionType::Purge, &resource.name, e.to_string());
            on_event(TeardownEvent::PurgeFailed(resource, e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResourceKind;
    use crate::mock::MockProvider;

    fn graph() -> DeletionGraph {
        let mut graph = DeletionGraph::new();
        graph.add_kind(ResourceKind::new("Microsoft.App/containerApps", Tier::Compute));
        graph.add_kind(ResourceKind::new("Microsoft.App/managedEnvironments", Tier::Hosting));
        graph.add_kind(ResourceKind::new("Microsoft.KeyVault/vaults", Tier::Security).soft_delete());
        graph.delete_before(
            "Microsoft.App/containerApps",
            "Microsoft.App/managedEnvironments",
        );
        graph
    }

    fn res(name: &str, resource_type: &str) -> CloudResource {
        CloudResource::new(format!("/rg/{}", name), name, resource_type)
    }

    #[test]
    fn test_plan_orders_types() {
        let resources = vec![
            res("kv", "Microsoft.KeyVault/vaults"),
            res("cae", "Microsoft.App/managedEnvironments"),
            res("web", "Microsoft.App/containerApps"),
            res("api", "Microsoft.App/containerApps"),
        ];

        let plan = TeardownPlan::build("rg-it", resources, &graph()).unwrap();
        let types: Vec<&str> = plan.steps.iter().map(|s| s.resource_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "Microsoft.App/containerApps",
                "Microsoft.App/managedEnvironments",
                "Microsoft.KeyVault/vaults",
            ]
        );
        // Instances sorted by name
        assert_eq!(plan.steps[0].resources[0].name, "api");
        assert_eq!(plan.resource_count(), 4);
        assert_eq!(plan.purge_targets().count(), 1);
    }

    #[test]
    fn test_plan_matches_types_case_insensitively() {
        let resources = vec![res("web", "microsoft.app/CONTAINERAPPS")];
        let plan = TeardownPlan::build("rg-it", resources, &graph()).unwrap();
        assert_eq!(plan.steps[0].tier, Tier::Compute);
        // Original casing from the graph
        assert_eq!(plan.steps[0].resource_type, "Microsoft.App/containerApps");
    }

    #[test]
    fn test_unknown_types_go_last() {
        let resources = vec![
            res("search", "Microsoft.Search/searchServices"),
            res("bot", "Microsoft.BotService/botServices"),
            res("kv", "Microsoft.KeyVault/vaults"),
        ];

        let plan = TeardownPlan::build("rg-it", resources, &graph()).unwrap();
        assert_eq!(plan.position("Microsoft.KeyVault/vaults"), Some(0));
        assert_eq!(plan.position("Microsoft.BotService/botServices"), Some(1));
        assert_eq!(plan.position("Microsoft.Search/searchServices"), Some(2));
        assert_eq!(plan.steps[2].tier, Tier::Unclassified);
    }

    #[test]
    fn test_empty_plan() {
        let plan = TeardownPlan::build("rg-it", Vec::new(), &graph()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.resource_count(), 0);
    }

    async fn run(provider: &MockProvider, group: &str) -> (TeardownReport, Vec<String>) {
        let resources = tokio_test::assert_ok!(provider.list_resources(group).await);
        let plan = TeardownPlan::build(group, resources, &provider.deletion_graph()).unwrap();
        let mut events = Vec::new();
        let report = execute(provider, &plan, &mut |event| {
            events.push(format!("{:?}", event).split('(').next().unwrap_or_default().to_string())
        })
        .await;
        (report, events)
    }

    #[tokio::test]
    async fn test_execute_deletes_in_order_then_group() {
        let provider = MockProvider::builder()
            .graph(graph())
            .group(
                "rg-it",
                vec![
                    res("kv", "Microsoft.KeyVault/vaults"),
                    res("cae", "Microsoft.App/managedEnvironments"),
                    res("web", "Microsoft.App/containerApps"),
                ],
            )
            .build();

        let (report, _) = run(&provider, "rg-it").await;

        assert!(report.group_deleted());
        assert!(report.result.is_success());
        assert_eq!(report.deleted(), 3);
        assert_eq!(report.purged(), 1);
        assert_eq!(
            provider.calls(),
            vec![
                "delete:web",
                "delete:cae",
                "delete:kv",
                "purge:kv",
                "delete_group:rg-it",
            ]
        );
        assert!(provider.soft_deleted().is_empty());
        assert!(!provider.has_group("rg-it"));
    }

    #[tokio::test]
    async fn test_execute_continues_past_failures() {
        let provider = MockProvider::builder()
            .graph(graph())
            .group(
                "rg-it",
                vec![
                    res("web", "Microsoft.App/containerApps"),
                    res("cae", "Microsoft.App/managedEnvironments"),
                ],
            )
            .failing_delete("web")
            .build();

        let (report, events) = run(&provider, "rg-it").await;

        assert!(!report.result.is_success());
        assert_eq!(report.result.failed[0].target, "web");
        assert_eq!(report.deleted(), 1);
        // Group deletion still attempted and succeeded
        assert!(report.group_deleted());
        assert!(events.contains(&"DeleteFailed".to_string()));
        assert_eq!(events.last().map(String::as_str), Some("GroupDeleted"));
    }

    #[tokio::test]
    async fn test_execute_reports_group_failure() {
        let provider = MockProvider::builder()
            .graph(graph())
            .group("rg-it", vec![res("kv", "Microsoft.KeyVault/vaults")])
            .failing_purge("kv")
            .failing_group_delete("rg-it")
            .build();

        let (report, _) = run(&provider, "rg-it").await;

        assert!(!report.group_deleted());
        assert!(report.group_error.as_deref().unwrap().contains("Blocked"));
        assert_eq!(report.result.failed.len(), 2);
        assert_eq!(provider.soft_deleted(), vec!["kv"]);
    }

    #[tokio::test]
    async fn test_vault_that_failed_to_delete_is_purged_with_group() {
        let provider = MockProvider::builder()
            .graph(graph())
            .group(
                "rg-it",
                vec![
                    res("kv", "Microsoft.KeyVault/vaults"),
                    res("web", "Microsoft.App/containerApps"),
                ],
            )
            .failing_delete("kv")
            .build();

        let (report, events) = run(&provider, "rg-it").await;

        assert!(report.group_deleted());
        assert_eq!(report.purged(), 1);
        assert_eq!(
            provider.calls(),
            vec!["delete:web", "delete:kv", "delete_group:rg-it", "purge:kv"]
        );
        assert!(provider.soft_deleted().is_empty());
        assert_eq!(events.last().map(String::as_str), Some("Purged"));
    }

    #[tokio::test]
    async fn test_late_purge_failure_is_recorded() {
        let provider = MockProvider::builder()
            .graph(graph())
            .group("rg-it", vec![res("kv", "Microsoft.KeyVault/vaults")])
            .failing_delete("kv")
            .failing_purge("kv")
            .build();

        let (report, _) = run(&provider, "rg-it").await;

        assert!(report.group_deleted());
        let failed: Vec<(ActionType, &str)> = report
            .result
            .failed
            .iter()
            .map(|f| (f.action_type, f.target.as_str()))
            .collect();
        assert_eq!(failed, vec![(ActionType::Delete, "kv"), (ActionType::Purge, "kv")]);
        assert_eq!(provider.soft_deleted(), vec!["kv"]);
    }

    #[test]
    fn test_cyclic_graph_fails_before_planning() {
        let mut graph = graph();
        graph.delete_before(
            "Microsoft.App/managedEnvironments",
            "Microsoft.App/containerApps",
        );
        assert!(TeardownPlan::build("rg-it", Vec::new(), &graph).is_err());
    }
}
