//! In-memory provider for tests
//!
//! Enabled with the `mock` feature so downstream crates can drive the
//! lifecycle without an Azure subscription.

use crate::error::{CloudError, Result};
use crate::graph::DeletionGraph;
use crate::provider::{AuthStatus, CloudProvider, CloudResource, ProvisionTarget};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockState {
    groups: BTreeMap<String, Vec<CloudResource>>,
    /// Deleted groups still reported as existing for this many polls
    lingering: HashMap<String, u32>,
    soft_deleted: Vec<CloudResource>,
    calls: Vec<String>,
    failing_polls: u32,
}

#[derive(Debug)]
pub struct MockProvider {
    state: Mutex<MockState>,
    graph: DeletionGraph,
    templates: HashMap<String, Vec<CloudResource>>,
    failing_deletes: HashSet<String>,
    failing_purges: HashSet<String>,
    failing_group_deletes: HashSet<String>,
    failing_provision: bool,
    linger_polls: u32,
    authenticated: bool,
    delay: Option<Duration>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Logged-in provider with no groups
    pub fn new() -> Self {
        MockProviderBuilder::default().build()
    }

    pub fn builder() -> MockProviderBuilder {
        MockProviderBuilder::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Every mutating call in order, as `"<action>:<target>"`
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Names of resources deleted but not yet purged
    pub fn soft_deleted(&self) -> Vec<String> {
        self.state()
            .soft_deleted
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.state().groups.contains_key(group)
    }

    pub fn resources(&self, group: &str) -> Vec<CloudResource> {
        self.state().groups.get(group).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CloudProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn display_name(&self) -> &str {
        "Mock Cloud"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        if self.authenticated {
            Ok(AuthStatus::ok("mock-subscription"))
        } else {
            Ok(AuthStatus::failed("not logged in"))
        }
    }

    async fn group_exists(&self, group: &str) -> Result<bool> {
        let mut state = self.state();
        if state.failing_polls > 0 {
            state.failing_polls -= 1;
            return Err(CloudError::CommandFailed("transient failure".into()));
        }
        if let Some(remaining) = state.lingering.get_mut(group) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(true);
            }
            state.lingering.remove(group);
        }
        Ok(state.groups.contains_key(group))
    }

    async fn list_resources(&self, group: &str) -> Result<Vec<CloudResource>> {
        Ok(self.state().groups.get(group).cloned().unwrap_or_default())
    }

    async fn delete_resource(&self, resource: &CloudResource) -> Result<()> {
        self.pause().await;
        let mut state = self.state();
        state.calls.push(format!("delete:{}", resource.name));

        if self.failing_deletes.contains(&resource.name) {
            return Err(CloudError::CommandFailed(format!(
                "conflict deleting {}",
                resource.name
            )));
        }

        let mut removed = None;
        for resources in state.groups.values_mut() {
            if let Some(pos) = resources.iter().position(|r| r.id == resource.id) {
                removed = Some(resources.remove(pos));
                break;
            }
        }

        if let Some(r) = removed
            && self.graph.is_soft_delete(&r.resource_type)
        {
            state.soft_deleted.push(r);
        }
        Ok(())
    }

    async fn purge_resource(&self, resource: &CloudResource) -> Result<()> {
        self.pause().await;
        let mut state = self.state();
        state.calls.push(format!("purge:{}", resource.name));

        if self.failing_purges.contains(&resource.name) {
            return Err(CloudError::CommandFailed(format!(
                "purge protection enabled on {}",
                resource.name
            )));
        }

        match state.soft_deleted.iter().position(|r| r.id == resource.id) {
            Some(pos) => {
                state.soft_deleted.remove(pos);
                Ok(())
            }
            None => Err(CloudError::ResourceNotFound(resource.id.clone())),
        }
    }

    async fn delete_group(&self, group: &str) -> Result<()> {
        self.pause().await;
        let mut state = self.state();
        state.calls.push(format!("delete_group:{}", group));

        if self.failing_group_deletes.contains(group) {
            return Err(CloudError::CommandFailed(format!(
                "ResourceGroupDeletionBlocked: {}",
                group
            )));
        }

        if let Some(leftovers) = state.groups.remove(group) {
            let soft: Vec<CloudResource> = leftovers
                .into_iter()
                .filter(|r| self.graph.is_soft_delete(&r.resource_type))
                .collect();
            state.soft_deleted.extend(soft);
            if self.linger_polls > 0 {
                state.lingering.insert(group.to_string(), self.linger_polls);
            }
        }
        Ok(())
    }

    async fn provision(&self, target: &ProvisionTarget) -> Result<()> {
        self.pause().await;
        let mut state = self.state();
        state
            .calls
            .push(format!("provision:{}", target.resource_group));

        if self.failing_provision {
            return Err(CloudError::ProvisionFailed(format!(
                "deployment failed for {}",
                target.environment
            )));
        }

        let resources = self
            .templates
            .get(&target.resource_group)
            .cloned()
            .unwrap_or_default();
        state.lingering.remove(&target.resource_group);
        state
            .groups
            .insert(target.resource_group.clone(), resources);
        Ok(())
    }

    fn deletion_graph(&self) -> DeletionGraph {
        self.graph.clone()
    }
}

#[derive(Debug)]
pub struct MockProviderBuilder {
    groups: BTreeMap<String, Vec<CloudResource>>,
    graph: DeletionGraph,
    templates: HashMap<String, Vec<CloudResource>>,
    failing_deletes: HashSet<String>,
    failing_purges: HashSet<String>,
    failing_group_deletes: HashSet<String>,
    failing_provision: bool,
    failing_polls: u32,
    linger_polls: u32,
    authenticated: bool,
    delay: Option<Duration>,
}

impl Default for MockProviderBuilder {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
            graph: DeletionGraph::new(),
            templates: HashMap::new(),
            failing_deletes: HashSet::new(),
            failing_purges: HashSet::new(),
            failing_group_deletes: HashSet::new(),
            failing_provision: false,
            failing_polls: 0,
            linger_polls: 0,
            authenticated: true,
            delay: None,
        }
    }
}

impl MockProviderBuilder {
    /// Existing group with its resources
    pub fn group(mut self, name: &str, resources: Vec<CloudResource>) -> Self {
        self.groups.insert(name.to_string(), resources);
        self
    }

    pub fn graph(mut self, graph: DeletionGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Resources `provision` creates for a group
    pub fn template(mut self, group: &str, resources: Vec<CloudResource>) -> Self {
        self.templates.insert(group.to_string(), resources);
        self
    }

    pub fn failing_delete(mut self, resource_name: &str) -> Self {
        self.failing_deletes.insert(resource_name.to_string());
        self
    }

    pub fn failing_purge(mut self, resource_name: &str) -> Self {
        self.failing_purges.insert(resource_name.to_string());
        self
    }

    pub fn failing_group_delete(mut self, group: &str) -> Self {
        self.failing_group_deletes.insert(group.to_string());
        self
    }

    pub fn failing_provision(mut self) -> Self {
        self.failing_provision = true;
        self
    }

    /// The first `n` existence checks fail
    pub fn failing_polls(mut self, n: u32) -> Self {
        self.failing_polls = n;
        self
    }

    /// Deleted groups keep showing up for `n` existence checks
    pub fn linger_polls(mut self, n: u32) -> Self {
        self.linger_polls = n;
        self
    }

    pub fn logged_out(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Sleep before every mutating call
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn build(self) -> MockProvider {
        MockProvider {
            state: Mutex::new(MockState {
                groups: self.groups,
                failing_polls: self.failing_polls,
                ..MockState::default()
            }),
            graph: self.graph,
            templates: self.templates,
            failing_deletes: self.failing_deletes,
            failing_purges: self.failing_purges,
            failing_group_deletes: self.failing_group_deletes,
            failing_provision: self.failing_provision,
            linger_polls: self.linger_polls,
            authenticated: self.authenticated,
            delay: self.delay,
        }
    }
}
