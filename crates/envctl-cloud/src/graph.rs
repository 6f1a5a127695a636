//! Resource-type deletion graph
//!
//! Nodes are resource types, an edge `a -> b` means every `a` must be
//! deleted before any `b`. The teardown order is a topological sort of this
//! graph. Ties are broken by [`Tier`] and then declaration order, so the same
//! graph always yields the same plan.
//!
//! Resource types are compared case-insensitively.

use crate::error::{CloudError, Result};
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Coarse teardown tier, in deletion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// API gateways, application gateways, CDN/front door
    Gateway,
    /// Container apps, web apps, VMs, clusters
    Compute,
    /// Container app environments, app service plans, disks, NICs
    Hosting,
    /// Databases, storage, caches
    Data,
    /// Key Vault, container registries
    Security,
    /// Private endpoints, public IPs, VNets
    Network,
    /// Application Insights, Log Analytics
    Observability,
    /// Managed identities
    Identity,
    /// Types the graph knows nothing about
    Unclassified,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::Gateway => "gateway",
            Tier::Compute => "compute",
            Tier::Hosting => "hosting",
            Tier::Data => "data",
            Tier::Security => "security",
            Tier::Network => "network",
            Tier::Observability => "observability",
            Tier::Identity => "identity",
            Tier::Unclassified => "unclassified",
        };
        write!(f, "{}", s)
    }
}

/// One node of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceKind {
    pub resource_type: String,

    pub tier: Tier,

    /// Deletion only soft-deletes; a purge must follow
    pub soft_delete: bool,
}

impl ResourceKind {
    pub fn new(resource_type: impl Into<String>, tier: Tier) -> Self {
        Self {
            resource_type: resource_type.into(),
            tier,
            soft_delete: false,
        }
    }

    pub fn soft_delete(mut self) -> Self {
        self.soft_delete = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeletionGraph {
    /// Node indices follow declaration order
    graph: DiGraph<ResourceKind, ()>,
    index: HashMap<String, NodeIndex>,
}

fn key(resource_type: &str) -> String {
    resource_type.to_ascii_lowercase()
}

impl DeletionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Add a node; re-adding a type updates its tier and soft-delete flag
    pub fn add_kind(&mut self, kind: ResourceKind) -> NodeIndex {
        let k = key(&kind.resource_type);
        if let Some(&i) = self.index.get(&k) {
            let existing = &mut self.graph[i];
            existing.tier = kind.tier;
            existing.soft_delete |= kind.soft_delete;
            return i;
        }
        let i = self.graph.add_node(kind);
        self.index.insert(k, i);
        i
    }

    fn node(&mut self, resource_type: &str) -> NodeIndex {
        match self.index.get(&key(resource_type)) {
            Some(&i) => i,
            None => self.add_kind(ResourceKind::new(resource_type, Tier::Unclassified)),
        }
    }

    /// Every `first` must be deleted before any `then`
    ///
    /// Unknown types are added as [`Tier::Unclassified`].
    pub fn delete_before(&mut self, first: &str, then: &str) {
        let a = self.node(first);
        let b = self.node(then);
        if a != b {
            self.graph.update_edge(a, b, ());
        }
    }

    pub fn kind(&self, resource_type: &str) -> Option<&ResourceKind> {
        self.index
            .get(&key(resource_type))
            .map(|&i| &self.graph[i])
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.index.contains_key(&key(resource_type))
    }

    pub fn is_soft_delete(&self, resource_type: &str) -> bool {
        self.kind(resource_type).is_some_and(|k| k.soft_delete)
    }

    /// Types that must wait for `resource_type`, in declaration order
    pub fn successors(&self, resource_type: &str) -> Vec<&ResourceKind> {
        let Some(&i) = self.index.get(&key(resource_type)) else {
            return Vec::new();
        };
        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(i, Direction::Outgoing)
            .collect();
        next.sort();
        next.into_iter().map(|j| &self.graph[j]).collect()
    }

    /// All types in deletion order
    ///
    /// Kahn's algorithm; among ready nodes the lowest (tier, declaration
    /// index) goes first.
    pub fn order(&self) -> Result<Vec<&ResourceKind>> {
        self.validate()?;

        let mut waiting: Vec<usize> = self
            .graph
            .node_indices()
            .map(|i| self.graph.neighbors_directed(i, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<(Tier, NodeIndex)>> = self
            .graph
            .node_indices()
            .filter(|i| waiting[i.index()] == 0)
            .map(|i| Reverse((self.graph[i].tier, i)))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((_, i))) = ready.pop() {
            order.push(&self.graph[i]);
            for next in self.graph.neighbors_directed(i, Direction::Outgoing) {
                waiting[next.index()] -= 1;
                if waiting[next.index()] == 0 {
                    ready.push(Reverse((self.graph[next].tier, next)));
                }
            }
        }

        Ok(order)
    }

    /// Check the graph is acyclic, naming the types on any cycle
    pub fn validate(&self) -> Result<()> {
        if !is_cyclic_directed(&self.graph) {
            return Ok(());
        }
        let mut members: Vec<NodeIndex> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .flatten()
            .collect();
        members.sort();
        let names: Vec<&str> = members
            .iter()
            .map(|&i| self.graph[i].resource_type.as_str())
            .collect();
        Err(CloudError::CircularDependency(names.join(", ")))
    }
}
