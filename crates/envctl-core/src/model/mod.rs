//! Data model
//!
//! A [`Manifest`] is everything `envctl.kdl` declares: the environments,
//! how long the verifier polls, and extra teardown ordering rules.

mod cost;
mod environment;

pub use cost::*;
pub use environment::*;

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Fully loaded configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Project name, used to derive default resource-group names
    pub project: String,

    /// Default Azure location for environments that don't set one
    pub location: String,

    /// Environments in declaration order
    pub environments: Vec<Environment>,

    /// Verifier polling settings
    #[serde(default)]
    pub verify: VerifySettings,

    /// Extra "delete before" rules on top of the provider's catalog
    #[serde(default)]
    pub teardown_rules: Vec<TeardownRule>,

    /// Gate for the all-environment emergency shutdown
    pub emergency: ConfirmationPolicy,
}

impl Manifest {
    /// Look up an environment by name
    pub fn environment(&self, name: &str) -> Result<&Environment> {
        self.environments
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CoreError::EnvironmentNotFound {
                name: name.to_string(),
                available: self.environment_names().join(", "),
            })
    }

    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.iter().map(|e| e.name.as_str()).collect()
    }

    /// Location for an environment, falling back to the project default
    pub fn location_for<'a>(&'a self, env: &'a Environment) -> &'a str {
        env.location.as_deref().unwrap_or(&self.location)
    }

    /// Combined hourly cost of every environment (emergency gate)
    pub fn total_cost(&self) -> CostEstimate {
        CostEstimate::combined(self.environments.iter().map(|e| &e.cost))
    }

    /// Check cross-environment invariants
    ///
    /// Every environment owns exactly one resource group and no group is
    /// shared. Protected environments need three distinct shutdown phrases
    /// and a countdown.
    pub fn validate(&self) -> Result<()> {
        if self.environments.is_empty() {
            return Err(CoreError::InvalidConfig(
                "at least one environment is required".to_string(),
            ));
        }

        for (i, env) in self.environments.iter().enumerate() {
            env.validate()?;

            for other in &self.environments[..i] {
                if other.name == env.name {
                    return Err(CoreError::InvalidConfig(format!(
                        "environment '{}' is declared twice",
                        env.name
                    )));
                }
                if other.resource_group.eq_ignore_ascii_case(&env.resource_group) {
                    return Err(CoreError::DuplicateResourceGroup {
                        group: env.resource_group.clone(),
                        first: other.name.clone(),
                        second: env.name.clone(),
                    });
                }
            }
        }

        self.emergency.validate("emergency")?;

        for rule in &self.teardown_rules {
            if rule.resource_type.eq_ignore_ascii_case(&rule.before) {
                return Err(CoreError::InvalidConfig(format!(
                    "teardown rule for '{}' refers to itself",
                    rule.resource_type
                )));
            }
        }

        Ok(())
    }
}

/// Verifier polling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySettings {
    /// Seconds between polls
    pub interval_secs: u64,

    /// Maximum number of polls before giving up with a warning
    pub attempts: u32,
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            attempts: 30,
        }
    }
}

/// `resource_type` must be deleted before `before`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownRule {
    pub resource_type: String,
    pub before: String,
}

impl TeardownRule {
    pub fn new(resource_type: impl Into<String>, before: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            before: before.into(),
        }
    }
}
