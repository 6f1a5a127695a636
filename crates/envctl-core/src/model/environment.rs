//! Environment descriptor

use super::CostEstimate;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Phrase the startup gate asks for
pub const STARTUP_PHRASE: &str = "Yes";

/// Number of distinct phrases a protected environment requires
pub const PROTECTED_PHRASE_COUNT: usize = 3;

/// One deployable environment (it, qa, prod, ...)
///
/// Each environment owns exactly one resource group. Deleting the group is
/// deleting the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,

    pub resource_group: String,

    /// Azure location, `None` means the project default
    #[serde(default)]
    pub location: Option<String>,

    pub cost: CostEstimate,

    /// Gate in front of teardown
    pub shutdown: ConfirmationPolicy,

    /// Gate in front of provisioning
    pub startup: ConfirmationPolicy,

    /// Resources the group should hold once startup finishes
    #[serde(default)]
    pub expected_resources: Option<usize>,

    /// Production-style environment: stricter shutdown gate
    #[serde(default)]
    pub protected: bool,
}

impl Environment {
    /// Environment with the default gates for its name
    pub fn new(
        name: impl Into<String>,
        resource_group: impl Into<String>,
        cost: CostEstimate,
    ) -> Self {
        let name = name.into();
        Self {
            shutdown: ConfirmationPolicy::single(default_shutdown_phrase(&name)),
            startup: ConfirmationPolicy::single(STARTUP_PHRASE),
            resource_group: resource_group.into(),
            location: None,
            cost,
            expected_resources: None,
            protected: false,
            name,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(CoreError::InvalidConfig(format!(
                "environment name '{}' must be lowercase letters, digits or '-'",
                self.name
            )));
        }

        if self.resource_group.trim().is_empty() {
            return Err(CoreError::InvalidConfig(format!(
                "environment '{}' has no resource group",
                self.name
            )));
        }

        if !self.cost.hourly_usd.is_finite() || self.cost.hourly_usd < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "environment '{}' has an invalid hourly cost",
                self.name
            )));
        }

        self.shutdown.validate(&format!("{} shutdown", self.name))?;
        self.startup.validate(&format!("{} startup", self.name))?;

        if self.protected {
            if self.shutdown.phrases.len() < PROTECTED_PHRASE_COUNT
                || !self.shutdown.phrases_are_distinct()
            {
                return Err(CoreError::InvalidConfig(format!(
                    "protected environment '{}' needs {} distinct shutdown phrases",
                    self.name, PROTECTED_PHRASE_COUNT
                )));
            }
            if self.shutdown.countdown_secs == 0 {
                return Err(CoreError::InvalidConfig(format!(
                    "protected environment '{}' needs a shutdown countdown",
                    self.name
                )));
            }
        }

        Ok(())
    }
}

/// `DELETE-IT-ENVIRONMENT` for `it`
pub fn default_shutdown_phrase(env_name: &str) -> String {
    format!("DELETE-{}-ENVIRONMENT", env_name.to_ascii_uppercase())
}

/// Phrases the operator must type, in order, before an action proceeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPolicy {
    pub phrases: Vec<String>,

    /// Seconds to count down after the last phrase
    #[serde(default)]
    pub countdown_secs: u64,
}

impl ConfirmationPolicy {
    pub fn single(phrase: impl Into<String>) -> Self {
        Self {
            phrases: vec![phrase.into()],
            countdown_secs: 0,
        }
    }

    pub fn with_countdown(mut self, secs: u64) -> Self {
        self.countdown_secs = secs;
        self
    }

    pub fn phrases_are_distinct(&self) -> bool {
        self.phrases
            .iter()
            .enumerate()
            .all(|(i, p)| !self.phrases[..i].contains(p))
    }

    pub(crate) fn validate(&self, label: &str) -> Result<()> {
        if self.phrases.is_empty() {
            return Err(CoreError::InvalidConfig(format!(
                "{} gate has no confirmation phrase",
                label
            )));
        }
        if self.phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(CoreError::InvalidConfig(format!(
                "{} gate has an empty confirmation phrase",
                label
            )));
        }
        Ok(())
    }
}
