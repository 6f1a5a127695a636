//! Action results for lifecycle runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of action performed against the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Delete a single resource
    Delete,
    /// Hard-delete a soft-deleted resource
    Purge,
    /// Delete the resource group itself
    DeleteGroup,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Delete => write!(f, "delete"),
            ActionType::Purge => write!(f, "purge"),
            ActionType::DeleteGroup => write!(f, "delete-group"),
        }
    }
}

/// Result of applying actions
///
/// Failures never stop a run; they are collected here and reported at the
/// end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(
        &mut self,
        action_type: ActionType,
        target: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.succeeded.push(ActionResult {
            action_type,
            target: target.into(),
            success: true,
            message: message.into(),
            error: None,
        });
    }

    pub fn add_failure(
        &mut self,
        action_type: ActionType,
        target: impl Into<String>,
        error: impl Into<String>,
    ) {
        self.failed.push(ActionResult {
            action_type,
            target: target.into(),
            success: false,
            message: String::new(),
            error: Some(error.into()),
        });
    }

    /// Number of successful actions of one type
    pub fn count(&self, action_type: ActionType) -> usize {
        self.succeeded
            .iter()
            .filter(|r| r.action_type == action_type)
            .count()
    }

    /// Stamp the elapsed time since `started_at`
    pub fn finish(&mut self) {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        self.duration_ms = elapsed.num_milliseconds().max(0) as u64;
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_type: ActionType,

    /// Resource name or group the action targeted
    pub target: String,

    /// Whether the action succeeded
    pub success: bool,

    /// Success message
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}
