//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Not authenticated: {0}")]
    AuthenticationFailed(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource group not found: {0}")]
    ResourceGroupNotFound(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Provisioning failed: {0}")]
    ProvisionFailed(String),

    #[error("Circular teardown dependency between: {0}")]
    CircularDependency(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
