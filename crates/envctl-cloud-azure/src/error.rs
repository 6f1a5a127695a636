//! Azure provider error types

use envctl_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az not found. Please install the Azure CLI: https://aka.ms/installazurecli")]
    AzNotFound,

    #[error("azd not found. Please install the Azure Developer CLI: https://aka.ms/azd-install")]
    AzdNotFound,

    #[error("az authentication failed: {0}. Run `az login`")]
    AuthenticationFailed(String),

    #[error("{tool} command failed: {stderr}")]
    CommandFailed { tool: &'static str, stderr: String },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource group not found: {0}")]
    ResourceGroupNotFound(String),

    #[error("Cannot purge {name}: {reason}")]
    PurgeUnsupported { name: String, reason: String },

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AzureError {
    /// Classify a failed `az` invocation by the ARM error code in stderr
    pub fn from_stderr(tool: &'static str, stderr: &str, target: &str) -> Self {
        if stderr.contains("ResourceGroupNotFound") {
            AzureError::ResourceGroupNotFound(target.to_string())
        } else if stderr.contains("ResourceNotFound") || stderr.contains("(NotFound)") {
            AzureError::ResourceNotFound(target.to_string())
        } else if stderr.contains("az login") || stderr.contains("AuthorizationFailed") {
            AzureError::AuthenticationFailed(stderr.trim().to_string())
        } else {
            AzureError::CommandFailed {
                tool,
                stderr: stderr.trim().to_string(),
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AzureError::ResourceNotFound(_) | AzureError::ResourceGroupNotFound(_)
        )
    }
}

impl From<AzureError> for CloudError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::AzNotFound | AzureError::AzdNotFound => {
                CloudError::AuthenticationFailed(err.to_string())
            }
            AzureError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            AzureError::ResourceNotFound(id) => CloudError::ResourceNotFound(id),
            AzureError::ResourceGroupNotFound(group) => CloudError::ResourceGroupNotFound(group),
            AzureError::CommandFailed { stderr, .. } => CloudError::CommandFailed(stderr),
            AzureError::PurgeUnsupported { .. } => CloudError::InvalidConfig(err.to_string()),
            AzureError::JsonError(e) => CloudError::Json(e),
            AzureError::IoError(e) => CloudError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;
