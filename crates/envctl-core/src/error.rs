use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("failed to read {path}: {message}")]
    ReadConfig { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("environment not found: {name} (available: {available})")]
    EnvironmentNotFound { name: String, available: String },

    #[error("resource group '{group}' is claimed by both '{first}' and '{second}'")]
    DuplicateResourceGroup {
        group: String,
        first: String,
        second: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
