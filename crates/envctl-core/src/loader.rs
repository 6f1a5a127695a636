//! Manifest loading

use crate::defaults;
use crate::error::{CoreError, Result};
use crate::model::Manifest;
use crate::parser::parse_kdl_string;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Read and parse an `envctl.kdl` file
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    debug!("Reading config file");
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::ReadConfig {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let manifest = parse_kdl_string(&content)?;
    info!(
        project = %manifest.project,
        environments = manifest.environments.len(),
        rules = manifest.teardown_rules.len(),
        "Config loaded"
    );
    Ok(manifest)
}

/// Load the file if one was found, otherwise the built-in environments
pub fn load_manifest_or_default(path: Option<&Path>) -> Result<Manifest> {
    match path {
        Some(path) => load_manifest(path),
        None => {
            info!("No config file found, using built-in environments");
            Ok(defaults::builtin_manifest())
        }
    }
}
