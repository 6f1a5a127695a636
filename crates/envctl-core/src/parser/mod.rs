//! KDL parser
//!
//! Parses `envctl.kdl`. Unknown top-level nodes are skipped so the file can
//! carry notes for other tooling.
//!
//! ```kdl
//! project "webplatform"
//! location "eastus"
//! verify interval=10 attempts=30
//!
//! environment "it" {
//!     resource-group "rg-webplatform-it"
//!     hourly-cost 0.50
//! }
//!
//! teardown {
//!     delete "Microsoft.Web/sites" before="Microsoft.Web/serverFarms"
//! }
//! ```

mod environment;
mod teardown;

use environment::parse_environment;
use teardown::parse_teardown;

use crate::defaults::{self, DEFAULT_LOCATION, DEFAULT_PROJECT};
use crate::error::{CoreError, Result};
use crate::model::{ConfirmationPolicy, Manifest, VerifySettings};
use kdl::{KdlDocument, KdlNode, KdlValue};

/// Parse a KDL document into a validated [`Manifest`]
///
/// A document without `environment` nodes gets the built-in it/qa/prod set,
/// named after the document's `project`.
pub fn parse_kdl_string(content: &str) -> Result<Manifest> {
    let doc: KdlDocument = content.parse()?;

    // Project-level settings first: environments derive names from them
    let mut project = DEFAULT_PROJECT.to_string();
    let mut location = DEFAULT_LOCATION.to_string();
    let mut verify = VerifySettings::default();
    let mut emergency = defaults::emergency_policy();

    for node in doc.nodes() {
        match node.name().value() {
            "project" => project = required_string(node, "project")?,
            "location" => location = required_string(node, "location")?,
            "verify" => verify = parse_verify(node, verify)?,
            "emergency" => emergency = parse_policy(node, emergency)?,
            _ => {}
        }
    }

    let mut environments = Vec::new();
    let mut teardown_rules = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "environment" | "env" => environments.push(parse_environment(node, &project)?),
            "teardown" => teardown_rules.extend(parse_teardown(node)?),
            "project" | "location" | "verify" | "emergency" => {}
            other => {
                tracing::debug!(node = other, "Skipping unknown node");
            }
        }
    }

    if environments.is_empty() {
        environments = defaults::builtin_environments(&project);
    }

    let manifest = Manifest {
        project,
        location,
        environments,
        verify,
        teardown_rules,
        emergency,
    };
    manifest.validate()?;

    Ok(manifest)
}

fn parse_verify(node: &KdlNode, mut verify: VerifySettings) -> Result<VerifySettings> {
    if let Some(interval) = property(node, "interval") {
        verify.interval_secs = as_u64(interval, "verify interval")?;
    }
    if let Some(attempts) = property(node, "attempts") {
        verify.attempts = narrow(as_u64(attempts, "verify attempts")?, "verify attempts")?;
    }
    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "interval" => verify.interval_secs = first_u64(child, "verify interval")?,
                "attempts" => {
                    verify.attempts = narrow(first_u64(child, "verify attempts")?, "verify attempts")?
                }
                _ => {}
            }
        }
    }
    if verify.attempts == 0 {
        return Err(CoreError::InvalidConfig(
            "verify attempts must be at least 1".to_string(),
        ));
    }
    Ok(verify)
}

/// Parse a gate block:
///
/// ```kdl
/// shutdown {
///     confirm "DELETE-PRODUCTION"
///     confirm "DELETE-PROD-ENVIRONMENT"
///     countdown 10
/// }
/// ```
///
/// Phrases replace the defaults as a whole; a block without `confirm` keeps
/// the default phrases.
pub(crate) fn parse_policy(
    node: &KdlNode,
    default: ConfirmationPolicy,
) -> Result<ConfirmationPolicy> {
    let mut phrases = Vec::new();
    let mut countdown = default.countdown_secs;

    // `startup "Yes"` shorthand
    phrases.extend(positional_strings(node));

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "confirm" | "phrase" => phrases.extend(positional_strings(child)),
                "countdown" => countdown = first_u64(child, "countdown")?,
                other => {
                    return Err(CoreError::InvalidConfig(format!(
                        "unknown gate setting '{}' in {}",
                        other,
                        node.name().value()
                    )));
                }
            }
        }
    }

    Ok(ConfirmationPolicy {
        phrases: if phrases.is_empty() {
            default.phrases
        } else {
            phrases
        },
        countdown_secs: countdown,
    })
}

// ========== Value helpers ==========

pub(crate) fn first_value(node: &KdlNode) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .map(|e| e.value())
}

pub(crate) fn property<'a>(node: &'a KdlNode, key: &str) -> Option<&'a KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().is_some_and(|n| n.value() == key))
        .map(|e| e.value())
}

pub(crate) fn positional_strings(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

pub(crate) fn required_string(node: &KdlNode, what: &str) -> Result<String> {
    first_value(node)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| CoreError::InvalidConfig(format!("{} requires a string value", what)))
}

pub(crate) fn as_f64(value: &KdlValue, what: &str) -> Result<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
        .ok_or_else(|| CoreError::InvalidConfig(format!("{} must be a number", what)))
}

pub(crate) fn as_u64(value: &KdlValue, what: &str) -> Result<u64> {
    value
        .as_integer()
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| {
            CoreError::InvalidConfig(format!("{} must be a non-negative integer", what))
        })
}

pub(crate) fn first_f64(node: &KdlNode, what: &str) -> Result<f64> {
    let value = first_value(node)
        .ok_or_else(|| CoreError::InvalidConfig(format!("{} requires a value", what)))?;
    as_f64(value, what)
}

pub(crate) fn first_u64(node: &KdlNode, what: &str) -> Result<u64> {
    let value = first_value(node)
        .ok_or_else(|| CoreError::InvalidConfig(format!("{} requires a value", what)))?;
    as_u64(value, what)
}

/// Rejects values that do not fit the target integer instead of wrapping
pub(crate) fn narrow<T: TryFrom<u64>>(value: u64, what: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| CoreError::InvalidConfig(format!("{} is out of range: {}", what, value)))
}
