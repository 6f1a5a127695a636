//! environment node parsing

use super::{first_f64, first_u64, narrow, parse_policy, required_string};
use crate::defaults::{self, resource_group_name};
use crate::error::{CoreError, Result};
use crate::model::{CostEstimate, Environment};
use kdl::KdlNode;

/// Parse an `environment "<name>" { ... }` node
///
/// Well-known names (it, qa, prod) start from the built-in descriptor, so a
/// file only needs to state what differs.
pub fn parse_environment(node: &KdlNode, project: &str) -> Result<Environment> {
    let name = required_string(node, "environment")?;

    let mut env = defaults::builtin_environment(project, &name).unwrap_or_else(|| {
        Environment::new(
            name.clone(),
            resource_group_name(project, &name),
            CostEstimate::default(),
        )
    });

    let Some(children) = node.children() else {
        return Ok(env);
    };

    for child in children.nodes() {
        match child.name().value() {
            "resource-group" | "resource_group" => {
                env.resource_group = required_string(child, "resource-group")?;
            }
            "location" => {
                env.location = Some(required_string(child, "location")?);
            }
            "hourly-cost" | "hourly_cost" => {
                env.cost.hourly_usd = first_f64(child, "hourly-cost")?;
            }
            "monthly-budget" | "monthly_budget" => {
                env.cost.monthly_budget_usd = Some(first_f64(child, "monthly-budget")?);
            }
            "expected-resources" | "expected_resources" => {
                env.expected_resources = Some(narrow(
                    first_u64(child, "expected-resources")?,
                    "expected-resources",
                )?);
            }
            "protected" => {
                env.protected = true;
            }
            "shutdown" => {
                env.shutdown = parse_policy(child, env.shutdown.clone())?;
            }
            "startup" => {
                env.startup = parse_policy(child, env.startup.clone())?;
            }
            other => {
                return Err(CoreError::InvalidConfig(format!(
                    "unknown setting '{}' in environment '{}'",
                    other, name
                )));
            }
        }
    }

    Ok(env)
}
