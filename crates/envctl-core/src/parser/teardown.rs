//! teardown node parsing

use super::{property, required_string};
use crate::error::{CoreError, Result};
use crate::model::TeardownRule;
use kdl::KdlNode;

/// Parse a `teardown { delete "<type>" before="<type>" ... }` block
pub fn parse_teardown(node: &KdlNode) -> Result<Vec<TeardownRule>> {
    let mut rules = Vec::new();

    let Some(children) = node.children() else {
        return Ok(rules);
    };

    for child in children.nodes() {
        match child.name().value() {
            "delete" => {
                let resource_type = required_string(child, "teardown delete")?;
                let before = property(child, "before")
                    .and_then(|v| v.as_string())
                    .ok_or_else(|| {
                        CoreError::InvalidConfig(format!(
                            "teardown rule for '{}' requires before=\"<type>\"",
                            resource_type
                        ))
                    })?;
                rules.push(TeardownRule::new(resource_type, before));
            }
            other => {
                return Err(CoreError::InvalidConfig(format!(
                    "unknown teardown setting '{}'",
                    other
                )));
            }
        }
    }

    Ok(rules)
}
