//! Starter `envctl.kdl` written by `envctl init`
//!
//! Rendered from the built-in descriptors so the file a team starts from is
//! exactly what envctl would use without one.

use crate::defaults::{self, DEFAULT_LOCATION};
use crate::model::{ConfirmationPolicy, Environment, VerifySettings};
use std::fmt::Write;

/// Render the starter config for `project`
pub fn starter_config(project: &str) -> String {
    let mut out = String::new();
    let verify = VerifySettings::default();

    let _ = writeln!(out, "// envctl configuration");
    let _ = writeln!(
        out,
        "// Costs are the estimates shown by the confirmation gate and `envctl costs`."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "project {}", quote(project));
    let _ = writeln!(out, "location {}", quote(DEFAULT_LOCATION));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "verify interval={} attempts={}",
        verify.interval_secs, verify.attempts
    );

    for env in defaults::builtin_environments(project) {
        let _ = writeln!(out);
        render_environment(&mut out, &env);
    }

    let _ = writeln!(out);
    render_policy(&mut out, "emergency", &defaults::emergency_policy(), "");

    let _ = writeln!(out);
    let _ = writeln!(out, "// Extra teardown ordering on top of the built-in Azure catalog:");
    let _ = writeln!(out, "// teardown {{");
    let _ = writeln!(
        out,
        "//     delete \"Microsoft.Web/sites\" before=\"Microsoft.Web/serverFarms\""
    );
    let _ = writeln!(out, "// }}");

    out
}

fn render_environment(out: &mut String, env: &Environment) {
    let _ = writeln!(out, "environment {} {{", quote(&env.name));
    let _ = writeln!(out, "    resource-group {}", quote(&env.resource_group));
    if let Some(location) = &env.location {
        let _ = writeln!(out, "    location {}", quote(location));
    }
    let _ = writeln!(out, "    hourly-cost {:.2}", env.cost.hourly_usd);
    if let Some(budget) = env.cost.monthly_budget_usd {
        let _ = writeln!(out, "    monthly-budget {:.2}", budget);
    }
    if let Some(expected) = env.expected_resources {
        let _ = writeln!(out, "    expected-resources {}", expected);
    }
    if env.protected {
        let _ = writeln!(out, "    protected");
    }
    render_policy(out, "shutdown", &env.shutdown, "    ");
    render_policy(out, "startup", &env.startup, "    ");
    let _ = writeln!(out, "}}");
}

fn render_policy(out: &mut String, name: &str, policy: &ConfirmationPolicy, indent: &str) {
    if policy.phrases.len() == 1 && policy.countdown_secs == 0 {
        let _ = writeln!(out, "{}{} {}", indent, name, quote(&policy.phrases[0]));
        return;
    }
    let _ = writeln!(out, "{}{} {{", indent, name);
    for phrase in &policy.phrases {
        let _ = writeln!(out, "{}    confirm {}", indent, quote(phrase));
    }
    if policy.countdown_secs > 0 {
        let _ = writeln!(out, "{}    countdown {}", indent, policy.countdown_secs);
    }
    let _ = writeln!(out, "{}}}", indent);
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DEFAULT_PROJECT;
    use crate::parser::parse_kdl_string;

    #[test]
    fn test_starter_config_matches_builtins() {
        let content = starter_config(DEFAULT_PROJECT);
        let manifest = parse_kdl_string(&content).unwrap();
        let builtin = defaults::builtin_manifest();

        assert_eq!(manifest.environments, builtin.environments);
        assert_eq!(manifest.verify, builtin.verify);
        assert_eq!(manifest.emergency, builtin.emergency);
        assert!(manifest.teardown_rules.is_empty());
    }

    #[test]
    fn test_starter_config_uses_project() {
        let content = starter_config("shop");
        assert!(content.contains("resource-group \"rg-shop-qa\""));

        let manifest = parse_kdl_string(&content).unwrap();
        assert_eq!(manifest.project, "shop");
        assert_eq!(
            manifest.environment("prod").unwrap().resource_group,
            "rg-shop-prod"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
    }
}
