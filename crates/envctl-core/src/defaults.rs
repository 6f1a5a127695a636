//! Built-in environments
//!
//! Used when no `envctl.kdl` is found, and as the template for
//! environments a config file declares without details.

use crate::model::{
    ConfirmationPolicy, CostEstimate, Environment, Manifest, VerifySettings,
    default_shutdown_phrase,
};

pub const DEFAULT_PROJECT: &str = "webplatform";
pub const DEFAULT_LOCATION: &str = "eastus";

/// Phrase for the all-environment emergency shutdown
pub const EMERGENCY_PHRASE: &str = "EMERGENCY-SHUTDOWN-ALL";
pub const EMERGENCY_COUNTDOWN_SECS: u64 = 10;
pub const PRODUCTION_COUNTDOWN_SECS: u64 = 10;

/// `rg-<project>-<env>`
pub fn resource_group_name(project: &str, env: &str) -> String {
    format!("rg-{}-{}", project, env)
}

pub fn production_shutdown_policy() -> ConfirmationPolicy {
    ConfirmationPolicy {
        phrases: vec![
            "DELETE-PRODUCTION".to_string(),
            "I UNDERSTAND THIS CANNOT BE UNDONE".to_string(),
            default_shutdown_phrase("prod"),
        ],
        countdown_secs: PRODUCTION_COUNTDOWN_SECS,
    }
}

pub fn emergency_policy() -> ConfirmationPolicy {
    ConfirmationPolicy::single(EMERGENCY_PHRASE).with_countdown(EMERGENCY_COUNTDOWN_SECS)
}

/// Built-in descriptor for a well-known environment name
pub fn builtin_environment(project: &str, name: &str) -> Option<Environment> {
    let group = resource_group_name(project, name);
    let env = match name {
        "it" => {
            let mut env = Environment::new(name, group, CostEstimate::hourly(0.50).with_budget(400.0));
            env.expected_resources = Some(14);
            env
        }
        "qa" => {
            let mut env = Environment::new(name, group, CostEstimate::hourly(1.25).with_budget(1000.0));
            env.expected_resources = Some(16);
            env
        }
        "prod" => {
            let mut env = Environment::new(name, group, CostEstimate::hourly(4.80).with_budget(3600.0));
            env.expected_resources = Some(22);
            env.protected = true;
            env.shutdown = production_shutdown_policy();
            env
        }
        _ => return None,
    };
    Some(env)
}

pub fn builtin_environments(project: &str) -> Vec<Environment> {
    ["it", "qa", "prod"]
        .iter()
        .filter_map(|name| builtin_environment(project, name))
        .collect()
}

pub fn builtin_manifest() -> Manifest {
    Manifest {
        project: DEFAULT_PROJECT.to_string(),
        location: DEFAULT_LOCATION.to_string(),
        environments: builtin_environments(DEFAULT_PROJECT),
        verify: VerifySettings::default(),
        teardown_rules: Vec::new(),
        emergency: emergency_policy(),
    }
}
